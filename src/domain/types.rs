//! Shared domain types.
//!
//! The data contract stores its tags as plain strings; everything here is the
//! parsed, closed form the evaluators work with. Parsing happens once, when a
//! model is constructed, so an unknown tag never reaches an evaluation path.

use std::fmt;
use std::str::FromStr;

use nalgebra::{Complex, DMatrix};
use clap::ValueEnum;

use crate::error::{AppError, ErrorKind};
use crate::math::peak_index;

/// How raw parameter values are normalized before fit evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffineMap {
    /// `[x_min, x_max] -> [-1, 1]`
    MinusOneToOne,
    /// `[x_min, x_max] -> [0, 1]`
    ZeroToOne,
    Identity,
}

impl FromStr for AffineMap {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minus1_to_1" => Ok(AffineMap::MinusOneToOne),
            "zero_to_1" => Ok(AffineMap::ZeroToOne),
            "none" => Ok(AffineMap::Identity),
            other => Err(AppError::new(
                ErrorKind::UnknownAffineMap,
                format!("Unknown affine map '{other}'."),
            )),
        }
    }
}

/// Basis representation a surrogate was trained with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// One complex empirical-interpolant operator `B`.
    WaveformBasis,
    /// Separate real operators for amplitude and phase.
    AmpPhaseBasis,
}

impl Representation {
    pub fn tag(self) -> &'static str {
        match self {
            Representation::WaveformBasis => "waveform_basis",
            Representation::AmpPhaseBasis => "amp_phase_basis",
        }
    }
}

impl FromStr for Representation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waveform_basis" => Ok(Representation::WaveformBasis),
            "amp_phase_basis" => Ok(Representation::AmpPhaseBasis),
            other => Err(AppError::new(
                ErrorKind::UnknownRepresentation,
                format!("Invalid surrogate representation '{other}'."),
            )),
        }
    }
}

/// Which physical quantity the fits are functions of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parameterization {
    /// Fits take the mass ratio `q` directly.
    MassRatio,
    /// Fits take the symmetric mass ratio `nu = q / (1 + q)^2`.
    SymmetricMassRatio,
}

impl Parameterization {
    /// Map a mass ratio to the surrogate's fit parameter.
    pub fn apply(self, q: f64) -> f64 {
        match self {
            Parameterization::MassRatio => q,
            Parameterization::SymmetricMassRatio => q / ((1.0 + q) * (1.0 + q)),
        }
    }
}

impl FromStr for Parameterization {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "q_to_q" => Ok(Parameterization::MassRatio),
            "q_to_nu" => Ok(Parameterization::SymmetricMassRatio),
            other => Err(AppError::new(
                ErrorKind::UnknownParameterization,
                format!("Unknown parameterization '{other}'."),
            )),
        }
    }
}

/// Units of caller-supplied sample times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SampleUnits {
    /// Geometric units, `t / M`.
    #[default]
    Dimensionless,
    /// Seconds.
    Mks,
}

impl FromStr for SampleUnits {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dimensionless" => Ok(SampleUnits::Dimensionless),
            "mks" => Ok(SampleUnits::Mks),
            other => Err(AppError::new(
                ErrorKind::UnsupportedSampleUnits,
                format!("Sample units '{other}' are not supported (use 'dimensionless' or 'mks')."),
            )),
        }
    }
}

/// Units for the native time grid accessor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeUnits {
    /// `t / M` with `G = c = 1`.
    Geometric,
    /// Seconds per solar mass of total mass.
    SolarMass,
    /// Seconds for a binary of the given total mass (solar masses).
    Seconds { total_mass: f64 },
}

/// Flavor of basis vector exposed for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasisFlavor {
    /// Column of the empirical interpolant operator `B`.
    Cardinal,
    /// Column of `B V`.
    Orthogonal,
    /// Column of `B V R`.
    Waveform,
}

impl FromStr for BasisFlavor {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cardinal" => Ok(BasisFlavor::Cardinal),
            "orthogonal" => Ok(BasisFlavor::Orthogonal),
            "waveform" => Ok(BasisFlavor::Waveform),
            other => Err(AppError::new(
                ErrorKind::InvalidInput,
                format!("Not a valid basis flavor '{other}'."),
            )),
        }
    }
}

/// Which set of EIM fits to inspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitQuantity {
    Amplitude,
    Phase,
}

/// Angular harmonic index `(l, m)`.
///
/// Ordering is lexicographic on `(ell, m)`, which is the order used for
/// per-mode (non-summed) output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModeKey {
    pub ell: i32,
    pub m: i32,
}

impl ModeKey {
    pub fn new(ell: i32, m: i32) -> Self {
        Self { ell, m }
    }

    /// The same `ell` with the azimuthal index mirrored.
    pub fn mirrored(self) -> Self {
        Self {
            ell: self.ell,
            m: -self.m,
        }
    }

    /// Label used for mode groups in model files, e.g. `l2_m1`.
    pub fn label(self) -> String {
        format!("l{}_m{}", self.ell, self.m)
    }

    /// Parse a `l{ell}_m{m}` label. Trailing text after the `m` index is not allowed.
    pub fn from_label(label: &str) -> Result<Self, AppError> {
        let bad = || {
            AppError::new(
                ErrorKind::InvalidModel,
                format!("Mode label '{label}' is not of the form l#_m#."),
            )
        };
        let rest = label.strip_prefix('l').ok_or_else(bad)?;
        let (ell, m) = rest.split_once("_m").ok_or_else(bad)?;
        let ell = ell.parse::<i32>().map_err(|_| bad())?;
        let m = m.trim_end_matches('_').parse::<i32>().map_err(|_| bad())?;
        Ok(Self { ell, m })
    }
}

impl fmt::Display for ModeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.ell, self.m)
    }
}

/// Recoverable condition raised during evaluation.
///
/// The waveform is still returned; the advisory tells the caller it should be
/// used with care.
#[derive(Debug, Clone, PartialEq)]
pub enum Advisory {
    /// The parameter lies outside the interval the fits were trained on.
    Extrapolation { parameter: f64, min: f64, max: f64 },
    /// The surrogate starts at a higher frequency than the caller asked for.
    StartFrequencyAboveLow { f_start: f64, f_low: f64 },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::Extrapolation { parameter, min, max } => write!(
                f,
                "surrogate not trained at parameter value {parameter} (fit interval [{min}, {max}])"
            ),
            Advisory::StartFrequencyAboveLow { f_start, f_low } => write!(
                f,
                "starting frequency is {f_start}, above the requested f_low = {f_low}"
            ),
        }
    }
}

/// Options for a single-mode evaluation.
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// Total mass in solar masses. Physical scaling needs both `mass` and `dist`.
    pub mass: Option<f64>,
    /// Distance in megaparsecs.
    pub dist: Option<f64>,
    /// Target phase at the amplitude peak.
    pub phi_ref: Option<f64>,
    /// Lowest frequency the caller needs covered.
    pub f_low: Option<f64>,
    /// Custom evaluation times; `None` uses the native grid.
    pub samples: Option<Vec<f64>>,
    pub samples_units: SampleUnits,
}

impl EvalOptions {
    /// True when both mass and distance are given and output is physical.
    pub fn is_physical(&self) -> bool {
        self.mass.is_some() && self.dist.is_some()
    }
}

/// Which modes a multi-mode evaluation should cover.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModeRequest {
    /// Every mode the model carries.
    #[default]
    All,
    /// Every `(L, M)` with `2 <= L <= ell_max` and `0 <= M <= L`.
    UpTo(i32),
    /// Exactly these modes, in this order.
    Pairs(Vec<ModeKey>),
}

impl ModeRequest {
    /// Pair up parallel `ell` / `m` lists.
    pub fn pairs(ell: &[i32], m: &[i32]) -> Result<Self, AppError> {
        if ell.len() != m.len() {
            return Err(AppError::new(
                ErrorKind::InvalidInput,
                format!(
                    "ell and m lists must have the same length (got {} and {}).",
                    ell.len(),
                    m.len()
                ),
            ));
        }
        Ok(ModeRequest::Pairs(
            ell.iter().zip(m).map(|(&l, &m)| ModeKey::new(l, m)).collect(),
        ))
    }
}

/// Options for a multi-mode evaluation.
#[derive(Debug, Clone)]
pub struct MultiEvalOptions {
    pub mass: Option<f64>,
    pub dist: Option<f64>,
    /// Polar angle on the sphere. When set, modes are projected onto `Y^{-2}_{lm}`.
    pub theta: Option<f64>,
    /// Azimuthal angle; defaults to 0 when `theta` is set.
    pub phi: Option<f64>,
    /// Not supported for multi-mode evaluation; must be `None`.
    pub phi_ref: Option<f64>,
    pub f_low: Option<f64>,
    pub samples: Option<Vec<f64>>,
    pub samples_units: SampleUnits,
    pub modes: ModeRequest,
    /// Sum all modes into one polarization pair.
    pub mode_sum: bool,
    /// Add `m < 0` modes derived from the `m > 0` ones.
    pub fake_neg_modes: bool,
}

impl Default for MultiEvalOptions {
    fn default() -> Self {
        Self {
            mass: None,
            dist: None,
            theta: None,
            phi: None,
            phi_ref: None,
            f_low: None,
            samples: None,
            samples_units: SampleUnits::Dimensionless,
            modes: ModeRequest::All,
            mode_sum: true,
            fake_neg_modes: false,
        }
    }
}

impl MultiEvalOptions {
    /// Per-mode options forwarded to each single-mode evaluator.
    pub fn single(&self) -> EvalOptions {
        EvalOptions {
            mass: self.mass,
            dist: self.dist,
            phi_ref: self.phi_ref,
            f_low: self.f_low,
            samples: self.samples.clone(),
            samples_units: self.samples_units,
        }
    }
}

/// An evaluated polarization pair.
#[derive(Debug, Clone)]
pub struct Waveform {
    pub times: Vec<f64>,
    pub h_plus: Vec<f64>,
    pub h_cross: Vec<f64>,
    pub advisories: Vec<Advisory>,
}

impl Waveform {
    /// `|h_plus + i h_cross|` at every sample.
    pub fn amplitude(&self) -> Vec<f64> {
        self.h_plus
            .iter()
            .zip(&self.h_cross)
            .map(|(p, c)| p.hypot(*c))
            .collect()
    }

    /// Index of the (first) amplitude maximum, `None` for an empty waveform.
    pub fn peak_index(&self) -> Option<usize> {
        peak_index(&self.complex())
    }

    /// `h_plus + i h_cross` at every sample.
    pub fn complex(&self) -> Vec<Complex<f64>> {
        self.h_plus
            .iter()
            .zip(&self.h_cross)
            .map(|(&p, &c)| Complex::new(p, c))
            .collect()
    }
}

/// Per-mode evaluation output, one column per mode in `modes` order.
#[derive(Debug, Clone)]
pub struct ModeSeries {
    pub modes: Vec<ModeKey>,
    pub times: Vec<f64>,
    pub h_plus: DMatrix<f64>,
    pub h_cross: DMatrix<f64>,
    pub advisories: Vec<Advisory>,
}

impl ModeSeries {
    /// Column index of a mode, if it was evaluated.
    pub fn column_of(&self, key: ModeKey) -> Option<usize> {
        self.modes.iter().position(|k| *k == key)
    }
}

/// Result of a multi-mode evaluation.
#[derive(Debug, Clone)]
pub enum Composition {
    Summed(Waveform),
    Separated(ModeSeries),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_labels_round_trip() {
        let key = ModeKey::from_label("l3_m2").unwrap();
        assert_eq!(key, ModeKey::new(3, 2));
        assert_eq!(key.label(), "l3_m2");
        assert_eq!(ModeKey::from_label("l2_m1_").unwrap(), ModeKey::new(2, 1));
    }

    #[test]
    fn malformed_mode_label_is_rejected() {
        for bad in ["m2_l2", "l2m2", "lx_m1", "l2_my"] {
            let err = ModeKey::from_label(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidModel, "{bad}");
        }
    }

    #[test]
    fn unknown_tags_are_fatal() {
        assert_eq!(
            "bogus".parse::<Representation>().unwrap_err().kind(),
            ErrorKind::UnknownRepresentation
        );
        assert_eq!(
            "minus2_to_2".parse::<AffineMap>().unwrap_err().kind(),
            ErrorKind::UnknownAffineMap
        );
        assert_eq!(
            "cgs".parse::<SampleUnits>().unwrap_err().kind(),
            ErrorKind::UnsupportedSampleUnits
        );
        assert_eq!(
            "q_to_eta".parse::<Parameterization>().unwrap_err().kind(),
            ErrorKind::UnknownParameterization
        );
    }

    #[test]
    fn mode_pairs_require_equal_lengths() {
        let err = ModeRequest::pairs(&[2, 3], &[2]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let req = ModeRequest::pairs(&[2, 3], &[2, 1]).unwrap();
        assert_eq!(
            req,
            ModeRequest::Pairs(vec![ModeKey::new(2, 2), ModeKey::new(3, 1)])
        );
    }

    #[test]
    fn waveform_peak_is_the_first_amplitude_maximum() {
        let w = Waveform {
            times: vec![0.0, 1.0, 2.0, 3.0],
            h_plus: vec![0.1, 0.6, 0.0, -0.8],
            h_cross: vec![0.0, 0.8, 0.2, 0.6],
            advisories: Vec::new(),
        };
        assert_eq!(w.peak_index(), Some(1));
        assert_eq!(w.peak_index(), peak_index(&w.complex()));
        assert_eq!(w.amplitude()[3], 1.0);

        let empty = Waveform {
            times: Vec::new(),
            h_plus: Vec::new(),
            h_cross: Vec::new(),
            advisories: Vec::new(),
        };
        assert_eq!(empty.peak_index(), None);
    }

    #[test]
    fn symmetric_mass_ratio_of_equal_masses_is_quarter() {
        assert!((Parameterization::SymmetricMassRatio.apply(1.0) - 0.25).abs() < 1e-15);
        assert_eq!(Parameterization::MassRatio.apply(3.0), 3.0);
    }

    #[test]
    fn modes_sort_by_ell_then_m() {
        let mut modes = vec![
            ModeKey::new(3, -1),
            ModeKey::new(2, 2),
            ModeKey::new(2, -2),
            ModeKey::new(2, 0),
        ];
        modes.sort();
        assert_eq!(
            modes,
            vec![
                ModeKey::new(2, -2),
                ModeKey::new(2, 0),
                ModeKey::new(2, 2),
                ModeKey::new(3, -1)
            ]
        );
    }
}
