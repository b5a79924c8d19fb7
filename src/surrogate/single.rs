//! Single-mode surrogate evaluation.
//!
//! Pipeline for one call to [`SingleModeSurrogate::evaluate`]:
//!
//! - map the mass ratio through the model's parameterization and normalize it
//! - evaluate the amplitude, phase and norm fits at the normalized value
//! - pick evaluation times (native grid or caller samples, in `t/M` or seconds)
//! - recombine with the basis, optionally align the merger phase
//! - apply the physical amplitude scale and check the starting frequency

use log::{debug, warn};
use nalgebra::{Complex, DMatrix, DVector};

use crate::domain::constants::{MTSUN_SI, strain_scale, time_scale};
use crate::domain::{Advisory, BasisFlavor, EvalOptions, FitQuantity, SampleUnits, TimeUnits, Waveform};
use crate::error::{AppError, ErrorKind};
use crate::math::{adjust_merger_phase, instantaneous_start_frequency};
use crate::models::{BasisOperator, SurrogateData, SurrogateModel};
use crate::surrogate::fits::FitEvaluation;
use crate::surrogate::mapper::ParameterMapper;
use crate::surrogate::reconstruct::reconstruct;

/// Training data at the EIM nodes, for plotting collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct EimData<'a> {
    pub greedy_points: &'a [f64],
    /// One row per EIM node, one value per greedy point.
    pub values: &'a [Vec<f64>],
}

/// Fitted curves sampled across the fit interval.
#[derive(Debug, Clone, PartialEq)]
pub struct FitCurve {
    /// Raw (un-normalized) parameter values.
    pub x: Vec<f64>,
    /// One curve per requested EIM node, each of length `x.len()`.
    pub values: Vec<Vec<f64>>,
}

/// An evaluator around one immutable [`SurrogateModel`].
#[derive(Debug, Clone)]
pub struct SingleModeSurrogate {
    model: SurrogateModel,
    mapper: ParameterMapper,
}

impl SingleModeSurrogate {
    pub fn new(data: SurrogateData) -> Result<Self, AppError> {
        Ok(Self::from_model(SurrogateModel::new(data)?))
    }

    pub fn with_degree(data: SurrogateData, degree: usize) -> Result<Self, AppError> {
        Ok(Self::from_model(SurrogateModel::with_degree(data, degree)?))
    }

    pub fn from_model(model: SurrogateModel) -> Self {
        let mapper = ParameterMapper::new(model.affine_map(), model.fit_interval());
        Self { model, mapper }
    }

    pub fn model(&self) -> &SurrogateModel {
        &self.model
    }

    pub fn mapper(&self) -> &ParameterMapper {
        &self.mapper
    }

    /// Evaluate the mode at mass ratio `q`.
    ///
    /// Returned times are in seconds when both `mass` and `dist` are given,
    /// otherwise in `t/M`. `h_plus + i h_cross` is the complex mode.
    pub fn evaluate(&self, q: f64, opts: &EvalOptions) -> Result<Waveform, AppError> {
        let w = self.evaluate_quiet(q, opts)?;
        warn_advisories(&w.advisories);
        Ok(w)
    }

    /// [`Self::evaluate`] without logging the advisories; callers that merge
    /// several evaluations log the merged set themselves.
    pub(crate) fn evaluate_quiet(&self, q: f64, opts: &EvalOptions) -> Result<Waveform, AppError> {
        let x = self.model.parameterization().apply(q);
        let (x0, extrapolation) = self.mapper.normalize(x);
        let fits = FitEvaluation::at(&self.model, x0);
        debug!("fit parameter {x} normalized to {x0}, norm = {}", fits.norm);

        let amp0 = opts
            .mass
            .zip(opts.dist)
            .map_or(1.0, |(mass, dist)| strain_scale(mass, dist));
        let (times, recon_samples) = evaluation_times(self.model.times(), opts)?;

        let mut h = reconstruct(&self.model, &fits, recon_samples.as_deref())?;

        if let Some(phi_ref) = opts.phi_ref {
            adjust_merger_phase(&mut h, phi_ref);
        }

        let h_plus: Vec<f64> = h.iter().map(|z| amp0 * z.re).collect();
        let h_cross: Vec<f64> = h.iter().map(|z| amp0 * z.im).collect();

        let mut advisories: Vec<Advisory> = extrapolation.into_iter().collect();
        if let Some(f_low) = opts.f_low {
            if let Some(f_start) = instantaneous_start_frequency(&h_plus, &h_cross, &times) {
                if f_start > f_low {
                    advisories.push(Advisory::StartFrequencyAboveLow { f_start, f_low });
                }
            }
        }

        Ok(Waveform {
            times,
            h_plus,
            h_cross,
            advisories,
        })
    }

    /// Native time grid in the requested units.
    pub fn times(&self, units: TimeUnits) -> Vec<f64> {
        let scale = match units {
            TimeUnits::Geometric => 1.0,
            TimeUnits::SolarMass => MTSUN_SI,
            TimeUnits::Seconds { total_mass } => time_scale(total_mass),
        };
        self.model.times().iter().map(|t| t * scale).collect()
    }

    /// The `i`-th cardinal, orthogonal (`B V`) or waveform (`B V R`) basis vector.
    pub fn basis_vector(&self, i: usize, flavor: BasisFlavor) -> Result<DVector<Complex<f64>>, AppError> {
        let BasisOperator::Waveform(b) = self.model.basis() else {
            return Err(AppError::new(
                ErrorKind::InvalidInput,
                "Basis vectors are only defined for waveform_basis surrogates.",
            ));
        };
        if i >= b.ncols() {
            return Err(AppError::new(
                ErrorKind::InvalidInput,
                format!("Basis index {i} out of range (reduced basis size {}).", b.ncols()),
            ));
        }

        let matrix: DMatrix<Complex<f64>> = match flavor {
            BasisFlavor::Cardinal => return Ok(b.column(i).into_owned()),
            BasisFlavor::Orthogonal => b * self.change_of_basis(self.model.v(), "V", b.ncols())?,
            BasisFlavor::Waveform => {
                let v = self.change_of_basis(self.model.v(), "V", b.ncols())?;
                let e = b * v;
                let r = self.change_of_basis(self.model.r(), "R", e.ncols())?;
                e * r
            }
        };
        if i >= matrix.ncols() {
            return Err(AppError::new(
                ErrorKind::InvalidInput,
                format!("Basis index {i} out of range ({} columns).", matrix.ncols()),
            ));
        }
        Ok(matrix.column(i).into_owned())
    }

    fn change_of_basis<'a>(
        &self,
        matrix: Option<&'a DMatrix<Complex<f64>>>,
        name: &str,
        rows: usize,
    ) -> Result<&'a DMatrix<Complex<f64>>, AppError> {
        let m = matrix.ok_or_else(|| {
            AppError::new(ErrorKind::InvalidModel, format!("Surrogate has no {name} matrix."))
        })?;
        if m.nrows() != rows {
            return Err(AppError::new(
                ErrorKind::InvalidModel,
                format!("{name} has {} rows, expected {rows}.", m.nrows()),
            ));
        }
        Ok(m)
    }

    /// Greedy points and EIM node values the fits were trained on.
    pub fn eim_data(&self, quantity: FitQuantity) -> Result<EimData<'_>, AppError> {
        let (values, name) = match quantity {
            FitQuantity::Amplitude => (self.model.eim_amp(), "amplitude"),
            FitQuantity::Phase => (self.model.eim_phase(), "phase"),
        };
        let values = values.ok_or_else(|| {
            AppError::new(ErrorKind::InvalidModel, format!("Surrogate carries no EIM {name} data."))
        })?;
        Ok(EimData {
            greedy_points: self.model.greedy_points(),
            values,
        })
    }

    /// Sample the amplitude or phase fits at `num` evenly spaced parameter
    /// values spanning the fit interval. `node = None` samples every node.
    pub fn eim_fit_curve(
        &self,
        quantity: FitQuantity,
        node: Option<usize>,
        num: usize,
    ) -> Result<FitCurve, AppError> {
        let (function, params) = match quantity {
            FitQuantity::Amplitude => (self.model.amp_fit(), self.model.fit_params_amp()),
            FitQuantity::Phase => (self.model.phase_fit(), self.model.fit_params_phase()),
        };
        let nodes: Vec<&Vec<f64>> = match node {
            None => params.iter().collect(),
            Some(j) => vec![params.get(j).ok_or_else(|| {
                AppError::new(
                    ErrorKind::InvalidInput,
                    format!("EIM node {j} out of range ({} nodes).", params.len()),
                )
            })?],
        };

        let (x_min, x_max) = self.mapper.fit_interval();
        let x: Vec<f64> = match num {
            0 => Vec::new(),
            1 => vec![x_min],
            _ => (0..num)
                .map(|k| x_min + (x_max - x_min) * k as f64 / (num - 1) as f64)
                .collect(),
        };
        let values = nodes
            .into_iter()
            .map(|c| x.iter().map(|&xi| function.evaluate(c, self.mapper.map(xi))).collect())
            .collect();
        Ok(FitCurve { x, values })
    }
}

/// Emit every advisory as a warning.
pub(crate) fn warn_advisories(advisories: &[Advisory]) {
    for a in advisories {
        warn!("{a}");
    }
}

/// Output times and the `t/M` samples handed to reconstruction.
///
/// Output times are in seconds only when both mass and distance are given;
/// `mks` samples are divided back to `t/M` before reconstruction. `None` for
/// the reconstruction samples means the native grid.
pub(crate) fn evaluation_times(
    native: &[f64],
    opts: &EvalOptions,
) -> Result<(Vec<f64>, Option<Vec<f64>>), AppError> {
    let t_scale = opts
        .mass
        .zip(opts.dist)
        .map_or(1.0, |(mass, _)| time_scale(mass));

    let Some(samples) = &opts.samples else {
        return Ok((native.iter().map(|t| t * t_scale).collect(), None));
    };
    if samples.iter().any(|t| !t.is_finite()) {
        return Err(AppError::new(
            ErrorKind::InvalidInput,
            "Sample times must be finite.",
        ));
    }
    Ok(match opts.samples_units {
        SampleUnits::Dimensionless => (
            samples.iter().map(|t| t * t_scale).collect(),
            Some(samples.clone()),
        ),
        SampleUnits::Mks => (
            samples.clone(),
            Some(samples.iter().map(|t| t / t_scale).collect()),
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::peak_index;
    use crate::test_fixtures::{amp_phase_data, linspace, waveform_data};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::PI;

    fn surrogate() -> SingleModeSurrogate {
        SingleModeSurrogate::new(waveform_data(100, 3)).unwrap()
    }

    fn complex(w: &Waveform) -> Vec<Complex<f64>> {
        w.h_plus
            .iter()
            .zip(&w.h_cross)
            .map(|(&p, &c)| Complex::new(p, c))
            .collect()
    }

    #[test]
    fn dimensionless_evaluation_on_native_grid() {
        let sur = surrogate();
        let w = sur.evaluate(2.0, &EvalOptions::default()).unwrap();
        assert_eq!(w.times, sur.model().times());
        assert_eq!(w.h_plus.len(), 100);
        assert!(w.advisories.is_empty());
    }

    #[test]
    fn physical_scaling_is_linear_in_mass_over_distance() {
        let sur = surrogate();
        let eval = |mass: f64, dist: f64| {
            let opts = EvalOptions {
                mass: Some(mass),
                dist: Some(dist),
                ..EvalOptions::default()
            };
            sur.evaluate(2.0, &opts).unwrap()
        };
        let base = eval(60.0, 400.0);
        let both = eval(120.0, 800.0);
        let mass = eval(120.0, 400.0);

        let i = base.peak_index().unwrap();
        assert_relative_eq!(both.h_plus[i], base.h_plus[i], max_relative = 1e-12);
        assert_relative_eq!(mass.h_plus[i], 2.0 * base.h_plus[i], max_relative = 1e-12);
        assert_relative_eq!(base.times[1] - base.times[0], time_scale(60.0) * 200.0 / 99.0, max_relative = 1e-12);
    }

    #[test]
    fn mass_without_distance_stays_dimensionless() {
        let sur = surrogate();
        let opts = EvalOptions {
            mass: Some(60.0),
            ..EvalOptions::default()
        };
        let w = sur.evaluate(2.0, &opts).unwrap();
        let plain = sur.evaluate(2.0, &EvalOptions::default()).unwrap();
        assert_eq!(w.times, plain.times);
        assert_eq!(w.h_plus, plain.h_plus);
    }

    #[test]
    fn mks_samples_are_converted_before_reconstruction() {
        let sur = surrogate();
        let samples = linspace(-50.0, 50.0, 21);
        let dimless = EvalOptions {
            mass: Some(30.0),
            dist: Some(100.0),
            samples: Some(samples.clone()),
            ..EvalOptions::default()
        };
        let a = sur.evaluate(3.0, &dimless).unwrap();

        let seconds: Vec<f64> = samples.iter().map(|t| t * time_scale(30.0)).collect();
        let mks = EvalOptions {
            samples: Some(seconds.clone()),
            samples_units: SampleUnits::Mks,
            ..dimless
        };
        let b = sur.evaluate(3.0, &mks).unwrap();
        assert_eq!(b.times, seconds);
        for (x, y) in a.h_plus.iter().zip(&b.h_plus) {
            assert_relative_eq!(*x, *y, max_relative = 1e-9, epsilon = 1e-30);
        }
    }

    #[test]
    fn phi_ref_sets_peak_phase() {
        let sur = surrogate();
        let phi_ref = 0.7;
        let opts = EvalOptions {
            phi_ref: Some(phi_ref),
            ..EvalOptions::default()
        };
        let w = sur.evaluate(4.0, &opts).unwrap();
        let h = complex(&w);
        let i = peak_index(&h).unwrap();
        let diff = (h[i].arg() - phi_ref).rem_euclid(2.0 * PI);
        assert!(diff < 1e-10 || 2.0 * PI - diff < 1e-10);
    }

    #[test]
    fn advisories_are_reported_not_fatal() {
        let sur = surrogate();
        let opts = EvalOptions {
            f_low: Some(1e-6),
            ..EvalOptions::default()
        };
        let w = sur.evaluate(20.0, &opts).unwrap();
        assert!(matches!(w.advisories[0], Advisory::Extrapolation { parameter, .. } if parameter == 20.0));
        assert!(matches!(w.advisories[1], Advisory::StartFrequencyAboveLow { f_low, .. } if f_low == 1e-6));

        let opts = EvalOptions {
            f_low: Some(1e3),
            ..EvalOptions::default()
        };
        assert!(sur.evaluate(2.0, &opts).unwrap().advisories.is_empty());
    }

    #[test]
    fn symmetric_mass_ratio_parameterization() {
        let mut data = waveform_data(60, 2);
        data.parameterization = "q_to_nu".to_string();
        data.fit_min = 0.1;
        data.fit_max = 0.25;
        let sur = SingleModeSurrogate::new(data).unwrap();
        // q = 1 -> nu = 0.25, the upper fit edge
        let w = sur.evaluate(1.0, &EvalOptions::default()).unwrap();
        assert!(w.advisories.is_empty());

        let w = sur.evaluate(10.0, &EvalOptions::default()).unwrap();
        assert_eq!(
            w.advisories,
            vec![Advisory::Extrapolation {
                parameter: 10.0 / 121.0,
                min: 0.1,
                max: 0.25
            }]
        );
    }

    #[test]
    fn time_units() {
        let sur = surrogate();
        let t = sur.times(TimeUnits::Geometric);
        let ts = sur.times(TimeUnits::SolarMass);
        let tm = sur.times(TimeUnits::Seconds { total_mass: 10.0 });
        assert_eq!(t[0], -100.0);
        assert_relative_eq!(ts[0], -100.0 * MTSUN_SI);
        assert_relative_eq!(tm[0], -1000.0 * MTSUN_SI, max_relative = 1e-14);
    }

    #[test]
    fn basis_vectors_by_flavor() {
        let sur = surrogate();
        let BasisOperator::Waveform(b) = sur.model().basis() else {
            panic!("fixture is waveform_basis");
        };
        // V and R are identities in the fixture.
        for flavor in [BasisFlavor::Cardinal, BasisFlavor::Orthogonal, BasisFlavor::Waveform] {
            let e = sur.basis_vector(1, flavor).unwrap();
            assert_eq!(e, b.column(1).into_owned());
        }
        assert_eq!(
            sur.basis_vector(3, BasisFlavor::Cardinal).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );

        let ap = SingleModeSurrogate::new(amp_phase_data(30, 2)).unwrap();
        assert_eq!(
            ap.basis_vector(0, BasisFlavor::Cardinal).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn missing_change_of_basis_is_a_model_error() {
        let mut data = waveform_data(30, 2);
        data.r = None;
        let sur = SingleModeSurrogate::new(data).unwrap();
        assert!(sur.basis_vector(0, BasisFlavor::Orthogonal).is_ok());
        assert_eq!(
            sur.basis_vector(0, BasisFlavor::Waveform).unwrap_err().kind(),
            ErrorKind::InvalidModel
        );
    }

    #[test]
    fn eim_introspection() {
        let sur = surrogate();
        let data = sur.eim_data(FitQuantity::Amplitude).unwrap();
        assert_eq!(data.greedy_points, &[1.0, 5.5, 10.0]);
        assert_eq!(data.values.len(), 3);
        assert_eq!(
            sur.eim_data(FitQuantity::Phase).unwrap_err().kind(),
            ErrorKind::InvalidModel
        );

        let curve = sur.eim_fit_curve(FitQuantity::Amplitude, Some(0), 11).unwrap();
        assert_eq!(curve.x.len(), 11);
        assert_eq!(curve.x[0], 1.0);
        assert_eq!(curve.x[10], 10.0);
        // polyval [0.1, 1] on the [-1, 1] image of [1, 10]
        assert_abs_diff_eq!(curve.values[0][0], 0.9, epsilon = 1e-14);
        assert_abs_diff_eq!(curve.values[0][10], 1.1, epsilon = 1e-14);

        let all = sur.eim_fit_curve(FitQuantity::Phase, None, 5).unwrap();
        assert_eq!(all.values.len(), 3);
        assert!(sur.eim_fit_curve(FitQuantity::Phase, Some(7), 5).is_err());
    }
}
