//! Multi-mode composition.
//!
//! A [`MultiModeSurrogate`] owns one [`SingleModeSurrogate`] per trained
//! `(l, m)` mode (`m >= 0`), all on one shared time grid. An evaluation:
//!
//! - resolves the mode list (see [`super::selection`])
//! - evaluates every listed mode the model can serve, in parallel
//! - derives `m < 0` modes from `h(l, -m) = (-1)^l conj(h(l, m))`
//! - zero-fills listed modes the model cannot serve
//! - optionally projects onto `-2 Y_lm(theta, phi)`
//! - sums the modes, or returns them as columns in sorted mode order

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};
use nalgebra::{Complex, DMatrix};
use rayon::prelude::*;

use crate::domain::{
    Advisory, Composition, EvalOptions, ModeKey, ModeSeries, MultiEvalOptions, Waveform,
};
use crate::error::{AppError, ErrorKind};
use crate::math::{DEFAULT_SPLINE_DEGREE, spin_weighted_ylm};
use crate::models::SurrogateData;
use crate::multimode::selection::{select, sort_modes};
use crate::surrogate::SingleModeSurrogate;
use crate::surrogate::single::{evaluation_times, warn_advisories};

#[derive(Debug, Clone)]
pub struct MultiModeSurrogate {
    modes: BTreeMap<ModeKey, SingleModeSurrogate>,
}

impl MultiModeSurrogate {
    pub fn new(data: BTreeMap<ModeKey, SurrogateData>) -> Result<Self, AppError> {
        Self::with_degree(data, DEFAULT_SPLINE_DEGREE)
    }

    pub fn with_degree(data: BTreeMap<ModeKey, SurrogateData>, degree: usize) -> Result<Self, AppError> {
        let mut modes = BTreeMap::new();
        for (key, data) in data {
            check_key(key)?;
            info!("loading surrogate mode {}", key.label());
            let surrogate = SingleModeSurrogate::with_degree(data, degree)
                .map_err(|e| AppError::new(e.kind(), format!("mode {}: {e}", key.label())))?;
            modes.insert(key, surrogate);
        }
        Self::from_modes(modes)
    }

    /// Assemble from already-built single-mode evaluators.
    pub fn from_modes(modes: BTreeMap<ModeKey, SingleModeSurrogate>) -> Result<Self, AppError> {
        let Some((first_key, first)) = modes.iter().next() else {
            return Err(AppError::new(
                ErrorKind::NoModes,
                "No surrogate modes found; mode groups must be named l#_m#.",
            ));
        };
        let grid = first.model().times();
        for (&key, surrogate) in &modes {
            check_key(key)?;
            if surrogate.model().times() != grid {
                return Err(AppError::new(
                    ErrorKind::TimeGridMismatch,
                    format!(
                        "Mode {} is not defined on the time grid of mode {} ({} vs {} samples).",
                        key.label(),
                        first_key.label(),
                        surrogate.model().times().len(),
                        grid.len()
                    ),
                ));
            }
        }
        Ok(Self { modes })
    }

    /// Time grid shared by all modes, `t/M`.
    pub fn times(&self) -> &[f64] {
        self.modes
            .values()
            .next()
            .map_or(&[] as &[f64], |s| s.model().times())
    }

    pub fn mode(&self, key: ModeKey) -> Option<&SingleModeSurrogate> {
        self.modes.get(&key)
    }

    /// Trained modes in key order; with `minus_m`, followed by the mirror of
    /// every `m > 0` mode.
    pub fn all_model_modes(&self, minus_m: bool) -> Vec<ModeKey> {
        let mut modes: Vec<ModeKey> = self.modes.keys().copied().collect();
        if minus_m {
            let mirrored: Vec<ModeKey> = modes.iter().filter(|k| k.m > 0).map(|k| k.mirrored()).collect();
            modes.extend(mirrored);
        }
        modes
    }

    /// Evaluate one trained mode. Negative `m` must go through
    /// [`Self::evaluate_single_mode_minus`].
    pub fn evaluate_single_mode(&self, q: f64, key: ModeKey, opts: &EvalOptions) -> Result<Waveform, AppError> {
        if key.m < 0 {
            return Err(AppError::new(
                ErrorKind::NegativeModeDirect,
                format!("m must be non-negative for {key}; evaluate m < 0 modes through the symmetry path."),
            ));
        }
        self.trained(key)?.evaluate(q, opts)
    }

    /// Evaluate an `m < 0` mode from its trained `m > 0` partner.
    pub fn evaluate_single_mode_minus(&self, q: f64, key: ModeKey, opts: &EvalOptions) -> Result<Waveform, AppError> {
        if key.m >= 0 {
            return Err(AppError::new(
                ErrorKind::InvalidInput,
                format!("m must be negative for {key}."),
            ));
        }
        let mut w = self.evaluate_single_mode(q, key.mirrored(), opts)?;
        mirror_mode(key.ell, &mut w.h_plus, &mut w.h_cross);
        Ok(w)
    }

    /// One entry of a multi-mode evaluation; advisories are left for the caller to log.
    fn evaluate_listed_mode(&self, q: f64, key: ModeKey, opts: &EvalOptions) -> Result<Waveform, AppError> {
        if key.m >= 0 {
            return self.trained(key)?.evaluate_quiet(q, opts);
        }
        let mut w = self.trained(key.mirrored())?.evaluate_quiet(q, opts)?;
        mirror_mode(key.ell, &mut w.h_plus, &mut w.h_cross);
        Ok(w)
    }

    fn trained(&self, key: ModeKey) -> Result<&SingleModeSurrogate, AppError> {
        self.modes.get(&key).ok_or_else(|| {
            AppError::new(
                ErrorKind::InvalidInput,
                format!("Mode {key} is not part of this surrogate."),
            )
        })
    }

    /// Evaluate, project and combine the requested modes at mass ratio `q`.
    pub fn evaluate(&self, q: f64, opts: &MultiEvalOptions) -> Result<Composition, AppError> {
        if opts.phi_ref.is_some() {
            return Err(AppError::new(
                ErrorKind::PhaseAlignmentUnsupported,
                "phi_ref is not supported for multi-mode evaluation.",
            ));
        }

        let mut mode_list = select(&self.all_model_modes(false), &opts.modes, opts.fake_neg_modes)?;
        if !opts.mode_sum {
            sort_modes(&mut mode_list);
        }

        let single = opts.single();
        let (times, _) = evaluation_times(self.times(), &single)?;
        let available: BTreeSet<ModeKey> = self.all_model_modes(true).into_iter().collect();

        let evaluated: Vec<(usize, Result<Waveform, AppError>)> = mode_list
            .par_iter()
            .enumerate()
            .filter_map(|(i, &key)| {
                if !available.contains(&key) {
                    debug!("mode {key} not modelled; contributing zero");
                    return None;
                }
                Some((i, self.evaluate_listed_mode(q, key, &single)))
            })
            .collect();

        let n = times.len();
        let mut columns: Vec<Option<Vec<Complex<f64>>>> = vec![None; mode_list.len()];
        let mut advisories: Vec<Advisory> = Vec::new();
        for (i, result) in evaluated {
            let w = result?;
            for a in &w.advisories {
                if !advisories.contains(a) {
                    advisories.push(a.clone());
                }
            }
            let key = mode_list[i];
            columns[i] = Some(project(key, opts.theta, opts.phi, &w.h_plus, &w.h_cross));
        }
        warn_advisories(&advisories);

        if opts.mode_sum {
            let mut h = vec![Complex::new(0.0, 0.0); n];
            for column in columns.iter().flatten() {
                h.iter_mut().zip(column).for_each(|(acc, z)| *acc += *z);
            }
            Ok(Composition::Summed(Waveform {
                times,
                h_plus: h.iter().map(|z| z.re).collect(),
                h_cross: h.iter().map(|z| z.im).collect(),
                advisories,
            }))
        } else {
            let k = mode_list.len();
            let mut h_plus = DMatrix::zeros(n, k);
            let mut h_cross = DMatrix::zeros(n, k);
            for (j, column) in columns.iter().enumerate() {
                if let Some(column) = column {
                    for (i, z) in column.iter().enumerate() {
                        h_plus[(i, j)] = z.re;
                        h_cross[(i, j)] = z.im;
                    }
                }
            }
            Ok(Composition::Separated(ModeSeries {
                modes: mode_list,
                times,
                h_plus,
                h_cross,
                advisories,
            }))
        }
    }
}

/// `h(l, -m) = (-1)^l conj(h(l, m))` applied in place.
pub fn mirror_mode(ell: i32, h_plus: &mut [f64], h_cross: &mut [f64]) {
    let sign = if ell % 2 == 0 { 1.0 } else { -1.0 };
    h_plus.iter_mut().for_each(|x| *x *= sign);
    h_cross.iter_mut().for_each(|x| *x *= -sign);
}

/// Complex mode, multiplied by `-2 Y_lm(theta, phi)` when `theta` is given
/// (`phi` defaults to 0).
pub fn project(key: ModeKey, theta: Option<f64>, phi: Option<f64>, h_plus: &[f64], h_cross: &[f64]) -> Vec<Complex<f64>> {
    let ylm = theta.map(|theta| spin_weighted_ylm(-2, key.ell, key.m, theta, phi.unwrap_or(0.0)));
    h_plus
        .iter()
        .zip(h_cross)
        .map(|(&p, &c)| {
            let h = Complex::new(p, c);
            ylm.map_or(h, |y| y * h)
        })
        .collect()
}

fn check_key(key: ModeKey) -> Result<(), AppError> {
    if key.ell < 2 || key.m < 0 || key.m > key.ell {
        return Err(AppError::new(
            ErrorKind::InvalidModel,
            format!("Trained modes need l >= 2 and 0 <= m <= l, got {key}."),
        ));
    }
    Ok(())
}
