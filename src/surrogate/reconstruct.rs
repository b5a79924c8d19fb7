//! Basis recombination: EIM node values -> complex time series.
//!
//! Two representations are supported:
//!
//! - `waveform_basis`: `h = norm * B (a e^{i p})` with one complex operator `B`
//! - `amp_phase_basis`: `h = norm * (B_amp a) e^{i (B_phase p)}`
//!
//! For evaluation off the native grid, every basis column is interpolated with
//! a spline fitted once at model construction ([`ResampleCache`]); a call with
//! custom samples evaluates those splines and then performs the same product.

use nalgebra::{Complex, DMatrix, DVector};

use crate::error::{AppError, ErrorKind};
use crate::math::SplineBasis;
use crate::models::{BasisOperator, SurrogateModel};
use crate::surrogate::fits::FitEvaluation;

/// Spline coefficients for every basis column, sharing one knot set.
#[derive(Debug, Clone)]
pub enum ResampleCache {
    Waveform {
        splines: SplineBasis,
        re: DMatrix<f64>,
        im: DMatrix<f64>,
    },
    AmpPhase {
        splines: SplineBasis,
        amp: DMatrix<f64>,
        phase: DMatrix<f64>,
    },
}

impl ResampleCache {
    pub fn build(times: &[f64], operator: &BasisOperator, degree: usize) -> Result<Self, AppError> {
        let splines = SplineBasis::new(times, degree)?;
        match operator {
            BasisOperator::Waveform(b) => {
                let re = splines.fit_columns(&b.map(|z| z.re))?;
                let im = splines.fit_columns(&b.map(|z| z.im))?;
                Ok(ResampleCache::Waveform { splines, re, im })
            }
            BasisOperator::AmpPhase { amp, phase } => {
                let amp = splines.fit_columns(amp)?;
                let phase = splines.fit_columns(phase)?;
                Ok(ResampleCache::AmpPhase { splines, amp, phase })
            }
        }
    }

    pub fn degree(&self) -> usize {
        match self {
            ResampleCache::Waveform { splines, .. } | ResampleCache::AmpPhase { splines, .. } => {
                splines.degree()
            }
        }
    }
}

/// Complex empirical interpolant operator `B` evaluated at `samples`.
pub fn resample_waveform_basis(
    model: &SurrogateModel,
    samples: &[f64],
) -> Result<DMatrix<Complex<f64>>, AppError> {
    match model.resampler() {
        ResampleCache::Waveform { splines, re, im } => {
            let re = splines.evaluate_columns(re, samples);
            let im = splines.evaluate_columns(im, samples);
            Ok(re.zip_map(&im, Complex::new))
        }
        ResampleCache::AmpPhase { .. } => Err(AppError::new(
            ErrorKind::InvalidInput,
            "Resampling B is only defined for waveform_basis surrogates.",
        )),
    }
}

/// Rebuild the dimensionless complex mode from fit evaluations.
///
/// `samples = None` uses the native grid.
pub fn reconstruct(
    model: &SurrogateModel,
    fits: &FitEvaluation,
    samples: Option<&[f64]>,
) -> Result<Vec<Complex<f64>>, AppError> {
    let dim = model.dim_rb();
    if fits.amp.len() != dim || fits.phase.len() != dim {
        return Err(AppError::new(
            ErrorKind::InvalidInput,
            format!(
                "Fit evaluations have lengths {} / {} but the reduced basis size is {dim}.",
                fits.amp.len(),
                fits.phase.len()
            ),
        ));
    }

    let series: DVector<Complex<f64>> = match (model.basis(), model.resampler(), samples) {
        (BasisOperator::Waveform(b), _, None) => b * h_eim(fits),
        (BasisOperator::Waveform(_), ResampleCache::Waveform { .. }, Some(s)) => {
            resample_waveform_basis(model, s)? * h_eim(fits)
        }
        (BasisOperator::AmpPhase { amp, phase }, _, None) => {
            amp_phase_series(&(amp * &fits.amp), &(phase * &fits.phase))
        }
        (
            BasisOperator::AmpPhase { .. },
            ResampleCache::AmpPhase {
                splines,
                amp,
                phase,
            },
            Some(s),
        ) => {
            let a = splines.evaluate_columns(amp, s) * &fits.amp;
            let p = splines.evaluate_columns(phase, s) * &fits.phase;
            amp_phase_series(&a, &p)
        }
        (operator, _, Some(_)) => {
            return Err(AppError::new(
                ErrorKind::UnknownRepresentation,
                format!(
                    "Resampling cache does not match the {} operator.",
                    operator.representation().tag()
                ),
            ));
        }
    };

    Ok(series.iter().map(|z| *z * fits.norm).collect())
}

/// `a e^{i p}` at the EIM nodes.
fn h_eim(fits: &FitEvaluation) -> DVector<Complex<f64>> {
    fits.amp.zip_map(&fits.phase, Complex::from_polar)
}

fn amp_phase_series(amp: &DVector<f64>, phase: &DVector<f64>) -> DVector<Complex<f64>> {
    amp.zip_map(phase, Complex::from_polar)
}
