//! Fit evaluation at a normalized parameter value.

use nalgebra::DVector;

use crate::models::SurrogateModel;

/// Amplitude and phase fits at every EIM node, plus the overall norm.
#[derive(Debug, Clone, PartialEq)]
pub struct FitEvaluation {
    pub amp: DVector<f64>,
    pub phase: DVector<f64>,
    /// `1.0` when the model has no norm fit.
    pub norm: f64,
}

impl FitEvaluation {
    pub fn at(model: &SurrogateModel, x0: f64) -> Self {
        let amp_fit = model.amp_fit();
        let phase_fit = model.phase_fit();
        let amp = DVector::from_iterator(
            model.dim_rb(),
            model.fit_params_amp().iter().map(|c| amp_fit.evaluate(c, x0)),
        );
        let phase = DVector::from_iterator(
            model.dim_rb(),
            model.fit_params_phase().iter().map(|c| phase_fit.evaluate(c, x0)),
        );
        let norm = model
            .norm_fit()
            .map_or(1.0, |n| n.function.evaluate(&n.coeffs, x0));
        Self { amp, phase, norm }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::waveform_data;

    #[test]
    fn rows_are_evaluated_independently() {
        let model = SurrogateModel::new(waveform_data(20, 3)).unwrap();
        let fits = FitEvaluation::at(&model, 0.5);
        // polyval [0.1 (j + 1), 1] and [0.2, 0.05 j]
        for j in 0..3 {
            assert!((fits.amp[j] - (0.1 * (j as f64 + 1.0) * 0.5 + 1.0)).abs() < 1e-15);
            assert!((fits.phase[j] - (0.2 * 0.5 + 0.05 * j as f64)).abs() < 1e-15);
        }
        assert_eq!(fits.norm, 1.0);
    }
}
