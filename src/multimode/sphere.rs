//! Continuous `h(t, theta, phi)` built from one multi-mode evaluation.
//!
//! [`HSphere::build`] evaluates every requested mode once (negative `m`
//! included, modes kept separate) on the native grid and fits a spline to each
//! mode's plus and cross series. The resulting value can then be queried at
//! arbitrary times inside the evaluated window, at any point on the sphere,
//! and after a rotation about the z-axis, without touching the surrogate again.

use nalgebra::{Complex, DMatrix};

use crate::domain::{Advisory, Composition, ModeKey, ModeRequest, MultiEvalOptions};
use crate::error::{AppError, ErrorKind};
use crate::math::{DEFAULT_SPLINE_DEGREE, SplineBasis, spin_weighted_ylm};
use crate::multimode::composer::MultiModeSurrogate;

/// Result of a sphere query.
#[derive(Debug, Clone)]
pub enum SphereEvaluation {
    /// Net polarizations at the requested point on the sphere.
    Net { h_plus: Vec<f64>, h_cross: Vec<f64> },
    /// One column per mode, in [`HSphere::modes`] order.
    Modes { h_plus: DMatrix<f64>, h_cross: DMatrix<f64> },
}

/// Cached per-mode interpolants over `[t_min, t_max]`.
#[derive(Debug, Clone)]
pub struct HSphere {
    modes: Vec<ModeKey>,
    splines: SplineBasis,
    h_plus: DMatrix<f64>,
    h_cross: DMatrix<f64>,
    t_min: f64,
    t_max: f64,
    advisories: Vec<Advisory>,
}

impl HSphere {
    /// Evaluate `surrogate` at `q` (physical when both `mass` and `dist` are
    /// given) and cache every mode as a cubic spline.
    pub fn build(
        surrogate: &MultiModeSurrogate,
        q: f64,
        mass: Option<f64>,
        dist: Option<f64>,
        modes: ModeRequest,
    ) -> Result<Self, AppError> {
        let opts = MultiEvalOptions {
            mass,
            dist,
            modes,
            mode_sum: false,
            fake_neg_modes: true,
            ..MultiEvalOptions::default()
        };
        let Composition::Separated(series) = surrogate.evaluate(q, &opts)? else {
            return Err(AppError::new(
                ErrorKind::Numerical,
                "Expected per-mode output from a mode_sum = false evaluation.",
            ));
        };

        let splines = SplineBasis::new(&series.times, DEFAULT_SPLINE_DEGREE)?;
        let h_plus = splines.fit_columns(&series.h_plus)?;
        let h_cross = splines.fit_columns(&series.h_cross)?;
        let (t_min, t_max) = splines.domain();

        Ok(Self {
            modes: series.modes,
            splines,
            h_plus,
            h_cross,
            t_min,
            t_max,
            advisories: series.advisories,
        })
    }

    /// Modes held, sorted by `(l, m)`.
    pub fn modes(&self) -> &[ModeKey] {
        &self.modes
    }

    /// Time window over which queries are valid.
    pub fn window(&self) -> (f64, f64) {
        (self.t_min, self.t_max)
    }

    /// Advisories raised by the evaluation the cache was built from.
    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    /// Query the cached modes.
    ///
    /// With `theta` the modes are projected onto `-2 Y_lm(theta, phi)` and
    /// summed (`phi` defaults to 0); otherwise they come back per mode.
    /// `z_rot` multiplies each mode by `e^{i z_rot m}` first. `psi_rot` is
    /// not supported and must be `None`.
    pub fn evaluate(
        &self,
        times: &[f64],
        theta: Option<f64>,
        phi: Option<f64>,
        z_rot: Option<f64>,
        psi_rot: Option<f64>,
    ) -> Result<SphereEvaluation, AppError> {
        if let Some(t) = times.iter().find(|&&t| !(t >= self.t_min && t <= self.t_max)) {
            return Err(AppError::new(
                ErrorKind::OutsideTimeWindow,
                format!(
                    "Surrogate cannot be evaluated outside of its time window [{}, {}] (got {t}).",
                    self.t_min, self.t_max
                ),
            ));
        }
        if psi_rot.is_some() {
            return Err(AppError::new(
                ErrorKind::PsiRotationUnsupported,
                "psi_rot is not supported.",
            ));
        }

        let mut hp = self.splines.evaluate_columns(&self.h_plus, times);
        let mut hc = self.splines.evaluate_columns(&self.h_cross, times);

        if let Some(z_rot) = z_rot {
            for (j, key) in self.modes.iter().enumerate() {
                let rot = Complex::from_polar(1.0, z_rot * key.m as f64);
                for i in 0..times.len() {
                    let h = rot * Complex::new(hp[(i, j)], hc[(i, j)]);
                    hp[(i, j)] = h.re;
                    hc[(i, j)] = h.im;
                }
            }
        }

        let Some(theta) = theta else {
            return Ok(SphereEvaluation::Modes {
                h_plus: hp,
                h_cross: hc,
            });
        };
        let phi = phi.unwrap_or(0.0);
        let mut h = vec![Complex::new(0.0, 0.0); times.len()];
        for (j, key) in self.modes.iter().enumerate() {
            let ylm = spin_weighted_ylm(-2, key.ell, key.m, theta, phi);
            for (i, acc) in h.iter_mut().enumerate() {
                *acc += ylm * Complex::new(hp[(i, j)], hc[(i, j)]);
            }
        }
        Ok(SphereEvaluation::Net {
            h_plus: h.iter().map(|z| z.re).collect(),
            h_cross: h.iter().map(|z| z.im).collect(),
        })
    }
}

impl MultiModeSurrogate {
    /// Build a reusable [`HSphere`] for mass ratio `q`.
    pub fn h_sphere_builder(
        &self,
        q: f64,
        mass: Option<f64>,
        dist: Option<f64>,
        modes: ModeRequest,
    ) -> Result<HSphere, AppError> {
        HSphere::build(self, q, mass, dist, modes)
    }
}
