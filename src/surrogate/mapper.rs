//! Parameter normalization into the fits' native domain.

use log::debug;

use crate::domain::{Advisory, AffineMap};

/// Maps a surrogate parameter into the normalized fit domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterMapper {
    affine_map: AffineMap,
    x_min: f64,
    x_max: f64,
}

impl ParameterMapper {
    pub fn new(affine_map: AffineMap, fit_interval: (f64, f64)) -> Self {
        Self {
            affine_map,
            x_min: fit_interval.0,
            x_max: fit_interval.1,
        }
    }

    pub fn fit_interval(&self) -> (f64, f64) {
        (self.x_min, self.x_max)
    }

    /// Affine image of `x`, without the training-interval check.
    pub fn map(&self, x: f64) -> f64 {
        let (a, b) = (self.x_min, self.x_max);
        match self.affine_map {
            AffineMap::MinusOneToOne => 2.0 * (x - a) / (b - a) - 1.0,
            AffineMap::ZeroToOne => (x - a) / (b - a),
            AffineMap::Identity => x,
        }
    }

    /// Normalize `x`; values outside the fit interval still map, with an
    /// extrapolation advisory.
    pub fn normalize(&self, x: f64) -> (f64, Option<Advisory>) {
        let advisory = if x < self.x_min || x > self.x_max {
            debug!(
                "Surrogate not trained at requested parameter value {x} (fit interval [{}, {}])",
                self.x_min, self.x_max
            );
            Some(Advisory::Extrapolation {
                parameter: x,
                min: self.x_min,
                max: self.x_max,
            })
        } else {
            None
        };
        (self.map(x), advisory)
    }
}
