//! Parametric fit families used for EIM node values.
//!
//! Each surrogate names its amplitude, phase, and (optional) norm fits by tag.
//! Evaluation is a pure function of the coefficient vector and the normalized
//! parameter; the evaluator never needs to know which family it is using.
//!
//! Supported tags:
//!
//! - `polyval_1d`: `c[0] x^(n-1) + ... + c[n-1]` (highest power first)
//! - `rational_1d`: `(a0 + a1 x + ...) / (1 + b1 x + ...)`, numerator takes the
//!   first `ceil(n/2)` coefficients
//! - `chebyshev_1d`: `sum_k c[k] T_k(x)`

use std::str::FromStr;

use crate::error::{AppError, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitFunction {
    Polyval,
    Rational,
    Chebyshev,
}

impl FitFunction {
    pub fn tag(self) -> &'static str {
        match self {
            FitFunction::Polyval => "polyval_1d",
            FitFunction::Rational => "rational_1d",
            FitFunction::Chebyshev => "chebyshev_1d",
        }
    }

    /// Evaluate the fit at `x`.
    pub fn evaluate(self, coeffs: &[f64], x: f64) -> f64 {
        match self {
            FitFunction::Polyval => polyval(coeffs, x),
            FitFunction::Rational => rational(coeffs, x),
            FitFunction::Chebyshev => chebyshev(coeffs, x),
        }
    }
}

impl FromStr for FitFunction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "polyval_1d" => Ok(FitFunction::Polyval),
            "rational_1d" => Ok(FitFunction::Rational),
            "chebyshev_1d" => Ok(FitFunction::Chebyshev),
            other => Err(AppError::new(
                ErrorKind::UnknownFitType,
                format!("Unknown fit function '{other}'."),
            )),
        }
    }
}

/// Horner evaluation, highest power first. Empty coefficients give 0.
pub fn polyval(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().fold(0.0, |acc, c| acc * x + c)
}

/// Ascending-power Horner evaluation.
fn poly_ascending(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

pub fn rational(coeffs: &[f64], x: f64) -> f64 {
    let n_num = coeffs.len().div_ceil(2);
    let (num, den) = coeffs.split_at(n_num);
    // Denominator constant term is fixed at 1.
    let denom = 1.0 + x * poly_ascending(den, x);
    poly_ascending(num, x) / denom
}

/// Clenshaw recurrence for a Chebyshev series of the first kind.
pub fn chebyshev(coeffs: &[f64], x: f64) -> f64 {
    let Some((&c0, rest)) = coeffs.split_first() else {
        return 0.0;
    };
    let mut b1 = 0.0;
    let mut b2 = 0.0;
    for &c in rest.iter().rev() {
        let b0 = 2.0 * x * b1 - b2 + c;
        b2 = b1;
        b1 = b0;
    }
    c0 + x * b1 - b2
}
