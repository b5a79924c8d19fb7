//! Spin-weighted spherical harmonics.
//!
//! `{}_sY_{lm}(theta, phi) = (-1)^s sqrt((2l + 1) / 4 pi) d^l_{m,-s}(theta) e^{i m phi}`
//!
//! The Wigner small-d sum is written with explicit half-angle powers so that
//! the poles (`theta = 0`, `theta = pi`) need no special casing.

use std::f64::consts::PI;

use nalgebra::Complex;

/// `n!` as a float. Mode indices are small, so direct multiplication is exact enough.
fn factorial(n: i32) -> f64 {
    (2..=n).fold(1.0, |acc, k| acc * k as f64)
}

/// Wigner small-d matrix element `d^l_{m1, m2}(beta)`.
pub fn wigner_d(l: i32, m1: i32, m2: i32, beta: f64) -> f64 {
    if l < 0 || m1.abs() > l || m2.abs() > l {
        return 0.0;
    }
    let (s, c) = (0.5 * beta).sin_cos();
    let norm = (factorial(l + m1) * factorial(l - m1) * factorial(l + m2) * factorial(l - m2)).sqrt();

    let k_min = 0.max(m2 - m1);
    let k_max = (l + m2).min(l - m1);
    let mut sum = 0.0;
    for k in k_min..=k_max {
        let sign = if (k - m2 + m1).rem_euclid(2) == 0 { 1.0 } else { -1.0 };
        let denom = factorial(l + m2 - k) * factorial(k) * factorial(l - k - m1) * factorial(k - m2 + m1);
        let cos_pow = 2 * l + m2 - m1 - 2 * k;
        let sin_pow = m1 - m2 + 2 * k;
        sum += sign * c.powi(cos_pow) * s.powi(sin_pow) / denom;
    }
    norm * sum
}

/// `{}_sY_{lm}(theta, phi)`. Zero when `|m| > l` or `|s| > l`.
pub fn spin_weighted_ylm(s: i32, l: i32, m: i32, theta: f64, phi: f64) -> Complex<f64> {
    if m.abs() > l || s.abs() > l {
        return Complex::new(0.0, 0.0);
    }
    let sign = if s.rem_euclid(2) == 0 { 1.0 } else { -1.0 };
    let radial = sign * ((2 * l + 1) as f64 / (4.0 * PI)).sqrt() * wigner_d(l, m, -s, theta);
    Complex::from_polar(radial, m as f64 * phi)
}
