//! Numerical building blocks: fit families, spline interpolation, spherical
//! harmonics, and complex-waveform helpers.

pub mod fit_funcs;
pub mod harmonics;
pub mod spline;
pub mod waveform;

pub use fit_funcs::*;
pub use harmonics::*;
pub use spline::*;
pub use waveform::*;
