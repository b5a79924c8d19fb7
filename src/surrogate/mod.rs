//! Single-mode evaluation engine.
//!
//! - `mapper`: parameter normalization and the extrapolation advisory
//! - `fits`: amplitude / phase / norm fit evaluation
//! - `reconstruct`: basis recombination and off-grid resampling
//! - `single`: the evaluator tying them together

pub mod fits;
pub mod mapper;
pub mod reconstruct;
pub mod single;

pub use fits::FitEvaluation;
pub use mapper::ParameterMapper;
pub use reconstruct::{ResampleCache, reconstruct, resample_waveform_basis};
pub use single::{EimData, FitCurve, SingleModeSurrogate};
