//! Domain types used throughout the evaluators.
//!
//! This module defines:
//!
//! - the closed tag enums parsed from model data (`AffineMap`, `Representation`, ...)
//! - evaluation options (`EvalOptions`, `MultiEvalOptions`, `ModeRequest`)
//! - evaluation outputs (`Waveform`, `ModeSeries`, `Composition`, `Advisory`)
//! - physical constants used for unit scaling

pub mod constants;
pub mod types;

pub use types::*;
