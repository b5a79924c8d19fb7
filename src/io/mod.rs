//! Input/output helpers.
//!
//! - surrogate model JSON read/write, single and multi-mode (`model_file`)
//! - waveform CSV exports and sample-time input (`export`)

pub mod export;
pub mod model_file;

pub use export::*;
pub use model_file::*;
