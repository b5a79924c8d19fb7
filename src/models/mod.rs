//! Surrogate model data.
//!
//! `SurrogateData` is the plain data contract a loader produces;
//! `SurrogateModel` is its validated, immutable form consumed by the evaluators.

pub mod model;

pub use model::*;
