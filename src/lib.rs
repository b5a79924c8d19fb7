//! `gw-surrogate` library crate.
//!
//! Evaluates reduced-order surrogate models of gravitational-wave modes:
//! single modes as functions of mass ratio, and multi-mode composites
//! projected onto the sphere.
//!
//! The binary (`gws`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the evaluators are reusable from other tools

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod multimode;
pub mod report;
pub mod surrogate;

#[cfg(test)]
pub(crate) mod test_fixtures;
