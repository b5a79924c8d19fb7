//! Command-line parsing for the surrogate evaluator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the evaluation code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::SampleUnits;
use crate::math::DEFAULT_SPLINE_DEGREE;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "gws", version, about = "Gravitational-wave surrogate evaluator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate a single-mode surrogate.
    Single(SingleArgs),
    /// Evaluate a multi-mode surrogate, summed on the sphere or per mode.
    Multi(MultiArgs),
    /// List the modes a multi-mode surrogate carries.
    Modes(ModesArgs),
}

/// Options shared by every evaluation.
#[derive(Debug, Args, Clone)]
pub struct EvalArgs {
    /// Surrogate model JSON file.
    #[arg(long, value_name = "JSON")]
    pub model: PathBuf,

    /// Mass ratio.
    #[arg(long)]
    pub q: f64,

    /// Total mass in solar masses (physical output needs --dist as well).
    #[arg(long)]
    pub mass: Option<f64>,

    /// Distance in megaparsecs.
    #[arg(long)]
    pub dist: Option<f64>,

    /// Warn when the surrogate starts above this frequency.
    #[arg(long)]
    pub f_low: Option<f64>,

    /// Evaluation times, one per line (native grid if omitted).
    #[arg(long, value_name = "FILE")]
    pub samples: Option<PathBuf>,

    /// Units of --samples.
    #[arg(long, value_enum, default_value_t = SampleUnits::Dimensionless)]
    pub samples_units: SampleUnits,

    /// Spline degree used to resample the basis off the native grid.
    #[arg(long, default_value_t = DEFAULT_SPLINE_DEGREE)]
    pub degree: usize,

    /// Write the evaluated waveform to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SingleArgs {
    #[command(flatten)]
    pub eval: EvalArgs,

    /// Rotate so the phase at peak amplitude equals this value.
    #[arg(long)]
    pub phi_ref: Option<f64>,
}

#[derive(Debug, Args, Clone)]
pub struct MultiArgs {
    #[command(flatten)]
    pub eval: EvalArgs,

    /// Polar angle; modes are projected onto -2Y_lm when given.
    #[arg(long)]
    pub theta: Option<f64>,

    /// Azimuthal angle (0 if omitted).
    #[arg(long)]
    pub phi: Option<f64>,

    /// Evaluate every (l, m) with 2 <= l <= LMAX.
    #[arg(long, conflicts_with_all = ["ell", "m"])]
    pub lmax: Option<i32>,

    /// Explicit l values, paired with --m.
    #[arg(long, num_args = 1.., requires = "m", allow_negative_numbers = true)]
    pub ell: Vec<i32>,

    /// Explicit m values, paired with --ell.
    #[arg(long, num_args = 1.., requires = "ell", allow_negative_numbers = true)]
    pub m: Vec<i32>,

    /// Keep modes separate instead of summing them.
    #[arg(long)]
    pub separate: bool,

    /// Add m < 0 modes derived from the m > 0 ones.
    #[arg(long)]
    pub fake_neg_modes: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ModesArgs {
    /// Multi-mode surrogate JSON file.
    #[arg(long, value_name = "JSON")]
    pub model: PathBuf,

    /// Include the m < 0 mirrors of every m > 0 mode.
    #[arg(long)]
    pub minus_m: bool,
}
