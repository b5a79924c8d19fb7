//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - initializes logging
//! - parses CLI arguments into evaluation configs
//! - runs the evaluation pipeline
//! - prints the summary

use clap::Parser;

use crate::cli::{Command, EvalArgs, ModesArgs, MultiArgs, SingleArgs};
use crate::domain::{Composition, EvalOptions, ModeRequest, MultiEvalOptions};
use crate::error::AppError;
use crate::io::read_samples;
use crate::report::{format_mode_list, format_mode_series_summary, format_waveform_summary};

pub mod pipeline;

use pipeline::{MultiRunConfig, SingleRunConfig};

/// Entry point for the `gws` binary.
pub fn run() -> Result<(), AppError> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).try_init();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Single(args) => handle_single(args),
        Command::Multi(args) => handle_multi(args),
        Command::Modes(args) => handle_modes(args),
    }
}

fn handle_single(args: SingleArgs) -> Result<(), AppError> {
    let config = single_config_from_args(&args)?;
    let waveform = pipeline::run_single(&config)?;
    println!(
        "{}",
        format_waveform_summary("single mode", &waveform, config.options.is_physical())
    );
    Ok(())
}

fn handle_multi(args: MultiArgs) -> Result<(), AppError> {
    let config = multi_config_from_args(&args)?;
    let physical = config.options.mass.is_some() && config.options.dist.is_some();
    match pipeline::run_multi(&config)? {
        Composition::Summed(w) => println!("{}", format_waveform_summary("multi mode", &w, physical)),
        Composition::Separated(s) => {
            println!("{}", format_mode_series_summary("multi mode", &s, physical))
        }
    }
    Ok(())
}

fn handle_modes(args: ModesArgs) -> Result<(), AppError> {
    let modes = pipeline::list_modes(&args.model, args.minus_m)?;
    print!("{}", format_mode_list(&modes));
    Ok(())
}

pub fn single_config_from_args(args: &SingleArgs) -> Result<SingleRunConfig, AppError> {
    let mut options = eval_options_from_args(&args.eval)?;
    options.phi_ref = args.phi_ref;
    Ok(SingleRunConfig {
        model_path: args.eval.model.clone(),
        q: args.eval.q,
        options,
        degree: args.eval.degree,
        export: args.eval.export.clone(),
    })
}

pub fn multi_config_from_args(args: &MultiArgs) -> Result<MultiRunConfig, AppError> {
    let single = eval_options_from_args(&args.eval)?;
    let modes = match args.lmax {
        Some(lmax) => ModeRequest::UpTo(lmax),
        None if args.ell.is_empty() && args.m.is_empty() => ModeRequest::All,
        None => ModeRequest::pairs(&args.ell, &args.m)?,
    };
    Ok(MultiRunConfig {
        model_path: args.eval.model.clone(),
        q: args.eval.q,
        options: MultiEvalOptions {
            mass: single.mass,
            dist: single.dist,
            theta: args.theta,
            phi: args.phi,
            phi_ref: None,
            f_low: single.f_low,
            samples: single.samples,
            samples_units: single.samples_units,
            modes,
            mode_sum: !args.separate,
            fake_neg_modes: args.fake_neg_modes,
        },
        degree: args.eval.degree,
        export: args.eval.export.clone(),
    })
}

fn eval_options_from_args(args: &EvalArgs) -> Result<EvalOptions, AppError> {
    let samples = args.samples.as_deref().map(read_samples).transpose()?;
    Ok(EvalOptions {
        mass: args.mass,
        dist: args.dist,
        phi_ref: None,
        f_low: args.f_low,
        samples,
        samples_units: args.samples_units,
    })
}
