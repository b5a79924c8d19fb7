//! Shared evaluation pipeline used by the CLI.
//!
//! Keeping the workflow here keeps `app` focused on presentation:
//! model file -> validated surrogate -> evaluation -> optional export

use std::path::{Path, PathBuf};

use log::info;

use crate::domain::{Composition, EvalOptions, ModeKey, MultiEvalOptions, Waveform};
use crate::error::AppError;
use crate::io::{read_multimode_json, read_surrogate_json, write_mode_series_csv, write_waveform_csv};
use crate::multimode::MultiModeSurrogate;
use crate::surrogate::SingleModeSurrogate;

/// Everything needed for one single-mode run.
#[derive(Debug, Clone)]
pub struct SingleRunConfig {
    pub model_path: PathBuf,
    pub q: f64,
    pub options: EvalOptions,
    pub degree: usize,
    pub export: Option<PathBuf>,
}

/// Everything needed for one multi-mode run.
#[derive(Debug, Clone)]
pub struct MultiRunConfig {
    pub model_path: PathBuf,
    pub q: f64,
    pub options: MultiEvalOptions,
    pub degree: usize,
    pub export: Option<PathBuf>,
}

/// Load, evaluate and optionally export a single-mode surrogate.
pub fn run_single(config: &SingleRunConfig) -> Result<Waveform, AppError> {
    let data = read_surrogate_json(&config.model_path)?;
    info!("loaded single-mode surrogate from {}", config.model_path.display());
    let surrogate = SingleModeSurrogate::with_degree(data, config.degree)?;

    let waveform = surrogate.evaluate(config.q, &config.options)?;
    if let Some(path) = &config.export {
        write_waveform_csv(path, &waveform)?;
    }
    Ok(waveform)
}

/// Load, evaluate and optionally export a multi-mode surrogate.
pub fn run_multi(config: &MultiRunConfig) -> Result<Composition, AppError> {
    let surrogate = load_multimode(&config.model_path, config.degree)?;

    let composition = surrogate.evaluate(config.q, &config.options)?;
    if let Some(path) = &config.export {
        match &composition {
            Composition::Summed(w) => write_waveform_csv(path, w)?,
            Composition::Separated(s) => write_mode_series_csv(path, s)?,
        }
    }
    Ok(composition)
}

/// Modes carried by a multi-mode model file.
pub fn list_modes(model_path: &Path, minus_m: bool) -> Result<Vec<ModeKey>, AppError> {
    let surrogate = load_multimode(model_path, crate::math::DEFAULT_SPLINE_DEGREE)?;
    Ok(surrogate.all_model_modes(minus_m))
}

fn load_multimode(path: &Path, degree: usize) -> Result<MultiModeSurrogate, AppError> {
    let modes = read_multimode_json(path)?;
    info!("found {} surrogate modes in {}", modes.len(), path.display());
    MultiModeSurrogate::with_degree(modes, degree)
}
