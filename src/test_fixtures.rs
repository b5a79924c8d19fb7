//! Small synthetic surrogates shared by unit tests.

use std::collections::BTreeMap;

use crate::domain::ModeKey;
use crate::models::{ComplexRows, SurrogateData};

pub fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| a + (b - a) * i as f64 / (n as f64 - 1.0))
        .collect()
}

fn gaussian(t: f64, center: f64, width: f64) -> f64 {
    (-(t - center) * (t - center) / (2.0 * width * width)).exp()
}

fn identity_rows(dim: usize) -> ComplexRows {
    ComplexRows {
        re: (0..dim)
            .map(|i| (0..dim).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
            .collect(),
        im: None,
    }
}

/// Waveform-basis surrogate on `t in [-100, 100]` with carrier frequency `omega`.
pub fn waveform_data_with(n_times: usize, dim: usize, omega: f64, amp_scale: f64) -> SurrogateData {
    let times = linspace(-100.0, 100.0, n_times);
    let centers: Vec<f64> = (0..dim).map(|j| -10.0 + 15.0 * j as f64).collect();

    let mut re = Vec::with_capacity(n_times);
    let mut im = Vec::with_capacity(n_times);
    for &t in &times {
        let (s, c) = (omega * t).sin_cos();
        let g: Vec<f64> = centers.iter().map(|&c0| gaussian(t, c0, 35.0)).collect();
        re.push(g.iter().map(|g| g * c).collect());
        im.push(g.iter().map(|g| g * s).collect());
    }

    let fit_params_amp: Vec<Vec<f64>> = (0..dim)
        .map(|j| vec![0.1 * (j as f64 + 1.0) * amp_scale, amp_scale])
        .collect();
    let fit_params_phase: Vec<Vec<f64>> = (0..dim).map(|j| vec![0.2, 0.05 * j as f64]).collect();

    let greedy_points = vec![1.0, 5.5, 10.0];
    let eim_amp = fit_params_amp
        .iter()
        .map(|c| greedy_points.iter().map(|q| c[0] * q + c[1]).collect())
        .collect();

    SurrogateData {
        times,
        surrogate_mode_type: "waveform_basis".to_string(),
        b: Some(ComplexRows { re, im: Some(im) }),
        b_amp: None,
        b_phase: None,
        fit_params_amp,
        fit_params_phase,
        fit_params_norm: None,
        fit_type_amp: "polyval_1d".to_string(),
        fit_type_phase: "polyval_1d".to_string(),
        fit_type_norm: None,
        fit_min: 1.0,
        fit_max: 10.0,
        affine_map: "minus1_to_1".to_string(),
        parameterization: "q_to_q".to_string(),
        greedy_points,
        eim_indices: (0..dim).map(|j| 10 + j).collect(),
        eim_amp: Some(eim_amp),
        eim_phase: None,
        v: Some(identity_rows(dim)),
        r: Some(identity_rows(dim)),
    }
}

pub fn waveform_data(n_times: usize, dim: usize) -> SurrogateData {
    waveform_data_with(n_times, dim, 0.15, 1.0)
}

/// Amplitude/phase-basis surrogate on `t in [-100, 100]`.
pub fn amp_phase_data(n_times: usize, dim: usize) -> SurrogateData {
    let times = linspace(-100.0, 100.0, n_times);
    let mut b_amp = Vec::with_capacity(n_times);
    let mut b_phase = Vec::with_capacity(n_times);
    for &t in &times {
        b_amp.push((0..dim).map(|j| gaussian(t, 10.0 * j as f64, 40.0)).collect());
        b_phase.push((0..dim).map(|j| (t / 100.0).powi(j as i32 + 1)).collect());
    }

    SurrogateData {
        times,
        surrogate_mode_type: "amp_phase_basis".to_string(),
        b: None,
        b_amp: Some(b_amp),
        b_phase: Some(b_phase),
        fit_params_amp: (0..dim).map(|j| vec![0.5, 1.0 + j as f64]).collect(),
        fit_params_phase: (0..dim).map(|j| vec![1.0, 10.0 / (j as f64 + 1.0)]).collect(),
        fit_params_norm: Some(vec![0.1, 2.0]),
        fit_type_amp: "chebyshev_1d".to_string(),
        fit_type_phase: "polyval_1d".to_string(),
        fit_type_norm: Some("polyval_1d".to_string()),
        fit_min: 1.0,
        fit_max: 10.0,
        affine_map: "zero_to_1".to_string(),
        parameterization: "q_to_q".to_string(),
        greedy_points: Vec::new(),
        eim_indices: Vec::new(),
        eim_amp: None,
        eim_phase: None,
        v: None,
        r: None,
    }
}

/// Three-mode model: (2,2), (2,1), (3,3), carrier frequency proportional to `m`.
pub fn multimode_data(n_times: usize) -> BTreeMap<ModeKey, SurrogateData> {
    let mut modes = BTreeMap::new();
    for (ell, m, scale) in [(2, 2, 1.0), (2, 1, 0.3), (3, 3, 0.1)] {
        let omega = 0.075 * m as f64;
        modes.insert(ModeKey::new(ell, m), waveform_data_with(n_times, 3, omega, scale));
    }
    modes
}
