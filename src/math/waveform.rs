//! Helpers on complex waveform series `h = A e^{i phi}`.

use std::f64::consts::PI;

use nalgebra::Complex;

/// Remove `2 pi` jumps between consecutive phase samples.
pub fn unwrap_phase(phase: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(phase.len());
    let mut offset = 0.0;
    let mut prev: Option<f64> = None;
    for &p in phase {
        if let Some(q) = prev {
            let d = p - q;
            if d > PI {
                offset -= 2.0 * PI * ((d + PI) / (2.0 * PI)).floor();
            } else if d < -PI {
                offset += 2.0 * PI * ((-d + PI) / (2.0 * PI)).floor();
            }
        }
        out.push(p + offset);
        prev = Some(p);
    }
    out
}

/// Amplitude and unwrapped phase.
pub fn amp_phase(h: &[Complex<f64>]) -> (Vec<f64>, Vec<f64>) {
    let amp = h.iter().map(|z| z.norm()).collect();
    let wrapped: Vec<f64> = h.iter().map(|z| z.arg()).collect();
    (amp, unwrap_phase(&wrapped))
}

/// Index of the discrete amplitude peak (first one on ties).
pub fn peak_index(h: &[Complex<f64>]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, z) in h.iter().enumerate() {
        let a = z.norm();
        match best {
            Some((_, b)) if b >= a => {}
            _ => best = Some((i, a)),
        }
    }
    best.map(|(i, _)| i)
}

/// Unwrapped phase at the amplitude peak.
pub fn phi_merger(h: &[Complex<f64>]) -> Option<f64> {
    let idx = peak_index(h)?;
    let (_, phase) = amp_phase(h);
    Some(phase[idx])
}

/// Multiply every sample by `e^{i dphi}`.
pub fn modify_phase(h: &mut [Complex<f64>], dphi: f64) {
    let rot = Complex::from_polar(1.0, dphi);
    h.iter_mut().for_each(|z| *z *= rot);
}

/// Rotate `h` by a constant phase so its phase at the amplitude peak equals `phi_ref`.
pub fn adjust_merger_phase(h: &mut [Complex<f64>], phi_ref: f64) {
    if let Some(phi_peak) = phi_merger(h) {
        modify_phase(h, phi_ref - phi_peak);
    }
}

/// Instantaneous gravitational-wave frequency at the first sample.
///
/// Assumes slowly varying amplitude and frequency, so `f = |d phi / dt| / 2 pi`
/// from the first two samples. `None` with fewer than two samples.
pub fn instantaneous_start_frequency(h_plus: &[f64], h_cross: &[f64], t: &[f64]) -> Option<f64> {
    if h_plus.len() < 2 || h_cross.len() < 2 || t.len() < 2 {
        return None;
    }
    let dt = t[1] - t[0];
    if dt == 0.0 {
        return None;
    }
    let wrapped = [h_cross[0].atan2(h_plus[0]), h_cross[1].atan2(h_plus[1])];
    let phase = unwrap_phase(&wrapped);
    Some(((phase[1] - phase[0]) / dt).abs() / (2.0 * PI))
}
