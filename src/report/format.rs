//! Formatted terminal output.
//!
//! Formatting lives in one place so:
//! - the evaluation code stays clean and testable
//! - output changes are localized

use crate::domain::{Advisory, ModeKey, ModeSeries, Waveform};
use crate::report::{mode_peaks, waveform_stats};

/// Summary of a summed (or single-mode) evaluation.
pub fn format_waveform_summary(title: &str, w: &Waveform, physical: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== gws - {title} ===\n"));

    let unit = if physical { "s" } else { "M" };
    match waveform_stats(w) {
        Some(s) => {
            out.push_str(&format!(
                "Samples: n={} | t=[{:.6e}, {:.6e}] {unit}\n",
                s.n_samples, s.t_start, s.t_end
            ));
            out.push_str(&format!(
                "Peak: |h|={:.6e} at t={:.6e} {unit}\n",
                s.peak_amplitude, s.peak_time
            ));
        }
        None => out.push_str("Samples: n=0\n"),
    }
    out.push_str(&format_advisories(&w.advisories));
    out
}

/// Summary of a per-mode evaluation: one row per mode.
pub fn format_mode_series_summary(title: &str, series: &ModeSeries, physical: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== gws - {title} ===\n"));
    let unit = if physical { "s" } else { "M" };
    out.push_str(&format!(
        "Samples: n={} | modes={}\n\n",
        series.times.len(),
        series.modes.len()
    ));

    out.push_str(&format!("{:<10} {:>14} {:>14}\n", "mode", "peak |h|", format!("t_peak [{unit}]")));
    out.push_str(&format!("{:-<10} {:-<14} {:-<14}\n", "", "", ""));
    for p in mode_peaks(series) {
        out.push_str(&format!(
            "{:<10} {:>14.6e} {:>14.6e}\n",
            p.mode.to_string(),
            p.peak_amplitude,
            p.peak_time
        ));
    }
    out.push_str(&format_advisories(&series.advisories));
    out
}

/// One mode per line.
pub fn format_mode_list(modes: &[ModeKey]) -> String {
    let mut out = format!("Modes ({}):\n", modes.len());
    for key in modes {
        out.push_str(&format!("  {key}  [{}]\n", key.label()));
    }
    out
}

fn format_advisories(advisories: &[Advisory]) -> String {
    if advisories.is_empty() {
        return String::new();
    }
    let mut out = String::from("\nAdvisories:\n");
    for a in advisories {
        out.push_str(&format!("- {a}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_mentions_peak_and_advisories() {
        let w = Waveform {
            times: vec![0.0, 1.0],
            h_plus: vec![1.0, 2.0],
            h_cross: vec![0.0, 0.0],
            advisories: vec![Advisory::Extrapolation {
                parameter: 12.0,
                min: 1.0,
                max: 10.0,
            }],
        };
        let text = format_waveform_summary("single mode", &w, false);
        assert!(text.contains("n=2"));
        assert!(text.contains("|h|=2.000000e0"));
        assert!(text.contains("Advisories:"));
        assert!(text.contains("parameter value 12"));
    }

    #[test]
    fn mode_list_shows_labels() {
        let text = format_mode_list(&[ModeKey::new(2, 2), ModeKey::new(3, -3)]);
        assert!(text.starts_with("Modes (2):"));
        assert!(text.contains("(3, -3)  [l3_m-3]"));
    }
}
