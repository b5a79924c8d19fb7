//! Reporting utilities: waveform statistics and formatted terminal output.

pub mod format;

pub use format::*;

use nalgebra::Complex;

use crate::domain::{ModeKey, ModeSeries, Waveform};
use crate::math::peak_index;

/// Headline numbers for one polarization pair.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformStats {
    pub n_samples: usize,
    pub t_start: f64,
    pub t_end: f64,
    pub peak_time: f64,
    pub peak_amplitude: f64,
}

/// Peak of one mode column.
#[derive(Debug, Clone, PartialEq)]
pub struct ModePeak {
    pub mode: ModeKey,
    pub peak_time: f64,
    pub peak_amplitude: f64,
}

/// Summary statistics; `None` for an empty waveform.
pub fn waveform_stats(w: &Waveform) -> Option<WaveformStats> {
    let peak = w.peak_index()?;
    Some(WaveformStats {
        n_samples: w.times.len(),
        t_start: *w.times.first()?,
        t_end: *w.times.last()?,
        peak_time: w.times[peak],
        peak_amplitude: w.h_plus[peak].hypot(w.h_cross[peak]),
    })
}

/// Amplitude peak of every mode column. All-zero columns report amplitude 0
/// at the first sample.
pub fn mode_peaks(series: &ModeSeries) -> Vec<ModePeak> {
    series
        .modes
        .iter()
        .enumerate()
        .filter_map(|(j, &mode)| {
            let h: Vec<Complex<f64>> = series
                .h_plus
                .column(j)
                .iter()
                .zip(series.h_cross.column(j).iter())
                .map(|(&p, &c)| Complex::new(p, c))
                .collect();
            let i = peak_index(&h)?;
            Some(ModePeak {
                mode,
                peak_time: series.times[i],
                peak_amplitude: h[i].norm(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    #[test]
    fn stats_locate_the_peak() {
        let w = Waveform {
            times: vec![-1.0, 0.0, 1.0, 2.0],
            h_plus: vec![0.1, 0.3, 0.0, 0.1],
            h_cross: vec![0.0, 0.4, 0.2, 0.0],
            advisories: Vec::new(),
        };
        let s = waveform_stats(&w).unwrap();
        assert_eq!(s.n_samples, 4);
        assert_eq!(s.peak_time, 0.0);
        assert!((s.peak_amplitude - 0.5).abs() < 1e-15);
        assert_eq!((s.t_start, s.t_end), (-1.0, 2.0));

        let empty = Waveform {
            times: Vec::new(),
            h_plus: Vec::new(),
            h_cross: Vec::new(),
            advisories: Vec::new(),
        };
        assert!(waveform_stats(&empty).is_none());
    }

    #[test]
    fn peaks_per_mode_column() {
        let series = ModeSeries {
            modes: vec![ModeKey::new(2, 1), ModeKey::new(2, 2)],
            times: vec![0.0, 1.0, 2.0],
            h_plus: DMatrix::from_row_slice(3, 2, &[0.0, 1.0, 0.0, 3.0, 0.0, 2.0]),
            h_cross: DMatrix::zeros(3, 2),
            advisories: Vec::new(),
        };
        let peaks = mode_peaks(&series);
        assert_eq!(peaks[0].peak_amplitude, 0.0);
        assert_eq!(peaks[0].peak_time, 0.0);
        assert_eq!(peaks[1].peak_time, 1.0);
        assert_eq!(peaks[1].peak_amplitude, 3.0);
    }
}
