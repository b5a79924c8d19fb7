//! Waveform CSV export and sample-time input.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! - summed waveforms: `t,h_plus,h_cross`
//! - per-mode output: `t` then `hp_l#_m#,hc_l#_m#` for each mode

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{ModeSeries, Waveform};
use crate::error::{AppError, ErrorKind};

/// Write a polarization pair to CSV.
pub fn write_waveform_csv(path: &Path, waveform: &Waveform) -> Result<(), AppError> {
    let mut file = create(path)?;
    writeln!(file, "t,h_plus,h_cross").map_err(write_err)?;
    for ((t, hp), hc) in waveform.times.iter().zip(&waveform.h_plus).zip(&waveform.h_cross) {
        writeln!(file, "{t:.17e},{hp:.17e},{hc:.17e}").map_err(write_err)?;
    }
    file.flush().map_err(write_err)
}

/// Write per-mode polarizations to CSV, one column pair per mode.
pub fn write_mode_series_csv(path: &Path, series: &ModeSeries) -> Result<(), AppError> {
    let mut file = create(path)?;

    let mut header = String::from("t");
    for key in &series.modes {
        let label = key.label();
        header.push_str(&format!(",hp_{label},hc_{label}"));
    }
    writeln!(file, "{header}").map_err(write_err)?;

    for (i, t) in series.times.iter().enumerate() {
        let mut row = format!("{t:.17e}");
        for j in 0..series.modes.len() {
            row.push_str(&format!(
                ",{:.17e},{:.17e}",
                series.h_plus[(i, j)],
                series.h_cross[(i, j)]
            ));
        }
        writeln!(file, "{row}").map_err(write_err)?;
    }
    file.flush().map_err(write_err)
}

/// Read evaluation times, one per line. Blank lines and `#` comments are skipped.
pub fn read_samples(path: &Path) -> Result<Vec<f64>, AppError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        AppError::new(
            ErrorKind::Io,
            format!("Failed to read samples '{}': {e}", path.display()),
        )
    })?;
    text.lines()
        .enumerate()
        .map(|(i, line)| (i, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(i, line)| {
            line.parse::<f64>().map_err(|e| {
                AppError::new(
                    ErrorKind::InvalidInput,
                    format!("{}:{}: invalid sample time '{line}': {e}", path.display(), i + 1),
                )
            })
        })
        .collect()
}

fn create(path: &Path) -> Result<BufWriter<File>, AppError> {
    File::create(path).map(BufWriter::new).map_err(|e| {
        AppError::new(
            ErrorKind::Io,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })
}

fn write_err(e: std::io::Error) -> AppError {
    AppError::new(ErrorKind::Io, format!("Failed to write export CSV: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModeKey;
    use nalgebra::DMatrix;

    #[test]
    fn waveform_csv_has_one_row_per_sample() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.csv");
        let w = Waveform {
            times: vec![0.0, 1.0, 2.0],
            h_plus: vec![1.0, 0.5, -0.25],
            h_cross: vec![0.0, 0.5, 0.75],
            advisories: Vec::new(),
        };
        write_waveform_csv(&path, &w).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "t,h_plus,h_cross");
        assert_eq!(lines.len(), 4);
        let last: Vec<f64> = lines[3].split(',').map(|x| x.parse().unwrap()).collect();
        assert_eq!(last, vec![2.0, -0.25, 0.75]);
    }

    #[test]
    fn mode_series_csv_labels_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modes.csv");
        let series = ModeSeries {
            modes: vec![ModeKey::new(2, -2), ModeKey::new(2, 2)],
            times: vec![0.0, 1.0],
            h_plus: DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]),
            h_cross: DMatrix::from_row_slice(2, 2, &[-1.0, -2.0, -3.0, -4.0]),
            advisories: Vec::new(),
        };
        write_mode_series_csv(&path, &series).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "t,hp_l2_m-2,hc_l2_m-2,hp_l2_m2,hc_l2_m2");
        let row: Vec<f64> = lines[2].split(',').map(|x| x.parse().unwrap()).collect();
        assert_eq!(row, vec![1.0, 3.0, -3.0, 4.0, -4.0]);
    }

    #[test]
    fn samples_skip_comments_and_report_bad_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.txt");
        std::fs::write(&path, "# times\n-10\n\n0.5\n2e1\n").unwrap();
        assert_eq!(read_samples(&path).unwrap(), vec![-10.0, 0.5, 20.0]);

        std::fs::write(&path, "1.0\nabc\n").unwrap();
        let err = read_samples(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains(":2:"));
    }
}
