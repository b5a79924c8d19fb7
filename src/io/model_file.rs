//! Read/write surrogate model JSON files.
//!
//! Two layouts:
//! - single mode: one `SurrogateData` object
//! - multi mode: an object whose `l#_m#` keys each hold a `SurrogateData`
//!   (other top-level keys are ignored, so files may carry metadata)

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use log::debug;
use serde_json::{Map, Value};

use crate::domain::ModeKey;
use crate::error::{AppError, ErrorKind};
use crate::models::SurrogateData;

/// Read a single-mode surrogate JSON file.
pub fn read_surrogate_json(path: &Path) -> Result<SurrogateData, AppError> {
    let reader = open(path)?;
    serde_json::from_reader(reader).map_err(|e| {
        AppError::new(
            ErrorKind::InvalidModel,
            format!("Invalid surrogate JSON '{}': {e}", path.display()),
        )
    })
}

/// Write a single-mode surrogate JSON file.
pub fn write_surrogate_json(path: &Path, data: &SurrogateData) -> Result<(), AppError> {
    let writer = create(path)?;
    serde_json::to_writer(writer, data)
        .map_err(|e| AppError::new(ErrorKind::Io, format!("Failed to write surrogate JSON: {e}")))
}

/// Read a multi-mode surrogate JSON file.
pub fn read_multimode_json(path: &Path) -> Result<BTreeMap<ModeKey, SurrogateData>, AppError> {
    let reader = open(path)?;
    let root: Map<String, Value> = serde_json::from_reader(reader).map_err(|e| {
        AppError::new(
            ErrorKind::InvalidModel,
            format!("Invalid multi-mode JSON '{}': {e}", path.display()),
        )
    })?;

    let mut modes = BTreeMap::new();
    for (label, value) in root {
        if !is_mode_label(&label) {
            debug!("skipping non-mode key '{label}'");
            continue;
        }
        let key = ModeKey::from_label(&label)?;
        let data: SurrogateData = serde_json::from_value(value).map_err(|e| {
            AppError::new(ErrorKind::InvalidModel, format!("Invalid data for mode {label}: {e}"))
        })?;
        modes.insert(key, data);
    }
    Ok(modes)
}

/// Write a multi-mode surrogate JSON file keyed by `l#_m#` labels.
pub fn write_multimode_json(path: &Path, modes: &BTreeMap<ModeKey, SurrogateData>) -> Result<(), AppError> {
    let labelled: BTreeMap<String, &SurrogateData> = modes.iter().map(|(k, v)| (k.label(), v)).collect();
    let writer = create(path)?;
    serde_json::to_writer(writer, &labelled)
        .map_err(|e| AppError::new(ErrorKind::Io, format!("Failed to write multi-mode JSON: {e}")))
}

fn is_mode_label(label: &str) -> bool {
    label
        .strip_prefix('l')
        .and_then(|rest| rest.split_once('_'))
        .is_some_and(|(ell, m)| !ell.is_empty() && ell.chars().all(|c| c.is_ascii_digit()) && m.starts_with('m'))
}

fn open(path: &Path) -> Result<BufReader<File>, AppError> {
    File::open(path).map(BufReader::new).map_err(|e| {
        AppError::new(
            ErrorKind::Io,
            format!("Failed to open model file '{}': {e}", path.display()),
        )
    })
}

fn create(path: &Path) -> Result<BufWriter<File>, AppError> {
    File::create(path).map(BufWriter::new).map_err(|e| {
        AppError::new(
            ErrorKind::Io,
            format!("Failed to create model file '{}': {e}", path.display()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::compare_models;
    use crate::test_fixtures::{amp_phase_data, multimode_data, waveform_data};
    use std::io::Write;

    #[test]
    fn single_mode_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mode.json");
        let data = amp_phase_data(25, 2);
        write_surrogate_json(&path, &data).unwrap();
        let back = read_surrogate_json(&path).unwrap();
        assert!(compare_models(&data, &back).iter().all(|c| c.agrees));
        assert_eq!(back.fit_type_norm.as_deref(), Some("polyval_1d"));
    }

    #[test]
    fn multimode_file_uses_mode_labels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modes.json");
        let modes = multimode_data(20);
        write_multimode_json(&path, &modes).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"l2_m1\"") && text.contains("\"l3_m3\""));

        let back = read_multimode_json(&path).unwrap();
        assert_eq!(back.keys().collect::<Vec<_>>(), modes.keys().collect::<Vec<_>>());
    }

    #[test]
    fn metadata_keys_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("modes.json");
        let mode = serde_json::to_string(&waveform_data(12, 2)).unwrap();
        let mut f = File::create(&path).unwrap();
        write!(f, "{{\"label\": \"demo\", \"l2_m2_\": {mode}}}").unwrap();
        drop(f);

        let back = read_multimode_json(&path).unwrap();
        assert_eq!(back.keys().copied().collect::<Vec<_>>(), vec![ModeKey::new(2, 2)]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_surrogate_json(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn malformed_file_is_a_model_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{\"times\": [1, 2]}").unwrap();
        assert_eq!(read_surrogate_json(&path).unwrap_err().kind(), ErrorKind::InvalidModel);
    }
}
