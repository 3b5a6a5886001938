//! Flat-file repository for layer histories and the registry index.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use wms_common::{
    Bounds, ColorScale, ColorScaleRegistry, LayerHistory, LayerSummary, RegistryIndex, WmsError,
    WmsResult,
};

/// Name of the registry index file inside the metadata directory.
pub const INDEX_FILE: &str = "index.json";

/// Metadata directory holding `<parameter>.json` histories and `index.json`.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    dir: PathBuf,
}

impl MetadataStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Replace the whole store with `histories`.
    ///
    /// Every history and the index are written atomically. History files of
    /// parameters not present in `histories` are removed afterwards. All
    /// parameter names are checked before anything is written.
    pub fn replace_all(
        &self,
        histories: &[LayerHistory],
        color_scales: &ColorScaleRegistry,
    ) -> WmsResult<RegistryIndex> {
        for history in histories {
            validate_parameter(&history.parameter)?;
        }
        fs::create_dir_all(&self.dir)?;

        for history in histories {
            self.write_history(history)?;
        }

        let index = RegistryIndex::from_histories(histories, color_scales);
        self.write_index(&index)?;

        let keep: BTreeSet<&str> = histories.iter().map(|h| h.parameter.as_str()).collect();
        for (parameter, path) in self.history_files()? {
            if !keep.contains(parameter.as_str()) {
                info!(parameter = %parameter, "Removing stale layer history");
                remove_if_exists(&path)?;
            }
        }

        Ok(index)
    }

    /// Write one parameter's history to `<parameter>.json`.
    pub fn write_history(&self, history: &LayerHistory) -> WmsResult<()> {
        let path = self.history_path(&history.parameter)?;
        write_json_atomic(&path, history)?;
        debug!(parameter = %history.parameter, count = history.count, "Wrote layer history");
        Ok(())
    }

    pub fn write_index(&self, index: &RegistryIndex) -> WmsResult<()> {
        write_json_atomic(&self.dir.join(INDEX_FILE), index)?;
        debug!(count = index.count, "Wrote registry index");
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// The registry index, or `MetadataNotFound` if it was never generated.
    pub fn index(&self) -> WmsResult<RegistryIndex> {
        read_json(&self.dir.join(INDEX_FILE))?.ok_or(WmsError::MetadataNotFound)
    }

    pub fn history(&self, parameter: &str) -> WmsResult<LayerHistory> {
        let path = self
            .history_path(parameter)
            .map_err(|_| WmsError::ParameterNotFound(parameter.to_string()))?;
        read_json(&path)?.ok_or_else(|| WmsError::ParameterNotFound(parameter.to_string()))
    }

    /// Every timestamp published for `parameter`, ascending and deduplicated.
    pub fn times(&self, parameter: &str) -> WmsResult<Vec<DateTime<Utc>>> {
        Ok(self.history(parameter)?.all_times())
    }

    /// Bounds of the most recent record.
    pub fn bounds(&self, parameter: &str) -> WmsResult<Bounds> {
        let history = self.history(parameter)?;
        history
            .latest()
            .map(|record| record.bounds)
            .ok_or_else(|| WmsError::NoDatasets(parameter.to_string()))
    }

    /// Color scale of the most recent record.
    pub fn color_scale(&self, parameter: &str) -> WmsResult<ColorScale> {
        let history = self.history(parameter)?;
        history
            .latest()
            .map(|record| record.color_scale.clone())
            .ok_or_else(|| WmsError::NoDatasets(parameter.to_string()))
    }

    /// Every readable history, sorted by parameter.
    ///
    /// Uses the index's parameter list when present, otherwise every
    /// history file in the directory. Unreadable histories are skipped.
    pub fn all_histories(&self) -> WmsResult<Vec<LayerHistory>> {
        let parameters: Vec<String> = match self.index() {
            Ok(index) => index.parameters,
            Err(WmsError::MetadataNotFound) => self
                .history_files()?
                .into_iter()
                .map(|(parameter, _)| parameter)
                .collect(),
            Err(e) => return Err(e),
        };

        let mut histories = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            match self.history(&parameter) {
                Ok(history) => histories.push(history),
                Err(WmsError::ParameterNotFound(_)) => {
                    warn!(parameter = %parameter, "Indexed parameter has no history file");
                }
                Err(e) => {
                    warn!(parameter = %parameter, error = %e, "Skipping unreadable history");
                }
            }
        }
        histories.sort_by(|a, b| a.parameter.cmp(&b.parameter));
        Ok(histories)
    }

    /// Latest-record summary of every indexed parameter with data.
    /// Empty when no index exists.
    pub fn layers(&self) -> WmsResult<Vec<LayerSummary>> {
        let index = match self.index() {
            Ok(index) => index,
            Err(WmsError::MetadataNotFound) => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut layers = Vec::new();
        for parameter in &index.parameters {
            match self.history(parameter) {
                Ok(history) => layers.extend(history.latest().map(LayerSummary::from)),
                Err(WmsError::ParameterNotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(layers)
    }

    // ========================================================================
    // Paths
    // ========================================================================

    /// `<dir>/<parameter>.json`.
    fn history_path(&self, parameter: &str) -> WmsResult<PathBuf> {
        validate_parameter(parameter)?;
        Ok(self.dir.join(format!("{}.json", parameter)))
    }

    /// `(parameter, path)` of every history file currently on disk.
    fn history_files(&self) -> WmsResult<Vec<(String, PathBuf)>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if path.file_name().and_then(|n| n.to_str()) == Some(INDEX_FILE) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                files.push((stem.to_string(), path.clone()));
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Check that `parameter` can name a history file: not empty, no path
/// separators, and not colliding with the index.
pub fn validate_parameter(parameter: &str) -> WmsResult<()> {
    let valid = !parameter.is_empty()
        && parameter != "."
        && parameter != ".."
        && !parameter.contains(|c: char| c == '/' || c == '\\')
        && format!("{}.json", parameter) != INDEX_FILE;
    if valid {
        Ok(())
    } else {
        Err(WmsError::InvalidParameter {
            param: "parameter".to_string(),
            message: format!("'{}' is not a valid parameter name", parameter),
        })
    }
}

/// Serialize to a temporary file next to `path`, then rename over it.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> WmsResult<()> {
    let dir = path
        .parent()
        .ok_or_else(|| WmsError::StorageError(format!("{} has no parent", path.display())))?;
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, value)?;
    tmp.write_all(b"\n")?;
    tmp.flush()?;
    tmp.persist(path)
        .map_err(|e| WmsError::StorageError(format!("Failed to replace {}: {}", path.display(), e)))?;
    Ok(())
}

/// `Ok(None)` when the file does not exist.
fn read_json<T: DeserializeOwned>(path: &Path) -> WmsResult<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| WmsError::StorageError(format!("Corrupt metadata file {}: {}", path.display(), e)))
}

fn remove_if_exists(path: &Path) -> WmsResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wms_common::{GridDimensions, MetadataRecord, Statistics};

    fn record(parameter: &str, file: &str, created_hour: u32, times: &[u32]) -> MetadataRecord {
        MetadataRecord {
            parameter: parameter.to_string(),
            name: parameter.to_string(),
            units: "K".to_string(),
            file: file.to_string(),
            variable: "v".to_string(),
            times: times
                .iter()
                .map(|h| Utc.with_ymd_and_hms(2024, 1, 1, *h, 0, 0).unwrap())
                .collect(),
            bounds: Bounds {
                north: 50.0 + created_hour as f64,
                south: -50.0,
                east: 10.0,
                west: -10.0,
            },
            statistics: Statistics::zeroed(),
            color_scale: ColorScale::fallback(parameter, 0.0, created_hour as f64),
            dimensions: GridDimensions {
                time: times.len(),
                lat: 2,
                lon: 2,
            },
            created: Utc.with_ymd_and_hms(2024, 1, 2, created_hour, 0, 0).unwrap(),
        }
    }

    fn scales() -> ColorScaleRegistry {
        ColorScaleRegistry::builtin()
    }

    fn store() -> (tempfile::TempDir, MetadataStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MetadataStore::new(dir.path().join("metadata"));
        (dir, store)
    }

    #[test]
    fn test_missing_index_is_not_found() {
        let (_dir, store) = store();
        assert!(matches!(store.index(), Err(WmsError::MetadataNotFound)));
        assert!(store.layers().unwrap().is_empty());
        assert!(store.all_histories().unwrap().is_empty());
    }

    #[test]
    fn test_replace_all_and_query() {
        let (_dir, store) = store();
        let history = LayerHistory::new(
            "temp_2m",
            vec![
                record("temp_2m", "temp_2m_a.nc", 1, &[6, 0]),
                record("temp_2m", "temp_2m_b.nc", 5, &[3, 6]),
            ],
        );
        let index = store.replace_all(&[history], &scales()).unwrap();
        assert_eq!(index.count, 1);

        let read = store.index().unwrap();
        assert_eq!(read.parameters, vec!["temp_2m"]);
        assert_eq!(read.color_scales, scales());

        let hours: Vec<u32> = store
            .times("temp_2m")
            .unwrap()
            .iter()
            .map(|t| chrono::Timelike::hour(t))
            .collect();
        assert_eq!(hours, vec![0, 3, 6]);

        // Most recent record wins
        assert_eq!(store.bounds("temp_2m").unwrap().north, 55.0);
        assert_eq!(store.color_scale("temp_2m").unwrap().range, [0.0, 5.0]);

        let layers = store.layers().unwrap();
        assert_eq!(layers.len(), 1);
        assert_eq!(layers[0].name, "temp_2m");
    }

    #[test]
    fn test_unknown_parameter() {
        let (_dir, store) = store();
        store.replace_all(&[], &scales()).unwrap();
        assert!(matches!(
            store.history("nope"),
            Err(WmsError::ParameterNotFound(p)) if p == "nope"
        ));
        assert!(matches!(store.bounds("nope"), Err(WmsError::ParameterNotFound(_))));
        assert!(matches!(store.history("../etc"), Err(WmsError::ParameterNotFound(_))));
        assert!(matches!(store.history("index"), Err(WmsError::ParameterNotFound(_))));
    }

    #[test]
    fn test_empty_history_has_no_bounds() {
        let (_dir, store) = store();
        store
            .replace_all(&[LayerHistory::new("mslp", vec![])], &scales())
            .unwrap();
        assert!(store.history("mslp").unwrap().is_empty());
        assert!(matches!(store.bounds("mslp"), Err(WmsError::NoDatasets(_))));
        assert!(matches!(store.color_scale("mslp"), Err(WmsError::NoDatasets(_))));
        assert!(store.layers().unwrap().is_empty());
    }

    #[test]
    fn test_replace_removes_stale_histories() {
        let (_dir, store) = store();
        store
            .replace_all(
                &[
                    LayerHistory::new("temp_2m", vec![record("temp_2m", "a.nc", 1, &[0])]),
                    LayerHistory::new("mslp", vec![record("mslp", "b.nc", 1, &[0])]),
                ],
                &scales(),
            )
            .unwrap();
        assert!(store.dir().join("mslp.json").exists());

        store
            .replace_all(
                &[LayerHistory::new("temp_2m", vec![record("temp_2m", "a.nc", 1, &[0])])],
                &scales(),
            )
            .unwrap();
        assert!(!store.dir().join("mslp.json").exists());
        assert!(store.dir().join(INDEX_FILE).exists());
        assert_eq!(store.index().unwrap().parameters, vec!["temp_2m"]);
    }

    #[test]
    fn test_invalid_parameter_writes_nothing() {
        let (_dir, store) = store();
        let result = store.replace_all(
            &[
                LayerHistory::new("temp_2m", vec![record("temp_2m", "a.nc", 1, &[0])]),
                LayerHistory::new("index", vec![record("index", "index_1.nc", 1, &[0])]),
            ],
            &scales(),
        );
        assert!(matches!(result, Err(WmsError::InvalidParameter { .. })));
        assert!(!store.dir().join("temp_2m.json").exists());
        assert!(!store.dir().join(INDEX_FILE).exists());
    }

    #[test]
    fn test_validate_parameter() {
        assert!(validate_parameter("wind_speed_10m").is_ok());
        for bad in ["", ".", "..", "a/b", "a\\b", "index"] {
            assert!(validate_parameter(bad).is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let (_dir, store) = store();
        store
            .replace_all(
                &[LayerHistory::new("temp_2m", vec![record("temp_2m", "a.nc", 1, &[0])])],
                &scales(),
            )
            .unwrap();
        let mut names: Vec<String> = fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["index.json", "temp_2m.json"]);
    }

    #[test]
    fn test_all_histories_without_index() {
        let (_dir, store) = store();
        store
            .write_history(&LayerHistory::new("b", vec![record("b", "b.nc", 1, &[0])]))
            .unwrap();
        store
            .write_history(&LayerHistory::new("a", vec![record("a", "a.nc", 1, &[0])]))
            .unwrap();
        let params: Vec<String> = store
            .all_histories()
            .unwrap()
            .into_iter()
            .map(|h| h.parameter)
            .collect();
        assert_eq!(params, vec!["a", "b"]);
    }

    #[test]
    fn test_corrupt_index_is_storage_error() {
        let (_dir, store) = store();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.dir().join(INDEX_FILE), b"{not json").unwrap();
        assert!(matches!(store.index(), Err(WmsError::StorageError(_))));
    }
}
