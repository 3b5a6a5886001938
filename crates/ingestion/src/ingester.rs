//! Regeneration of the layer registry from a dataset directory.

use metrics::{counter, histogram};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use storage::{validate_parameter, MetadataStore};
use wms_common::{ColorScaleRegistry, LayerHistory, MetadataRecord, RegistryIndex};

use crate::error::{IngestionError, Result};
use crate::metadata::{extract, parameter_from_filename, DATASET_EXTENSION};

/// A dataset that could not be extracted during regeneration.
#[derive(Debug, Clone)]
pub struct PartialFailure {
    pub file: PathBuf,
    pub error: String,
}

/// Outcome of a regeneration run.
#[derive(Debug, Clone)]
pub struct RegenerationReport {
    /// Number of records published across all parameters
    pub records: usize,
    /// Files that were skipped
    pub failures: Vec<PartialFailure>,
    /// Published parameters, sorted
    pub parameters: Vec<String>,
    pub index: RegistryIndex,
}

/// Builds layer metadata for every dataset in a directory.
pub struct Ingester {
    registry: Arc<ColorScaleRegistry>,
}

impl Ingester {
    pub fn new(registry: Arc<ColorScaleRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ColorScaleRegistry {
        &self.registry
    }

    /// Rebuild every layer history and the registry index from the
    /// datasets in `data_dir`.
    ///
    /// Files that fail to extract are logged and reported, never fatal.
    /// A missing `data_dir` publishes an empty index.
    pub fn regenerate(&self, data_dir: &Path, metadata_dir: &Path) -> Result<RegenerationReport> {
        let start = Instant::now();
        counter!("regeneration_runs_total").increment(1);

        let files = list_datasets(data_dir)?;
        info!(
            data_dir = %data_dir.display(),
            files = files.len(),
            "Regenerating layer metadata"
        );

        let extracted: Vec<(PathBuf, Result<MetadataRecord>)> = files
            .par_iter()
            .map(|path| (path.clone(), self.extract_dataset(path)))
            .collect();

        let mut grouped: BTreeMap<String, Vec<MetadataRecord>> = BTreeMap::new();
        let mut failures = Vec::new();
        for (path, result) in extracted {
            match result {
                Ok(record) => grouped.entry(record.parameter.clone()).or_default().push(record),
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Skipping dataset");
                    failures.push(PartialFailure {
                        file: path,
                        error: e.to_string(),
                    });
                }
            }
        }

        let histories: Vec<LayerHistory> = grouped
            .into_iter()
            .map(|(parameter, records)| LayerHistory::new(parameter, records))
            .collect();
        let records = histories.iter().map(|h| h.count).sum();

        let store = MetadataStore::new(metadata_dir);
        let index = store.replace_all(&histories, &self.registry)?;

        counter!("regeneration_files_total").increment(records as u64);
        counter!("regeneration_failures_total").increment(failures.len() as u64);
        histogram!("regeneration_duration_ms").record(start.elapsed().as_secs_f64() * 1000.0);

        info!(
            parameters = index.count,
            records,
            failures = failures.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Layer metadata regenerated"
        );

        Ok(RegenerationReport {
            records,
            failures,
            parameters: index.parameters.clone(),
            index,
        })
    }
}

impl Ingester {
    /// Extract one dataset under the parameter its filename encodes.
    /// A name that cannot key a history file is a per-file failure.
    fn extract_dataset(&self, path: &Path) -> Result<MetadataRecord> {
        let file_name = path.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
            IngestionError::InvalidName {
                path: path.to_path_buf(),
                message: "file name is not valid UTF-8".to_string(),
            }
        })?;
        let parameter = parameter_from_filename(file_name);
        validate_parameter(&parameter).map_err(|e| IngestionError::InvalidName {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        extract(path, &parameter, &self.registry)
    }
}

/// Regular `.nc` files directly inside `dir`, sorted by path.
fn list_datasets(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        warn!(data_dir = %dir.display(), "Dataset directory does not exist");
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| IngestionError::Scan {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;

        let is_dataset = entry.path().extension().and_then(|e| e.to_str()) == Some(DATASET_EXTENSION);
        if entry.file_type().is_file() && is_dataset {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
