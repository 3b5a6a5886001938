//! Error types for the ingestion crate.

use std::path::PathBuf;

use netcdf_parser::NetCdfError;
use thiserror::Error;
use wms_common::WmsError;

/// Errors that can occur during metadata extraction and regeneration.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse NetCDF data: {0}")]
    Dataset(#[from] NetCdfError),

    #[error("Failed to scan {}: {message}", path.display())]
    Scan { path: PathBuf, message: String },

    #[error("Unusable dataset name {}: {message}", path.display())]
    InvalidName { path: PathBuf, message: String },

    #[error("Failed to write metadata: {0}")]
    Store(#[from] WmsError),
}

impl From<IngestionError> for WmsError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::Dataset(e) => e.into(),
            IngestionError::Store(e) => e,
            other => WmsError::StorageError(other.to_string()),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;
