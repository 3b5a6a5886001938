//! Weather layer metadata ingestion.
//!
//! Turns a directory of `<parameter>_<run>.nc` datasets into published
//! layer metadata:
//!
//! - parameter ids from dataset filenames
//! - per-file metadata extraction (bounds, times, statistics, color scale)
//! - regeneration of every layer history and the registry index

pub mod error;
pub mod metadata;
mod ingester;

// Re-exports
pub use error::{IngestionError, Result};
pub use ingester::{Ingester, PartialFailure, RegenerationReport};
pub use metadata::{extract, parameter_from_filename, DATASET_EXTENSION};
