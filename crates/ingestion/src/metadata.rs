//! Metadata extraction from weather dataset files.
//!
//! Derives the parameter id from a dataset's filename and builds the
//! [`MetadataRecord`] published for it.

use chrono::Utc;
use std::path::Path;
use tracing::{debug, info, warn};

use netcdf_parser::{GridFile, NetCdfError};
use wms_common::{
    Bounds, ColorScaleRegistry, GridDimensions, MetadataRecord, Statistics,
};

use crate::error::Result;

/// Extension of dataset files, without the dot.
pub const DATASET_EXTENSION: &str = "nc";

/// Stem prefixes whose parameter id keeps exactly three `_` tokens,
/// e.g. `wind_speed_10m_2024010100` -> `wind_speed_10m`.
const THREE_TOKEN_PREFIXES: &[&str] = &["wind_speed_"];

/// Parameter id encoded in a dataset filename.
///
/// The stem is split on `_` and the last token (the run timestamp) is
/// dropped. Stems with fewer than two tokens are used whole.
pub fn parameter_from_filename(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    let parts: Vec<&str> = stem.split('_').collect();
    if parts.len() < 2 {
        return stem.to_string();
    }

    if parts.len() >= 3 && THREE_TOKEN_PREFIXES.iter().any(|p| stem.starts_with(p)) {
        return parts[..3].join("_");
    }

    parts[..parts.len() - 1].join("_")
}

/// Extract the metadata record of one dataset file.
///
/// Statistics cover every time step of the first data variable, skipping
/// fill and non-finite values. The file is closed before returning.
pub fn extract(
    path: &Path,
    parameter: &str,
    registry: &ColorScaleRegistry,
) -> Result<MetadataRecord> {
    info!(file = %path.display(), parameter = %parameter, "Extracting metadata");

    let file = GridFile::open(path)?;
    let var = file.first_data_variable()?;

    let lats = file.latitudes(&var)?;
    let lons = file.longitudes(&var)?;
    let bounds = Bounds::from_axes(&lats, &lons)
        .ok_or_else(|| NetCdfError::AxesNotFound(file.name().to_string()))?;

    let times = file.times()?;

    let values = file.read_all(&var)?;
    let statistics = match Statistics::from_values(values.iter().copied()) {
        Some(stats) => stats,
        None => {
            warn!(
                file = %file.name(),
                variable = %var.name,
                "Variable holds no valid values, using zeroed statistics"
            );
            Statistics::zeroed()
        }
    };

    let color_scale = registry.resolve(parameter, statistics.min, statistics.max);

    debug!(
        file = %file.name(),
        variable = %var.name,
        times = times.len(),
        min = statistics.min,
        max = statistics.max,
        "Extracted dataset metadata"
    );

    Ok(MetadataRecord {
        parameter: parameter.to_string(),
        name: color_scale.name.clone(),
        units: color_scale.units.clone(),
        file: file.name().to_string(),
        variable: var.name.clone(),
        dimensions: GridDimensions {
            time: times.len(),
            lat: lats.len(),
            lon: lons.len(),
        },
        times,
        bounds,
        statistics,
        color_scale,
        created: Utc::now(),
    })
}
