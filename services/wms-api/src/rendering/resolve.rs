//! Locating the dataset file and time step for a render.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

use wms_common::{parse_iso8601, WmsError, WmsResult};

/// Dataset file for `layer`.
///
/// An explicit `file` is reduced to its final path component inside
/// `data_dir`. Without one, or when it does not exist, the most recently
/// modified `<layer>_*.nc` is used.
pub fn resolve_dataset(data_dir: &Path, layer: &str, file: Option<&str>) -> WmsResult<PathBuf> {
    if let Some(requested) = file {
        match Path::new(requested).file_name() {
            Some(name) => {
                let path = data_dir.join(name);
                if path.is_file() {
                    return Ok(path);
                }
                debug!(layer = %layer, file = %requested, "Requested file missing, using latest");
            }
            None => warn!(layer = %layer, file = %requested, "Ignoring file without a name"),
        }
    }

    latest_for_layer(data_dir, layer)?.ok_or_else(|| WmsError::LayerNotFound(layer.to_string()))
}

/// Newest `<layer>_*.nc` by modification time; ties go to the larger name.
fn latest_for_layer(data_dir: &Path, layer: &str) -> WmsResult<Option<PathBuf>> {
    let entries = match fs::read_dir(data_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let prefix = format!("{}_", layer);
    let mut best: Option<(SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.starts_with(&prefix) || !name.ends_with(".nc") {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified()?;
        let newer = match &best {
            None => true,
            Some((t, p)) => (modified, &path) > (*t, p),
        };
        if newer {
            best = Some((modified, path));
        }
    }
    Ok(best.map(|(_, path)| path))
}

/// Position on the time axis of the step nearest `requested`. Steps whose
/// value did not decode are never chosen.
///
/// Falls back to 0 when nothing was requested, the timestamp does not
/// parse, or no step decoded. Ties resolve to the earlier index.
pub fn select_time_index(times: &[Option<DateTime<Utc>>], requested: Option<&str>) -> usize {
    let Some(raw) = requested.filter(|s| !s.trim().is_empty()) else {
        return 0;
    };
    let target = match parse_iso8601(raw) {
        Ok(t) => t,
        Err(e) => {
            warn!(time = %raw, error = %e, "Unparsable time, using first step");
            return 0;
        }
    };

    let mut best: Option<(usize, i64)> = None;
    for (i, t) in times.iter().enumerate() {
        let Some(t) = t else { continue };
        let distance = (*t - target).num_milliseconds().abs();
        if best.map_or(true, |(_, d)| distance < d) {
            best = Some((i, distance));
        }
    }
    best.map(|(i, _)| i).unwrap_or(0)
}
