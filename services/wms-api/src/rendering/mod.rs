//! Tile rendering pipeline.
//!
//! A render request names a layer and optionally a dataset file, a time, a
//! bounding box and color settings. The pipeline resolves the file, reads
//! one lat/lon slice of its first data variable, orients and crops it, and
//! hands the field to the image renderer.
//!
//! ```text
//! resolve_dataset -> GridFile::first_data_variable -> select_time_index
//!   -> GridFile::read_slice -> Subset::extract -> renderer::render_field
//! ```
//!
//! Everything here is blocking file work; HTTP handlers call [`render`]
//! from `spawn_blocking`.

pub mod resolve;
pub mod subset;

use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{debug, warn};

use netcdf_parser::{GridFile, NetCdfResult};
use renderer::{render_field, Field, Palette, RenderOptions, RenderedImage};
use wms_common::{WmsError, WmsResult};

pub use resolve::{resolve_dataset, select_time_index};
pub use subset::{normalize_longitudes, Subset};

/// Largest accepted output width or height, in pixels.
pub const MAX_DIMENSION: usize = 4096;

/// Default output width and height.
pub const DEFAULT_SIZE: usize = 256;

/// Parameters of one tile render.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub layer: String,
    /// Dataset file name inside the data directory
    pub file: Option<String>,
    /// ISO-8601 timestamp
    pub time: Option<String>,
    /// "minx,miny,maxx,maxy" in degrees
    pub bbox: Option<String>,
    pub width: usize,
    pub height: usize,
    /// "min,max"
    pub color_range: Option<String>,
    pub palette: Option<String>,
    pub gamma: Option<f64>,
}

impl RenderRequest {
    pub fn new(layer: impl Into<String>) -> Self {
        Self {
            layer: layer.into(),
            file: None,
            time: None,
            bbox: None,
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            color_range: None,
            palette: None,
            gamma: None,
        }
    }

    fn validate(&self) -> WmsResult<()> {
        if self.layer.trim().is_empty() {
            return Err(WmsError::MissingParameter("layer".to_string()));
        }
        for (param, value) in [("width", self.width), ("height", self.height)] {
            if value == 0 || value > MAX_DIMENSION {
                return Err(WmsError::InvalidParameter {
                    param: param.to_string(),
                    message: format!("must be between 1 and {}", MAX_DIMENSION),
                });
            }
        }
        Ok(())
    }

    fn options(&self) -> RenderOptions {
        RenderOptions {
            width: self.width,
            height: self.height,
            color_range: self.color_range.clone(),
            palette: self
                .palette
                .as_deref()
                .map(Palette::from_name)
                .unwrap_or_default(),
            gamma: self.gamma.unwrap_or(1.0),
        }
    }
}

/// Time step to read. An unreadable time axis selects the first step.
fn time_step(
    axis: NetCdfResult<Vec<Option<DateTime<Utc>>>>,
    requested: Option<&str>,
    ntime: usize,
    file: &str,
) -> usize {
    match axis {
        Ok(times) => select_time_index(&times, requested).min(ntime.saturating_sub(1)),
        Err(e) => {
            warn!(file = %file, error = %e, "Unreadable time axis, using first step");
            0
        }
    }
}

/// Render `request` against the datasets in `data_dir`.
pub fn render(data_dir: &Path, request: &RenderRequest) -> WmsResult<RenderedImage> {
    request.validate()?;

    let path = resolve_dataset(data_dir, &request.layer, request.file.as_deref())?;
    let grid = GridFile::open(&path)?;
    let var = grid.first_data_variable()?;
    let lats = grid.latitudes(&var)?;
    let lons = grid.longitudes(&var)?;

    let time_index = if var.axes.time_dim.is_some() {
        time_step(grid.time_axis(), request.time.as_deref(), var.ntime(), grid.name())
    } else {
        0
    };

    let slice = grid.read_slice(&var, time_index)?;
    let subset = Subset::extract(slice, &lats, &lons, request.bbox.as_deref());
    debug!(
        layer = %request.layer,
        file = %grid.name(),
        variable = %var.name,
        time_index,
        cols = subset.width,
        rows = subset.height,
        "Rendering subset"
    );

    let field = Field {
        values: &subset.values,
        width: subset.width,
        height: subset.height,
    };
    render_field(field, &request.options()).map_err(|e| WmsError::RenderError(e.to_string()))
}
