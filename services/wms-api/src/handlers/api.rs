//! REST API handlers: health, metadata queries, file listing, capabilities
//! and tile rendering.

use axum::{
    extract::{Extension, Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::fs;
use std::path::Path as FsPath;
use std::sync::Arc;
use std::time::UNIX_EPOCH;
use tracing::{error, info, instrument};

use renderer::RenderedImage;
use wms_common::{format_iso8601, WmsError, WmsResult};
use wms_protocol::{error_document, no_data_document, CapabilitiesError};

use super::common::{
    error_response, json_error, layer_error_response, parse_optional, run_blocking, xml_response,
};
use crate::metrics::{record_render, record_request, Timer};
use crate::rendering::{self, RenderRequest};
use crate::state::AppState;

// ============================================================================
// Health
// ============================================================================

/// GET /health
pub async fn health_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "wms-api",
        "data_dir": state.data_dir.display().to_string(),
        "metadata_dir": state.store.dir().display().to_string(),
    }))
}

// ============================================================================
// Metadata
// ============================================================================

/// GET /api/metadata
#[instrument(skip(state))]
pub async fn metadata_index_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    record_request("api");
    match run_blocking(move || state.store.index()).await {
        Ok(index) => Json(index).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/metadata/:parameter
#[instrument(skip(state))]
pub async fn metadata_parameter_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(parameter): Path<String>,
) -> Response {
    record_request("api");
    match run_blocking(move || state.store.history(&parameter)).await {
        Ok(history) => Json(history).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/layers
#[instrument(skip(state))]
pub async fn layers_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    record_request("api");
    match run_blocking(move || state.store.layers()).await {
        Ok(layers) => Json(json!({ "count": layers.len(), "layers": layers })).into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /api/layer/:layer/times
#[instrument(skip(state))]
pub async fn layer_times_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(layer): Path<String>,
) -> Response {
    record_request("api");
    let name = layer.clone();
    match run_blocking(move || state.store.times(&name)).await {
        Ok(times) => {
            let times: Vec<String> = times.iter().map(format_iso8601).collect();
            Json(json!({ "layer": layer, "count": times.len(), "times": times })).into_response()
        }
        Err(e) => layer_error_response(e),
    }
}

/// GET /api/layer/:layer/bounds
#[instrument(skip(state))]
pub async fn layer_bounds_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(layer): Path<String>,
) -> Response {
    record_request("api");
    let name = layer.clone();
    match run_blocking(move || state.store.bounds(&name)).await {
        Ok(bounds) => Json(json!({ "layer": layer, "bounds": bounds })).into_response(),
        Err(e) => layer_error_response(e),
    }
}

/// GET /api/layer/:layer/colorscale
#[instrument(skip(state))]
pub async fn layer_colorscale_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(layer): Path<String>,
) -> Response {
    record_request("api");
    let name = layer.clone();
    match run_blocking(move || state.store.color_scale(&name)).await {
        Ok(scale) => Json(json!({ "layer": layer, "colorScale": scale })).into_response(),
        Err(e) => layer_error_response(e),
    }
}

// ============================================================================
// Files
// ============================================================================

/// GET /api/files
#[instrument(skip(state))]
pub async fn files_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    record_request("api");
    let dir = state.data_dir.clone();
    match run_blocking(move || list_dataset_files(&dir)).await {
        Ok(files) => Json(json!({
            "count": files.len(),
            "files": files,
            "directory": state.data_dir.display().to_string(),
        }))
        .into_response(),
        Err(e) => error_response(&e),
    }
}

/// `.nc` files directly in `dir`, most recently modified first.
fn list_dataset_files(dir: &FsPath) -> WmsResult<Vec<serde_json::Value>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("nc") {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        files.push((entry.file_name().to_string_lossy().into_owned(), metadata.len(), modified));
    }

    files.sort_by(|a, b| b.2.total_cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
    Ok(files
        .into_iter()
        .map(|(name, size, modified)| json!({ "name": name, "size": size, "modified": modified }))
        .collect())
}

// ============================================================================
// Capabilities
// ============================================================================

/// GET /api/capabilities
#[instrument(skip(state))]
pub async fn capabilities_handler(Extension(state): Extension<Arc<AppState>>) -> Response {
    record_request("api");
    capabilities_response(state).await
}

pub(crate) async fn capabilities_response(state: Arc<AppState>) -> Response {
    let store_state = state.clone();
    let histories = match run_blocking(move || store_state.store.all_histories()).await {
        Ok(histories) => histories,
        Err(e) => {
            error!(error = %e, "Failed to load layer histories");
            return xml_response(StatusCode::INTERNAL_SERVER_ERROR, error_document(&e.to_string()));
        }
    };

    match state.capabilities.build(&histories) {
        Ok(xml) => xml_response(StatusCode::OK, xml),
        Err(CapabilitiesError::NoData) => xml_response(StatusCode::NOT_FOUND, no_data_document()),
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Query parameters of GET /api/render.
#[derive(Debug, Default, Deserialize)]
pub struct RenderParams {
    pub layer: Option<String>,
    pub file: Option<String>,
    pub time: Option<String>,
    pub bbox: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub colorscalerange: Option<String>,
    pub palette: Option<String>,
    pub styles: Option<String>,
    pub gamma: Option<String>,
}

impl RenderParams {
    fn into_request(self) -> WmsResult<RenderRequest> {
        let layer = self
            .layer
            .filter(|l| !l.trim().is_empty())
            .ok_or_else(|| WmsError::MissingParameter("layer".to_string()))?;

        let mut request = RenderRequest::new(layer);
        if let Some(width) = parse_optional("width", self.width.as_deref())? {
            request.width = width;
        }
        if let Some(height) = parse_optional("height", self.height.as_deref())? {
            request.height = height;
        }
        request.file = non_empty(self.file);
        request.time = non_empty(self.time);
        request.bbox = non_empty(self.bbox);
        request.color_range = non_empty(self.colorscalerange);
        request.palette = non_empty(self.palette).or_else(|| non_empty(self.styles));
        request.gamma = self.gamma.and_then(|g| g.trim().parse().ok());
        Ok(request)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// GET /api/render
#[instrument(skip(state))]
pub async fn render_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<RenderParams>,
) -> Response {
    record_request("render");
    let request = match params.into_request() {
        Ok(request) => request,
        Err(e) => return error_response(&e),
    };

    match render_image(state, request).await {
        Ok(image) => png_response(image),
        Err(WmsError::LayerNotFound(layer)) => json_error(
            StatusCode::NOT_FOUND,
            "NetCDF file not found for layer",
            "NotFound",
            &[("layer", layer.as_str())],
        ),
        Err(e) => error_response(&e),
    }
}

/// Run a render on the blocking pool and record its outcome.
pub(crate) async fn render_image(state: Arc<AppState>, request: RenderRequest) -> WmsResult<RenderedImage> {
    let timer = Timer::start();
    let layer = request.layer.clone();
    let result = run_blocking(move || rendering::render(&state.data_dir, &request)).await;

    let elapsed_ms = timer.elapsed_ms();
    record_render(elapsed_ms, result.is_ok());
    if let Ok(image) = &result {
        info!(
            layer = %layer,
            width = image.width,
            height = image.height,
            bytes = image.png.len(),
            elapsed_ms,
            "Rendered tile"
        );
    }
    result
}

pub(crate) fn png_response(image: RenderedImage) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, image.content_type())],
        image.png,
    )
        .into_response()
}
