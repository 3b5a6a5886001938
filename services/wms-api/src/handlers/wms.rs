//! WMS facade: GetCapabilities, GetMap and GetFeatureInfo mapped onto the
//! capabilities builder and the tile renderer.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

use wms_common::{BoundingBox, WmsError};
use wms_protocol::wms_exception;

use super::api::{capabilities_response, png_response, render_image};
use super::common::{status_of, xml_response};
use crate::metrics::record_request;
use crate::rendering::{RenderRequest, DEFAULT_SIZE};
use crate::state::AppState;

/// WMS query parameters. Keys are accepted upper- or lower-case.
#[derive(Debug, Default, Deserialize)]
pub struct WmsParams {
    #[serde(rename = "REQUEST", alias = "request")]
    pub request: Option<String>,
    #[serde(rename = "LAYERS", alias = "layers")]
    pub layers: Option<String>,
    #[serde(rename = "STYLES", alias = "styles")]
    pub styles: Option<String>,
    #[serde(rename = "PALETTE", alias = "palette")]
    pub palette: Option<String>,
    #[serde(rename = "CRS", alias = "SRS", alias = "crs", alias = "srs")]
    pub crs: Option<String>,
    #[serde(rename = "BBOX", alias = "bbox")]
    pub bbox: Option<String>,
    #[serde(rename = "WIDTH", alias = "width")]
    pub width: Option<String>,
    #[serde(rename = "HEIGHT", alias = "height")]
    pub height: Option<String>,
    #[serde(rename = "TIME", alias = "time")]
    pub time: Option<String>,
    #[serde(rename = "COLORSCALERANGE", alias = "colorscalerange")]
    pub colorscalerange: Option<String>,
    #[serde(rename = "GAMMA", alias = "gamma")]
    pub gamma: Option<String>,
}

/// GET /wms
#[instrument(skip(state))]
pub async fn wms_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<WmsParams>,
) -> Response {
    dispatch(state, String::new(), params).await
}

/// GET /wms/*dataset
#[instrument(skip(state))]
pub async fn wms_dataset_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(dataset): Path<String>,
    Query(params): Query<WmsParams>,
) -> Response {
    dispatch(state, dataset, params).await
}

async fn dispatch(state: Arc<AppState>, dataset: String, params: WmsParams) -> Response {
    record_request("wms");
    let request = params.request.clone().unwrap_or_default();
    debug!(request = %request, dataset = %dataset, "WMS request");

    match request.as_str() {
        r if r.eq_ignore_ascii_case("GetCapabilities") => capabilities_response(state).await,
        r if r.eq_ignore_ascii_case("GetMap") => get_map(state, &dataset, params).await,
        r if r.eq_ignore_ascii_case("GetFeatureInfo") => Json(json!({
            "dataset": dataset,
            "value": null,
            "info": "FeatureInfo not implemented",
        }))
        .into_response(),
        _ => xml_response(
            StatusCode::BAD_REQUEST,
            wms_exception(
                "OperationNotSupported",
                "Invalid REQUEST parameter. Use GetCapabilities, GetMap, or GetFeatureInfo",
            ),
        ),
    }
}

async fn get_map(state: Arc<AppState>, dataset: &str, params: WmsParams) -> Response {
    let request = match map_request(dataset, params) {
        Ok(request) => request,
        Err(e) => return exception_response(&e),
    };
    match render_image(state, request).await {
        Ok(image) => png_response(image),
        Err(e) => exception_response(&e),
    }
}

fn exception_response(err: &WmsError) -> Response {
    xml_response(status_of(err), wms_exception(err.wms_exception_code(), &err.to_string()))
}

/// Translate GetMap parameters into a render request.
fn map_request(dataset: &str, params: WmsParams) -> Result<RenderRequest, WmsError> {
    let (layer, file) = split_dataset(dataset);
    let layer = layer
        .or_else(|| params.layers.filter(|l| !l.trim().is_empty()))
        .ok_or_else(|| WmsError::MissingParameter("LAYERS".to_string()))?;

    let mut request = RenderRequest::new(layer);
    request.file = file;
    request.width = dimension(params.width.as_deref());
    request.height = dimension(params.height.as_deref());
    request.bbox = params
        .bbox
        .filter(|b| !b.trim().is_empty())
        .map(|bbox| geographic_bbox(&bbox, params.crs.as_deref()));
    request.time = params.time.filter(|t| !t.trim().is_empty());
    request.color_range = params.colorscalerange.filter(|c| !c.trim().is_empty());
    request.palette = params
        .styles
        .filter(|s| !s.trim().is_empty())
        .or_else(|| params.palette.filter(|p| !p.trim().is_empty()));
    request.gamma = params.gamma.and_then(|g| g.trim().parse().ok());
    Ok(request)
}

/// Layer and file from a `<layer>/<file>.nc` dataset path. A single
/// component names only the file.
fn split_dataset(dataset: &str) -> (Option<String>, Option<String>) {
    let parts: Vec<&str> = dataset.split('/').filter(|p| !p.is_empty()).collect();
    match parts.as_slice() {
        [] => (None, None),
        [file] => (None, Some((*file).to_string())),
        [.., layer, file] => (Some((*layer).to_string()), Some((*file).to_string())),
    }
}

/// WIDTH/HEIGHT; missing, unparsable or non-positive values use the default.
fn dimension(raw: Option<&str>) -> usize {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .map(|v| v as usize)
        .unwrap_or(DEFAULT_SIZE)
}

/// Bbox in degrees. Web Mercator boxes are converted; anything unparsable
/// is passed through for the renderer to reject.
fn geographic_bbox(bbox: &str, crs: Option<&str>) -> String {
    let Ok(parsed) = BoundingBox::from_wms_string(bbox) else {
        return bbox.to_string();
    };
    let mercator = crs.is_some_and(|c| {
        c.eq_ignore_ascii_case("EPSG:3857") || c.eq_ignore_ascii_case("EPSG:900913")
    });
    if mercator {
        BoundingBox::from_web_mercator(parsed.min_x, parsed.min_y, parsed.max_x, parsed.max_y)
            .to_wms_string()
    } else {
        parsed.to_wms_string()
    }
}
