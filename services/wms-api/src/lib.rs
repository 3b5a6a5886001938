//! Weather layer API service library.
//!
//! Serves layer metadata published by the ingester, renders PNG tiles from
//! dataset files and answers WMS requests.

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod rendering;
pub mod state;

use axum::{extract::Extension, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Build the HTTP router.
pub fn app(state: Arc<AppState>, prometheus: PrometheusHandle) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/metadata", get(handlers::metadata_index_handler))
        .route("/api/metadata/:parameter", get(handlers::metadata_parameter_handler))
        .route("/api/layers", get(handlers::layers_handler))
        .route("/api/layer/:layer/times", get(handlers::layer_times_handler))
        .route("/api/layer/:layer/bounds", get(handlers::layer_bounds_handler))
        .route("/api/layer/:layer/colorscale", get(handlers::layer_colorscale_handler))
        .route("/api/files", get(handlers::files_handler))
        .route("/api/capabilities", get(handlers::capabilities_handler))
        .route("/api/render", get(handlers::render_handler))
        .route("/wms", get(handlers::wms_handler))
        .route("/wms/*dataset", get(handlers::wms_dataset_handler))
        .layer(Extension(state))
        .layer(Extension(prometheus))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
