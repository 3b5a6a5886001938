//! HTTP request handlers.
//!
//! - `api`: health, metadata queries, file listing, capabilities, rendering
//! - `wms`: WMS GetCapabilities, GetMap, GetFeatureInfo facade
//! - `metrics`: Prometheus exposition
//! - `common`: error bodies and shared helpers

pub mod api;
pub mod common;
pub mod metrics;
pub mod wms;

pub use api::{
    capabilities_handler, files_handler, health_handler, layer_bounds_handler,
    layer_colorscale_handler, layer_times_handler, layers_handler, metadata_index_handler,
    metadata_parameter_handler, render_handler,
};
pub use metrics::metrics_handler;
pub use wms::{wms_dataset_handler, wms_handler};
