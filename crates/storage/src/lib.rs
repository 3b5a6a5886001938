//! Storage for published layer metadata.
//!
//! Histories and the registry index live as JSON files in a single
//! metadata directory:
//! - `<parameter>.json`: one [`LayerHistory`](wms_common::LayerHistory) per parameter
//! - `index.json`: the [`RegistryIndex`](wms_common::RegistryIndex)

pub mod metadata_store;

pub use metadata_store::{validate_parameter, MetadataStore, INDEX_FILE};
