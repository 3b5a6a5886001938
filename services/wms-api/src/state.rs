//! Application state and shared resources.

use std::path::PathBuf;

use storage::MetadataStore;
use wms_protocol::WmsCapabilitiesBuilder;

use crate::config::Args;

/// Shared application state.
pub struct AppState {
    /// Directory holding dataset files
    pub data_dir: PathBuf,
    pub store: MetadataStore,
    pub capabilities: WmsCapabilitiesBuilder,
}

impl AppState {
    pub fn new(data_dir: impl Into<PathBuf>, metadata_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            store: MetadataStore::new(metadata_dir),
            capabilities: WmsCapabilitiesBuilder::default(),
        }
    }

    pub fn from_args(args: &Args) -> Self {
        let mut state = Self::new(&args.data_dir, args.metadata_dir());
        state.capabilities = state.capabilities.with_service_url(&args.public_url);
        state
    }
}
