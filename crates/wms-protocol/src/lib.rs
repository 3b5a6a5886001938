//! OGC WMS 1.3.0 documents for published weather layers.
//!
//! Supports:
//! - GetCapabilities built from layer histories
//! - ServiceExceptionReport and "no data" error documents

pub mod capabilities;
pub mod exceptions;

pub use capabilities::{build_capabilities, CapabilitiesError, WmsCapabilitiesBuilder};
pub use exceptions::{error_document, no_data_document, wms_exception, XML_CONTENT_TYPE};
