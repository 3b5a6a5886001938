//! Shared types for the weather layer services.
//!
//! Holds the bounding box and time helpers used at the request edge, the
//! error taxonomy, metadata record types and the color scale registry.

pub mod bbox;
pub mod error;
pub mod layer;
pub mod style;
pub mod time;

pub use bbox::{BboxParseError, BoundingBox};
pub use error::{WmsError, WmsResult};
pub use layer::{
    Bounds, GridDimensions, LayerHistory, LayerSummary, MetadataRecord, RegistryIndex, Statistics,
};
pub use style::{parse_hex_color, ColorScale, ColorScaleRegistry, ColorStop, StyleError};
pub use time::{format_iso8601, parse_iso8601, time_extent, TimeParseError, RUN_CADENCE};
