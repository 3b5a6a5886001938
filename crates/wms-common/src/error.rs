//! Error types for weather-wms services.

use thiserror::Error;

/// Result type alias using WmsError.
pub type WmsResult<T> = Result<T, WmsError>;

/// Primary error type for metadata queries and rendering.
#[derive(Debug, Error)]
pub enum WmsError {
    // === Request Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Lookup Errors ===
    #[error("Layer not found: {0}")]
    LayerNotFound(String),

    #[error("Parameter not found: {0}")]
    ParameterNotFound(String),

    #[error("No datasets available for layer: {0}")]
    NoDatasets(String),

    #[error("No metadata available")]
    MetadataNotFound,

    // === Data Errors ===
    #[error("Could not determine latitude/longitude coordinates in {file}")]
    AxesNotFound { file: String },

    #[error("No data variables in dataset {file}")]
    NoDataVariables { file: String },

    #[error("Failed to read dataset {file}: {message}")]
    DatasetRead { file: String, message: String },

    // === Storage Errors ===
    #[error("Storage error: {0}")]
    StorageError(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    RenderError(String),

    // === Infrastructure Errors ===
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl WmsError {
    /// Stable machine-readable category for error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            WmsError::MissingParameter(_) | WmsError::InvalidParameter { .. } => "MalformedInput",
            WmsError::LayerNotFound(_)
            | WmsError::ParameterNotFound(_)
            | WmsError::NoDatasets(_)
            | WmsError::MetadataNotFound => "NotFound",
            WmsError::AxesNotFound { .. }
            | WmsError::NoDataVariables { .. }
            | WmsError::DatasetRead { .. } => "DataIntegrityError",
            WmsError::RenderError(_) => "RenderFailed",
            WmsError::StorageError(_) | WmsError::InternalError(_) => "InternalError",
        }
    }

    /// Get the OGC WMS exception code for this error.
    pub fn wms_exception_code(&self) -> &'static str {
        match self {
            WmsError::MissingParameter(_) => "MissingParameterValue",
            WmsError::InvalidParameter { .. } => "InvalidParameterValue",
            WmsError::LayerNotFound(_) | WmsError::ParameterNotFound(_) => "LayerNotDefined",
            WmsError::NoDatasets(_) => "MissingDimensionValue",
            _ => "NoApplicableCode",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            WmsError::MissingParameter(_) | WmsError::InvalidParameter { .. } => 400,

            WmsError::LayerNotFound(_)
            | WmsError::ParameterNotFound(_)
            | WmsError::NoDatasets(_)
            | WmsError::MetadataNotFound => 404,

            _ => 500,
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for WmsError {
    fn from(err: std::io::Error) -> Self {
        WmsError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for WmsError {
    fn from(err: serde_json::Error) -> Self {
        WmsError::StorageError(format!("JSON error: {}", err))
    }
}
