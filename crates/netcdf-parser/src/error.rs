//! Error types for NetCDF parsing operations.

use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reported by the netCDF library
    #[error("NetCDF error in {file}: {message}")]
    Library { file: String, message: String },

    /// No variable other than coordinate variables
    #[error("No data variables in {0}")]
    NoDataVariables(String),

    /// Missing or unusable latitude/longitude coordinates
    #[error("Could not determine latitude/longitude coordinates in {0}")]
    AxesNotFound(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),
}

impl NetCdfError {
    pub(crate) fn library(file: &str, err: netcdf::Error) -> Self {
        NetCdfError::Library {
            file: file.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<NetCdfError> for wms_common::WmsError {
    fn from(err: NetCdfError) -> Self {
        use wms_common::WmsError;
        match err {
            NetCdfError::NoDataVariables(file) => WmsError::NoDataVariables { file },
            NetCdfError::AxesNotFound(file) => WmsError::AxesNotFound { file },
            NetCdfError::Library { file, message } => WmsError::DatasetRead { file, message },
            NetCdfError::IoError(e) => WmsError::DatasetRead {
                file: String::new(),
                message: e.to_string(),
            },
            NetCdfError::InvalidFormat(message) => WmsError::DatasetRead {
                file: String::new(),
                message,
            },
        }
    }
}
