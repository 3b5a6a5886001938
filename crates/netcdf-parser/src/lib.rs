//! NetCDF reader for gridded lat/lon weather datasets.
//!
//! Datasets hold one or more numeric variables laid out as `(lat, lon)` or
//! `(time, lat, lon)` over 1-D coordinate variables named `latitude`/`lat`,
//! `longitude`/`lon` and optionally `time` (CF `units` such as
//! `hours since 2024-01-01 00:00:00`).
//!
//! ```ignore
//! let grid = GridFile::open("temp_2m_2024010100.nc")?;
//! let var = grid.first_data_variable()?;
//! let slice = grid.read_slice(&var, 0)?;
//! ```

pub mod cf_time;
pub mod error;
pub mod grid;

pub use cf_time::{decode_time_axis, decode_times, CfTimeUnits, TimeUnit};
pub use error::{NetCdfError, NetCdfResult};
pub use grid::{DataVariable, GridFile, GridSlice, VariableAxes};
