//! Helpers shared by the workspace's test suites.
//!
//! - [`fixtures`]: grid shapes, request boxes, layer names and reference times
//! - [`generators`]: synthetic row-major fields with known values
//! - [`netcdf_writer`]: real CF-style `.nc` files for scratch directories
//!
//! ```ignore
//! use test_utils::{grid, write_grid_dataset, DatasetSpec};
//!
//! let spec = DatasetSpec::new("t2m", grid::SIMPLE_10X10.lats(), grid::SIMPLE_10X10.lons());
//! write_grid_dataset(dir.path().join("temp_2m_2024010100.nc"), &spec)?;
//! ```

pub mod fixtures;
pub mod generators;
pub mod netcdf_writer;

pub use fixtures::*;
pub use generators::*;
pub use netcdf_writer::*;

/// Assert two numbers are within `epsilon` of each other.
///
/// ```ignore
/// assert_approx_eq!(stats.mean, 15.0, 1e-9);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right, epsilon) = ($left as f64, $right as f64, $epsilon as f64);
        if (left - right).abs() > epsilon {
            panic!(
                "values differ by more than {}: left {:?}, right {:?}",
                epsilon, left, right
            );
        }
    }};
}

/// Assert every pixel of an RGBA buffer has the given alpha.
#[macro_export]
macro_rules! assert_alpha_all {
    ($rgba:expr, $alpha:expr) => {{
        let rgba: &[u8] = &$rgba;
        assert_eq!(rgba.len() % 4, 0, "buffer is not RGBA");
        if let Some(pos) = rgba.chunks_exact(4).position(|px| px[3] != $alpha) {
            panic!(
                "pixel {} has alpha {}, expected {}",
                pos,
                rgba[pos * 4 + 3],
                $alpha
            );
        }
    }};
}
