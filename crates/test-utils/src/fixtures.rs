//! Common test fixtures for weather-wms tests.
//!
//! This module provides pre-defined test data that represents common
//! scenarios in weather data processing.

/// Common bounding box definitions for testing, as "minx,miny,maxx,maxy".
pub mod bbox {
    /// Straddles the prime meridian, so 0..360 longitude grids need
    /// normalization to serve it.
    pub const PRIME_MERIDIAN: &str = "-10,30,10,50";

    /// Entirely outside any lat/lon grid
    pub const OFF_GRID: &str = "500,500,600,600";

    /// Not a bounding box at all
    pub const MALFORMED: &str = "not,a,bbox";
}

/// Common grid specifications for testing.
pub mod grid {
    use crate::generators::axis;

    /// GFS global grid (0.25 degree resolution), latitudes north to south.
    pub const GFS_GLOBAL: GridSpec = GridSpec {
        lat_start: 90.0,
        lat_step: -0.25,
        nlat: 721,
        lon_start: 0.0,
        lon_step: 0.25,
        nlon: 1440,
    };

    /// 1 degree global grid, same orientation as GFS but cheap to render.
    pub const COARSE_GLOBAL: GridSpec = GridSpec {
        lat_start: 90.0,
        lat_step: -1.0,
        nlat: 181,
        lon_start: 0.0,
        lon_step: 1.0,
        nlon: 360,
    };

    /// Simple 10x10 test grid, ascending axes over [-10, 8]
    pub const SIMPLE_10X10: GridSpec = GridSpec {
        lat_start: -10.0,
        lat_step: 2.0,
        nlat: 10,
        lon_start: -10.0,
        lon_step: 2.0,
        nlon: 10,
    };

    /// Regular lat/lon grid specification.
    #[derive(Debug, Clone, Copy)]
    pub struct GridSpec {
        pub lat_start: f64,
        pub lat_step: f64,
        pub nlat: usize,
        pub lon_start: f64,
        pub lon_step: f64,
        pub nlon: usize,
    }

    impl GridSpec {
        /// Returns the total number of grid cells.
        pub fn size(&self) -> usize {
            self.nlat * self.nlon
        }

        pub fn lats(&self) -> Vec<f64> {
            axis(self.lat_start, self.lat_step, self.nlat)
        }

        pub fn lons(&self) -> Vec<f64> {
            axis(self.lon_start, self.lon_step, self.nlon)
        }
    }
}

/// Common time values for testing.
pub mod time {
    /// Run time of the fixture datasets
    pub const REFERENCE_TIME: &str = "2024-01-01T00:00:00Z";

    /// CF units of fixture time axes
    pub const HOURS_SINCE_REFERENCE: &str = "hours since 2024-01-01 00:00:00";

    /// Forecast offsets at the 3-hour cadence
    pub const FORECAST_HOURS: [f64; 3] = [0.0, 3.0, 6.0];
}

/// Common layer identifiers for testing.
pub mod layers {
    /// Temperature at 2m above ground
    pub const TEMP_2M: &str = "temp_2m";

    /// Wind speed at 10m above ground
    pub const WIND_SPEED_10M: &str = "wind_speed_10m";

    /// Mean sea level pressure
    pub const MSLP: &str = "mslp";

    /// A parameter with no built-in color scale
    pub const UNKNOWN: &str = "cape";
}
