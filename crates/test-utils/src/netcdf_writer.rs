//! Writes small CF-style NetCDF datasets for integration tests.
//!
//! ```ignore
//! let dir = tempfile::tempdir()?;
//! let spec = DatasetSpec::new("t2m", grid::COARSE_GLOBAL.lats(), grid::COARSE_GLOBAL.lons())
//!     .with_times(&time::FORECAST_HOURS)
//!     .with_field(|_, lat, _| 30.0 - lat.abs() / 3.0);
//! let path = write_grid_dataset(dir.path().join("temp_2m_2024010100.nc"), &spec)?;
//! ```

use std::path::{Path, PathBuf};

use crate::fixtures::time::HOURS_SINCE_REFERENCE;

/// Description of a single-variable lat/lon dataset.
#[derive(Debug, Clone)]
pub struct DatasetSpec {
    pub variable: String,
    pub units: Option<String>,
    pub lat_name: String,
    pub lon_name: String,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    /// Raw time coordinate values; `None` writes a 2-D variable
    pub times: Option<Vec<f64>>,
    /// `units` attribute of the time coordinate
    pub time_units: Option<String>,
    /// Values ordered time, lat, lon
    pub values: Vec<f64>,
    pub fill_value: Option<f64>,
}

impl DatasetSpec {
    /// A 2-D variable over the given axes, filled with zeros.
    pub fn new(variable: &str, lats: Vec<f64>, lons: Vec<f64>) -> Self {
        let values = vec![0.0; lats.len() * lons.len()];
        Self {
            variable: variable.to_string(),
            units: None,
            lat_name: "latitude".to_string(),
            lon_name: "longitude".to_string(),
            lats,
            lons,
            times: None,
            time_units: Some(HOURS_SINCE_REFERENCE.to_string()),
            values,
            fill_value: None,
        }
    }

    /// Add a time axis in hours since the reference time. Existing values
    /// are repeated for every step.
    pub fn with_times(mut self, hours: &[f64]) -> Self {
        let per_step = self.lats.len() * self.lons.len();
        let base: Vec<f64> = self.values.iter().take(per_step).copied().collect();
        self.values = base.iter().copied().cycle().take(per_step * hours.len()).collect();
        self.times = Some(hours.to_vec());
        self
    }

    /// Override the `units` attribute of the time coordinate (`None` omits it).
    pub fn with_time_units(mut self, units: Option<&str>) -> Self {
        self.time_units = units.map(str::to_string);
        self
    }

    /// Fill values from `f(time_index, lat, lon)`.
    pub fn with_field<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, f64, f64) -> f64,
    {
        let steps = self.times.as_ref().map(Vec::len).unwrap_or(1);
        let mut values = Vec::with_capacity(steps * self.lats.len() * self.lons.len());
        for t in 0..steps {
            for lat in &self.lats {
                for lon in &self.lons {
                    values.push(f(t, *lat, *lon));
                }
            }
        }
        self.values = values;
        self
    }

    /// Use explicit values (time, lat, lon order).
    pub fn with_values(mut self, values: Vec<f64>) -> Self {
        self.values = values;
        self
    }

    pub fn with_fill_value(mut self, fill: f64) -> Self {
        self.fill_value = Some(fill);
        self
    }

    pub fn with_units(mut self, units: &str) -> Self {
        self.units = Some(units.to_string());
        self
    }

    /// Use short coordinate names (`lat`/`lon`).
    pub fn with_short_axis_names(mut self) -> Self {
        self.lat_name = "lat".to_string();
        self.lon_name = "lon".to_string();
        self
    }

    /// Rename the coordinate variables to something unrecognizable.
    pub fn with_axis_names(mut self, lat: &str, lon: &str) -> Self {
        self.lat_name = lat.to_string();
        self.lon_name = lon.to_string();
        self
    }
}

/// Write `spec` to `path`, replacing any existing file.
pub fn write_grid_dataset(path: impl AsRef<Path>, spec: &DatasetSpec) -> Result<PathBuf, netcdf::Error> {
    let path = path.as_ref().to_path_buf();
    let mut file = netcdf::create(&path)?;

    if let Some(times) = &spec.times {
        file.add_dimension("time", times.len())?;
    }
    file.add_dimension(&spec.lat_name, spec.lats.len())?;
    file.add_dimension(&spec.lon_name, spec.lons.len())?;

    // Coordinate variables
    if let Some(times) = &spec.times {
        let mut time_var = file.add_variable::<f64>("time", &["time"])?;
        time_var.put_attribute("standard_name", "time")?;
        if let Some(units) = &spec.time_units {
            time_var.put_attribute("units", units.as_str())?;
        }
        time_var.put_values(times, ..)?;
    }
    {
        let mut lat_var = file.add_variable::<f64>(&spec.lat_name, &[spec.lat_name.as_str()])?;
        lat_var.put_attribute("units", "degrees_north")?;
        lat_var.put_values(&spec.lats, ..)?;
    }
    {
        let mut lon_var = file.add_variable::<f64>(&spec.lon_name, &[spec.lon_name.as_str()])?;
        lon_var.put_attribute("units", "degrees_east")?;
        lon_var.put_values(&spec.lons, ..)?;
    }

    // Data variable
    let mut dims: Vec<&str> = Vec::with_capacity(3);
    if spec.times.is_some() {
        dims.push("time");
    }
    dims.push(&spec.lat_name);
    dims.push(&spec.lon_name);

    let mut data_var = file.add_variable::<f64>(&spec.variable, &dims)?;
    if let Some(fill) = spec.fill_value {
        data_var.put_attribute("_FillValue", fill)?;
    }
    if let Some(units) = &spec.units {
        data_var.put_attribute("units", units.as_str())?;
    }
    data_var.put_values(&spec.values, ..)?;

    Ok(path)
}

/// Write bytes that are not a NetCDF file under a `.nc` name.
pub fn write_corrupt_dataset(path: impl AsRef<Path>) -> std::io::Result<PathBuf> {
    let path = path.as_ref().to_path_buf();
    std::fs::write(&path, b"this is not a netcdf file")?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::grid;

    #[test]
    fn test_with_times_repeats_field() {
        let spec = DatasetSpec::new("t", vec![0.0, 1.0], vec![0.0, 1.0, 2.0])
            .with_values(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .with_times(&[0.0, 3.0]);
        assert_eq!(spec.values.len(), 12);
        assert_eq!(spec.values[6], 1.0);
    }

    #[test]
    fn test_write_grid_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let spec = DatasetSpec::new("t2m", grid::SIMPLE_10X10.lats(), grid::SIMPLE_10X10.lons())
            .with_times(&[0.0])
            .with_field(|_, lat, lon| lat + lon);
        let path = write_grid_dataset(dir.path().join("temp_2m_2024010100.nc"), &spec).unwrap();
        assert!(path.exists());

        let file = netcdf::open(&path).unwrap();
        let var = file.variable("t2m").unwrap();
        assert_eq!(var.dimensions().len(), 3);
    }
}
