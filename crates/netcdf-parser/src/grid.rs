//! Reading gridded lat/lon datasets through the netCDF library.

use chrono::{DateTime, Utc};
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cf_time::decode_time_axis;
use crate::error::{NetCdfError, NetCdfResult};

const LATITUDE_NAMES: &[&str] = &["latitude", "lat"];
const LONGITUDE_NAMES: &[&str] = &["longitude", "lon"];
const TIME_NAME: &str = "time";

/// Coordinate variables a data variable is laid out over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableAxes {
    /// Name of the latitude coordinate variable
    pub lat: String,
    /// Name of the longitude coordinate variable
    pub lon: String,
    /// Name of the time coordinate variable, if present in the file
    pub time: Option<String>,
    /// Position of the latitude dimension in the variable's dimensions
    pub lat_dim: usize,
    /// Position of the longitude dimension in the variable's dimensions
    pub lon_dim: usize,
    /// Position of the time dimension, if the variable has one
    pub time_dim: Option<usize>,
}

/// The subject variable of a dataset: the first variable that is not a
/// coordinate variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataVariable {
    pub name: String,
    /// Dimension names and lengths, in declaration order
    pub dims: Vec<(String, usize)>,
    pub axes: VariableAxes,
}

impl DataVariable {
    pub fn nlat(&self) -> usize {
        self.dims[self.axes.lat_dim].1
    }

    pub fn nlon(&self) -> usize {
        self.dims[self.axes.lon_dim].1
    }

    /// Number of time steps along the variable's time dimension (1 if none).
    pub fn ntime(&self) -> usize {
        self.axes.time_dim.map(|i| self.dims[i].1).unwrap_or(1)
    }
}

/// One 2-D lat/lon field, row-major with one row per latitude.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSlice {
    pub values: Vec<f64>,
    pub nlat: usize,
    pub nlon: usize,
}

impl GridSlice {
    pub fn row(&self, lat_index: usize) -> &[f64] {
        let start = lat_index * self.nlon;
        &self.values[start..start + self.nlon]
    }
}

/// An open NetCDF dataset. The underlying handle is closed on drop.
pub struct GridFile {
    file: netcdf::File,
    path: PathBuf,
    name: String,
}

impl GridFile {
    pub fn open(path: impl AsRef<Path>) -> NetCdfResult<Self> {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let file = netcdf::open(&path).map_err(|e| NetCdfError::library(&name, e))?;
        debug!(file = %name, "Opened NetCDF dataset");

        Ok(Self { file, path, name })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without directories.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve the first data variable and its lat/lon/time layout.
    pub fn first_data_variable(&self) -> NetCdfResult<DataVariable> {
        let dim_names: Vec<String> = self.file.dimensions().map(|d| d.name()).collect();

        let var = self
            .file
            .variables()
            .find(|v| !dim_names.contains(&v.name()))
            .ok_or_else(|| NetCdfError::NoDataVariables(self.name.clone()))?;

        let dims: Vec<(String, usize)> = var
            .dimensions()
            .iter()
            .map(|d| (d.name(), d.len()))
            .collect();

        let (lat, lat_dim) = self
            .find_axis(LATITUDE_NAMES, &dims)
            .ok_or_else(|| NetCdfError::AxesNotFound(self.name.clone()))?;
        let (lon, lon_dim) = self
            .find_axis(LONGITUDE_NAMES, &dims)
            .ok_or_else(|| NetCdfError::AxesNotFound(self.name.clone()))?;

        let time = self.file.variable(TIME_NAME).map(|_| TIME_NAME.to_string());
        let time_dim = self
            .find_axis(&[TIME_NAME], &dims)
            .map(|(_, index)| index);

        Ok(DataVariable {
            name: var.name(),
            dims,
            axes: VariableAxes {
                lat,
                lon,
                time,
                lat_dim,
                lon_dim,
                time_dim,
            },
        })
    }

    /// First coordinate variable from `names` that is 1-D and whose
    /// dimension is one of `dims`.
    fn find_axis(&self, names: &[&str], dims: &[(String, usize)]) -> Option<(String, usize)> {
        names.iter().find_map(|name| {
            let var = self.file.variable(name)?;
            let var_dims = var.dimensions();
            if var_dims.len() != 1 {
                return None;
            }
            let dim_name = var_dims[0].name();
            let position = dims.iter().position(|(d, _)| *d == dim_name)?;
            Some((name.to_string(), position))
        })
    }

    /// Values of a 1-D coordinate variable.
    pub fn coordinate(&self, name: &str) -> NetCdfResult<Vec<f64>> {
        let var = self
            .file
            .variable(name)
            .ok_or_else(|| NetCdfError::InvalidFormat(format!("{} has no variable {}", self.name, name)))?;
        var.get_values::<f64, _>(..)
            .map_err(|e| NetCdfError::library(&self.name, e))
    }

    pub fn latitudes(&self, var: &DataVariable) -> NetCdfResult<Vec<f64>> {
        self.coordinate(&var.axes.lat)
    }

    pub fn longitudes(&self, var: &DataVariable) -> NetCdfResult<Vec<f64>> {
        self.coordinate(&var.axes.lon)
    }

    /// Decoded time axis, one entry per time step (`None` where a value
    /// does not decode); empty when the file has no `time` variable.
    pub fn time_axis(&self) -> NetCdfResult<Vec<Option<DateTime<Utc>>>> {
        let Some(var) = self.file.variable(TIME_NAME) else {
            return Ok(Vec::new());
        };
        let raw: Vec<f64> = var
            .get_values(..)
            .map_err(|e| NetCdfError::library(&self.name, e))?;
        let units = get_string_attr(&var, "units");
        Ok(decode_time_axis(&raw, units.as_deref()))
    }

    /// Every decodable timestamp of the time axis.
    pub fn times(&self) -> NetCdfResult<Vec<DateTime<Utc>>> {
        Ok(self.time_axis()?.into_iter().flatten().collect())
    }

    /// Every value of the variable with fill values replaced by NaN and
    /// `scale_factor`/`add_offset` applied.
    pub fn read_all(&self, var: &DataVariable) -> NetCdfResult<Vec<f64>> {
        let nc_var = self.variable(&var.name)?;
        let raw: Vec<f64> = nc_var
            .get_values(..)
            .map_err(|e| NetCdfError::library(&self.name, e))?;
        Ok(unpack(&nc_var, raw))
    }

    /// One lat/lon field at `time_index`. Any other extra dimension is
    /// pinned to its first index.
    pub fn read_slice(&self, var: &DataVariable, time_index: usize) -> NetCdfResult<GridSlice> {
        let nc_var = self.variable(&var.name)?;
        let ntime = var.ntime();
        if time_index >= ntime {
            return Err(NetCdfError::InvalidFormat(format!(
                "time index {} out of range for {} ({} steps)",
                time_index, var.name, ntime
            )));
        }

        let extents: Vec<Range<usize>> = var
            .dims
            .iter()
            .enumerate()
            .map(|(i, (_, len))| {
                if i == var.axes.lat_dim || i == var.axes.lon_dim {
                    0..*len
                } else if Some(i) == var.axes.time_dim {
                    time_index..time_index + 1
                } else {
                    0..1
                }
            })
            .collect();

        let raw: Vec<f64> = nc_var
            .get_values(extents)
            .map_err(|e| NetCdfError::library(&self.name, e))?;
        let mut values = unpack(&nc_var, raw);

        let (nlat, nlon) = (var.nlat(), var.nlon());
        if var.axes.lon_dim < var.axes.lat_dim {
            values = transpose(&values, nlon, nlat);
        }

        Ok(GridSlice {
            values,
            nlat,
            nlon,
        })
    }

    fn variable(&self, name: &str) -> NetCdfResult<netcdf::Variable<'_>> {
        self.file
            .variable(name)
            .ok_or_else(|| NetCdfError::NoDataVariables(self.name.clone()))
    }
}

/// Mask `_FillValue`/`missing_value` and apply packing attributes.
fn unpack(var: &netcdf::Variable, raw: Vec<f64>) -> Vec<f64> {
    let fills = fill_values(var);
    let scale = get_f64_attr(var, "scale_factor").unwrap_or(1.0);
    let offset = get_f64_attr(var, "add_offset").unwrap_or(0.0);

    raw.into_iter()
        .map(|v| {
            if fills.iter().any(|f| *f == v) {
                f64::NAN
            } else {
                v * scale + offset
            }
        })
        .collect()
}

/// Values flagged as missing by `_FillValue` or `missing_value`.
fn fill_values(var: &netcdf::Variable) -> Vec<f64> {
    let mut fills = Vec::new();
    for name in ["_FillValue", "missing_value"] {
        if !has_attr(var, name) {
            continue;
        }
        match var.attribute_value(name) {
            Some(Ok(netcdf::AttributeValue::Doubles(values))) => fills.extend(values),
            Some(Ok(netcdf::AttributeValue::Floats(values))) => {
                fills.extend(values.into_iter().map(f64::from))
            }
            Some(Ok(value)) => {
                if let Ok(v) = f64::try_from(value) {
                    fills.push(v);
                }
            }
            _ => {}
        }
    }
    fills
}

fn transpose(values: &[f64], rows: usize, cols: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    for r in 0..rows {
        for c in 0..cols {
            out[c * rows + r] = values[r * cols + c];
        }
    }
    out
}

// =============================================================================
// Attribute helpers
// =============================================================================

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

fn get_string_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    String::try_from(attr_value).ok()
}
