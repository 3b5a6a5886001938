//! Reading fixture datasets written through the netCDF library.

use chrono::{TimeZone, Utc};
use netcdf_parser::{GridFile, NetCdfError};
use test_utils::{assert_approx_eq, grid, time, write_corrupt_dataset, write_grid_dataset, DatasetSpec};

fn temperature_spec() -> DatasetSpec {
    DatasetSpec::new("t2m", grid::COARSE_GLOBAL.lats(), grid::COARSE_GLOBAL.lons())
        .with_times(&time::FORECAST_HOURS)
        .with_field(|t, lat, lon| t as f64 * 100.0 + lat + lon / 1000.0)
        .with_units("C")
}

#[test]
fn test_first_data_variable_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_grid_dataset(dir.path().join("temp_2m_2024010100.nc"), &temperature_spec()).unwrap();

    let grid_file = GridFile::open(&path).unwrap();
    assert_eq!(grid_file.name(), "temp_2m_2024010100.nc");

    let var = grid_file.first_data_variable().unwrap();
    assert_eq!(var.name, "t2m");
    assert_eq!(var.axes.lat, "latitude");
    assert_eq!(var.axes.lon, "longitude");
    assert_eq!(var.axes.time.as_deref(), Some("time"));
    assert_eq!(var.axes.time_dim, Some(0));
    assert_eq!((var.ntime(), var.nlat(), var.nlon()), (3, 181, 360));
}

#[test]
fn test_times_decoded_from_cf_units() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_grid_dataset(dir.path().join("temp_2m_2024010100.nc"), &temperature_spec()).unwrap();

    let times = GridFile::open(&path).unwrap().times().unwrap();
    assert_eq!(
        times,
        vec![
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 3, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap(),
        ]
    );
}

#[test]
fn test_times_without_units_are_epoch_seconds() {
    let dir = tempfile::tempdir().unwrap();
    let spec = DatasetSpec::new("t2m", vec![0.0, 1.0], vec![0.0, 1.0])
        .with_times(&[0.0, 3600.0])
        .with_time_units(None);
    let path = write_grid_dataset(dir.path().join("temp_2m_1970010100.nc"), &spec).unwrap();

    let times = GridFile::open(&path).unwrap().times().unwrap();
    assert_eq!(
        times,
        vec![
            Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(1970, 1, 1, 1, 0, 0).unwrap(),
        ]
    );
}

#[test]
fn test_times_in_days() {
    let dir = tempfile::tempdir().unwrap();
    let spec = DatasetSpec::new("t2m", vec![0.0, 1.0], vec![0.0, 1.0])
        .with_times(&[0.0, 1.5])
        .with_time_units(Some("days since 2024-01-01"));
    let path = write_grid_dataset(dir.path().join("temp_2m_2024010100.nc"), &spec).unwrap();

    let times = GridFile::open(&path).unwrap().times().unwrap();
    assert_eq!(times[1], Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap());
}

#[test]
fn test_time_axis_keeps_undecodable_steps() {
    let dir = tempfile::tempdir().unwrap();
    let spec = DatasetSpec::new("t2m", vec![0.0, 1.0], vec![0.0, 1.0])
        .with_times(&[0.0, f64::NAN, 6.0])
        .with_time_units(Some("hours since 2024-01-01 00:00:00"));
    let path = write_grid_dataset(dir.path().join("temp_2m_2024010100.nc"), &spec).unwrap();

    let grid_file = GridFile::open(&path).unwrap();
    let axis = grid_file.time_axis().unwrap();
    assert_eq!(axis.len(), 3);
    assert_eq!(axis[1], None);
    assert_eq!(axis[2], Some(Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap()));
    assert_eq!(grid_file.times().unwrap().len(), 2);
}

#[test]
fn test_read_slice_selects_time_step() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_grid_dataset(dir.path().join("temp_2m_2024010100.nc"), &temperature_spec()).unwrap();

    let grid_file = GridFile::open(&path).unwrap();
    let var = grid_file.first_data_variable().unwrap();
    let slice = grid_file.read_slice(&var, 2).unwrap();

    assert_eq!(slice.values.len(), 181 * 360);
    // Row 0 is latitude 90, column 1 is longitude 1
    assert_approx_eq!(slice.row(0)[1], 200.0 + 90.0 + 0.001, 1e-9);
    assert!(grid_file.read_slice(&var, 3).is_err());
}

#[test]
fn test_fill_values_become_nan() {
    let dir = tempfile::tempdir().unwrap();
    let spec = DatasetSpec::new("mslp", vec![10.0, 20.0], vec![0.0, 1.0])
        .with_values(vec![1000.0, -9999.0, 1012.0, 1013.0])
        .with_fill_value(-9999.0);
    let path = write_grid_dataset(dir.path().join("mslp_2024010100.nc"), &spec).unwrap();

    let grid_file = GridFile::open(&path).unwrap();
    let var = grid_file.first_data_variable().unwrap();
    assert_eq!(var.axes.time_dim, None);

    let values = grid_file.read_all(&var).unwrap();
    assert_eq!(values[0], 1000.0);
    assert!(values[1].is_nan());
    assert!(grid_file.times().unwrap().is_empty());
}

#[test]
fn test_short_axis_names() {
    let dir = tempfile::tempdir().unwrap();
    let spec = DatasetSpec::new("rh", vec![0.0, 1.0], vec![0.0, 1.0]).with_short_axis_names();
    let path = write_grid_dataset(dir.path().join("rh_2m_2024010100.nc"), &spec).unwrap();

    let var = GridFile::open(&path).unwrap().first_data_variable().unwrap();
    assert_eq!(var.axes.lat, "lat");
    assert_eq!(var.axes.lon, "lon");
}

#[test]
fn test_unrecognized_axes() {
    let dir = tempfile::tempdir().unwrap();
    let spec = DatasetSpec::new("field", vec![0.0, 1.0], vec![0.0, 1.0]).with_axis_names("y", "x");
    let path = write_grid_dataset(dir.path().join("field_2024010100.nc"), &spec).unwrap();

    let result = GridFile::open(&path).unwrap().first_data_variable();
    assert!(matches!(result, Err(NetCdfError::AxesNotFound(_))));
}

#[test]
fn test_corrupt_file_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_corrupt_dataset(dir.path().join("temp_2m_2024010100.nc")).unwrap();
    assert!(matches!(GridFile::open(&path), Err(NetCdfError::Library { .. })));
}
