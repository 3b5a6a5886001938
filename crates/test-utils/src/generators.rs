//! Synthetic fields with values you can predict from the cell position.
//! Grids are row-major with one row per latitude.

/// Evenly spaced coordinate axis: `start, start + step, ...` (`count` values).
///
/// ```
/// use test_utils::axis;
///
/// assert_eq!(axis(90.0, -45.0, 5), vec![90.0, 45.0, 0.0, -45.0, -90.0]);
/// ```
pub fn axis(start: f64, step: f64, count: usize) -> Vec<f64> {
    (0..count).map(|i| start + step * i as f64).collect()
}

/// Field where cell `(row, col)` holds `col * 1000 + row`.
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!((grid[1], grid[10]), (1000.0, 1.0));
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f64> {
    (0..height)
        .flat_map(|row| (0..width).map(move |col| (col * 1000 + row) as f64))
        .collect()
}

/// Field holding its flat index, with NaN at each `(row, col)` given.
/// Positions off the grid are ignored.
pub fn create_grid_with_nans(width: usize, height: usize, nan_positions: &[(usize, usize)]) -> Vec<f64> {
    let mut data: Vec<f64> = (0..width * height).map(|i| i as f64).collect();
    for &(row, col) in nan_positions {
        if row < height && col < width {
            data[row * width + col] = f64::NAN;
        }
    }
    data
}
