//! Reorienting a lat/lon slice and cutting out a bounding box.

use std::cmp::Ordering;
use tracing::warn;

use netcdf_parser::GridSlice;
use wms_common::BoundingBox;

/// A rectangular piece of a grid with ascending latitude rows and
/// ascending longitude columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Subset {
    pub values: Vec<f64>,
    pub width: usize,
    pub height: usize,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
}

impl Subset {
    /// Orient `slice` so both axes ascend, then cut out `bbox`
    /// ("minx,miny,maxx,maxy" in degrees).
    ///
    /// A malformed box is logged and the full extent is used.
    pub fn extract(slice: GridSlice, lats: &[f64], lons: &[f64], bbox: Option<&str>) -> Self {
        let GridSlice {
            mut values,
            nlat,
            nlon,
        } = slice;
        let mut lats = lats.to_vec();
        let mut lons = normalize_longitudes(lons);

        if !is_ascending(&lons) {
            let order = argsort(&lons);
            lons = order.iter().map(|&i| lons[i]).collect();
            values = reorder_columns(&values, nlon, &order);
        }

        if lats.len() > 1 && lats[0] > lats[lats.len() - 1] {
            lats.reverse();
            values = reverse_rows(&values, nlon);
        }

        let grid = Self {
            values,
            width: nlon,
            height: nlat,
            lats,
            lons,
        };

        match bbox.map(BoundingBox::from_wms_string) {
            None => grid,
            Some(Ok(bbox)) => grid.crop(&bbox),
            Some(Err(e)) => {
                warn!(bbox = ?bbox, error = %e, "Malformed bbox, using full extent");
                grid
            }
        }
    }

    /// Keep the rows and columns inside `bbox` after clamping it to the
    /// data extent. A box past the data on one side keeps the nearest edge
    /// cell; a box with min above max on the request side is empty.
    pub fn crop(self, bbox: &BoundingBox) -> Self {
        let ranges = self.extent().and_then(|extent| {
            let clamped = bbox.clamp_to(&extent);
            Some((
                index_range(&self.lons, clamped.min_x, clamped.max_x)?,
                index_range(&self.lats, clamped.min_y, clamped.max_y)?,
            ))
        });
        let Some((cols, rows)) = ranges else {
            return Self {
                values: Vec::new(),
                width: 0,
                height: 0,
                lats: Vec::new(),
                lons: Vec::new(),
            };
        };

        let width = cols.1 - cols.0 + 1;
        let height = rows.1 - rows.0 + 1;
        let mut values = Vec::with_capacity(width * height);
        for row in rows.0..=rows.1 {
            let start = row * self.width;
            values.extend_from_slice(&self.values[start + cols.0..=start + cols.1]);
        }

        Self {
            values,
            width,
            height,
            lats: self.lats[rows.0..=rows.1].to_vec(),
            lons: self.lons[cols.0..=cols.1].to_vec(),
        }
    }

    /// Data extent in degrees; `None` for an empty grid.
    fn extent(&self) -> Option<BoundingBox> {
        Some(BoundingBox::new(
            *self.lons.first()?,
            *self.lats.first()?,
            *self.lons.last()?,
            *self.lats.last()?,
        ))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Map longitudes into [-180, 180) when any exceeds 180.
pub fn normalize_longitudes(lons: &[f64]) -> Vec<f64> {
    if lons.iter().any(|&lon| lon > 180.0) {
        lons.iter()
            .map(|&lon| (lon + 180.0).rem_euclid(360.0) - 180.0)
            .collect()
    } else {
        lons.to_vec()
    }
}

/// Inclusive index range of an ascending `axis` covering [min, max].
/// `None` when the range is inverted or the axis is empty.
fn index_range(axis: &[f64], min: f64, max: f64) -> Option<(usize, usize)> {
    let last_index = axis.len().checked_sub(1)?;
    let lo = axis.partition_point(|&v| v < min).min(last_index);
    let hi = axis
        .partition_point(|&v| v <= max)
        .saturating_sub(1)
        .min(last_index);

    (lo <= hi).then_some((lo, hi))
}

fn is_ascending(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

fn argsort(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].partial_cmp(&values[b]).unwrap_or(Ordering::Equal));
    order
}

fn reorder_columns(values: &[f64], width: usize, order: &[usize]) -> Vec<f64> {
    if width == 0 {
        return Vec::new();
    }
    values
        .chunks_exact(width)
        .flat_map(|row| order.iter().map(move |&i| row[i]))
        .collect()
}

fn reverse_rows(values: &[f64], width: usize) -> Vec<f64> {
    if width == 0 {
        return Vec::new();
    }
    values.chunks_exact(width).rev().flatten().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixtures::{bbox, grid::COARSE_GLOBAL};

    fn slice_from(lats: &[f64], lons: &[f64], f: impl Fn(f64, f64) -> f64) -> GridSlice {
        let values = lats
            .iter()
            .flat_map(|&lat| lons.iter().map(move |&lon| (lat, lon)))
            .map(|(lat, lon)| f(lat, lon))
            .collect();
        GridSlice {
            values,
            nlat: lats.len(),
            nlon: lons.len(),
        }
    }

    #[test]
    fn test_normalize_longitudes_is_idempotent() {
        let lons: Vec<f64> = (0..360).map(|i| i as f64).collect();
        let once = normalize_longitudes(&lons);
        assert_eq!(once[180], -180.0);
        assert_eq!(once[359], -1.0);
        assert_eq!(normalize_longitudes(&once), once);
    }

    #[test]
    fn test_extract_orients_axes() {
        let lats = [10.0, 0.0, -10.0];
        let lons = [0.0, 90.0, 270.0];
        let slice = slice_from(&lats, &lons, |lat, lon| lat * 1000.0 + lon);

        let subset = Subset::extract(slice, &lats, &lons, None);
        assert_eq!(subset.lats, vec![-10.0, 0.0, 10.0]);
        assert_eq!(subset.lons, vec![-90.0, 0.0, 90.0]);
        assert_eq!(subset.values[0], -10.0 * 1000.0 + 270.0);
        assert_eq!(subset.values[8], 10.0 * 1000.0 + 90.0);
    }

    #[test]
    fn test_bbox_over_global_grid() {
        let (lats, lons) = (COARSE_GLOBAL.lats(), COARSE_GLOBAL.lons());
        let slice = slice_from(&lats, &lons, |lat, _| lat);

        let subset = Subset::extract(slice, &lats, &lons, Some(bbox::PRIME_MERIDIAN));
        assert_eq!((subset.width, subset.height), (21, 21));
        assert_eq!(subset.lons.first(), Some(&-10.0));
        assert_eq!(subset.lons.last(), Some(&10.0));
        assert_eq!(subset.lats.first(), Some(&30.0));
        assert_eq!(subset.values[0], 30.0);
        assert_eq!(subset.values[subset.values.len() - 1], 50.0);
    }

    #[test]
    fn test_malformed_bbox_uses_full_extent() {
        let lats = [0.0, 1.0];
        let lons = [0.0, 1.0, 2.0];
        let slice = slice_from(&lats, &lons, |_, lon| lon);

        let subset = Subset::extract(slice, &lats, &lons, Some(bbox::MALFORMED));
        assert_eq!((subset.width, subset.height), (3, 2));
    }

    #[test]
    fn test_inverted_bbox_is_empty() {
        let lats = [0.0, 1.0, 2.0];
        let lons = [0.0, 1.0, 2.0];
        let slice = slice_from(&lats, &lons, |_, _| 1.0);

        let subset = Subset::extract(slice, &lats, &lons, Some("2,0,0,2"));
        assert!(subset.is_empty());
        assert_eq!((subset.width, subset.height), (0, 0));
    }

    #[test]
    fn test_bbox_outside_data_clamps_to_corner() {
        let lats = [0.0, 1.0, 2.0];
        let lons = [0.0, 1.0, 2.0];
        let slice = slice_from(&lats, &lons, |lat, lon| lat * 10.0 + lon);

        let subset = Subset::extract(slice, &lats, &lons, Some(bbox::OFF_GRID));
        assert_eq!(subset.lons, vec![2.0]);
        assert_eq!(subset.lats, vec![2.0]);
        assert_eq!(subset.values, vec![22.0]);
    }
}
