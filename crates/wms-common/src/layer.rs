//! Layer metadata records, per-parameter histories and the registry index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::time::iso8601;
use crate::{ColorScale, ColorScaleRegistry};

/// Geographic extent of a dataset in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    /// Global min/max of the coordinate axes. Non-finite values are ignored,
    /// so the result is well-ordered whatever the axis direction.
    pub fn from_axes(lats: &[f64], lons: &[f64]) -> Option<Self> {
        let (south, north) = finite_range(lats)?;
        let (west, east) = finite_range(lons)?;
        Some(Self {
            north,
            south,
            east,
            west,
        })
    }
}

fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Summary statistics of a data variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl Statistics {
    /// Min/max/mean over the finite values; `None` if there are none.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut count = 0usize;

        for v in values.into_iter().filter(|v| v.is_finite()) {
            min = min.min(v);
            max = max.max(v);
            sum += v;
            count += 1;
        }

        if count == 0 {
            return None;
        }

        Some(Self {
            min,
            max,
            mean: sum / count as f64,
        })
    }

    /// Placeholder used when a variable holds no valid values.
    pub fn zeroed() -> Self {
        Self {
            min: 0.0,
            max: 0.0,
            mean: 0.0,
        }
    }
}

/// Sizes of the time, latitude and longitude axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDimensions {
    pub time: usize,
    pub lat: usize,
    pub lon: usize,
}

/// Metadata extracted from one dataset file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    pub parameter: String,
    pub name: String,
    pub units: String,
    pub file: String,
    pub variable: String,
    #[serde(with = "iso8601::list")]
    pub times: Vec<DateTime<Utc>>,
    pub bounds: Bounds,
    pub statistics: Statistics,
    pub color_scale: ColorScale,
    pub dimensions: GridDimensions,
    #[serde(with = "iso8601")]
    pub created: DateTime<Utc>,
}

/// All records of one parameter, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerHistory {
    pub parameter: String,
    pub datasets: Vec<MetadataRecord>,
    pub count: usize,
    #[serde(with = "iso8601")]
    pub updated: DateTime<Utc>,
}

impl LayerHistory {
    /// Build a history, ordering records by `created` descending.
    /// Records created at the same instant keep their input order.
    pub fn new(parameter: impl Into<String>, mut datasets: Vec<MetadataRecord>) -> Self {
        datasets.sort_by(|a, b| b.created.cmp(&a.created));
        Self {
            parameter: parameter.into(),
            count: datasets.len(),
            datasets,
            updated: Utc::now(),
        }
    }

    pub fn latest(&self) -> Option<&MetadataRecord> {
        self.datasets.first()
    }

    /// Deduplicated union of every record's times, ascending.
    pub fn all_times(&self) -> Vec<DateTime<Utc>> {
        self.datasets
            .iter()
            .flat_map(|r| r.times.iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }
}

/// Master index of all published parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryIndex {
    pub parameters: Vec<String>,
    pub count: usize,
    #[serde(with = "iso8601")]
    pub updated: DateTime<Utc>,
    /// Snapshot of the color scale registry used for extraction
    pub color_scales: ColorScaleRegistry,
}

impl RegistryIndex {
    /// Index over the given histories with a snapshot of `color_scales`.
    pub fn from_histories<'a, I>(histories: I, color_scales: &ColorScaleRegistry) -> Self
    where
        I: IntoIterator<Item = &'a LayerHistory>,
    {
        let mut parameters: Vec<String> = histories
            .into_iter()
            .map(|history| history.parameter.clone())
            .collect();
        parameters.sort();

        Self {
            count: parameters.len(),
            parameters,
            updated: Utc::now(),
            color_scales: color_scales.clone(),
        }
    }
}

/// Condensed view of a layer's latest dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSummary {
    pub name: String,
    pub title: String,
    pub units: String,
    pub bounds: Bounds,
    #[serde(with = "iso8601::list")]
    pub times: Vec<DateTime<Utc>>,
    pub color_scale: ColorScale,
}

impl From<&MetadataRecord> for LayerSummary {
    fn from(record: &MetadataRecord) -> Self {
        Self {
            name: record.parameter.clone(),
            title: record.name.clone(),
            units: record.units.clone(),
            bounds: record.bounds,
            times: record.times.clone(),
            color_scale: record.color_scale.clone(),
        }
    }
}
