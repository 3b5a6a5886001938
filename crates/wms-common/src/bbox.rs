//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// Spherical Web Mercator earth radius (EPSG:3857), in meters.
const MERCATOR_RADIUS: f64 = 6378137.0;

/// A geographic bounding box.
///
/// Coordinates are in degrees: x is longitude, y is latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse a BBOX parameter string: "minx,miny,maxx,maxy"
    pub fn from_wms_string(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let parse = |p: &str| -> Result<f64, BboxParseError> {
            let value: f64 = p
                .parse()
                .map_err(|_| BboxParseError::InvalidNumber(p.to_string()))?;
            if value.is_finite() {
                Ok(value)
            } else {
                Err(BboxParseError::InvalidNumber(p.to_string()))
            }
        };

        Ok(Self {
            min_x: parse(parts[0])?,
            min_y: parse(parts[1])?,
            max_x: parse(parts[2])?,
            max_y: parse(parts[3])?,
        })
    }

    /// Convert a Web Mercator (EPSG:3857) box in meters to degrees.
    pub fn from_web_mercator(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        let (west, south) = mercator_to_wgs84(min_x, min_y);
        let (east, north) = mercator_to_wgs84(max_x, max_y);
        Self::new(west, south, east, north)
    }

    /// Clamp each edge to the given extent. A request that lies entirely
    /// outside `extent` comes back inverted (min > max).
    pub fn clamp_to(&self, extent: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.max(extent.min_x),
            min_y: self.min_y.max(extent.min_y),
            max_x: self.max_x.min(extent.max_x),
            max_y: self.max_y.min(extent.max_y),
        }
    }

    /// Format as the comma separated "minx,miny,maxx,maxy" form.
    pub fn to_wms_string(&self) -> String {
        format!("{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

/// Convert Web Mercator (EPSG:3857) meters to WGS84 degrees.
pub fn mercator_to_wgs84(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / MERCATOR_RADIUS).to_degrees();
    let lat = (2.0 * (y / MERCATOR_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    (lon, lat)
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid BBOX format: {0}. Expected 'minx,miny,maxx,maxy'")]
    InvalidFormat(String),

    #[error("Invalid number in BBOX: {0}")]
    InvalidNumber(String),
}
