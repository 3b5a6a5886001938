//! Color scale definitions for published weather parameters.
//!
//! The registry maps a parameter id (e.g. `temp_2m`) to its display name,
//! unit, palette id, default value range and value→color stops. A built-in
//! table covers the standard parameters; deployments may replace it with a
//! YAML document keyed by parameter id:
//!
//! ```yaml
//! temp_2m:
//!   name: Temperature 2m
//!   units: "°C"
//!   palette: rainbow
//!   range: [-40, 50]
//!   colors:
//!     - { value: -40, color: "#000080" }
//!     - { value: 50, color: "#800000" }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A single value→color stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub value: f64,
    /// Hex color, `#RRGGBB`
    pub color: String,
}

impl ColorStop {
    pub fn new(value: f64, color: impl Into<String>) -> Self {
        Self {
            value,
            color: color.into(),
        }
    }

    /// Parse the hex color into RGB components.
    pub fn rgb(&self) -> Result<(u8, u8, u8), StyleError> {
        parse_hex_color(&self.color)
    }
}

/// Display and color mapping settings of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScale {
    pub name: String,
    pub units: String,
    pub palette: String,
    pub range: [f64; 2],
    #[serde(default)]
    pub colors: Vec<ColorStop>,
}

impl ColorScale {
    /// Scale synthesized for parameters missing from the registry.
    pub fn fallback(parameter: &str, min: f64, max: f64) -> Self {
        Self {
            name: parameter.to_string(),
            units: "unknown".to_string(),
            palette: "rainbow".to_string(),
            range: [min, max],
            colors: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), StyleError> {
        if !(self.range[0].is_finite() && self.range[1].is_finite()) {
            return Err(StyleError::ValidationError(format!(
                "{}: range must be finite",
                self.name
            )));
        }
        for stop in &self.colors {
            stop.rgb()?;
        }
        for pair in self.colors.windows(2) {
            if pair[1].value < pair[0].value {
                return Err(StyleError::ValidationError(format!(
                    "{}: color stops must be in ascending value order",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// Parse `#RRGGBB` (leading `#` optional).
pub fn parse_hex_color(s: &str) -> Result<(u8, u8, u8), StyleError> {
    let hex = s.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(StyleError::InvalidColor(s.to_string()));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| StyleError::InvalidColor(s.to_string()))
    };

    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

type BuiltinScale = (
    &'static str,
    &'static str,
    &'static str,
    &'static str,
    [f64; 2],
    &'static [(f64, &'static str)],
);

const BUILTIN_SCALES: &[BuiltinScale] = &[
    (
        "temp_2m",
        "Temperature 2m",
        "°C",
        "rainbow",
        [-40.0, 50.0],
        &[
            (-40.0, "#000080"),
            (-20.0, "#0000FF"),
            (0.0, "#00FFFF"),
            (10.0, "#00FF00"),
            (20.0, "#FFFF00"),
            (30.0, "#FF8000"),
            (40.0, "#FF0000"),
            (50.0, "#800000"),
        ],
    ),
    (
        "temp_850mb",
        "Temperature 850mb",
        "°C",
        "rainbow",
        [-60.0, 30.0],
        &[
            (-60.0, "#000080"),
            (-40.0, "#0000FF"),
            (-20.0, "#00FFFF"),
            (0.0, "#00FF00"),
            (10.0, "#FFFF00"),
            (20.0, "#FF8000"),
            (30.0, "#FF0000"),
        ],
    ),
    (
        "wind_speed_10m",
        "Wind Speed 10m",
        "m/s",
        "wind",
        [0.0, 30.0],
        &[
            (0.0, "#FFFFFF"),
            (5.0, "#00FF00"),
            (10.0, "#FFFF00"),
            (15.0, "#FF8000"),
            (20.0, "#FF0000"),
            (25.0, "#800000"),
            (30.0, "#400000"),
        ],
    ),
    (
        "wind_speed_50m",
        "Wind Speed 50m",
        "m/s",
        "wind",
        [0.0, 40.0],
        &[
            (0.0, "#FFFFFF"),
            (10.0, "#00FF00"),
            (20.0, "#FFFF00"),
            (30.0, "#FF0000"),
            (40.0, "#800000"),
        ],
    ),
    (
        "precip_rate",
        "Precipitation Rate",
        "mm/hr",
        "precipitation",
        [0.0, 20.0],
        &[
            (0.0, "#FFFFFF"),
            (0.1, "#C0E0FF"),
            (1.0, "#00FF00"),
            (5.0, "#FFFF00"),
            (10.0, "#FF8000"),
            (15.0, "#FF0000"),
            (20.0, "#800000"),
        ],
    ),
    (
        "mslp",
        "Mean Sea Level Pressure",
        "hPa",
        "pressure",
        [960.0, 1040.0],
        &[
            (960.0, "#FF0000"),
            (980.0, "#FF8000"),
            (1000.0, "#FFFF00"),
            (1013.0, "#00FF00"),
            (1020.0, "#00FFFF"),
            (1030.0, "#0000FF"),
            (1040.0, "#000080"),
        ],
    ),
    (
        "rh_2m",
        "Relative Humidity 2m",
        "%",
        "humidity",
        [0.0, 100.0],
        &[
            (0.0, "#8B4513"),
            (20.0, "#FFD700"),
            (40.0, "#FFFF00"),
            (60.0, "#00FF00"),
            (80.0, "#00FFFF"),
            (100.0, "#0000FF"),
        ],
    ),
];

/// Read-only parameter → color scale table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorScaleRegistry {
    scales: BTreeMap<String, ColorScale>,
}

impl ColorScaleRegistry {
    /// Registry with the standard parameters.
    pub fn builtin() -> Self {
        let scales = BUILTIN_SCALES
            .iter()
            .map(|(id, name, units, palette, range, stops)| {
                let scale = ColorScale {
                    name: name.to_string(),
                    units: units.to_string(),
                    palette: palette.to_string(),
                    range: *range,
                    colors: stops.iter().map(|(v, c)| ColorStop::new(*v, *c)).collect(),
                };
                (id.to_string(), scale)
            })
            .collect();
        Self { scales }
    }

    /// Load a replacement table from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, StyleError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| StyleError::IoError(e.to_string()))?;
        Self::from_yaml_str(&content)
    }

    /// Parse a table from YAML and validate every entry.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, StyleError> {
        let registry: Self =
            serde_yaml::from_str(yaml).map_err(|e| StyleError::ParseError(e.to_string()))?;
        for (id, scale) in &registry.scales {
            scale
                .validate()
                .map_err(|e| StyleError::ValidationError(format!("{}: {}", id, e)))?;
        }
        Ok(registry)
    }

    pub fn get(&self, parameter: &str) -> Option<&ColorScale> {
        self.scales.get(parameter)
    }

    /// Registry entry for `parameter`, or a fallback spanning the observed range.
    pub fn resolve(&self, parameter: &str, observed_min: f64, observed_max: f64) -> ColorScale {
        self.get(parameter)
            .cloned()
            .unwrap_or_else(|| ColorScale::fallback(parameter, observed_min, observed_max))
    }

    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.scales.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.scales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }
}

impl Default for ColorScaleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_contains_standard_parameters() {
        let registry = ColorScaleRegistry::builtin();
        assert_eq!(registry.len(), 7);

        let temp = registry.get("temp_2m").unwrap();
        assert_eq!(temp.units, "°C");
        assert_eq!(temp.range, [-40.0, 50.0]);
        assert_eq!(temp.colors.len(), 8);

        let wind = registry.get("wind_speed_10m").unwrap();
        assert_eq!(wind.palette, "wind");
    }

    #[test]
    fn test_builtin_scales_are_valid() {
        let registry = ColorScaleRegistry::builtin();
        for id in registry.parameters() {
            registry.get(id).unwrap().validate().unwrap();
        }
    }

    #[test]
    fn test_resolve_falls_back_for_unknown_parameter() {
        let registry = ColorScaleRegistry::builtin();
        let scale = registry.resolve("cape", 0.0, 4200.0);
        assert_eq!(scale.name, "cape");
        assert_eq!(scale.units, "unknown");
        assert_eq!(scale.palette, "rainbow");
        assert_eq!(scale.range, [0.0, 4200.0]);
        assert!(scale.colors.is_empty());
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF8000").unwrap(), (255, 128, 0));
        assert_eq!(parse_hex_color("8b4513").unwrap(), (139, 69, 19));
        assert!(parse_hex_color("#FFF").is_err());
        assert!(parse_hex_color("#GG0000").is_err());
    }

    #[test]
    fn test_from_yaml_replaces_table() {
        let yaml = r##"
cape:
  name: CAPE
  units: J/kg
  palette: rainbow
  range: [0, 5000]
  colors:
    - { value: 0, color: "#FFFFFF" }
    - { value: 5000, color: "#FF0000" }
"##;
        let registry = ColorScaleRegistry::from_yaml_str(yaml).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("cape").unwrap().units, "J/kg");
        assert!(registry.get("temp_2m").is_none());
    }

    #[test]
    fn test_from_yaml_rejects_bad_color() {
        let yaml = r##"
cape:
  name: CAPE
  units: J/kg
  palette: rainbow
  range: [0, 5000]
  colors:
    - { value: 0, color: "white" }
"##;
        assert!(matches!(
            ColorScaleRegistry::from_yaml_str(yaml),
            Err(StyleError::ValidationError(_))
        ));
    }
}
