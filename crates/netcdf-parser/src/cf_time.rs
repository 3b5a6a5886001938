//! CF-convention time coordinate decoding (`<unit> since <reference>`).

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};

/// Time unit of a CF time coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "seconds" | "second" | "secs" | "sec" | "s" => Some(TimeUnit::Seconds),
            "minutes" | "minute" | "mins" | "min" => Some(TimeUnit::Minutes),
            "hours" | "hour" | "hrs" | "hr" | "h" => Some(TimeUnit::Hours),
            "days" | "day" | "d" => Some(TimeUnit::Days),
            _ => None,
        }
    }

    fn seconds(self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Minutes => 60.0,
            TimeUnit::Hours => 3600.0,
            TimeUnit::Days => 86400.0,
        }
    }
}

/// Parsed `units` attribute of a time coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfTimeUnits {
    pub unit: TimeUnit,
    pub reference: DateTime<Utc>,
}

impl CfTimeUnits {
    /// Parse e.g. `hours since 2024-01-01 00:00:00`.
    pub fn parse(units: &str) -> Option<Self> {
        let (unit, reference) = units.split_once(" since ")?;
        Some(Self {
            unit: TimeUnit::parse(unit)?,
            reference: parse_reference(reference.trim())?,
        })
    }

    /// Seconds since the Unix epoch, used when no units are available.
    pub fn unix_seconds() -> Self {
        Self {
            unit: TimeUnit::Seconds,
            reference: DateTime::<Utc>::default(),
        }
    }

    pub fn decode(&self, value: f64) -> Option<DateTime<Utc>> {
        if !value.is_finite() {
            return None;
        }
        let millis = (value * self.unit.seconds() * 1000.0).round();
        if millis.abs() >= i64::MAX as f64 {
            return None;
        }
        self.reference
            .checked_add_signed(Duration::milliseconds(millis as i64))
    }
}

fn parse_reference(s: &str) -> Option<DateTime<Utc>> {
    // Trailing zone designators seen in CF files: "Z", "UTC", "+00:00"
    let s = s
        .trim_end_matches(" UTC")
        .trim_end_matches(" utc")
        .trim_end_matches(" +00:00");

    for fmt in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }

    wms_common::parse_iso8601(s).ok()
}

/// Decode raw time values position by position. Values without usable
/// `units` are taken as seconds since the Unix epoch; non-finite or
/// out-of-range values decode to `None`.
pub fn decode_time_axis(values: &[f64], units: Option<&str>) -> Vec<Option<DateTime<Utc>>> {
    let units = units
        .and_then(CfTimeUnits::parse)
        .unwrap_or_else(CfTimeUnits::unix_seconds);
    values.iter().map(|v| units.decode(*v)).collect()
}

/// Like [`decode_time_axis`] with undecodable values dropped.
pub fn decode_times(values: &[f64], units: Option<&str>) -> Vec<DateTime<Utc>> {
    decode_time_axis(values, units).into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hours_since() {
        let units = CfTimeUnits::parse("hours since 2024-01-01 00:00:00").unwrap();
        assert_eq!(units.unit, TimeUnit::Hours);
        assert_eq!(
            units.decode(6.0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_reference_variants() {
        for units in [
            "days since 2024-01-01",
            "days since 2024-01-01T00:00:00Z",
            "days since 2024-01-01 00:00:00 UTC",
            "Days since 2024-01-01 00:00:00.0",
        ] {
            let parsed = CfTimeUnits::parse(units).unwrap_or_else(|| panic!("{}", units));
            assert_eq!(
                parsed.decode(1.5).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap()
            );
        }
    }

    #[test]
    fn test_missing_units_are_epoch_seconds() {
        let times = decode_times(&[0.0, 3600.0, f64::NAN], None);
        assert_eq!(times.len(), 2);
        assert_eq!(times[1], Utc.with_ymd_and_hms(1970, 1, 1, 1, 0, 0).unwrap());

        let garbled = decode_times(&[60.0], Some("fortnights after launch"));
        assert_eq!(garbled[0], Utc.with_ymd_and_hms(1970, 1, 1, 0, 1, 0).unwrap());
    }

    #[test]
    fn test_time_axis_keeps_positions() {
        let axis = decode_time_axis(&[0.0, f64::NAN, 6.0], Some("hours since 2024-01-01"));
        assert_eq!(axis.len(), 3);
        assert!(axis[1].is_none());
        assert_eq!(axis[2], Some(Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap()));
    }

    #[test]
    fn test_extreme_values_do_not_decode() {
        let units = CfTimeUnits {
            unit: TimeUnit::Seconds,
            reference: DateTime::<Utc>::default(),
        };
        let min_millis = i64::MIN as f64 / 1000.0;
        assert_eq!(units.decode(min_millis), None);
        assert_eq!(units.decode(-min_millis), None);
        assert_eq!(units.decode(f64::INFINITY), None);
    }
}
