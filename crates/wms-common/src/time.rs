//! Time handling utilities for meteorological data.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

/// Acquisition cadence advertised as the period of the time dimension.
pub const RUN_CADENCE: &str = "PT3H";

/// Parse an ISO 8601 timestamp, assuming UTC when no offset is given.
///
/// Accepts RFC 3339 (`2024-01-01T06:00:00Z`), naive date-times with or
/// without fractional seconds, and bare dates.
pub fn parse_iso8601(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let s = s.trim();

    // Try full datetime with timezone
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Try without timezone (assume UTC)
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    // Try date only
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(TimeParseError::InvalidFormat(s.to_string()))
}

/// Format as `YYYY-MM-DDTHH:MM:SSZ`, truncated to whole seconds.
pub fn format_iso8601(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Build a WMS time dimension extent `earliest/latest/period`.
///
/// Returns an empty string when there are no times.
pub fn time_extent(times: &[DateTime<Utc>], period: &str) -> String {
    let earliest = times.iter().min();
    let latest = times.iter().max();
    match (earliest, latest) {
        (Some(first), Some(last)) => {
            format!("{}/{}/{}", format_iso8601(first), format_iso8601(last), period)
        }
        _ => String::new(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),
}

/// Serde adapter writing timestamps as `YYYY-MM-DDTHH:MM:SSZ`.
pub mod iso8601 {
    use super::{format_iso8601, parse_iso8601};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_iso8601(dt))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_iso8601(&s).map_err(serde::de::Error::custom)
    }

    /// Same format for a list of timestamps.
    pub mod list {
        use super::super::{format_iso8601, parse_iso8601};
        use chrono::{DateTime, Utc};
        use serde::ser::SerializeSeq;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            times: &[DateTime<Utc>],
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(times.len()))?;
            for t in times {
                seq.serialize_element(&format_iso8601(t))?;
            }
            seq.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Vec<DateTime<Utc>>, D::Error> {
            let raw = Vec::<String>::deserialize(deserializer)?;
            raw.iter()
                .map(|s| parse_iso8601(s).map_err(serde::de::Error::custom))
                .collect()
        }
    }
}
