//! Timestamp helpers for the 15-minute prediction grid.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Width of one prediction interval.
pub const PREDICTION_INTERVAL_MINUTES: i64 = 15;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Combine a `YYYY-MM-DD` date and an `HH:MM[:SS]` time into a timestamp.
pub fn parse_timestamp(date: &str, time: &str) -> Result<NaiveDateTime, String> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}': {}", date, e))?;
    let time = parse_time_of_day(time)?;
    Ok(date.and_time(time))
}

fn parse_time_of_day(time: &str) -> Result<NaiveTime, String> {
    let trimmed = time.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|e| format!("Invalid time '{}': {}", time, e))
}

/// Whether the timestamp starts a prediction interval.
pub fn is_interval_aligned(timestamp: &NaiveDateTime) -> bool {
    timestamp.second() == 0
        && timestamp.nanosecond() == 0
        && i64::from(timestamp.minute()) % PREDICTION_INTERVAL_MINUTES == 0
}

/// End of the interval forecast for `timestamp`.
pub fn forecast_interval_end(timestamp: &NaiveDateTime) -> NaiveDateTime {
    *timestamp + Duration::minutes(PREDICTION_INTERVAL_MINUTES)
}

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(DISPLAY_FORMAT).to_string()
}

/// Calendar range the feature table covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SupportedWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        if start <= end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl Default for SupportedWindow {
    fn default() -> Self {
        Self {
            start: NaiveDate::from_ymd_opt(2016, 3, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2016, 3, 31).unwrap_or_default(),
        }
    }
}

/// Serde adapter for the `tpep_pickup_datetime` column.
///
/// Accepts both the pandas CSV form (`2016-03-15 08:00:00`) and ISO-8601
/// (`2016-03-15T08:00:00`).
pub mod pickup_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const CSV_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(CSV_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let trimmed = raw.trim();
        NaiveDateTime::parse_from_str(trimmed, CSV_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S"))
            .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M"))
            .map_err(|e| serde::de::Error::custom(format!("invalid timestamp '{}': {}", raw, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp_minutes_and_seconds() {
        let a = parse_timestamp("2016-03-15", "08:00").unwrap();
        let b = parse_timestamp("2016-03-15", "08:00:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(format_timestamp(&a), "2016-03-15 08:00");
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("2016-13-40", "08:00").is_err());
        assert!(parse_timestamp("2016-03-15", "25:99").is_err());
        assert!(parse_timestamp("", "").is_err());
    }

    #[test]
    fn test_interval_alignment() {
        assert!(is_interval_aligned(&parse_timestamp("2016-03-15", "08:45").unwrap()));
        assert!(!is_interval_aligned(&parse_timestamp("2016-03-15", "08:50").unwrap()));
        assert!(!is_interval_aligned(&parse_timestamp("2016-03-15", "08:45:30").unwrap()));
    }

    #[test]
    fn test_forecast_interval_end_crosses_midnight() {
        let ts = parse_timestamp("2016-03-15", "23:45").unwrap();
        let end = forecast_interval_end(&ts);
        assert_eq!(end.format("%H:%M").to_string(), "00:00");
        assert_eq!(end.date(), NaiveDate::from_ymd_opt(2016, 3, 16).unwrap());
    }

    #[test]
    fn test_supported_window_bounds() {
        let window = SupportedWindow::default();
        assert!(window.contains(NaiveDate::from_ymd_opt(2016, 3, 1).unwrap()));
        assert!(window.contains(NaiveDate::from_ymd_opt(2016, 3, 31).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2016, 4, 1).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2016, 2, 29).unwrap()));
    }

    #[test]
    fn test_supported_window_rejects_inverted_range() {
        let start = NaiveDate::from_ymd_opt(2016, 3, 31).unwrap();
        let end = NaiveDate::from_ymd_opt(2016, 3, 1).unwrap();
        assert!(SupportedWindow::new(start, end).is_none());
    }
}
