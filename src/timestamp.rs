// src/timestamp.rs
//! Fail-soft timestamp parsing.
//!
//! Article and cluster timestamps arrive as strings from heterogeneous feeds. A
//! parse failure is a recoverable, local condition: callers map `Err` to "this
//! scoring term contributes nothing" and carry on.
//!
//! Accepted shapes, tried in order:
//! 1. RFC 3339 (`2025-09-01T10:00:00Z`, `2025-09-01T10:00:00.123+05:30`)
//! 2. naive ISO `YYYY-MM-DDTHH:MM:SS`, optional fractional part, read as UTC
//! 3. RFC 2822 (`Mon, 01 Sep 2025 10:00:00 GMT`), as raw RSS dates often are

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::cmp::Ordering;
use thiserror::Error;

const NAIVE_ISO: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("timestamp missing")]
    Missing,
    #[error("malformed timestamp: {0:?}")]
    Malformed(String),
}

/// Parse an article/cluster timestamp into UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TimestampError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(TimestampError::Missing);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Naive ISO; fractional seconds are dropped.
    let head = s.split('.').next().unwrap_or(s);
    if let Ok(naive) = NaiveDateTime::parse_from_str(head, NAIVE_ISO) {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    Err(TimestampError::Malformed(s.to_string()))
}

/// Order two timestamp strings: by instant when both parse, lexicographically otherwise.
pub fn compare_timestamps(a: &str, b: &str) -> Ordering {
    match (parse_timestamp(a), parse_timestamp(b)) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn rfc3339_with_zone() {
        let dt = parse_timestamp("2025-09-01T10:00:00+05:30").unwrap();
        assert_eq!(dt.hour(), 4);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn naive_iso_with_fraction_is_utc() {
        let dt = parse_timestamp("2025-09-01T10:00:00.987654").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 9, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn rfc2822_feed_date() {
        let dt = parse_timestamp("Mon, 01 Sep 2025 10:00:00 GMT").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 9, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn missing_and_malformed_are_distinct() {
        assert_eq!(parse_timestamp("   "), Err(TimestampError::Missing));
        assert!(matches!(
            parse_timestamp("yesterday"),
            Err(TimestampError::Malformed(_))
        ));
        assert!(matches!(
            parse_timestamp("2025-09-01"),
            Err(TimestampError::Malformed(_))
        ));
    }

    #[test]
    fn compare_parsed_and_fallback() {
        // Same instant, different spelling.
        assert_eq!(
            compare_timestamps("2025-09-01T10:00:00Z", "2025-09-01T15:30:00+05:30"),
            Ordering::Equal
        );
        assert_eq!(
            compare_timestamps("2025-09-01T09:00:00", "2025-09-01T10:00:00Z"),
            Ordering::Less
        );
        // Unparseable → lexicographic.
        assert_eq!(compare_timestamps("b", "a"), Ordering::Greater);
    }
}
