//! Microsecond time helpers.
//!
//! The backend stores every machine timestamp as UTC microseconds. Client
//! payloads may instead carry date strings; `microseconds_from_string`
//! accepts RFC 3339 plus the two legacy formats older clients still send.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;

/// Errors from timestamp conversion and construction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimeError {
    #[error("Could not parse date string: {0}")]
    Unparseable(String),

    #[error("Timestamp out of representable range: {0}")]
    OutOfRange(i64),

    #[error("updated_at timestamp {updated_at} precedes created_at timestamp {created_at}")]
    InvertedPair { created_at: i64, updated_at: i64 },
}

/// Current UTC time in microseconds.
pub fn now_microseconds() -> i64 {
    Utc::now().timestamp_micros()
}

/// Convert UTC microseconds back into a `DateTime<Utc>`.
pub fn datetime_from_microseconds(microseconds: i64) -> Result<DateTime<Utc>, TimeError> {
    DateTime::from_timestamp_micros(microseconds).ok_or(TimeError::OutOfRange(microseconds))
}

/// Parse a client-supplied date string into UTC microseconds.
///
/// Accepts RFC 3339 (`2024-03-01T10:15:00.000Z`), the space-separated
/// datetime form (`2024-03-01 10:15:00.000`), and a bare date
/// (`2024-03-01`, midnight UTC).
pub fn microseconds_from_string(value: &str) -> Result<i64, TimeError> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.with_timezone(&Utc).timestamp_micros());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(naive.and_utc().timestamp_micros());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| TimeError::Unparseable(value.to_string()))?;
        return Ok(midnight.and_utc().timestamp_micros());
    }
    Err(TimeError::Unparseable(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_strings() {
        let micros = microseconds_from_string("2024-03-01T10:15:00Z").unwrap();
        let roundtrip = datetime_from_microseconds(micros).unwrap();
        assert_eq!(roundtrip.to_rfc3339(), "2024-03-01T10:15:00+00:00");
    }

    #[test]
    fn parses_space_separated_datetimes() {
        let micros = microseconds_from_string("2024-03-01 10:15:00.250").unwrap();
        assert_eq!(micros % 1_000_000, 250_000);
    }

    #[test]
    fn parses_bare_dates_as_midnight_utc() {
        let micros = microseconds_from_string("2024-03-01").unwrap();
        let datetime = datetime_from_microseconds(micros).unwrap();
        assert_eq!(datetime.to_rfc3339(), "2024-03-01T00:00:00+00:00");
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            microseconds_from_string("not a date"),
            Err(TimeError::Unparseable(_))
        ));
    }
}
