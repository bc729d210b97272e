//! Text forms for date-like values
//!
//! Dialects that store date-like values as text (SQLite) compare them
//! lexicographically, so every instant is written with a fixed width in UTC.

use crate::types::{ColumnType, ConversionError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Fixed-width RFC 3339 form, always microsecond precision and `Z` suffix
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, ConversionError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    // Naive text is read as UTC
    parse_naive_datetime(text)
        .map(|naive| naive.and_utc())
        .map_err(|_| ConversionError::Unparseable {
            text: text.to_string(),
            column_type: ColumnType::DateTimeOffset,
        })
}

pub fn parse_naive_datetime(text: &str) -> Result<NaiveDateTime, ConversionError> {
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc).naive_utc());
    }
    Err(ConversionError::Unparseable {
        text: text.to_string(),
        column_type: ColumnType::DateTime,
    })
}

pub fn parse_date(text: &str) -> Result<NaiveDate, ConversionError> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| ConversionError::Unparseable {
        text: text.to_string(),
        column_type: ColumnType::Date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_text_is_fixed_width_and_ordered() {
        let whole = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = whole + chrono::Duration::microseconds(120);

        let a = format_timestamp(whole);
        let b = format_timestamp(later);

        assert_eq!(a.len(), b.len());
        assert!(a < b);
        assert_eq!(a, "2024-01-01T00:00:00.000000Z");
    }

    #[test]
    fn test_parse_timestamp_accepts_offsets_and_naive_text() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-01T12:00:00+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-01-01 10:00:00").unwrap(), expected);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_date_roundtrip_text() {
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(parse_date(&format_date(date)).unwrap(), date);
        assert!(parse_date("31/12/2023").is_err());
    }
}
