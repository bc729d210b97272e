//! Type mapping definitions
//!
//! This module provides the closed set of declared column types and the
//! runtime value carried by bound parameters and decoded rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Declared type of a table column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Integer,
    BigInt,
    Boolean,
    Float,
    Date,
    DateTime,
    DateTimeOffset,
    Binary,
    Uuid,
    Json,
}

impl ColumnType {
    /// Whether a column of this type can hold an expiration instant
    pub fn is_date_like(self) -> bool {
        matches!(
            self,
            ColumnType::Date | ColumnType::DateTime | ColumnType::DateTimeOffset
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::BigInt => "bigint",
            ColumnType::Boolean => "boolean",
            ColumnType::Float => "float",
            ColumnType::Date => "date",
            ColumnType::DateTime => "datetime",
            ColumnType::DateTimeOffset => "datetime_offset",
            ColumnType::Binary => "binary",
            ColumnType::Uuid => "uuid",
            ColumnType::Json => "json",
        };
        f.write_str(name)
    }
}

/// Runtime value bound to a statement or decoded from a row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    Null,
    Text(String),
    Integer(i64),
    Boolean(bool),
    Float(f64),
    Uuid(Uuid),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Timestamp(DateTime<Utc>),
    Binary(Vec<u8>),
    Json(serde_json::Value),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConversionError {
    #[error("Value {value} does not fit column type {column_type}")]
    Incompatible {
        value: String,
        column_type: ColumnType,
    },
    #[error("Value out of range for {column_type}: {value}")]
    OutOfRange {
        value: String,
        column_type: ColumnType,
    },
    #[error("Cannot parse '{text}' as {column_type}")]
    Unparseable {
        text: String,
        column_type: ColumnType,
    },
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Interpret the value as an instant, widening dates and naive datetimes as UTC
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            SqlValue::Timestamp(ts) => Some(*ts),
            SqlValue::DateTime(dt) => Some(dt.and_utc()),
            SqlValue::Date(d) => d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SqlValue::Boolean(b) => Some(*b),
            SqlValue::Integer(i) => Some(*i != 0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Reshape an instant to the representation a date-like column stores
    ///
    /// A `Date` column cannot hold a time of day, so an instant past midnight
    /// rounds up to the following day. The stored value is never earlier
    /// than `instant`.
    pub fn coerce_instant(instant: DateTime<Utc>, column_type: ColumnType) -> SqlValue {
        match column_type {
            ColumnType::Date => {
                let date = instant.date_naive();
                if instant.time() == NaiveTime::default() {
                    SqlValue::Date(date)
                } else {
                    SqlValue::Date(date.succ_opt().unwrap_or(date))
                }
            }
            ColumnType::DateTime => SqlValue::DateTime(instant.naive_utc()),
            _ => SqlValue::Timestamp(instant),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Text(s) => write!(f, "'{}'", s),
            SqlValue::Integer(i) => write!(f, "{}", i),
            SqlValue::Boolean(b) => write!(f, "{}", b),
            SqlValue::Float(v) => write!(f, "{}", v),
            SqlValue::Uuid(u) => write!(f, "{}", u),
            SqlValue::Date(d) => write!(f, "{}", crate::sql::format_date(*d)),
            SqlValue::DateTime(dt) => write!(f, "{}", dt),
            SqlValue::Timestamp(ts) => write!(f, "{}", crate::sql::format_timestamp(*ts)),
            SqlValue::Binary(bytes) => write!(f, "<{} bytes>", bytes.len()),
            SqlValue::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<String> for SqlValue {
    fn from(val: String) -> Self {
        SqlValue::Text(val)
    }
}

impl From<&str> for SqlValue {
    fn from(val: &str) -> Self {
        SqlValue::Text(val.to_string())
    }
}

impl From<i64> for SqlValue {
    fn from(val: i64) -> Self {
        SqlValue::Integer(val)
    }
}

impl From<i32> for SqlValue {
    fn from(val: i32) -> Self {
        SqlValue::Integer(val as i64)
    }
}

impl From<i16> for SqlValue {
    fn from(val: i16) -> Self {
        SqlValue::Integer(val as i64)
    }
}

impl From<bool> for SqlValue {
    fn from(val: bool) -> Self {
        SqlValue::Boolean(val)
    }
}

impl From<f64> for SqlValue {
    fn from(val: f64) -> Self {
        SqlValue::Float(val)
    }
}

impl From<Uuid> for SqlValue {
    fn from(val: Uuid) -> Self {
        SqlValue::Uuid(val)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(val: NaiveDate) -> Self {
        SqlValue::Date(val)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(val: NaiveDateTime) -> Self {
        SqlValue::DateTime(val)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(val: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(val)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(val: Vec<u8>) -> Self {
        SqlValue::Binary(val)
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(val: serde_json::Value) -> Self {
        SqlValue::Json(val)
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(val: Option<T>) -> Self {
        match val {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_date_like_types() {
        assert!(ColumnType::Date.is_date_like());
        assert!(ColumnType::DateTime.is_date_like());
        assert!(ColumnType::DateTimeOffset.is_date_like());
        assert!(!ColumnType::Text.is_date_like());
        assert!(!ColumnType::Integer.is_date_like());
    }

    #[test]
    fn test_option_conversion() {
        let none: Option<i32> = None;
        assert_eq!(SqlValue::from(none), SqlValue::Null);
        assert_eq!(SqlValue::from(Some("a")), SqlValue::Text("a".to_string()));
    }

    #[test]
    fn test_coerce_instant() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(
            SqlValue::coerce_instant(instant, ColumnType::Date),
            SqlValue::Date(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap())
        );
        assert_eq!(
            SqlValue::coerce_instant(instant, ColumnType::DateTimeOffset),
            SqlValue::Timestamp(instant)
        );
        assert_eq!(
            SqlValue::coerce_instant(instant, ColumnType::DateTime).as_timestamp(),
            Some(instant)
        );
    }

    #[test]
    fn test_coerce_instant_to_date_never_moves_earlier() {
        let midnight = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(
            SqlValue::coerce_instant(midnight, ColumnType::Date),
            SqlValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );

        let just_after = midnight + chrono::TimeDelta::microseconds(1);
        assert_eq!(
            SqlValue::coerce_instant(just_after, ColumnType::Date),
            SqlValue::Date(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap())
        );

        let year_end = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(
            SqlValue::coerce_instant(year_end, ColumnType::Date),
            SqlValue::Date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
        );
    }
}
