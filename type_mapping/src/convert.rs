//! Conversions from decoded values back to native Rust types

use crate::types::{ColumnType, ConversionError, SqlValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

/// Native types that can be rebuilt from a decoded [`SqlValue`]
pub trait FromSqlValue: Sized {
    /// Declared type this Rust type is stored as
    const COLUMN_TYPE: ColumnType;

    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError>;
}

fn mismatch(value: &SqlValue, column_type: ColumnType) -> ConversionError {
    ConversionError::Incompatible {
        value: value.to_string(),
        column_type,
    }
}

impl FromSqlValue for String {
    const COLUMN_TYPE: ColumnType = ColumnType::Text;

    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Text(s) => Ok(s.clone()),
            other => Err(mismatch(other, Self::COLUMN_TYPE)),
        }
    }
}

impl FromSqlValue for i64 {
    const COLUMN_TYPE: ColumnType = ColumnType::BigInt;

    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        value
            .as_i64()
            .ok_or_else(|| mismatch(value, Self::COLUMN_TYPE))
    }
}

impl FromSqlValue for i32 {
    const COLUMN_TYPE: ColumnType = ColumnType::Integer;

    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        let wide = value
            .as_i64()
            .ok_or_else(|| mismatch(value, Self::COLUMN_TYPE))?;
        i32::try_from(wide).map_err(|_| ConversionError::OutOfRange {
            value: wide.to_string(),
            column_type: Self::COLUMN_TYPE,
        })
    }
}

impl FromSqlValue for bool {
    const COLUMN_TYPE: ColumnType = ColumnType::Boolean;

    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        value
            .as_bool()
            .ok_or_else(|| mismatch(value, Self::COLUMN_TYPE))
    }
}

impl FromSqlValue for f64 {
    const COLUMN_TYPE: ColumnType = ColumnType::Float;

    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Float(f) => Ok(*f),
            SqlValue::Integer(i) => Ok(*i as f64),
            other => Err(mismatch(other, Self::COLUMN_TYPE)),
        }
    }
}

impl FromSqlValue for Uuid {
    const COLUMN_TYPE: ColumnType = ColumnType::Uuid;

    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Uuid(u) => Ok(*u),
            other => Err(mismatch(other, Self::COLUMN_TYPE)),
        }
    }
}

impl FromSqlValue for NaiveDate {
    const COLUMN_TYPE: ColumnType = ColumnType::Date;

    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Date(d) => Ok(*d),
            other => Err(mismatch(other, Self::COLUMN_TYPE)),
        }
    }
}

impl FromSqlValue for NaiveDateTime {
    const COLUMN_TYPE: ColumnType = ColumnType::DateTime;

    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::DateTime(dt) => Ok(*dt),
            SqlValue::Timestamp(ts) => Ok(ts.naive_utc()),
            other => Err(mismatch(other, Self::COLUMN_TYPE)),
        }
    }
}

impl FromSqlValue for DateTime<Utc> {
    const COLUMN_TYPE: ColumnType = ColumnType::DateTimeOffset;

    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        value
            .as_timestamp()
            .ok_or_else(|| mismatch(value, Self::COLUMN_TYPE))
    }
}

impl FromSqlValue for Vec<u8> {
    const COLUMN_TYPE: ColumnType = ColumnType::Binary;

    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Binary(bytes) => Ok(bytes.clone()),
            other => Err(mismatch(other, Self::COLUMN_TYPE)),
        }
    }
}

impl FromSqlValue for serde_json::Value {
    const COLUMN_TYPE: ColumnType = ColumnType::Json;

    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Json(v) => Ok(v.clone()),
            other => Err(mismatch(other, Self::COLUMN_TYPE)),
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    const COLUMN_TYPE: ColumnType = T::COLUMN_TYPE;

    fn from_sql_value(value: &SqlValue) -> Result<Self, ConversionError> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_sql_value(other).map(Some),
        }
    }
}
