//! Serialization utilities
//!
//! This module converts serde-serializable structs to ordered column/value
//! pairs and back, using each column's declared type to pick the value shape.

use crate::sql::{parse_date, parse_naive_datetime, parse_timestamp};
use crate::types::{ColumnType, ConversionError, SqlValue};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Convert serializable data to column/value pairs
///
/// Only fields for which `column_type` returns a type are emitted, ordered
/// by field name.
pub fn serialize_to_columns<T, F>(
    data: &T,
    column_type: F,
) -> Result<Vec<(String, SqlValue)>, ConversionError>
where
    T: Serialize,
    F: Fn(&str) -> Option<ColumnType>,
{
    let value =
        serde_json::to_value(data).map_err(|e| ConversionError::Serialization(e.to_string()))?;

    let Value::Object(map) = value else {
        return Err(ConversionError::Serialization(
            "value must serialize to a struct or map".to_string(),
        ));
    };

    let mut columns = Vec::with_capacity(map.len());
    for (name, field) in map {
        if let Some(ty) = column_type(&name) {
            let converted = json_to_sql(field, ty)?;
            columns.push((name, converted));
        }
    }
    Ok(columns)
}

/// Rebuild a deserializable value from decoded column/value pairs
pub fn deserialize_from_columns<'a, T, I>(columns: I) -> Result<T, ConversionError>
where
    T: DeserializeOwned,
    I: IntoIterator<Item = (&'a str, &'a SqlValue)>,
{
    let map: serde_json::Map<String, Value> = columns
        .into_iter()
        .map(|(name, value)| (name.to_string(), sql_to_json(value)))
        .collect();
    serde_json::from_value(Value::Object(map))
        .map_err(|e| ConversionError::Serialization(e.to_string()))
}

fn json_to_sql(value: Value, column_type: ColumnType) -> Result<SqlValue, ConversionError> {
    let incompatible = |value: &Value| ConversionError::Incompatible {
        value: value.to_string(),
        column_type,
    };

    let converted = match (column_type, value) {
        (_, Value::Null) => SqlValue::Null,
        (ColumnType::Json, other) => SqlValue::Json(other),
        (ColumnType::Text, Value::String(s)) => SqlValue::Text(s),
        (ColumnType::Integer | ColumnType::BigInt, Value::Number(n)) => {
            let i = n.as_i64().ok_or_else(|| ConversionError::OutOfRange {
                value: n.to_string(),
                column_type,
            })?;
            SqlValue::Integer(i)
        }
        (ColumnType::Float, Value::Number(n)) => {
            let f = n.as_f64().ok_or_else(|| ConversionError::OutOfRange {
                value: n.to_string(),
                column_type,
            })?;
            SqlValue::Float(f)
        }
        (ColumnType::Boolean, Value::Bool(b)) => SqlValue::Boolean(b),
        (ColumnType::Uuid, Value::String(s)) => {
            let parsed = uuid::Uuid::parse_str(&s).map_err(|_| ConversionError::Unparseable {
                text: s.clone(),
                column_type,
            })?;
            SqlValue::Uuid(parsed)
        }
        (ColumnType::Date, Value::String(s)) => SqlValue::Date(parse_date(&s)?),
        (ColumnType::DateTime, Value::String(s)) => SqlValue::DateTime(parse_naive_datetime(&s)?),
        (ColumnType::DateTimeOffset, Value::String(s)) => SqlValue::Timestamp(parse_timestamp(&s)?),
        (ColumnType::Binary, Value::Array(items)) => {
            let mut bytes = Vec::with_capacity(items.len());
            for item in &items {
                let byte = item
                    .as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| incompatible(item))?;
                bytes.push(byte);
            }
            SqlValue::Binary(bytes)
        }
        (_, other) => return Err(incompatible(&other)),
    };
    Ok(converted)
}

fn sql_to_json(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Text(s) => Value::String(s.clone()),
        SqlValue::Integer(i) => Value::from(*i),
        SqlValue::Boolean(b) => Value::Bool(*b),
        SqlValue::Float(f) => Value::from(*f),
        SqlValue::Uuid(u) => Value::String(u.to_string()),
        SqlValue::Date(d) => Value::String(crate::sql::format_date(*d)),
        SqlValue::DateTime(dt) => Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        SqlValue::Timestamp(ts) => Value::String(crate::sql::format_timestamp(*ts)),
        SqlValue::Binary(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
        SqlValue::Json(v) => v.clone(),
    }
}
