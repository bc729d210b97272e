//! Validation utilities for type mapping
//!
//! This module checks runtime values against declared column types
//! before they are bound to a statement.

use crate::types::{ColumnType, SqlValue};

/// Check whether a value can be bound to a column of the given declared type
///
/// `Null` is accepted for every type; nullability is the storage engine's concern.
pub fn is_compatible(column_type: ColumnType, value: &SqlValue) -> bool {
    match value {
        SqlValue::Null => true,
        SqlValue::Text(_) => column_type == ColumnType::Text,
        SqlValue::Integer(_) => matches!(column_type, ColumnType::Integer | ColumnType::BigInt),
        SqlValue::Boolean(_) => column_type == ColumnType::Boolean,
        SqlValue::Float(_) => column_type == ColumnType::Float,
        SqlValue::Uuid(_) => column_type == ColumnType::Uuid,
        SqlValue::Date(_) | SqlValue::DateTime(_) | SqlValue::Timestamp(_) => {
            column_type.is_date_like()
        }
        SqlValue::Binary(_) => column_type == ColumnType::Binary,
        SqlValue::Json(_) => column_type == ColumnType::Json,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_null_fits_everything() {
        for column_type in [ColumnType::Text, ColumnType::Date, ColumnType::Binary] {
            assert!(is_compatible(column_type, &SqlValue::Null));
        }
    }

    #[test]
    fn test_instants_only_fit_date_like_columns() {
        let now = SqlValue::Timestamp(Utc::now());
        assert!(is_compatible(ColumnType::DateTimeOffset, &now));
        assert!(is_compatible(ColumnType::Date, &now));
        assert!(!is_compatible(ColumnType::Text, &now));
        assert!(!is_compatible(ColumnType::Integer, &now));
    }

    #[test]
    fn test_text_does_not_fit_numbers() {
        let text = SqlValue::from("42");
        assert!(!is_compatible(ColumnType::Integer, &text));
        assert!(is_compatible(ColumnType::Text, &text));
    }
}
