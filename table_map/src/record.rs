//! Decoded rows

use crate::errors::MapError;
use type_mapping::{FromSqlValue, SqlValue};

/// One decoded row, columns in projection order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: Vec<(String, SqlValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, column: impl Into<String>, value: SqlValue) {
        self.values.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Typed read of a column, failing when it is absent or of another type
    pub fn read<T: FromSqlValue>(&self, column: &str) -> Result<T, MapError> {
        let value = self
            .get(column)
            .ok_or_else(|| MapError::mapping(format!("column '{}' missing from row", column)))?;
        Ok(T::from_sql_value(value)?)
    }

    pub fn first(&self) -> Option<&SqlValue> {
        self.values.first().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl FromIterator<(String, SqlValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, SqlValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
