//! Ready-made key and value mappers
//!
//! Single-column keys and values need no custom code; struct values can go
//! through serde. Anything else implements [`KeyMapper`] or [`ValueMapper`]
//! directly.

use crate::descriptor::TableDescriptor;
use crate::errors::MapError;
use crate::record::Record;
use crate::traits::{KeyMapper, ValueMapper};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use type_mapping::{deserialize_from_columns, serialize_to_columns, FromSqlValue, SqlValue};

/// Key stored in one column
pub struct ColumnKeyMapper<K> {
    column: String,
    _marker: PhantomData<fn() -> K>,
}

impl<K> ColumnKeyMapper<K> {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            _marker: PhantomData,
        }
    }
}

impl<K> KeyMapper<K> for ColumnKeyMapper<K>
where
    K: Clone + Into<SqlValue> + FromSqlValue,
{
    fn to_filter(&self, key: &K) -> Result<Vec<(String, SqlValue)>, MapError> {
        Ok(vec![(self.column.clone(), key.clone().into())])
    }

    fn from_record(&self, record: &Record) -> Result<K, MapError> {
        record.read(&self.column)
    }
}

/// Value stored in one column
pub struct ColumnValueMapper<V> {
    column: String,
    _marker: PhantomData<fn() -> V>,
}

impl<V> ColumnValueMapper<V> {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            _marker: PhantomData,
        }
    }
}

impl<V> ValueMapper<V> for ColumnValueMapper<V>
where
    V: Clone + Into<SqlValue> + FromSqlValue,
{
    fn to_columns(&self, value: &V) -> Result<Vec<(String, SqlValue)>, MapError> {
        Ok(vec![(self.column.clone(), value.clone().into())])
    }

    fn from_record(&self, record: &Record) -> Result<V, MapError> {
        record.read(&self.column)
    }
}

/// Struct value spread over the table's non-key columns by field name
///
/// Fields without a matching column are not written; columns without a
/// matching field are ignored on read.
pub struct SerdeValueMapper<V> {
    table: Arc<TableDescriptor>,
    excluded: Vec<String>,
    _marker: PhantomData<fn() -> V>,
}

impl<V> SerdeValueMapper<V> {
    pub fn new(table: Arc<TableDescriptor>) -> Self {
        Self {
            table,
            excluded: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Never write this column from the value
    pub fn exclude(mut self, column: impl Into<String>) -> Self {
        self.excluded.push(column.into());
        self
    }
}

impl<V> ValueMapper<V> for SerdeValueMapper<V>
where
    V: Serialize + DeserializeOwned,
{
    fn to_columns(&self, value: &V) -> Result<Vec<(String, SqlValue)>, MapError> {
        let columns = serialize_to_columns(value, |name| {
            if self.table.is_key_column(name) || self.excluded.iter().any(|c| c == name) {
                return None;
            }
            self.table.column(name).map(|c| c.column_type())
        })?;
        Ok(columns)
    }

    fn from_record(&self, record: &Record) -> Result<V, MapError> {
        Ok(deserialize_from_columns(record.iter())?)
    }
}
