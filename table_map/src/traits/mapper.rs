use crate::errors::MapError;
use crate::record::Record;
use type_mapping::SqlValue;

/// Turns a key into the ordered column/value pairs that identify its row
pub trait KeyMapper<K>: Send + Sync {
    /// Must be non-empty and name only columns of the table
    fn to_filter(&self, key: &K) -> Result<Vec<(String, SqlValue)>, MapError>;

    fn from_record(&self, record: &Record) -> Result<K, MapError>;
}

/// Turns a value into the columns it occupies, and back
pub trait ValueMapper<V>: Send + Sync {
    fn to_columns(&self, value: &V) -> Result<Vec<(String, SqlValue)>, MapError>;

    fn from_record(&self, record: &Record) -> Result<V, MapError>;
}
