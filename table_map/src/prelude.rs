//! Convenience re-exports for common table-map usage

// Core traits
pub use crate::traits::{Connection, Driver, Expirable, KeyMapper, KeyValueMap, UpsertStrategy, ValueMapper};

// Error types
pub use crate::errors::MapError;

// Maps and decorators
pub use crate::expiration::{ExpirableMap, ExpiringConnection, ExpiringDriver};
pub use crate::generic_store::{PutOutcome, TableMap};

// Drivers
pub use crate::dialects::{AnyDriver, PostgresDriver, SqliteDriver};

// Table shape and row mapping
pub use crate::descriptor::{ColumnDescriptor, TableDescriptor};
pub use crate::mappers::{ColumnKeyMapper, ColumnValueMapper, SerdeValueMapper};
pub use crate::record::Record;

// Validation
pub use crate::validation::{ValidatedIdentifier, ValidationError};

// Statement building
pub use crate::query_builder::{Command, CommandFabric, Predicate, StatementKind, NOW_PARAMETER};

// Value types
pub use type_mapping::{ColumnType, FromSqlValue, SqlValue};

// Common external dependencies that are frequently used
pub use async_trait::async_trait;
pub use chrono::{DateTime, Utc};
