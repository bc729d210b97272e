//! Table Map - Core key/value persistence layer for TableHaus
//!
//! This crate maps typed keys and values onto rows of one relational table
//! through a pluggable dialect driver, and provides the decorators that add
//! time-based row expiration to any driver without touching the base map.

/// Conditional debug logging macros
/// These macros only compile in code when the `debug-logging` feature is enabled
#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "debug-logging")]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "debug-logging"))]
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

pub mod descriptor;
pub mod dialects;
pub mod errors;
pub mod expiration;
pub mod generic_store;
pub mod mappers;
pub mod prelude;
pub mod query_builder;
pub mod record;
pub mod traits;
pub mod validation;

pub use descriptor::{ColumnDescriptor, TableDescriptor, TableDescriptorBuilder};
pub use dialects::{AnyConnection, AnyDriver, PostgresDriver, SqliteDriver};
pub use errors::MapError;
pub use expiration::{ExpirableMap, ExpiringConnection, ExpiringDriver};
pub use generic_store::{PutOutcome, TableMap};
pub use mappers::{ColumnKeyMapper, ColumnValueMapper, SerdeValueMapper};
pub use query_builder::{
    BoundParameter, Command, CommandFabric, Paging, Predicate, StatementKind, StatementTemplate,
    NOW_PARAMETER,
};
pub use record::Record;
pub use traits::*;
pub use validation::{ValidatedIdentifier, ValidationError};

pub use type_mapping::{ColumnType, FromSqlValue, SqlValue};
