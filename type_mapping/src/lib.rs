//! Unified type mapping between Rust values and relational columns
//! This crate provides the value model shared by every dialect driver in the tablehaus ecosystem

pub mod convert;
pub mod serialize;
pub mod sql;
pub mod types;
pub mod validate;

pub use convert::FromSqlValue;
pub use serialize::{deserialize_from_columns, serialize_to_columns};
pub use sql::{format_date, format_timestamp, parse_date, parse_naive_datetime, parse_timestamp};
pub use types::{ColumnType, ConversionError, SqlValue};
pub use validate::is_compatible;
