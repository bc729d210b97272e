use super::connection::Connection;
use crate::errors::MapError;
use crate::query_builder::{BoundParameter, StatementKind, StatementTemplate};
use async_trait::async_trait;
use config::Dialect;
use std::time::Duration;
use type_mapping::{ColumnType, SqlValue};

/// How a driver reports whether a `put` created or replaced its row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertStrategy {
    /// One merge statement that returns an `inserted` flag
    Merge,
    /// An update, followed by an insert on the same connection when no row matched
    UpdateThenInsert,
}

/// Dialect driver contract
///
/// Decorators implement this trait too, so anything written against a
/// `Driver` accepts a decorated driver without knowing it.
#[async_trait]
pub trait Driver: Send + Sync {
    type Connection: Connection;

    fn dialect(&self) -> Dialect;

    /// Statement skeleton for one operation kind
    fn template(&self, kind: StatementKind) -> StatementTemplate;

    /// Escape a possibly schema-qualified identifier, each dotted part on its own
    fn parse_identifier(&self, name: &str) -> String {
        crate::dialects::quote_identifier(name)
    }

    /// Text referencing the parameter bound at `position` (1-based)
    fn parameter_marker(&self, position: usize) -> String;

    fn create_parameter(
        &self,
        name: &str,
        value: SqlValue,
        column_type: Option<ColumnType>,
    ) -> BoundParameter {
        BoundParameter::new(name, value, column_type)
    }

    /// Column type as written in DDL for this dialect
    fn type_name(&self, column_type: ColumnType) -> &'static str;

    fn default_schema(&self) -> &str;

    fn command_timeout(&self) -> Duration;

    fn upsert_strategy(&self) -> UpsertStrategy;

    async fn create_connection(&self) -> Result<Self::Connection, MapError>;
}
