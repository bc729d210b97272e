//! Driver selected at runtime from the configured dialect

use super::postgres::{PostgresConnection, PostgresDriver};
use super::sqlite::{SqliteConnection, SqliteDriver};
use crate::errors::MapError;
use crate::query_builder::{BoundParameter, Command, StatementKind, StatementTemplate};
use crate::record::Record;
use crate::traits::{Connection, Driver, UpsertStrategy};
use async_trait::async_trait;
use config::{DatabaseConfig, Dialect};
use std::time::Duration;
use type_mapping::{ColumnType, SqlValue};

#[derive(Debug, Clone)]
pub enum AnyDriver {
    Postgres(PostgresDriver),
    Sqlite(SqliteDriver),
}

impl AnyDriver {
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, MapError> {
        match config.dialect {
            Dialect::Postgres => PostgresDriver::from_config(config).map(AnyDriver::Postgres),
            Dialect::Sqlite => SqliteDriver::from_config(config).map(AnyDriver::Sqlite),
        }
    }
}

impl From<PostgresDriver> for AnyDriver {
    fn from(driver: PostgresDriver) -> Self {
        AnyDriver::Postgres(driver)
    }
}

impl From<SqliteDriver> for AnyDriver {
    fn from(driver: SqliteDriver) -> Self {
        AnyDriver::Sqlite(driver)
    }
}

#[async_trait]
impl Driver for AnyDriver {
    type Connection = AnyConnection;

    fn dialect(&self) -> Dialect {
        match self {
            AnyDriver::Postgres(d) => d.dialect(),
            AnyDriver::Sqlite(d) => d.dialect(),
        }
    }

    fn template(&self, kind: StatementKind) -> StatementTemplate {
        match self {
            AnyDriver::Postgres(d) => d.template(kind),
            AnyDriver::Sqlite(d) => d.template(kind),
        }
    }

    fn parse_identifier(&self, name: &str) -> String {
        match self {
            AnyDriver::Postgres(d) => d.parse_identifier(name),
            AnyDriver::Sqlite(d) => d.parse_identifier(name),
        }
    }

    fn parameter_marker(&self, position: usize) -> String {
        match self {
            AnyDriver::Postgres(d) => d.parameter_marker(position),
            AnyDriver::Sqlite(d) => d.parameter_marker(position),
        }
    }

    fn create_parameter(
        &self,
        name: &str,
        value: SqlValue,
        column_type: Option<ColumnType>,
    ) -> BoundParameter {
        match self {
            AnyDriver::Postgres(d) => d.create_parameter(name, value, column_type),
            AnyDriver::Sqlite(d) => d.create_parameter(name, value, column_type),
        }
    }

    fn type_name(&self, column_type: ColumnType) -> &'static str {
        match self {
            AnyDriver::Postgres(d) => d.type_name(column_type),
            AnyDriver::Sqlite(d) => d.type_name(column_type),
        }
    }

    fn default_schema(&self) -> &str {
        match self {
            AnyDriver::Postgres(d) => d.default_schema(),
            AnyDriver::Sqlite(d) => d.default_schema(),
        }
    }

    fn command_timeout(&self) -> Duration {
        match self {
            AnyDriver::Postgres(d) => d.command_timeout(),
            AnyDriver::Sqlite(d) => d.command_timeout(),
        }
    }

    fn upsert_strategy(&self) -> UpsertStrategy {
        match self {
            AnyDriver::Postgres(d) => d.upsert_strategy(),
            AnyDriver::Sqlite(d) => d.upsert_strategy(),
        }
    }

    async fn create_connection(&self) -> Result<AnyConnection, MapError> {
        match self {
            AnyDriver::Postgres(d) => d.create_connection().await.map(AnyConnection::Postgres),
            AnyDriver::Sqlite(d) => d.create_connection().await.map(AnyConnection::Sqlite),
        }
    }
}

pub enum AnyConnection {
    Postgres(PostgresConnection),
    Sqlite(SqliteConnection),
}

#[async_trait]
impl Connection for AnyConnection {
    fn create_command(&self) -> Command {
        match self {
            AnyConnection::Postgres(c) => c.create_command(),
            AnyConnection::Sqlite(c) => c.create_command(),
        }
    }

    async fn execute(&mut self, command: &Command) -> Result<u64, MapError> {
        match self {
            AnyConnection::Postgres(c) => c.execute(command).await,
            AnyConnection::Sqlite(c) => c.execute(command).await,
        }
    }

    async fn fetch_all(&mut self, command: &Command) -> Result<Vec<Record>, MapError> {
        match self {
            AnyConnection::Postgres(c) => c.fetch_all(command).await,
            AnyConnection::Sqlite(c) => c.fetch_all(command).await,
        }
    }

    async fn close(self) -> Result<(), MapError> {
        match self {
            AnyConnection::Postgres(c) => c.close().await,
            AnyConnection::Sqlite(c) => c.close().await,
        }
    }
}
