//! SQLite driver
//!
//! SQLite has no native date types, so date-like values are stored as
//! fixed-width UTC text. Text of that shape sorts in time order, which keeps
//! expiration comparisons correct inside the engine.

use super::{optional_seconds, run_with_timeout, POOL_TARGET};
use crate::descriptor::ColumnDescriptor;
use crate::errors::MapError;
use crate::query_builder::{BoundParameter, Command, StatementKind, StatementTemplate, TemplateCatalog};
use crate::record::Record;
use crate::traits::{Connection, Driver, UpsertStrategy};
use async_trait::async_trait;
use config::{DatabaseConfig, Dialect};
use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use type_mapping::{
    format_date, format_timestamp, parse_date, parse_naive_datetime, parse_timestamp, ColumnType,
    ConversionError, SqlValue,
};
use uuid::Uuid;

const DEFAULT_SCHEMA: &str = "main";

#[derive(Clone)]
pub struct SqliteDriver {
    pool: SqlitePool,
    schema: String,
    command_timeout: Duration,
    catalog: Arc<TemplateCatalog>,
}

impl std::fmt::Debug for SqliteDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteDriver")
            .field("schema", &self.schema)
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}

impl SqliteDriver {
    pub fn new(pool: SqlitePool, schema: Option<String>, command_timeout: Duration) -> Self {
        Self {
            pool,
            schema: schema.unwrap_or_else(|| DEFAULT_SCHEMA.to_string()),
            command_timeout,
            catalog: Arc::new(TemplateCatalog::for_dialect(Dialect::Sqlite)),
        }
    }

    /// Build a lazily connecting pool from configuration
    ///
    /// File databases are created when missing. An in-memory database lives
    /// as long as one pooled connection does, so such pools should keep at
    /// least one connection without idle timeout or lifetime.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, MapError> {
        if config.dialect != Dialect::Sqlite {
            return Err(MapError::configuration(format!(
                "SqliteDriver cannot serve dialect {}",
                config.dialect
            )));
        }

        let options = SqliteConnectOptions::from_str(config.connection_string())
            .map_err(|e| MapError::database_operation(POOL_TARGET, "connect", e))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(optional_seconds(config.idle_timeout_seconds))
            .max_lifetime(optional_seconds(config.max_lifetime_seconds))
            .connect_lazy_with(options);

        Ok(Self::new(
            pool,
            config.schema.clone(),
            Duration::from_secs(config.command_timeout_seconds),
        ))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Driver for SqliteDriver {
    type Connection = SqliteConnection;

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn template(&self, kind: StatementKind) -> StatementTemplate {
        self.catalog.get(kind)
    }

    fn parameter_marker(&self, position: usize) -> String {
        format!("?{}", position)
    }

    fn type_name(&self, column_type: ColumnType) -> &'static str {
        match column_type {
            ColumnType::Integer | ColumnType::BigInt => "INTEGER",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Float => "REAL",
            ColumnType::Binary => "BLOB",
            ColumnType::Text
            | ColumnType::Date
            | ColumnType::DateTime
            | ColumnType::DateTimeOffset
            | ColumnType::Uuid
            | ColumnType::Json => "TEXT",
        }
    }

    fn default_schema(&self) -> &str {
        &self.schema
    }

    fn command_timeout(&self) -> Duration {
        self.command_timeout
    }

    /// SQLite cannot tell an insert from an update in one statement
    fn upsert_strategy(&self) -> UpsertStrategy {
        UpsertStrategy::UpdateThenInsert
    }

    async fn create_connection(&self) -> Result<SqliteConnection, MapError> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| MapError::database_operation(POOL_TARGET, "acquire", e))?;
        Ok(SqliteConnection {
            conn,
            timeout: self.command_timeout,
        })
    }
}

/// Pooled SQLite connection, returned to the pool on drop
pub struct SqliteConnection {
    conn: PoolConnection<Sqlite>,
    timeout: Duration,
}

#[async_trait]
impl Connection for SqliteConnection {
    fn create_command(&self) -> Command {
        Command::new(self.timeout)
    }

    async fn execute(&mut self, command: &Command) -> Result<u64, MapError> {
        let query = bind_all(command);
        let result = run_with_timeout(command, query.execute(&mut *self.conn)).await?;
        Ok(result.rows_affected())
    }

    async fn fetch_all(&mut self, command: &Command) -> Result<Vec<Record>, MapError> {
        let query = bind_all(command);
        let rows = run_with_timeout(command, query.fetch_all(&mut *self.conn)).await?;
        rows.iter()
            .map(|row| decode_row(row, command))
            .collect()
    }

    async fn close(self) -> Result<(), MapError> {
        drop(self.conn);
        Ok(())
    }
}

fn bind_all(command: &Command) -> Query<'_, Sqlite, SqliteArguments<'_>> {
    command
        .bound_parameters()
        .fold(sqlx::query(command.text()), bind_parameter)
}

fn bind_parameter<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    parameter: &'q BoundParameter,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    let as_date = parameter.column_type() == Some(ColumnType::Date);
    match parameter.value() {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Text(text) => query.bind(text.as_str()),
        SqlValue::Integer(value) => query.bind(*value),
        SqlValue::Boolean(value) => query.bind(*value),
        SqlValue::Float(value) => query.bind(*value),
        SqlValue::Uuid(value) => query.bind(value.to_string()),
        SqlValue::Date(value) => query.bind(format_date(*value)),
        SqlValue::DateTime(value) if as_date => query.bind(format_date(value.date())),
        SqlValue::DateTime(value) => query.bind(format_timestamp(value.and_utc())),
        SqlValue::Timestamp(value) if as_date => query.bind(format_date(value.date_naive())),
        SqlValue::Timestamp(value) => query.bind(format_timestamp(*value)),
        SqlValue::Binary(bytes) => query.bind(bytes.as_slice()),
        SqlValue::Json(value) => query.bind(value.to_string()),
    }
}

fn decode_row(row: &SqliteRow, command: &Command) -> Result<Record, MapError> {
    let projection: &[ColumnDescriptor] = command.projection();
    let sql_error = |e: sqlx::Error| MapError::database_operation(command.table(), command.operation(), e);
    let text_at = |index: usize| {
        row.try_get_unchecked::<Option<String>, _>(index)
            .map_err(sql_error)
    };

    let mut record = Record::with_capacity(projection.len());
    for (index, column) in projection.iter().enumerate() {
        let value = match column.column_type() {
            ColumnType::Text => text_at(index)?.map(SqlValue::Text),
            ColumnType::Integer | ColumnType::BigInt => row
                .try_get_unchecked::<Option<i64>, _>(index)
                .map_err(sql_error)?
                .map(SqlValue::Integer),
            ColumnType::Boolean => row
                .try_get_unchecked::<Option<i64>, _>(index)
                .map_err(sql_error)?
                .map(|v| SqlValue::Boolean(v != 0)),
            ColumnType::Float => row
                .try_get_unchecked::<Option<f64>, _>(index)
                .map_err(sql_error)?
                .map(SqlValue::Float),
            ColumnType::Binary => row
                .try_get_unchecked::<Option<Vec<u8>>, _>(index)
                .map_err(sql_error)?
                .map(SqlValue::Binary),
            ColumnType::Date => text_at(index)?
                .map(|t| parse_date(&t).map(SqlValue::Date))
                .transpose()?,
            ColumnType::DateTime => text_at(index)?
                .map(|t| parse_naive_datetime(&t).map(SqlValue::DateTime))
                .transpose()?,
            ColumnType::DateTimeOffset => text_at(index)?
                .map(|t| parse_timestamp(&t).map(SqlValue::Timestamp))
                .transpose()?,
            ColumnType::Uuid => text_at(index)?
                .map(|t| {
                    Uuid::parse_str(&t)
                        .map(SqlValue::Uuid)
                        .map_err(|_| ConversionError::Unparseable {
                            text: t.clone(),
                            column_type: ColumnType::Uuid,
                        })
                })
                .transpose()?,
            ColumnType::Json => text_at(index)?
                .map(|t| {
                    serde_json::from_str(&t)
                        .map(SqlValue::Json)
                        .map_err(|e| ConversionError::Serialization(e.to_string()))
                })
                .transpose()?,
        };
        record.push(column.name(), value.unwrap_or(SqlValue::Null));
    }
    Ok(record)
}
