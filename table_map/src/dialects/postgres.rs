//! PostgreSQL driver

use super::{optional_seconds, run_with_timeout, POOL_TARGET};
use crate::descriptor::ColumnDescriptor;
use crate::errors::MapError;
use crate::query_builder::{BoundParameter, Command, StatementKind, StatementTemplate, TemplateCatalog};
use crate::record::Record;
use crate::traits::{Connection, Driver, UpsertStrategy};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use config::{DatabaseConfig, Dialect};
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Executor, Postgres, Row};
use std::sync::Arc;
use std::time::Duration;
use type_mapping::{ColumnType, ConversionError, SqlValue};
use uuid::Uuid;

const DEFAULT_SCHEMA: &str = "public";

#[derive(Clone)]
pub struct PostgresDriver {
    pool: PgPool,
    schema: String,
    command_timeout: Duration,
    catalog: Arc<TemplateCatalog>,
}

impl std::fmt::Debug for PostgresDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresDriver")
            .field("schema", &self.schema)
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}

impl PostgresDriver {
    pub fn new(pool: PgPool, schema: Option<String>, command_timeout: Duration) -> Self {
        Self {
            pool,
            schema: schema.unwrap_or_else(|| DEFAULT_SCHEMA.to_string()),
            command_timeout,
            catalog: Arc::new(TemplateCatalog::for_dialect(Dialect::Postgres)),
        }
    }

    /// Build a lazily connecting pool from configuration
    ///
    /// Every pooled session runs in UTC so that naive timestamps compare
    /// consistently with the instants bound by the crate.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, MapError> {
        if config.dialect != Dialect::Postgres {
            return Err(MapError::configuration(format!(
                "PostgresDriver cannot serve dialect {}",
                config.dialect
            )));
        }

        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .idle_timeout(optional_seconds(config.idle_timeout_seconds))
            .max_lifetime(optional_seconds(config.max_lifetime_seconds))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    conn.execute("SET TIME ZONE 'UTC'").await?;
                    Ok(())
                })
            })
            .connect_lazy(config.connection_string())
            .map_err(|e| MapError::database_operation(POOL_TARGET, "connect", e))?;

        Ok(Self::new(
            pool,
            config.schema.clone(),
            Duration::from_secs(config.command_timeout_seconds),
        ))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Driver for PostgresDriver {
    type Connection = PostgresConnection;

    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn template(&self, kind: StatementKind) -> StatementTemplate {
        self.catalog.get(kind)
    }

    fn parameter_marker(&self, position: usize) -> String {
        format!("${}", position)
    }

    fn type_name(&self, column_type: ColumnType) -> &'static str {
        match column_type {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::BigInt => "BIGINT",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Float => "DOUBLE PRECISION",
            ColumnType::Date => "DATE",
            ColumnType::DateTime => "TIMESTAMP",
            ColumnType::DateTimeOffset => "TIMESTAMPTZ",
            ColumnType::Binary => "BYTEA",
            ColumnType::Uuid => "UUID",
            ColumnType::Json => "JSONB",
        }
    }

    fn default_schema(&self) -> &str {
        &self.schema
    }

    fn command_timeout(&self) -> Duration {
        self.command_timeout
    }

    fn upsert_strategy(&self) -> UpsertStrategy {
        UpsertStrategy::Merge
    }

    async fn create_connection(&self) -> Result<PostgresConnection, MapError> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| MapError::database_operation(POOL_TARGET, "acquire", e))?;
        Ok(PostgresConnection {
            conn,
            timeout: self.command_timeout,
        })
    }
}

/// Pooled PostgreSQL connection, returned to the pool on drop
pub struct PostgresConnection {
    conn: PoolConnection<Postgres>,
    timeout: Duration,
}

#[async_trait]
impl Connection for PostgresConnection {
    fn create_command(&self) -> Command {
        Command::new(self.timeout)
    }

    async fn execute(&mut self, command: &Command) -> Result<u64, MapError> {
        let query = bind_all(command)?;
        let result = run_with_timeout(command, query.execute(&mut *self.conn)).await?;
        Ok(result.rows_affected())
    }

    async fn fetch_all(&mut self, command: &Command) -> Result<Vec<Record>, MapError> {
        let query = bind_all(command)?;
        let rows = run_with_timeout(command, query.fetch_all(&mut *self.conn)).await?;
        rows.iter()
            .map(|row| decode_row(row, command.projection()))
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(|e| MapError::database_operation(command.table(), command.operation(), e))
    }

    async fn close(self) -> Result<(), MapError> {
        drop(self.conn);
        Ok(())
    }
}

fn bind_all(command: &Command) -> Result<Query<'_, Postgres, PgArguments>, MapError> {
    let mut query = sqlx::query(command.text());
    for parameter in command.bound_parameters() {
        query = bind_parameter(query, parameter)?;
    }
    Ok(query)
}

fn bind_parameter<'q>(
    query: Query<'q, Postgres, PgArguments>,
    parameter: &'q BoundParameter,
) -> Result<Query<'q, Postgres, PgArguments>, MapError> {
    let column_type = parameter.column_type();
    let query = match parameter.value() {
        SqlValue::Null => bind_null(query, column_type),
        SqlValue::Text(text) => query.bind(text.as_str()),
        SqlValue::Integer(value) if column_type == Some(ColumnType::Integer) => {
            let narrow = i32::try_from(*value).map_err(|_| ConversionError::OutOfRange {
                value: value.to_string(),
                column_type: ColumnType::Integer,
            })?;
            query.bind(narrow)
        }
        SqlValue::Integer(value) => query.bind(*value),
        SqlValue::Boolean(value) => query.bind(*value),
        SqlValue::Float(value) => query.bind(*value),
        SqlValue::Uuid(value) => query.bind(*value),
        SqlValue::Date(value) => query.bind(*value),
        SqlValue::DateTime(value) if column_type == Some(ColumnType::DateTimeOffset) => {
            query.bind(value.and_utc())
        }
        SqlValue::DateTime(value) => query.bind(*value),
        SqlValue::Timestamp(value) if column_type == Some(ColumnType::DateTime) => {
            query.bind(value.naive_utc())
        }
        SqlValue::Timestamp(value) => query.bind(*value),
        SqlValue::Binary(bytes) => query.bind(bytes.as_slice()),
        SqlValue::Json(value) => query.bind(sqlx::types::Json(value)),
    };
    Ok(query)
}

/// NULL carrying the declared type, so the server can infer the parameter type
fn bind_null<'q>(
    query: Query<'q, Postgres, PgArguments>,
    column_type: Option<ColumnType>,
) -> Query<'q, Postgres, PgArguments> {
    match column_type {
        None | Some(ColumnType::Text) => query.bind(None::<String>),
        Some(ColumnType::Integer) => query.bind(None::<i32>),
        Some(ColumnType::BigInt) => query.bind(None::<i64>),
        Some(ColumnType::Boolean) => query.bind(None::<bool>),
        Some(ColumnType::Float) => query.bind(None::<f64>),
        Some(ColumnType::Date) => query.bind(None::<NaiveDate>),
        Some(ColumnType::DateTime) => query.bind(None::<NaiveDateTime>),
        Some(ColumnType::DateTimeOffset) => query.bind(None::<DateTime<Utc>>),
        Some(ColumnType::Binary) => query.bind(None::<Vec<u8>>),
        Some(ColumnType::Uuid) => query.bind(None::<Uuid>),
        Some(ColumnType::Json) => query.bind(None::<serde_json::Value>),
    }
}

fn decode_row(row: &PgRow, projection: &[ColumnDescriptor]) -> Result<Record, sqlx::Error> {
    let mut record = Record::with_capacity(projection.len());
    for (index, column) in projection.iter().enumerate() {
        let value = match column.column_type() {
            ColumnType::Text => row.try_get::<Option<String>, _>(index)?.map(SqlValue::Text),
            ColumnType::Integer => row
                .try_get::<Option<i32>, _>(index)?
                .map(|v| SqlValue::Integer(v.into())),
            ColumnType::BigInt => row.try_get::<Option<i64>, _>(index)?.map(SqlValue::Integer),
            ColumnType::Boolean => row.try_get::<Option<bool>, _>(index)?.map(SqlValue::Boolean),
            ColumnType::Float => row.try_get::<Option<f64>, _>(index)?.map(SqlValue::Float),
            ColumnType::Date => row.try_get::<Option<NaiveDate>, _>(index)?.map(SqlValue::Date),
            ColumnType::DateTime => row
                .try_get::<Option<NaiveDateTime>, _>(index)?
                .map(SqlValue::DateTime),
            ColumnType::DateTimeOffset => row
                .try_get::<Option<DateTime<Utc>>, _>(index)?
                .map(SqlValue::Timestamp),
            ColumnType::Binary => row.try_get::<Option<Vec<u8>>, _>(index)?.map(SqlValue::Binary),
            ColumnType::Uuid => row.try_get::<Option<Uuid>, _>(index)?.map(SqlValue::Uuid),
            ColumnType::Json => row
                .try_get::<Option<serde_json::Value>, _>(index)?
                .map(SqlValue::Json),
        };
        record.push(column.name(), value.unwrap_or(SqlValue::Null));
    }
    Ok(record)
}
