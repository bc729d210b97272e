//! Dialect drivers
//!
//! One driver per SQL engine, plus [`AnyDriver`] which picks one from the
//! configured dialect.

pub mod any;
pub mod postgres;
pub mod sqlite;

pub use any::{AnyConnection, AnyDriver};
pub use postgres::{PostgresConnection, PostgresDriver};
pub use sqlite::{SqliteConnection, SqliteDriver};

use crate::errors::MapError;
use crate::query_builder::Command;
use std::future::Future;
use std::time::Duration;

/// Label used for failures that happen before any table is involved
pub(crate) const POOL_TARGET: &str = "connection pool";

/// Double-quote each dot-separated part, doubling embedded quotes
pub fn quote_identifier(name: &str) -> String {
    name.split('.')
        .map(|part| format!("\"{}\"", part.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

/// Seconds from configuration, where zero means no limit
pub(crate) fn optional_seconds(seconds: u64) -> Option<Duration> {
    (seconds > 0).then(|| Duration::from_secs(seconds))
}

/// Run one statement under the command's timeout
pub(crate) async fn run_with_timeout<T, F>(command: &Command, future: F) -> Result<T, MapError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(command.timeout(), future).await {
        Ok(result) => result
            .map_err(|e| MapError::database_operation(command.table(), command.operation(), e)),
        Err(_) => {
            tracing::warn!(
                "[{}] {} timed out after {:?}",
                command.operation().to_uppercase(),
                command.table(),
                command.timeout()
            );
            Err(MapError::timeout(
                command.table(),
                command.operation(),
                command.timeout(),
            ))
        }
    }
}
