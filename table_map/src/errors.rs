use crate::validation::ValidationError;
use std::time::Duration;
use thiserror::Error;
use type_mapping::ConversionError;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid identifier: {0}")]
    Validation(#[from] ValidationError),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Command references parameter '{0}' that was never bound")]
    MissingParameter(String),

    #[error("Mapping error: {0}")]
    Mapping(String),

    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Database error during {operation} on {table}: {source}")]
    Database {
        operation: &'static str,
        table: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("{operation} on {table} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        table: String,
        timeout: Duration,
    },
}

impl MapError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn template(message: impl Into<String>) -> Self {
        Self::Template(message.into())
    }

    pub fn mapping(message: impl Into<String>) -> Self {
        Self::Mapping(message.into())
    }

    pub fn database_operation(table: &str, operation: &'static str, source: sqlx::Error) -> Self {
        Self::Database {
            operation,
            table: table.to_string(),
            source,
        }
    }

    pub fn timeout(table: &str, operation: &'static str, timeout: Duration) -> Self {
        Self::Timeout {
            operation,
            table: table.to_string(),
            timeout,
        }
    }

    /// Whether the failure came from the storage engine or the connection to it
    pub fn is_data_access(&self) -> bool {
        matches!(self, Self::Database { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
