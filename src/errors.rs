//! Error types for the TableHaus crate
//!
//! This module contains all error types that can be returned by TableHaus operations.

use config::ConfigError;
use table_map::MapError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableHausError {
    #[error("Database connection error: {0}")]
    DatabaseConnection(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error("No expiration column configured")]
    ExpirationNotConfigured,

    #[error("Map not found: {0}")]
    MapNotFound(String),

    #[error("Map already registered: {0}")]
    MapAlreadyRegistered(String),
}
