//! # TableHaus
//!
//! Typed key/value maps stored in one relational table, for PostgreSQL and
//! SQLite. Rows can be given an expiration instant; expired rows stay in the
//! table but disappear from every read.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tablehaus::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::from_toml_str(
//!         r#"
//!         [database]
//!         dialect = "sqlite"
//!         url = "sqlite://sessions.db"
//!         min_connections = 1
//!         max_connections = 4
//!         connection_timeout_seconds = 30
//!         idle_timeout_seconds = 600
//!         max_lifetime_seconds = 3600
//!         command_timeout_seconds = 30
//!
//!         [expiration]
//!         column = "expires"
//!         "#,
//!     )?;
//!     let tablehaus = TableHaus::from_config(config)?;
//!
//!     let table = Arc::new(
//!         TableDescriptor::builder("sessions")
//!             .key_column("id", ColumnType::Integer)
//!             .column("user_name", ColumnType::Text)
//!             .nullable_column("expires", ColumnType::DateTimeOffset)
//!             .build()?,
//!     );
//!     tablehaus.ensure_table(&table).await?;
//!
//!     let sessions = tablehaus.expirable_map(
//!         table,
//!         ColumnKeyMapper::<i32>::new("id"),
//!         ColumnValueMapper::<String>::new("user_name"),
//!     )?;
//!
//!     sessions.put(&1, &"ada".to_string()).await?;
//!     sessions.set_relative_expiration(&1, Duration::from_secs(900)).await?;
//!     println!("session: {:?}", sessions.get(&1).await?);
//!
//!     Ok(())
//! }
//! ```

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

pub mod core;
pub mod errors;
pub mod migration;
pub mod prelude;

// Re-export the main public types for convenience
pub use core::TableHaus;
pub use errors::TableHausError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, Dialect, ExpirationConfig};

// Re-export member crates used by the public API
pub use table_map;
pub use type_mapping;

// Re-export external dependencies used in public API
pub use async_trait;
pub use sqlx;
