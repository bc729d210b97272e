//! Convenience re-exports for common TableHaus usage
//!
//! This prelude module re-exports the most commonly used items from the TableHaus ecosystem,
//! making it easier to import everything you need with a single use statement.
//!
//! # Example
//!
//! ```rust
//! use tablehaus::prelude::*;
//!
//! // Maps, drivers, descriptors and the key/value traits are now in scope
//! ```

// Core TableHaus components
pub use crate::core::TableHaus;
pub use crate::errors::TableHausError;

// Re-export centralized config
pub use config::{AppConfig, DatabaseConfig, Dialect, ExpirationConfig};

// Re-export commonly used table-map types for convenience
pub use table_map::prelude::*;

// Common external dependencies
pub use sqlx;
pub use tokio;
pub use uuid::Uuid;
