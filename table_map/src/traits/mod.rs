//! Trait definitions
//!
//! This module contains the capability contracts a map is built from: the
//! dialect driver, its connections, the key/value mappers and the public map
//! operations.

pub mod connection;
pub mod core;
pub mod driver;
pub mod expirable;
pub mod mapper;

// Re-export all public items for convenience
pub use connection::Connection;
pub use core::KeyValueMap;
pub use driver::{Driver, UpsertStrategy};
pub use expirable::Expirable;
pub use mapper::{KeyMapper, ValueMapper};
