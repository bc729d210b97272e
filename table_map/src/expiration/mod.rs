//! Time-based row expiration
//!
//! Three decorators cooperate through the [`NOW_PARAMETER`] name:
//! [`ExpiringDriver`] adds a visibility predicate to every read template,
//! [`ExpiringConnection`] stages the current instant on every command, and
//! [`ExpirableMap`] adds the operations that set and clear expirations.
//!
//! [`NOW_PARAMETER`]: crate::query_builder::NOW_PARAMETER

pub mod connection;
pub mod driver;
pub mod map;

pub use connection::ExpiringConnection;
pub use driver::ExpiringDriver;
pub use map::ExpirableMap;
