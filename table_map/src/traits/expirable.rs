//! Trait definitions
//!
//! This module defines the operations of maps whose rows can expire.

use super::core::KeyValueMap;
use crate::errors::MapError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Maps whose rows disappear from reads once their expiration instant passes
#[async_trait]
pub trait Expirable<K, V>: KeyValueMap<K, V>
where
    K: Send + Sync,
    V: Send + Sync,
{
    /// Expire the row `ttl` after now; false when no row matched
    async fn set_relative_expiration(&self, key: &K, ttl: Duration) -> Result<bool, MapError>;

    /// Expire the row at `instant`; false when no row matched
    async fn set_absolute_expiration(
        &self,
        key: &K,
        instant: DateTime<Utc>,
    ) -> Result<bool, MapError>;

    /// Clear the expiration; false when no row matched or none was set
    async fn remove_expiration(&self, key: &K) -> Result<bool, MapError>;

    /// Expiration instant of a visible row
    async fn expiration(&self, key: &K) -> Result<Option<DateTime<Utc>>, MapError>;

    /// Physically delete rows whose expiration has passed
    async fn purge_expired(&self) -> Result<u64, MapError>;
}
