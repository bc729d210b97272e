//! Trait definitions
//!
//! This module defines the key/value operations every map exposes.

use crate::errors::MapError;
use crate::generic_store::PutOutcome;
use async_trait::async_trait;

/// Key/value store backed by one table
#[async_trait]
pub trait KeyValueMap<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    /// Get the value stored under a key
    async fn get(&self, key: &K) -> Result<Option<V>, MapError>;

    /// Store a value, reporting whether the row was created or replaced
    async fn put(&self, key: &K, value: &V) -> Result<PutOutcome, MapError>;

    /// Delete the row for a key
    async fn remove(&self, key: &K) -> Result<bool, MapError>;

    async fn contains_key(&self, key: &K) -> Result<bool, MapError>;

    /// Count visible rows
    async fn count(&self) -> Result<u64, MapError>;

    /// All visible entries, ordered by primary key
    async fn entries(&self) -> Result<Vec<(K, V)>, MapError>;

    async fn keys(&self) -> Result<Vec<K>, MapError>;

    /// Delete every row of the table
    async fn clear(&self) -> Result<u64, MapError>;
}
