use super::driver::ExpiringDriver;
use crate::descriptor::ColumnDescriptor;
use crate::errors::MapError;
use crate::generic_store::{PutOutcome, TableMap};
use crate::query_builder::{Predicate, NOW_PARAMETER};
use crate::traits::{Connection, Driver, Expirable, KeyValueMap};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use config::ExpirationConfig;
use std::sync::Arc;
use std::time::Duration;
use type_mapping::SqlValue;

/// Map whose rows can be given an expiration instant
///
/// Expired rows stay in the table but no read through this map sees them.
/// They disappear for good when removed, purged or overwritten by `put`,
/// which clears the expiration of the row it writes.
pub struct ExpirableMap<K, V, D: Driver> {
    inner: TableMap<K, V, ExpiringDriver<D>>,
    column: ColumnDescriptor,
}

impl<K, V, D: Driver> Clone for ExpirableMap<K, V, D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            column: self.column.clone(),
        }
    }
}

impl<K, V, D: Driver> std::fmt::Debug for ExpirableMap<K, V, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpirableMap")
            .field("table", &self.inner.table().name())
            .field("expiration_column", &self.column.name())
            .finish()
    }
}

impl<K, V, D: Driver> ExpirableMap<K, V, D> {
    /// Wrap `map`, expiring rows through `column`
    ///
    /// Fails when the table has no such column or its type is not date-like.
    pub fn new(map: TableMap<K, V, D>, column: &str) -> Result<Self, MapError> {
        let table = map.table();
        let descriptor = match table.column(column) {
            Some(descriptor) if descriptor.column_type().is_date_like() => descriptor.clone(),
            Some(descriptor) => {
                tracing::warn!(
                    "[EXPIRATION] Column {}.{} has type {}, not a date type",
                    table.name(),
                    column,
                    descriptor.column_type()
                );
                return Err(MapError::configuration(format!(
                    "expiration column '{}' on {} has type {}; date, datetime or datetime_offset required",
                    column,
                    table.name(),
                    descriptor.column_type()
                )));
            }
            None => {
                tracing::warn!("[EXPIRATION] Column {}.{} does not exist", table.name(), column);
                return Err(MapError::configuration(format!(
                    "expiration column '{}' does not exist on {}",
                    column,
                    table.name()
                )));
            }
        };

        if !descriptor.is_nullable() {
            tracing::warn!(
                "[EXPIRATION] Column {}.{} is NOT NULL; rows cannot be left unexpired",
                table.name(),
                column
            );
        }
        tracing::debug!(
            "[EXPIRATION] Table {} expires rows through {}",
            table.name(),
            column
        );

        let driver = Arc::new(ExpiringDriver::new(Arc::clone(map.driver()), column));
        Ok(Self {
            inner: map.map_driver(driver),
            column: descriptor,
        })
    }

    pub fn from_config(map: TableMap<K, V, D>, config: &ExpirationConfig) -> Result<Self, MapError> {
        Self::new(map, &config.column)
    }

    pub fn expiration_column(&self) -> &str {
        self.column.name()
    }

    /// The underlying map, already reading through the expiring driver
    ///
    /// Writes made through it leave the expiration column alone; use
    /// [`ExpirableMap::upsert`] to overwrite and clear it in one statement.
    pub fn as_map(&self) -> &TableMap<K, V, ExpiringDriver<D>> {
        &self.inner
    }

    fn expiration_value(&self, instant: DateTime<Utc>) -> Vec<(String, SqlValue)> {
        vec![(
            self.column.name().to_string(),
            SqlValue::coerce_instant(instant, self.column.column_type()),
        )]
    }

    fn cleared(&self) -> Vec<(String, SqlValue)> {
        vec![(self.column.name().to_string(), SqlValue::Null)]
    }
}

impl<K, V, D> ExpirableMap<K, V, D>
where
    K: Send + Sync,
    V: Send + Sync,
    D: Driver,
{
    /// Insert or overwrite in one merge statement, clearing any expiration
    pub async fn upsert(&self, key: &K, value: &V) -> Result<(), MapError> {
        self.inner.upsert_with(key, value, &self.cleared()).await
    }
}

#[async_trait]
impl<K, V, D> KeyValueMap<K, V> for ExpirableMap<K, V, D>
where
    K: Send + Sync,
    V: Send + Sync,
    D: Driver,
{
    async fn get(&self, key: &K) -> Result<Option<V>, MapError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &K, value: &V) -> Result<PutOutcome, MapError> {
        self.inner.put_with(key, value, &self.cleared()).await
    }

    /// Deletes the row even when it has already expired
    async fn remove(&self, key: &K) -> Result<bool, MapError> {
        self.inner.remove(key).await
    }

    async fn contains_key(&self, key: &K) -> Result<bool, MapError> {
        self.inner.contains_key(key).await
    }

    async fn count(&self) -> Result<u64, MapError> {
        self.inner.count().await
    }

    async fn entries(&self) -> Result<Vec<(K, V)>, MapError> {
        self.inner.entries().await
    }

    async fn keys(&self) -> Result<Vec<K>, MapError> {
        self.inner.keys().await
    }

    async fn clear(&self) -> Result<u64, MapError> {
        self.inner.clear().await
    }
}

#[async_trait]
impl<K, V, D> Expirable<K, V> for ExpirableMap<K, V, D>
where
    K: Send + Sync,
    V: Send + Sync,
    D: Driver,
{
    async fn set_relative_expiration(&self, key: &K, ttl: Duration) -> Result<bool, MapError> {
        let ttl = TimeDelta::from_std(ttl)
            .map_err(|_| MapError::InvalidArgument(format!("ttl {:?} is out of range", ttl)))?;
        let filter = self.inner.key_filter(key)?;

        let mut conn = self.inner.driver().create_connection().await?;
        let command = self.inner.prepare(&conn);
        // Same instant the command's own visibility checks use
        let now = command
            .now()
            .ok_or_else(|| MapError::MissingParameter(NOW_PARAMETER.to_string()))?;
        let instant = now.checked_add_signed(ttl).ok_or_else(|| {
            MapError::InvalidArgument(format!("now + {} overflows", ttl))
        })?;

        let command = self.inner.fabric().update(
            command,
            &filter,
            &self.expiration_value(instant),
            &[],
        )?;
        Ok(conn.execute(&command).await? > 0)
    }

    async fn set_absolute_expiration(
        &self,
        key: &K,
        instant: DateTime<Utc>,
    ) -> Result<bool, MapError> {
        let filter = self.inner.key_filter(key)?;
        let mut conn = self.inner.driver().create_connection().await?;
        let command = self.inner.fabric().update(
            self.inner.prepare(&conn),
            &filter,
            &self.expiration_value(instant),
            &[],
        )?;
        Ok(conn.execute(&command).await? > 0)
    }

    async fn remove_expiration(&self, key: &K) -> Result<bool, MapError> {
        let filter = self.inner.key_filter(key)?;
        let mut conn = self.inner.driver().create_connection().await?;
        let command = self.inner.fabric().update(
            self.inner.prepare(&conn),
            &filter,
            &self.cleared(),
            &[Predicate::not_null(self.column.name())],
        )?;
        Ok(conn.execute(&command).await? > 0)
    }

    async fn expiration(&self, key: &K) -> Result<Option<DateTime<Utc>>, MapError> {
        let filter = self.inner.key_filter(key)?;
        let mut conn = self.inner.driver().create_connection().await?;
        let command = self.inner.fabric().select_column(
            self.inner.prepare(&conn),
            &filter,
            self.column.name(),
        )?;
        let value = conn.fetch_scalar(&command).await?;
        Ok(value.and_then(|v| v.as_timestamp()))
    }

    async fn purge_expired(&self) -> Result<u64, MapError> {
        let mut conn = self.inner.driver().create_connection().await?;
        let command = self.inner.fabric().delete(
            self.inner.prepare(&conn),
            &[],
            &[Predicate::at_or_before(self.column.name(), NOW_PARAMETER)],
        )?;
        let purged = conn.execute(&command).await?;
        tracing::debug!(
            "[PURGE_EXPIRED] Table: {}, rows: {}",
            self.inner.table().name(),
            purged
        );
        Ok(purged)
    }
}
