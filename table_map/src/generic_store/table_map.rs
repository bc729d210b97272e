//! Generic store implementations
//!
//! Each operation acquires one connection, builds and runs one command, and
//! lets the connection return to its pool when it goes out of scope.

use super::core::{PutOutcome, TableMap};
use crate::errors::MapError;
use crate::query_builder::Paging;
use crate::record::Record;
use crate::traits::{Connection, Driver, KeyValueMap, UpsertStrategy};
use async_trait::async_trait;
use type_mapping::SqlValue;

fn count_from(value: Option<SqlValue>, table: &str) -> Result<u64, MapError> {
    let count = value.and_then(|v| v.as_i64()).unwrap_or(0);
    u64::try_from(count)
        .map_err(|_| MapError::mapping(format!("negative row count {} from {}", count, table)))
}

impl<K, V, D> TableMap<K, V, D>
where
    K: Send + Sync,
    V: Send + Sync,
    D: Driver,
{
    pub(crate) async fn put_with(
        &self,
        key: &K,
        value: &V,
        extra: &[(String, SqlValue)],
    ) -> Result<PutOutcome, MapError> {
        let filter = self.key_filter(key)?;
        let mut assignments = self.value_columns(value)?;
        assignments.extend(extra.iter().cloned());

        let mut conn = self.driver.create_connection().await?;
        match self.driver.upsert_strategy() {
            UpsertStrategy::Merge => {
                let row: Vec<_> = filter.iter().chain(&assignments).cloned().collect();
                let command = self.fabric().merge(self.prepare(&conn), &row)?;
                let inserted = conn
                    .fetch_scalar(&command)
                    .await?
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false);
                Ok(if inserted {
                    PutOutcome::Created
                } else {
                    PutOutcome::Replaced
                })
            }
            UpsertStrategy::UpdateThenInsert => {
                // A key-only table still needs something to assign
                let targets = if assignments.is_empty() {
                    &filter
                } else {
                    &assignments
                };
                let command = self
                    .fabric()
                    .update(self.prepare(&conn), &filter, targets, &[])?;
                if conn.execute(&command).await? > 0 {
                    return Ok(PutOutcome::Replaced);
                }

                let row: Vec<_> = filter.iter().chain(&assignments).cloned().collect();
                let command = self.fabric().insert(self.prepare(&conn), &row)?;
                conn.execute(&command).await?;
                Ok(PutOutcome::Created)
            }
        }
    }

    /// Insert or overwrite in one merge statement, without reporting which
    pub async fn upsert(&self, key: &K, value: &V) -> Result<(), MapError> {
        self.upsert_with(key, value, &[]).await
    }

    pub(crate) async fn upsert_with(
        &self,
        key: &K,
        value: &V,
        extra: &[(String, SqlValue)],
    ) -> Result<(), MapError> {
        let filter = self.key_filter(key)?;
        let assignments = self.value_columns(value)?;
        let row: Vec<_> = filter
            .into_iter()
            .chain(assignments)
            .chain(extra.iter().cloned())
            .collect();

        let mut conn = self.driver.create_connection().await?;
        let command = self.fabric().merge(self.prepare(&conn), &row)?;
        conn.execute(&command).await?;
        Ok(())
    }

    /// Entries in primary key order, skipping `skip` and returning at most `take`
    pub async fn page(&self, skip: u64, take: u64) -> Result<Vec<(K, V)>, MapError> {
        let mut conn = self.driver.create_connection().await?;
        let command = self
            .fabric()
            .select_page(self.prepare(&conn), Paging::new(skip, take))?;
        let records = conn.fetch_all(&command).await?;
        self.decode_entries(&records)
    }

    /// Distinct values of one column, ordered
    pub async fn distinct(&self, column: &str) -> Result<Vec<SqlValue>, MapError> {
        let mut conn = self.driver.create_connection().await?;
        let command = self.fabric().distinct(self.prepare(&conn), column, None)?;
        let records = conn.fetch_all(&command).await?;
        Ok(first_values(records))
    }

    pub async fn distinct_page(
        &self,
        column: &str,
        skip: u64,
        take: u64,
    ) -> Result<Vec<SqlValue>, MapError> {
        let mut conn = self.driver.create_connection().await?;
        let command = self.fabric().distinct(
            self.prepare(&conn),
            column,
            Some(Paging::new(skip, take)),
        )?;
        let records = conn.fetch_all(&command).await?;
        Ok(first_values(records))
    }

    pub async fn distinct_count(&self, column: &str) -> Result<u64, MapError> {
        let mut conn = self.driver.create_connection().await?;
        let command = self.fabric().distinct_count(self.prepare(&conn), column)?;
        let value = conn.fetch_scalar(&command).await?;
        count_from(value, self.table.name())
    }

    /// Create the table when it does not exist yet
    pub async fn ensure_table(&self) -> Result<(), MapError> {
        let mut conn = self.driver.create_connection().await?;
        let command = self.fabric().create_table(self.prepare(&conn))?;
        conn.execute(&command).await?;
        tracing::debug!("[ENSURE_TABLE] Table: {}", self.table.name());
        Ok(())
    }

    fn decode_entries(&self, records: &[Record]) -> Result<Vec<(K, V)>, MapError> {
        records
            .iter()
            .map(|record| {
                Ok((
                    self.keys.from_record(record)?,
                    self.values.from_record(record)?,
                ))
            })
            .collect()
    }
}

fn first_values(records: Vec<Record>) -> Vec<SqlValue> {
    records
        .into_iter()
        .map(|record| record.first().cloned().unwrap_or(SqlValue::Null))
        .collect()
}

#[async_trait]
impl<K, V, D> KeyValueMap<K, V> for TableMap<K, V, D>
where
    K: Send + Sync,
    V: Send + Sync,
    D: Driver,
{
    async fn get(&self, key: &K) -> Result<Option<V>, MapError> {
        let filter = self.key_filter(key)?;
        let mut conn = self.driver.create_connection().await?;
        let command = self.fabric().select_one(self.prepare(&conn), &filter)?;
        let record = conn.fetch_optional(&command).await?;
        record.map(|r| self.values.from_record(&r)).transpose()
    }

    async fn put(&self, key: &K, value: &V) -> Result<PutOutcome, MapError> {
        self.put_with(key, value, &[]).await
    }

    async fn remove(&self, key: &K) -> Result<bool, MapError> {
        let filter = self.key_filter(key)?;
        let mut conn = self.driver.create_connection().await?;
        let command = self.fabric().delete(self.prepare(&conn), &filter, &[])?;
        Ok(conn.execute(&command).await? > 0)
    }

    async fn contains_key(&self, key: &K) -> Result<bool, MapError> {
        let filter = self.key_filter(key)?;
        let mut conn = self.driver.create_connection().await?;
        let command = self.fabric().exists(self.prepare(&conn), &filter)?;
        let value = conn.fetch_scalar(&command).await?;
        Ok(value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    async fn count(&self) -> Result<u64, MapError> {
        let mut conn = self.driver.create_connection().await?;
        let command = self.fabric().count(self.prepare(&conn))?;
        let value = conn.fetch_scalar(&command).await?;
        count_from(value, self.table.name())
    }

    async fn entries(&self) -> Result<Vec<(K, V)>, MapError> {
        let mut conn = self.driver.create_connection().await?;
        let command = self.fabric().select_all(self.prepare(&conn))?;
        let records = conn.fetch_all(&command).await?;
        self.decode_entries(&records)
    }

    async fn keys(&self) -> Result<Vec<K>, MapError> {
        let mut conn = self.driver.create_connection().await?;
        let command = self.fabric().select_keys(self.prepare(&conn))?;
        let records = conn.fetch_all(&command).await?;
        records
            .iter()
            .map(|record| self.keys.from_record(record))
            .collect()
    }

    async fn clear(&self) -> Result<u64, MapError> {
        let mut conn = self.driver.create_connection().await?;
        let command = self.fabric().delete(self.prepare(&conn), &[], &[])?;
        conn.execute(&command).await
    }
}
