use crate::errors::MapError;
use crate::query_builder::{BoundParameter, Command, NOW_PARAMETER};
use crate::record::Record;
use crate::traits::Connection;
use async_trait::async_trait;
use chrono::Utc;
use type_mapping::{ColumnType, SqlValue};

/// Connection whose commands all carry the instant they were created at
pub struct ExpiringConnection<C> {
    inner: C,
}

impl<C: Connection> ExpiringConnection<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

#[async_trait]
impl<C: Connection> Connection for ExpiringConnection<C> {
    fn create_command(&self) -> Command {
        let mut command = self.inner.create_command();
        command.add_parameter(BoundParameter::new(
            NOW_PARAMETER,
            SqlValue::Timestamp(Utc::now()),
            Some(ColumnType::DateTimeOffset),
        ));
        command
    }

    async fn execute(&mut self, command: &Command) -> Result<u64, MapError> {
        self.inner.execute(command).await
    }

    async fn fetch_all(&mut self, command: &Command) -> Result<Vec<Record>, MapError> {
        self.inner.fetch_all(command).await
    }

    async fn fetch_optional(&mut self, command: &Command) -> Result<Option<Record>, MapError> {
        self.inner.fetch_optional(command).await
    }

    async fn fetch_scalar(&mut self, command: &Command) -> Result<Option<SqlValue>, MapError> {
        self.inner.fetch_scalar(command).await
    }

    async fn close(self) -> Result<(), MapError> {
        self.inner.close().await
    }
}
