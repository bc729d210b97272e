use crate::errors::MapError;
use crate::query_builder::Command;
use crate::record::Record;
use async_trait::async_trait;
use type_mapping::SqlValue;

/// A live connection handed out by a [`Driver`](super::Driver)
///
/// Dropping the connection returns it to its pool.
#[async_trait]
pub trait Connection: Send {
    /// Start a fresh command carrying this connection's timeout
    fn create_command(&self) -> Command;

    /// Run a statement, returning the number of affected rows
    async fn execute(&mut self, command: &Command) -> Result<u64, MapError>;

    async fn fetch_all(&mut self, command: &Command) -> Result<Vec<Record>, MapError>;

    async fn fetch_optional(&mut self, command: &Command) -> Result<Option<Record>, MapError> {
        Ok(self.fetch_all(command).await?.into_iter().next())
    }

    /// First column of the first row, if any
    async fn fetch_scalar(&mut self, command: &Command) -> Result<Option<SqlValue>, MapError> {
        Ok(self
            .fetch_optional(command)
            .await?
            .and_then(|record| record.first().cloned()))
    }

    async fn close(self) -> Result<(), MapError>;
}
