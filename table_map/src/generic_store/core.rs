use crate::descriptor::TableDescriptor;
use crate::errors::MapError;
use crate::query_builder::{Command, CommandFabric};
use crate::traits::{Connection, Driver, KeyMapper, ValueMapper};
use std::sync::Arc;
use std::time::Duration;
use type_mapping::SqlValue;

/// Whether a `put` wrote a new row or overwrote an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Created,
    Replaced,
}

/// Key/value map stored in one table, reached through a dialect driver
pub struct TableMap<K, V, D: Driver> {
    pub(crate) driver: Arc<D>,
    pub(crate) table: Arc<TableDescriptor>,
    pub(crate) keys: Arc<dyn KeyMapper<K>>,
    pub(crate) values: Arc<dyn ValueMapper<V>>,
    pub(crate) command_timeout: Option<Duration>,
}

impl<K, V, D: Driver> Clone for TableMap<K, V, D> {
    fn clone(&self) -> Self {
        Self {
            driver: Arc::clone(&self.driver),
            table: Arc::clone(&self.table),
            keys: Arc::clone(&self.keys),
            values: Arc::clone(&self.values),
            command_timeout: self.command_timeout,
        }
    }
}

impl<K, V, D: Driver> std::fmt::Debug for TableMap<K, V, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableMap")
            .field("table", &self.table.name())
            .field("dialect", &self.driver.dialect())
            .field("command_timeout", &self.command_timeout())
            .finish()
    }
}

impl<K, V, D: Driver> TableMap<K, V, D> {
    pub fn new(
        driver: Arc<D>,
        table: Arc<TableDescriptor>,
        keys: impl KeyMapper<K> + 'static,
        values: impl ValueMapper<V> + 'static,
    ) -> Self {
        Self::from_parts(driver, table, Arc::new(keys), Arc::new(values))
    }

    pub fn from_parts(
        driver: Arc<D>,
        table: Arc<TableDescriptor>,
        keys: Arc<dyn KeyMapper<K>>,
        values: Arc<dyn ValueMapper<V>>,
    ) -> Self {
        Self {
            driver,
            table,
            keys,
            values,
            command_timeout: None,
        }
    }

    /// Override the driver's command timeout for this map
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
            .unwrap_or_else(|| self.driver.command_timeout())
    }

    pub fn driver(&self) -> &Arc<D> {
        &self.driver
    }

    pub fn table(&self) -> &Arc<TableDescriptor> {
        &self.table
    }

    /// Same table and mappers, reached through another driver
    pub fn map_driver<D2: Driver>(&self, driver: Arc<D2>) -> TableMap<K, V, D2> {
        TableMap {
            driver,
            table: Arc::clone(&self.table),
            keys: Arc::clone(&self.keys),
            values: Arc::clone(&self.values),
            command_timeout: self.command_timeout,
        }
    }

    pub(crate) fn fabric(&self) -> CommandFabric<'_, D> {
        CommandFabric::new(self.driver.as_ref(), self.table.as_ref())
    }

    /// Fresh command on `conn`, carrying this map's timeout
    pub(crate) fn prepare(&self, conn: &D::Connection) -> Command {
        let mut command = conn.create_command();
        if let Some(timeout) = self.command_timeout {
            command.set_timeout(timeout);
        }
        command
    }

    pub(crate) fn key_filter(&self, key: &K) -> Result<Vec<(String, SqlValue)>, MapError> {
        let filter = self.keys.to_filter(key)?;
        if filter.is_empty() {
            return Err(MapError::mapping(format!(
                "key mapper produced no column for table {}",
                self.table.name()
            )));
        }
        Ok(filter)
    }

    /// Value columns, without any column the key already supplies
    pub(crate) fn value_columns(&self, value: &V) -> Result<Vec<(String, SqlValue)>, MapError> {
        let mut columns = self.values.to_columns(value)?;
        columns.retain(|(name, _)| !self.table.is_key_column(name));
        Ok(columns)
    }
}
