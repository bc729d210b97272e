//! Table bootstrap
//!
//! Creates the table behind a map when it is missing. Existing tables are
//! left untouched; altering them is out of scope.

use table_map::{Connection, CommandFabric, Driver, KeyValueMap, TableDescriptor};

use crate::core::TableHaus;
use crate::errors::TableHausError;

impl TableHaus {
    /// Create the table described by `table` if it does not exist yet
    pub async fn ensure_table(&self, table: &TableDescriptor) -> Result<(), TableHausError> {
        let driver = self.driver();
        let mut conn = driver.create_connection().await?;
        let command = CommandFabric::new(driver.as_ref(), table).create_table(conn.create_command())?;

        crate::debug_log!("[ENSURE_TABLE] Table: {}", table.name());
        conn.execute(&command).await?;
        Ok(())
    }

    /// Ensure the map's table exists, then register the map
    pub async fn register_map_with_table<K, V, M>(
        &mut self,
        name: String,
        table: &TableDescriptor,
        map: M,
    ) -> Result<(), TableHausError>
    where
        M: KeyValueMap<K, V> + 'static,
        K: Send + Sync,
        V: Send + Sync,
    {
        self.ensure_table(table).await?;
        self.register_map(name, map)
    }
}
