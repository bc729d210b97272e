//! Core TableHaus functionality
//!
//! This module contains the main TableHaus struct and its implementation,
//! which owns the configured driver, builds maps on it and keeps a registry
//! of named maps.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use config::{AppConfig, DatabaseConfig, ExpirationConfig};
use table_map::{
    AnyDriver, ExpirableMap, KeyMapper, KeyValueMap, TableDescriptor, TableMap, ValueMapper,
};

use crate::errors::TableHausError;

/// Main TableHaus coordinator that owns the driver and named maps
pub struct TableHaus {
    driver: Arc<AnyDriver>,
    expiration: Option<ExpirationConfig>,
    maps: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl TableHaus {
    /// Create new TableHaus for one database
    ///
    /// The pool connects lazily; call [`TableHaus::health_check`] to verify
    /// the database is reachable.
    pub fn new(config: DatabaseConfig) -> Result<Self, TableHausError> {
        config.validate()?;
        let driver = AnyDriver::from_config(&config)?;
        tracing::debug!(
            "[TABLEHAUS] Driver ready, dialect: {}",
            config.dialect
        );

        Ok(Self {
            driver: Arc::new(driver),
            expiration: None,
            maps: HashMap::new(),
        })
    }

    /// Create new TableHaus from a full application configuration
    pub fn from_config(config: AppConfig) -> Result<Self, TableHausError> {
        config.validate()?;
        let mut tablehaus = Self::new(config.database)?;
        tablehaus.expiration = config.expiration;
        Ok(tablehaus)
    }

    /// Load configuration the way [`AppConfig::load`] does and build from it
    pub fn load() -> Result<Self, TableHausError> {
        Self::from_config(AppConfig::load()?)
    }

    /// Get the shared driver
    pub fn driver(&self) -> &Arc<AnyDriver> {
        &self.driver
    }

    /// Expiration column used by [`TableHaus::expirable_map`], if configured
    pub fn expiration(&self) -> Option<&ExpirationConfig> {
        self.expiration.as_ref()
    }

    /// Build a map over `table` on the shared driver
    pub fn map<K, V>(
        &self,
        table: Arc<TableDescriptor>,
        keys: impl KeyMapper<K> + 'static,
        values: impl ValueMapper<V> + 'static,
    ) -> TableMap<K, V, AnyDriver> {
        TableMap::new(Arc::clone(&self.driver), table, keys, values)
    }

    /// Build an expirable map over `table` using the configured expiration column
    pub fn expirable_map<K, V>(
        &self,
        table: Arc<TableDescriptor>,
        keys: impl KeyMapper<K> + 'static,
        values: impl ValueMapper<V> + 'static,
    ) -> Result<ExpirableMap<K, V, AnyDriver>, TableHausError> {
        let expiration = self
            .expiration
            .as_ref()
            .ok_or(TableHausError::ExpirationNotConfigured)?;
        let map = self.map(table, keys, values);
        Ok(ExpirableMap::from_config(map, expiration)?)
    }

    /// Register a map with a given name
    pub fn register_map<K, V, M>(&mut self, name: String, map: M) -> Result<(), TableHausError>
    where
        M: KeyValueMap<K, V> + 'static,
        K: Send + Sync,
        V: Send + Sync,
    {
        if self.maps.contains_key(&name) {
            return Err(TableHausError::MapAlreadyRegistered(name));
        }

        self.maps.insert(name, Box::new(map));
        Ok(())
    }

    /// Get a registered map by name
    ///
    /// Fails with `MapNotFound` when the name is unknown or the map has
    /// another type.
    pub fn get_map<M>(&self, name: &str) -> Result<&M, TableHausError>
    where
        M: Send + Sync + 'static,
    {
        self.maps
            .get(name)
            .and_then(|map| map.downcast_ref::<M>())
            .ok_or_else(|| TableHausError::MapNotFound(name.to_string()))
    }

    /// List all registered map names
    pub fn list_maps(&self) -> Vec<&String> {
        self.maps.keys().collect()
    }

    /// Remove a map by name
    pub fn unregister_map(&mut self, name: &str) -> Result<(), TableHausError> {
        self.maps
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| TableHausError::MapNotFound(name.to_string()))
    }

    /// Check database connection health
    pub async fn health_check(&self) -> Result<(), TableHausError> {
        match self.driver.as_ref() {
            AnyDriver::Postgres(driver) => {
                sqlx::query("SELECT 1").fetch_one(driver.pool()).await?;
            }
            AnyDriver::Sqlite(driver) => {
                sqlx::query("SELECT 1").fetch_one(driver.pool()).await?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for TableHaus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableHaus")
            .field("driver", &self.driver)
            .field("expiration", &self.expiration)
            .field("maps", &self.list_maps())
            .finish()
    }
}
