//! Driver registry mapping dialects to their adapters.

use std::collections::HashMap;
use std::sync::Arc;

use tablegen_core::{DbError, Dialect, Result};

use crate::{DatabaseDriver, MysqlDriver, PostgresDriver, SqliteDriver};

/// Registry of available database drivers.
pub struct DriverRegistry {
    drivers: HashMap<Dialect, Arc<dyn DatabaseDriver>>,
}

impl DriverRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            drivers: HashMap::new(),
        }
    }

    /// Create a registry with all built-in drivers registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(MysqlDriver::new()));
        registry.register(Arc::new(PostgresDriver::new()));
        registry.register(Arc::new(SqliteDriver::new()));
        registry
    }

    pub fn register(&mut self, driver: Arc<dyn DatabaseDriver>) {
        tracing::debug!(dialect = %driver.dialect(), "registering database driver");
        self.drivers.insert(driver.dialect(), driver);
    }

    /// Look up the driver for a dialect, failing fast with
    /// `UnsupportedDialect` before any network or file access is attempted.
    pub fn get(&self, dialect: Dialect) -> Result<Arc<dyn DatabaseDriver>> {
        self.drivers
            .get(&dialect)
            .cloned()
            .ok_or_else(|| DbError::unsupported_dialect(dialect))
    }

    pub fn has(&self, dialect: Dialect) -> bool {
        self.drivers.contains_key(&dialect)
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
