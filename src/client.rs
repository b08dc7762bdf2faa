use std::sync::Arc;

use tokio::runtime::Handle;

use crate::bindings::ConnectionBinding;
use crate::builders::QueryBuilder;
use crate::error::Result;
use crate::mapper::RowMapper;
use crate::traits::{DatabaseDriver, RowDecodable};
use crate::types::Row;

/// Main entry point for sqlfluent.
/// Holds a bound data source and prepares statements against it.
///
/// Cloning is cheap; clones share the driver and the row decoder registry.
#[derive(Clone)]
pub struct Database {
    binding: Option<ConnectionBinding>,
    driver: Arc<dyn DatabaseDriver>,
    mapper: Arc<RowMapper>,
    runtime: Option<Handle>,
}

impl Database {
    /// Create a database handle for a binding. No connection is opened until
    /// a statement runs.
    ///
    /// # Example
    /// ```ignore
    /// let binding = NetworkBinding::mysql("localhost", 3306, "test", "u", "p")?;
    /// let db = Database::new(binding);
    /// ```
    pub fn new(binding: impl Into<ConnectionBinding>) -> Self {
        let binding = binding.into();
        let driver = binding.driver();
        Self {
            binding: Some(binding),
            driver,
            mapper: Arc::new(RowMapper::new()),
            runtime: None,
        }
    }

    /// Create a database handle from a connection URL.
    pub fn from_url(url: &str) -> Result<Self> {
        ConnectionBinding::from_url(url).map(Self::new)
    }

    /// Create a database handle with a custom driver.
    /// Useful for testing or using alternative database drivers.
    pub fn with_driver(driver: Arc<dyn DatabaseDriver>) -> Self {
        Self {
            binding: None,
            driver,
            mapper: Arc::new(RowMapper::new()),
            runtime: None,
        }
    }

    /// Run background queries on `runtime` instead of the caller's runtime.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// The binding this handle was created from, if any.
    pub fn binding(&self) -> Option<&ConnectionBinding> {
        self.binding.as_ref()
    }

    pub fn mapper(&self) -> &RowMapper {
        &self.mapper
    }

    /// Register `T` for the `*_mapped` terminal operations.
    pub fn register<T: RowDecodable + Send + 'static>(&self) -> &Self {
        self.mapper.register::<T>();
        self
    }

    /// Register a decoding function for `T` for the `*_mapped` terminal operations.
    pub fn register_fn<T, F>(&self, decode: F) -> &Self
    where
        T: Send + 'static,
        F: Fn(&Row) -> Result<T> + Send + Sync + 'static,
    {
        self.mapper.register_fn(decode);
        self
    }

    /// Start a statement. Never fails: the SQL is only validated by the
    /// backend when the statement is executed.
    pub fn prepare(&self, sql: impl Into<String>) -> QueryBuilder {
        QueryBuilder::new(
            Arc::clone(&self.driver),
            Arc::clone(&self.mapper),
            self.runtime.clone(),
            sql.into(),
        )
    }
}
