use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::drivers::{register_sqlite_driver, SqliteDriver};
use crate::error::{Result, SqlFluentError};
use crate::traits::DatabaseDriver;

/// Connection parameters for an embedded, file-backed SQLite database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedBinding {
    path: PathBuf,
}

impl EmbeddedBinding {
    /// Bind to the SQLite file at `path`.
    ///
    /// The file does not have to exist yet; it is created when first used.
    /// Registers the SQLite driver for the process if no binding did so yet.
    pub fn sqlite(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(SqlFluentError::Binding("database path must not be empty".into()));
        }
        let path = std::path::absolute(path).map_err(|e| {
            SqlFluentError::Binding(format!("cannot resolve `{}`: {}", path.display(), e))
        })?;
        register_sqlite_driver();
        Ok(Self { path })
    }

    /// Absolute path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `sqlite://` followed by the absolute path.
    pub fn url(&self) -> String {
        format!("sqlite://{}", self.path.display())
    }

    pub(crate) fn driver(&self) -> Arc<dyn DatabaseDriver> {
        Arc::new(SqliteDriver::new(self.path.clone()))
    }
}
