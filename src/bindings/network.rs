use std::fmt;
use std::sync::Arc;

use crate::bindings::Dialect;
use crate::drivers::{MySqlDriver, TokioPostgresDriver};
use crate::error::{Result, SqlFluentError};
use crate::traits::DatabaseDriver;

/// Username and password attached to a networked binding.
/// Kept out of the connection URL.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Connection parameters for a server reached over the network.
///
/// Construction only validates the parameters: an unreachable host or bad
/// credentials surface when a statement is executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkBinding {
    dialect: Dialect,
    host: String,
    port: u16,
    database: String,
    credentials: Credentials,
}

impl NetworkBinding {
    /// Bind to a MySQL server.
    ///
    /// ```
    /// use sqlfluent::bindings::NetworkBinding;
    ///
    /// let binding = NetworkBinding::mysql("localhost", 3306, "test", "u", "p").unwrap();
    /// assert_eq!(binding.url(), "mysql://localhost:3306/test");
    /// ```
    pub fn mysql(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Self::new(
            Dialect::MySql,
            host,
            port,
            database,
            Credentials::new(username, password),
        )
    }

    /// Bind to a PostgreSQL server.
    pub fn postgres(
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        Self::new(
            Dialect::Postgres,
            host,
            port,
            database,
            Credentials::new(username, password),
        )
    }

    pub fn new(
        dialect: Dialect,
        host: impl Into<String>,
        port: u16,
        database: impl Into<String>,
        credentials: Credentials,
    ) -> Result<Self> {
        if dialect.is_embedded() {
            return Err(SqlFluentError::Binding(format!(
                "{} is not a networked dialect",
                dialect
            )));
        }
        let host = host.into();
        if host.trim().is_empty() {
            return Err(SqlFluentError::Binding("host must not be empty".into()));
        }
        if port == 0 {
            return Err(SqlFluentError::Binding("port must be positive".into()));
        }
        Ok(Self {
            dialect,
            host,
            port,
            database: database.into(),
            credentials,
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// `dialect://host:port/database`, without credentials.
    pub fn url(&self) -> String {
        format!(
            "{}://{}:{}/{}",
            self.dialect.scheme(),
            self.host,
            self.port,
            self.database
        )
    }

    pub(crate) fn driver(&self) -> Arc<dyn DatabaseDriver> {
        match self.dialect {
            Dialect::Postgres => Arc::new(TokioPostgresDriver::new(self)),
            _ => Arc::new(MySqlDriver::new(self)),
        }
    }
}
