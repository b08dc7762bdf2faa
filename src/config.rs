use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::bindings::{ConnectionBinding, Credentials, Dialect, EmbeddedBinding, NetworkBinding};
use crate::error::{Result, SqlFluentError};

/// Key/value configuration supplied by the host application.
pub trait ConfigSource {
    fn get_string(&self, key: &str) -> Option<String>;

    fn get_int(&self, key: &str) -> Option<i64> {
        self.get_string(key)?.trim().parse().ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Deserializable connection settings.
///
/// ```
/// use sqlfluent::config::BindingConfig;
///
/// let config: BindingConfig = serde_json::from_str(
///     r#"{ "dialect": "mysql", "host": "localhost", "database": "test",
///          "username": "u", "password": "p" }"#,
/// ).unwrap();
/// assert_eq!(config.into_binding().unwrap().url(), "mysql://localhost:3306/test");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "dialect", rename_all = "lowercase")]
pub enum BindingConfig {
    #[serde(alias = "mariadb")]
    MySql(ServerConfig),
    #[serde(alias = "postgresql")]
    Postgres(ServerConfig),
    Sqlite { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: Option<u16>,
    #[serde(default)]
    pub database: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl BindingConfig {
    /// Read settings stored under `prefix` (e.g. `database.host`,
    /// `database.port`, `database.path`). `dialect` defaults to `mysql`.
    pub fn from_source(source: &impl ConfigSource, prefix: &str) -> Result<Self> {
        let key = |name: &str| {
            if prefix.is_empty() {
                name.to_string()
            } else {
                format!("{}.{}", prefix, name)
            }
        };
        let dialect = match source.get_string(&key("dialect")) {
            Some(name) => Dialect::from_scheme(&name.to_ascii_lowercase()).ok_or_else(|| {
                SqlFluentError::Binding(format!("unsupported dialect `{}`", name))
            })?,
            None => Dialect::MySql,
        };

        if dialect.is_embedded() {
            let path = source
                .get_string(&key("path"))
                .ok_or_else(|| SqlFluentError::Binding(format!("missing `{}`", key("path"))))?;
            return Ok(BindingConfig::Sqlite { path: path.into() });
        }

        let port = match source.get_int(&key("port")) {
            Some(port) => Some(u16::try_from(port).map_err(|_| {
                SqlFluentError::Binding(format!("port {} is out of range", port))
            })?),
            None => None,
        };
        let server = ServerConfig {
            host: source
                .get_string(&key("host"))
                .ok_or_else(|| SqlFluentError::Binding(format!("missing `{}`", key("host"))))?,
            port,
            database: source.get_string(&key("database")).unwrap_or_default(),
            username: source.get_string(&key("username")).unwrap_or_default(),
            password: source.get_string(&key("password")).unwrap_or_default(),
        };
        Ok(match dialect {
            Dialect::Postgres => BindingConfig::Postgres(server),
            _ => BindingConfig::MySql(server),
        })
    }

    pub fn into_binding(self) -> Result<ConnectionBinding> {
        match self {
            BindingConfig::MySql(server) => server.into_binding(Dialect::MySql),
            BindingConfig::Postgres(server) => server.into_binding(Dialect::Postgres),
            BindingConfig::Sqlite { path } => EmbeddedBinding::sqlite(path).map(Into::into),
        }
    }
}

impl ServerConfig {
    fn into_binding(self, dialect: Dialect) -> Result<ConnectionBinding> {
        let port = self
            .port
            .or(dialect.default_port())
            .ok_or_else(|| SqlFluentError::Binding("missing port".into()))?;
        NetworkBinding::new(
            dialect,
            self.host,
            port,
            self.database,
            Credentials::new(self.username, self.password),
        )
        .map(Into::into)
    }
}

impl TryFrom<BindingConfig> for ConnectionBinding {
    type Error = SqlFluentError;

    fn try_from(config: BindingConfig) -> Result<Self> {
        config.into_binding()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_source_mysql() {
        let values = source(&[
            ("database.host", "localhost"),
            ("database.port", "3306"),
            ("database.database", "test"),
            ("database.username", "u"),
            ("database.password", "p"),
        ]);
        let binding = BindingConfig::from_source(&values, "database")
            .unwrap()
            .into_binding()
            .unwrap();
        assert_eq!(binding.url(), "mysql://localhost:3306/test");
    }

    #[test]
    fn test_from_source_sqlite() {
        let values = source(&[("dialect", "SQLite"), ("path", "plugin/data.sqlite")]);
        let config = BindingConfig::from_source(&values, "").unwrap();
        assert_eq!(
            config,
            BindingConfig::Sqlite {
                path: "plugin/data.sqlite".into()
            }
        );
    }

    #[test]
    fn test_from_source_bad_port() {
        let values = source(&[("host", "localhost"), ("port", "70000")]);
        let err = BindingConfig::from_source(&values, "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Binding);
    }

    #[test]
    fn test_from_source_missing_host() {
        let err = BindingConfig::from_source(&source(&[]), "db").unwrap_err();
        assert!(err.to_string().contains("db.host"));
    }

    #[test]
    fn test_deserialize_postgres() {
        let config: BindingConfig = serde_json::from_str(
            r#"{ "dialect": "postgresql", "host": "db", "port": 6432, "database": "app" }"#,
        )
        .unwrap();
        let binding = ConnectionBinding::try_from(config).unwrap();
        assert_eq!(binding.url(), "postgres://db:6432/app");
    }
}
