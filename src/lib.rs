//! sqlfluent - A small, driver-agnostic SQL access layer
//!
//! Literal SQL with positional parameters, executed against MySQL, PostgreSQL
//! or SQLite, with results produced on the calling task or in the background
//! and rows decoded into your own types.
//!
//! # Example
//! ```ignore
//! use sqlfluent::{Database, EmbeddedBinding, Result, Row, RowDecodable};
//!
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl RowDecodable for User {
//!     fn decode(row: &Row) -> Result<Self> {
//!         Ok(Self {
//!             id: row.get("id")?,
//!             name: row.get("name")?,
//!         })
//!     }
//! }
//!
//! let db = Database::new(EmbeddedBinding::sqlite("plugin/data.sqlite")?);
//!
//! // On the calling task
//! let users = db
//!     .prepare("SELECT id, name FROM users WHERE age > ?")
//!     .bind(18)
//!     .fetch_as::<User>()
//!     .await?
//!     .get()
//!     .await?;
//!
//! // In the background
//! let names = db
//!     .prepare("SELECT name FROM users")
//!     .spawn_fetch_as::<User>()?
//!     .map(|user| user.name)
//!     .get_timeout(Duration::from_secs(5))
//!     .await?;
//! ```

pub mod bindings;
pub mod builders;
pub mod config;
pub mod drivers;
pub mod error;
pub mod mapper;
pub mod traits;
pub mod types;

mod client;

// Re-export main types for convenient access
pub use bindings::{ConnectionBinding, Credentials, Dialect, EmbeddedBinding, NetworkBinding};
pub use builders::QueryBuilder;
pub use client::Database;
pub use config::{BindingConfig, ConfigSource};
pub use error::{ErrorKind, Result, SqlFluentError};
pub use mapper::RowMapper;
pub use traits::{DatabaseDriver, RowDecodable};
pub use types::{FromSqlValue, QueryResult, RawQueryResult, Row, SqlValue};
