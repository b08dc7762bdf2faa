mod mysql;
mod pg_value;
mod sqlite;
mod tokio_postgres;

pub use self::in_memory_test::{InMemoryTestDriver, InMemoryTestResponseBuilder, RecordedQuery};
pub use self::mysql::MySqlDriver;
pub use self::sqlite::{register_sqlite_driver, sqlite_driver_registered, SqliteDriver};
pub use self::tokio_postgres::TokioPostgresDriver;
