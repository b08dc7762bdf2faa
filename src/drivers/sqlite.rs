use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use async_trait::async_trait;
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{params_from_iter, Connection, Statement, ToSql};

use crate::error::{Result, SqlFluentError};
use crate::traits::DatabaseDriver;
use crate::types::{RawQueryResult, SqlValue};

static SQLITE_LIBRARY: OnceLock<&'static str> = OnceLock::new();

/// Marks the embedded SQLite backend as available for this process.
///
/// rusqlite links SQLite statically and needs no driver registration; this
/// only records the linked library version once and logs it. Returns `true`
/// for the first call and `false` for every later one, so repeated bindings
/// never fail.
pub fn register_sqlite_driver() -> bool {
    let registered = SQLITE_LIBRARY.set(rusqlite::version()).is_ok();
    if registered {
        log::debug!("Registered SQLite driver, library version {}", rusqlite::version());
    }
    registered
}

/// Whether [`register_sqlite_driver`] has run in this process.
pub fn sqlite_driver_registered() -> bool {
    SQLITE_LIBRARY.get().is_some()
}

/// SQLite driver implementation using rusqlite.
///
/// Every call opens the database file on tokio's blocking pool and closes it
/// before returning. The file is created on first use if it does not exist.
pub struct SqliteDriver {
    path: PathBuf,
}

impl SqliteDriver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn run_blocking<T, F>(&self, sql: &str, params: &[SqlValue], work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Statement<'_>, &[SqlValue]) -> Result<T> + Send + 'static,
    {
        let path = self.path.clone();
        let sql = sql.to_string();
        let params = params.to_vec();
        tokio::task::spawn_blocking(move || {
            log::debug!(
                "Executing on `{}`: {} ({} parameter(s))",
                path.display(),
                sql,
                params.len()
            );
            let connection = Connection::open(&path).map_err(|e| {
                SqlFluentError::ConnectionFailed(format!("{}: {}", path.display(), e))
            })?;
            let mut statement = connection.prepare(&sql).map_err(query_failed)?;
            let expected = statement.parameter_count();
            if expected != params.len() {
                return Err(SqlFluentError::ParameterCountMismatch {
                    expected,
                    actual: params.len(),
                });
            }
            work(&mut statement, &params)
        })
        .await
        .map_err(|e| SqlFluentError::QueryFailed(format!("SQLite worker failed: {e}")))?
    }
}

#[async_trait]
impl DatabaseDriver for SqliteDriver {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        self.run_blocking(sql, params, |statement, params| {
            let columns: Vec<String> = statement
                .column_names()
                .into_iter()
                .map(String::from)
                .collect();
            let width = columns.len();
            let mut rows = statement
                .query(params_from_iter(params.iter()))
                .map_err(query_failed)?;
            let mut result = Vec::new();
            while let Some(row) = rows.next().map_err(query_failed)? {
                let values = (0..width)
                    .map(|i| row.get_ref(i).map(from_value_ref))
                    .collect::<rusqlite::Result<Vec<_>>>()
                    .map_err(query_failed)?;
                result.push(values);
            }
            Ok(RawQueryResult::new(columns, result))
        })
        .await
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        self.run_blocking(sql, params, |statement, params| {
            let affected = statement
                .execute(params_from_iter(params.iter()))
                .map_err(query_failed)?;
            Ok(affected as u64)
        })
        .await
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Owned(Value::Null),
            SqlValue::Bool(v) => ToSqlOutput::Owned(Value::Integer(*v as i64)),
            SqlValue::Int32(v) => ToSqlOutput::Owned(Value::Integer((*v).into())),
            SqlValue::Int64(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            SqlValue::Float64(v) => ToSqlOutput::Owned(Value::Real(*v)),
            SqlValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            SqlValue::Bytes(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b.as_slice())),
        })
    }
}

fn from_value_ref(value: ValueRef<'_>) -> SqlValue {
    match value {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(v) => SqlValue::Int64(v),
        ValueRef::Real(v) => SqlValue::Float64(v),
        ValueRef::Text(v) => SqlValue::Text(String::from_utf8_lossy(v).into_owned()),
        ValueRef::Blob(v) => SqlValue::Bytes(v.to_vec()),
    }
}

fn query_failed(e: rusqlite::Error) -> SqlFluentError {
    SqlFluentError::QueryFailed(e.to_string())
}
