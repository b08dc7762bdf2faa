use std::sync::Arc;

use tokio::runtime::Handle;

use crate::error::{Result, SqlFluentError};
use crate::mapper::{decode_rows, RowMapper};
use crate::traits::{DatabaseDriver, RowDecodable};
use crate::types::{PendingResult, QueryResult, Row, SqlValue};

/// A SQL statement and the values bound to its positional placeholders.
///
/// Each `bind` fills the next placeholder, left to right. Whether the number
/// of values matches the statement is only checked when it is executed.
/// Terminal methods consume the builder, so a statement runs at most once.
pub struct QueryBuilder {
    driver: Arc<dyn DatabaseDriver>,
    mapper: Arc<RowMapper>,
    runtime: Option<Handle>,
    sql: String,
    params: Vec<SqlValue>,
}

impl QueryBuilder {
    pub(crate) fn new(
        driver: Arc<dyn DatabaseDriver>,
        mapper: Arc<RowMapper>,
        runtime: Option<Handle>,
        sql: String,
    ) -> Self {
        Self {
            driver,
            mapper,
            runtime,
            sql,
            params: Vec::new(),
        }
    }

    /// Bind a value to the next placeholder.
    pub fn bind<V: Into<SqlValue>>(mut self, value: V) -> Self {
        self.params.push(value.into());
        self
    }

    /// Bind SQL `NULL` to the next placeholder.
    pub fn bind_null(self) -> Self {
        self.bind(SqlValue::Null)
    }

    /// Bind several values, in order.
    pub fn bind_all<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        self.params.extend(values.into_iter().map(Into::into));
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Values bound so far, in placeholder order.
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Execute on the calling task and return every row, in order.
    pub async fn fetch(self) -> Result<QueryResult<Row>> {
        let rows = self.rows().await?;
        Ok(QueryResult::Ready(rows))
    }

    /// Execute on the calling task and decode every row into `T`.
    pub async fn fetch_as<T: RowDecodable>(self) -> Result<QueryResult<T>> {
        let rows = self.rows().await?;
        Ok(QueryResult::Ready(decode_rows(rows)?))
    }

    /// Execute on the calling task and decode every row through the decoder
    /// registered for `T`.
    pub async fn fetch_mapped<T: Send + 'static>(self) -> Result<QueryResult<T>> {
        let mapper = Arc::clone(&self.mapper);
        let rows = self.rows().await?;
        Ok(QueryResult::Ready(mapper.decode_all(rows)?))
    }

    /// Run the statement on a background task and return at once.
    ///
    /// Fails only if no tokio runtime is available to run it on.
    pub fn spawn_fetch(self) -> Result<QueryResult<Row>> {
        self.spawn(Ok)
    }

    /// Like [`QueryBuilder::spawn_fetch`], decoding rows into `T`.
    pub fn spawn_fetch_as<T>(self) -> Result<QueryResult<T>>
    where
        T: RowDecodable + Send + 'static,
    {
        self.spawn(decode_rows::<T>)
    }

    /// Like [`QueryBuilder::spawn_fetch`], decoding rows through the decoder
    /// registered for `T`.
    pub fn spawn_fetch_mapped<T: Send + 'static>(self) -> Result<QueryResult<T>> {
        let mapper = Arc::clone(&self.mapper);
        self.spawn(move |rows| mapper.decode_all(rows))
    }

    /// Execute a statement that returns no rows and report how many rows it
    /// changed.
    pub async fn execute_update(self) -> Result<u64> {
        self.driver.execute(&self.sql, &self.params).await
    }

    async fn rows(&self) -> Result<Vec<Row>> {
        let raw = self.driver.query(&self.sql, &self.params).await?;
        Ok(raw.into_rows())
    }

    fn spawn<T, F>(self, convert: F) -> Result<QueryResult<T>>
    where
        T: Send + 'static,
        F: FnOnce(Vec<Row>) -> Result<Vec<T>> + Send + 'static,
    {
        let runtime = match self.runtime.clone() {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|e| {
                SqlFluentError::QueryFailed(format!("no runtime to run the query on: {e}"))
            })?,
        };
        let task = runtime.spawn(async move { convert(self.rows().await?) });
        Ok(QueryResult::Pending(PendingResult::new(task, runtime)))
    }
}
