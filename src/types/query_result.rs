use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::{Result, SqlFluentError};

/// Ordered values produced by a query.
///
/// `Ready` holds values that were materialized on the calling task.
/// `Pending` is backed by a background task that completes or fails exactly
/// once; [`QueryResult::get`] waits for it.
///
/// `map` is a per-element projection: it never changes the number or the
/// order of the values.
///
/// # Example
/// ```ignore
/// let names = db
///     .prepare("SELECT name FROM users WHERE age > ?")
///     .bind(18)
///     .spawn_fetch()?
///     .map(|row| row.get::<String, _>("name"))
///     .get_timeout(Duration::from_secs(5))
///     .await?;
/// ```
#[derive(Debug)]
pub enum QueryResult<T> {
    Ready(Vec<T>),
    Pending(PendingResult<T>),
}

/// Handle on values still being produced by a background task.
#[derive(Debug)]
pub struct PendingResult<T> {
    task: JoinHandle<Result<Vec<T>>>,
    runtime: Handle,
}

impl<T> PendingResult<T> {
    pub(crate) fn new(task: JoinHandle<Result<Vec<T>>>, runtime: Handle) -> Self {
        Self { task, runtime }
    }

    async fn join(self) -> Result<Vec<T>> {
        self.task
            .await
            .map_err(|e| SqlFluentError::QueryFailed(format!("background query task failed: {e}")))?
    }
}

impl<T: Send + 'static> QueryResult<T> {
    /// Returns true when the values are available without waiting.
    pub fn is_ready(&self) -> bool {
        match self {
            QueryResult::Ready(_) => true,
            QueryResult::Pending(pending) => pending.task.is_finished(),
        }
    }

    /// Returns all values in order, waiting for a pending result to complete.
    pub async fn get(self) -> Result<Vec<T>> {
        match self {
            QueryResult::Ready(values) => Ok(values),
            QueryResult::Pending(pending) => pending.join().await,
        }
    }

    /// Like [`QueryResult::get`], but gives up after `timeout`.
    ///
    /// Expiry only stops the wait: the background task keeps running and
    /// releases its connection when it finishes.
    pub async fn get_timeout(self, timeout: Duration) -> Result<Vec<T>> {
        match self {
            QueryResult::Ready(values) => Ok(values),
            QueryResult::Pending(pending) => tokio::time::timeout(timeout, pending.join())
                .await
                .map_err(|_| SqlFluentError::Timeout(timeout))?,
        }
    }

    /// Extracts the only value of the result.
    /// Returns an error if the result holds zero or more than one value.
    pub async fn single(self) -> Result<T> {
        let mut values = self.get().await?;
        if values.len() != 1 {
            return Err(SqlFluentError::UnexpectedRowCount {
                expected: 1,
                actual: values.len(),
            });
        }
        Ok(values.remove(0))
    }

    /// Applies `f` to every value, in order.
    ///
    /// Ready values are mapped immediately. For a pending result a
    /// continuation is spawned next to the source task; it runs as soon as
    /// the source completes and skips `f` entirely if the source failed.
    pub fn map<R, F>(self, f: F) -> QueryResult<R>
    where
        R: Send + 'static,
        F: FnMut(T) -> R + Send + 'static,
    {
        match self {
            QueryResult::Ready(values) => QueryResult::Ready(project(values, f)),
            QueryResult::Pending(pending) => {
                let runtime = pending.runtime.clone();
                let task = runtime.spawn(async move { pending.join().await.map(|v| project(v, f)) });
                QueryResult::Pending(PendingResult::new(task, runtime))
            }
        }
    }
}

fn project<T, R>(values: Vec<T>, f: impl FnMut(T) -> R) -> Vec<R> {
    values.into_iter().map(f).collect()
}

impl<T> From<Vec<T>> for QueryResult<T> {
    fn from(values: Vec<T>) -> Self {
        QueryResult::Ready(values)
    }
}
