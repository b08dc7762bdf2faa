use async_trait::async_trait;

use crate::error::Result;
use crate::types::{RawQueryResult, SqlValue};

/// Trait for database driver implementations.
/// Drivers are responsible for:
/// - Opening a connection for every call and releasing it before returning
/// - Converting SqlValue parameters to native types
/// - Rejecting parameter lists that do not match the statement's placeholders
/// - Executing statements and converting results to RawQueryResult
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Execute a statement and materialize every row it returns, in order.
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult>;

    /// Execute a statement that returns no rows and report the rows affected.
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64>;
}
