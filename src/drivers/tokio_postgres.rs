use async_trait::async_trait;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Config, NoTls, Row, Statement};

use super::pg_value::PgValue;
use crate::bindings::NetworkBinding;
use crate::error::{Result, SqlFluentError};
use crate::traits::DatabaseDriver;
use crate::types::{RawQueryResult, SqlValue};

/// PostgreSQL driver implementation using tokio-postgres.
///
/// Holds connection parameters only; every call connects, runs its statement
/// and drops the client, which ends the connection task. Bound values are
/// coerced to the types the prepared statement declares.
pub struct TokioPostgresDriver {
    config: Config,
}

impl TokioPostgresDriver {
    pub fn new(binding: &NetworkBinding) -> Self {
        let credentials = binding.credentials();
        let mut config = Config::new();
        config
            .host(binding.host())
            .port(binding.port())
            .dbname(binding.database())
            .user(credentials.username())
            .password(credentials.password());
        Self { config }
    }

    async fn with_client<T, F, Fut>(&self, work: F) -> Result<T>
    where
        F: FnOnce(Client) -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let (client, connection) = self
            .config
            .connect(NoTls)
            .await
            .map_err(|e| SqlFluentError::ConnectionFailed(e.to_string()))?;

        // Spawn the connection handler
        let handler = tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::warn!("PostgreSQL connection error: {}", e);
            }
        });

        // `work` owns the client; dropping it closes the connection
        let result = work(client).await;
        let _ = handler.await;
        result
    }
}

#[async_trait]
impl DatabaseDriver for TokioPostgresDriver {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        self.with_client(|client| async move {
            let statement = prepare(&client, sql, params).await?;
            let values = bind_params(params);
            let param_refs: Vec<&(dyn ToSql + Sync)> =
                values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();

            let rows = client
                .query(&statement, &param_refs)
                .await
                .map_err(query_failed)?;

            let columns: Vec<String> = statement
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect();

            let result_rows = rows
                .iter()
                .map(|row| {
                    (0..row.len())
                        .map(|i| row_value(row, i))
                        .collect::<Result<Vec<_>>>()
                })
                .collect::<Result<Vec<_>>>()?;

            Ok(RawQueryResult::new(columns, result_rows))
        })
        .await
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        self.with_client(|client| async move {
            let statement = prepare(&client, sql, params).await?;
            let values = bind_params(params);
            let param_refs: Vec<&(dyn ToSql + Sync)> =
                values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
            client
                .execute(&statement, &param_refs)
                .await
                .map_err(query_failed)
        })
        .await
    }
}

async fn prepare(client: &Client, sql: &str, params: &[SqlValue]) -> Result<Statement> {
    log::debug!("Executing: {} ({} parameter(s))", sql, params.len());
    let statement = client.prepare(sql).await.map_err(query_failed)?;
    let expected = statement.params().len();
    if expected != params.len() {
        return Err(SqlFluentError::ParameterCountMismatch {
            expected,
            actual: params.len(),
        });
    }
    Ok(statement)
}

/// Read the value at `index` whatever the column's declared type.
fn row_value(row: &Row, index: usize) -> Result<SqlValue> {
    row.try_get::<_, PgValue>(index)
        .map(|value| value.0)
        .map_err(|e| {
            let column = &row.columns()[index];
            SqlFluentError::QueryFailed(format!(
                "cannot read column `{}` of type {}: {}",
                column.name(),
                column.type_(),
                e
            ))
        })
}

fn bind_params(params: &[SqlValue]) -> Vec<PgValue> {
    params.iter().cloned().map(PgValue).collect()
}

fn query_failed(e: tokio_postgres::Error) -> SqlFluentError {
    SqlFluentError::QueryFailed(e.to_string())
}
