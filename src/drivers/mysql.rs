use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Opts, OptsBuilder, Params, Statement, Value};

use crate::bindings::NetworkBinding;
use crate::error::{Result, SqlFluentError};
use crate::traits::DatabaseDriver;
use crate::types::{RawQueryResult, SqlValue};

/// MySQL driver implementation using mysql_async.
///
/// Holds connection options only; a connection is opened for every call and
/// disconnected before the call returns.
pub struct MySqlDriver {
    opts: Opts,
}

impl MySqlDriver {
    pub fn new(binding: &NetworkBinding) -> Self {
        let credentials = binding.credentials();
        let opts = OptsBuilder::default()
            .ip_or_hostname(binding.host())
            .tcp_port(binding.port())
            .db_name(Some(binding.database()))
            .user(Some(credentials.username()))
            .pass(Some(credentials.password()));
        Self { opts: opts.into() }
    }

    async fn connect(&self) -> Result<Conn> {
        log::debug!(
            "Connecting to mysql://{}:{}",
            self.opts.ip_or_hostname(),
            self.opts.tcp_port()
        );
        Conn::new(self.opts.clone())
            .await
            .map_err(|e| SqlFluentError::ConnectionFailed(e.to_string()))
    }

    async fn disconnect(conn: Conn) {
        if let Err(e) = conn.disconnect().await {
            log::warn!("Failed to close MySQL connection: {}", e);
        }
    }
}

#[async_trait]
impl DatabaseDriver for MySqlDriver {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        let mut conn = self.connect().await?;
        let result = run_query(&mut conn, sql, params).await;
        Self::disconnect(conn).await;
        result
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let mut conn = self.connect().await?;
        let result = run_update(&mut conn, sql, params).await;
        Self::disconnect(conn).await;
        result
    }
}

async fn prepare(conn: &mut Conn, sql: &str, params: &[SqlValue]) -> Result<(Statement, Params)> {
    log::debug!("Executing: {} ({} parameter(s))", sql, params.len());
    let statement = conn.prep(sql).await.map_err(query_failed)?;
    let expected = statement.num_params() as usize;
    if expected != params.len() {
        return Err(SqlFluentError::ParameterCountMismatch {
            expected,
            actual: params.len(),
        });
    }
    let params = if params.is_empty() {
        Params::Empty
    } else {
        Params::Positional(params.iter().map(to_mysql_value).collect())
    };
    Ok((statement, params))
}

async fn run_query(conn: &mut Conn, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
    let (statement, params) = prepare(conn, sql, params).await?;
    let columns: Vec<String> = statement
        .columns()
        .iter()
        .map(|c| c.name_str().into_owned())
        .collect();
    let rows: Vec<mysql_async::Row> = conn
        .exec(&statement, params)
        .await
        .map_err(query_failed)?;
    let rows = rows
        .into_iter()
        .map(|row| row.unwrap().into_iter().map(from_mysql_value).collect())
        .collect();
    Ok(RawQueryResult::new(columns, rows))
}

async fn run_update(conn: &mut Conn, sql: &str, params: &[SqlValue]) -> Result<u64> {
    let (statement, params) = prepare(conn, sql, params).await?;
    conn.exec_drop(&statement, params)
        .await
        .map_err(query_failed)?;
    Ok(conn.affected_rows())
}

fn to_mysql_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::NULL,
        SqlValue::Bool(v) => Value::Int(*v as i64),
        SqlValue::Int32(v) => Value::Int((*v).into()),
        SqlValue::Int64(v) => Value::Int(*v),
        SqlValue::Float64(v) => Value::Double(*v),
        SqlValue::Text(s) => Value::Bytes(s.clone().into_bytes()),
        SqlValue::Bytes(b) => Value::Bytes(b.clone()),
    }
}

fn from_mysql_value(value: Value) -> SqlValue {
    match value {
        Value::NULL => SqlValue::Null,
        Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(text) => SqlValue::Text(text),
            Err(e) => SqlValue::Bytes(e.into_bytes()),
        },
        Value::Int(v) => SqlValue::Int64(v),
        Value::UInt(v) => match i64::try_from(v) {
            Ok(v) => SqlValue::Int64(v),
            Err(_) => SqlValue::Text(v.to_string()),
        },
        Value::Float(v) => SqlValue::Float64(v.into()),
        Value::Double(v) => SqlValue::Float64(v),
        Value::Date(year, month, day, hour, minute, second, micros) => {
            let mut text = format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            );
            if micros > 0 {
                text.push_str(&format!(".{:06}", micros));
            }
            SqlValue::Text(text)
        }
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            let hours = u64::from(days) * 24 + u64::from(hours);
            let mut text = format!(
                "{}{:02}:{:02}:{:02}",
                if negative { "-" } else { "" },
                hours,
                minutes,
                seconds
            );
            if micros > 0 {
                text.push_str(&format!(".{:06}", micros));
            }
            SqlValue::Text(text)
        }
    }
}

fn query_failed(e: mysql_async::Error) -> SqlFluentError {
    SqlFluentError::QueryFailed(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_from_binding() {
        let binding = NetworkBinding::mysql("localhost", 3306, "test", "u", "p").unwrap();
        let driver = MySqlDriver::new(&binding);
        assert_eq!(driver.opts.ip_or_hostname(), "localhost");
        assert_eq!(driver.opts.tcp_port(), 3306);
        assert_eq!(driver.opts.db_name(), Some("test"));
        assert_eq!(driver.opts.user(), Some("u"));
        assert_eq!(driver.opts.pass(), Some("p"));
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(
            from_mysql_value(Value::Bytes(b"Alice".to_vec())),
            SqlValue::Text("Alice".into())
        );
        assert_eq!(
            from_mysql_value(Value::Bytes(vec![0xff, 0x00])),
            SqlValue::Bytes(vec![0xff, 0x00])
        );
        assert_eq!(
            from_mysql_value(Value::Date(2024, 2, 29, 13, 5, 0, 0)),
            SqlValue::Text("2024-02-29 13:05:00".into())
        );
        assert_eq!(
            from_mysql_value(Value::Time(true, 1, 2, 3, 4, 0)),
            SqlValue::Text("-26:03:04".into())
        );
        assert_eq!(to_mysql_value(&SqlValue::Bool(true)), Value::Int(1));
    }
}
