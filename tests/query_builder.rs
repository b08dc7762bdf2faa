mod common;

use std::sync::Arc;
use std::time::Duration;

use common::init_logs;
use sqlfluent::drivers::{InMemoryTestDriver, InMemoryTestResponseBuilder};
use sqlfluent::error::{ErrorKind, SqlFluentError};
use sqlfluent::traits::DatabaseDriver;
use sqlfluent::types::{Row, SqlValue};
use sqlfluent::{Database, Result, RowDecodable};

#[derive(Debug, PartialEq)]
struct User {
    id: i64,
    name: String,
}

impl RowDecodable for User {
    fn decode(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }
}

fn users_response() -> sqlfluent::RawQueryResult {
    InMemoryTestResponseBuilder::new()
        .columns(&["id", "name"])
        .row([SqlValue::Int64(1), "Alice".into()])
        .row([SqlValue::Int64(2), "Bob".into()])
        .build()
}

fn database(in_memory_test_driver: &Arc<InMemoryTestDriver>) -> Database {
    init_logs();
    let driver: Arc<dyn DatabaseDriver> =
        Arc::clone(in_memory_test_driver) as Arc<dyn DatabaseDriver>;
    Database::with_driver(driver)
}

#[tokio::test]
async fn test_prepare_holds_sql_and_no_params() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new());
    let db = database(&in_memory_test_driver);

    let builder = db.prepare("SELECT * FROM Test WHERE 1");

    assert_eq!(builder.sql(), "SELECT * FROM Test WHERE 1");
    assert!(builder.params().is_empty());
    in_memory_test_driver.assert_query_count(0);
}

#[tokio::test]
async fn test_fetch_rows_with_bound_params() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new().with_response(users_response()));
    let db = database(&in_memory_test_driver);

    let result = db
        .prepare("SELECT id, name FROM users WHERE age > ? AND active = ?")
        .bind(18)
        .bind(true)
        .fetch()
        .await
        .unwrap();

    // Verify the query that was executed
    in_memory_test_driver.assert_last_query(
        "SELECT id, name FROM users WHERE age > ? AND active = ?",
        &[SqlValue::Int32(18), SqlValue::Bool(true)],
    );
    in_memory_test_driver.assert_query_count(1);

    // Verify the result
    assert!(result.is_ready());
    let rows = result.get().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get::<i64, _>("id").unwrap(), 1);
    assert_eq!(rows[1].get::<String, _>("name").unwrap(), "Bob");
}

#[tokio::test]
async fn test_fetch_as_decodes_each_row_in_order() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new().with_response(users_response()));
    let db = database(&in_memory_test_driver);

    let users = db
        .prepare("SELECT id, name FROM users")
        .fetch_as::<User>()
        .await
        .unwrap()
        .get()
        .await
        .unwrap();

    assert_eq!(
        users,
        vec![
            User {
                id: 1,
                name: "Alice".to_string()
            },
            User {
                id: 2,
                name: "Bob".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_fetch_as_missing_column_discards_rows() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["id"])
                .row([1])
                .row([2])
                .build(),
        ),
    );
    let db = database(&in_memory_test_driver);

    let err = db
        .prepare("SELECT id FROM users")
        .fetch_as::<User>()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Mapping);
    match err {
        SqlFluentError::Construction { type_name, source } => {
            assert!(type_name.ends_with("User"));
            assert!(matches!(*source, SqlFluentError::ColumnNotFound(ref c) if c == "name"));
        }
        other => panic!("Expected Construction error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_mapped_uses_registered_decoder() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new().with_response(users_response()));
    let db = database(&in_memory_test_driver);
    db.register::<User>();

    let names: Vec<String> = db
        .prepare("SELECT id, name FROM users")
        .fetch_mapped::<User>()
        .await
        .unwrap()
        .map(|user| user.name)
        .get()
        .await
        .unwrap();

    assert_eq!(names, vec!["Alice", "Bob"]);
}

#[tokio::test]
async fn test_fetch_mapped_unregistered_type_fails() {
    struct Unregistered;

    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new().with_response(users_response()));
    let db = database(&in_memory_test_driver);

    let err = db
        .prepare("SELECT id, name FROM users")
        .fetch_mapped::<Unregistered>()
        .await
        .err()
        .expect("mapping to an unregistered type should fail");

    assert_eq!(err.kind(), ErrorKind::Mapping);
    assert!(err.to_string().contains("Unregistered"));
}

#[tokio::test]
async fn test_parameter_count_mismatch_fails_at_execute() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new());
    let db = database(&in_memory_test_driver);

    // Binding never fails
    let builder = db
        .prepare("SELECT * FROM users WHERE id = ? AND name = ?")
        .bind(1);
    assert_eq!(builder.params().len(), 1);

    let err = builder.fetch().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Execution);
    assert!(matches!(
        err,
        SqlFluentError::ParameterCountMismatch {
            expected: 2,
            actual: 1
        }
    ));

    let err = db
        .prepare("DELETE FROM users")
        .bind(1)
        .execute_update()
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Execution);
}

#[tokio::test]
async fn test_backend_failure_is_execution_error() {
    let in_memory_test_driver =
        Arc::new(InMemoryTestDriver::new().with_failure("syntax error near `SELEC`"));
    let db = database(&in_memory_test_driver);

    let err = db.prepare("SELEC 1").fetch().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Execution);
    assert!(err.to_string().contains("SELEC"));
}

#[tokio::test]
async fn test_execute_update_returns_affected_rows() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new()
            .with_response(InMemoryTestResponseBuilder::new().rows_affected(3).build()),
    );
    let db = database(&in_memory_test_driver);

    let affected = db
        .prepare("UPDATE users SET active = ? WHERE age < ?")
        .bind(false)
        .bind(18)
        .execute_update()
        .await
        .unwrap();

    assert_eq!(affected, 3);
    in_memory_test_driver.assert_last_query(
        "UPDATE users SET active = ? WHERE age < ?",
        &[SqlValue::Bool(false), SqlValue::Int32(18)],
    );
}

#[tokio::test]
async fn test_spawn_fetch_returns_before_completion() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new()
            .with_response(users_response())
            .with_latency(Duration::from_millis(50)),
    );
    let db = database(&in_memory_test_driver);

    let pending = db
        .prepare("SELECT id, name FROM users")
        .spawn_fetch_as::<User>()
        .unwrap();
    assert!(!pending.is_ready());

    let ids = pending.map(|user| user.id).get().await.unwrap();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn test_spawn_fetch_as_decode_failure_discards_rows() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new()
            .with_response(
                InMemoryTestResponseBuilder::new()
                    .columns(&["id"])
                    .row([1])
                    .row([2])
                    .build(),
            )
            .with_latency(Duration::from_millis(10)),
    );
    let db = database(&in_memory_test_driver);

    let pending = db
        .prepare("SELECT id FROM users")
        .spawn_fetch_as::<User>()
        .unwrap();
    assert!(!pending.is_ready());

    let err = pending.map(|user| user.id).get().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Mapping);
    assert!(matches!(
        err,
        SqlFluentError::Construction { ref source, .. }
            if matches!(**source, SqlFluentError::ColumnNotFound(ref c) if c == "name")
    ));
}

#[tokio::test]
async fn test_spawn_fetch_get_timeout_expires() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new()
            .with_response(users_response())
            .with_latency(Duration::from_secs(5)),
    );
    let db = database(&in_memory_test_driver);

    let err = db
        .prepare("SELECT id, name FROM users")
        .spawn_fetch()
        .unwrap()
        .get_timeout(Duration::from_millis(20))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
}

#[tokio::test]
async fn test_spawn_fetch_failure_short_circuits_map() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new().with_failure("connection reset"));
    let db = database(&in_memory_test_driver);

    let result = db
        .prepare("SELECT id, name FROM users")
        .spawn_fetch()
        .unwrap()
        .map(|_| -> i64 { panic!("map must not run on a failed result") });

    let err = result.get().await.unwrap_err();
    assert!(matches!(err, SqlFluentError::QueryFailed(ref m) if m == "connection reset"));
}

#[tokio::test]
async fn test_spawn_fetch_mapped() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new().with_response(users_response()));
    let db = database(&in_memory_test_driver);
    db.register_fn(|row| row.get::<String, _>("name"));

    let names = db
        .prepare("SELECT id, name FROM users")
        .spawn_fetch_mapped::<String>()
        .unwrap()
        .get_timeout(Duration::from_secs(5))
        .await
        .unwrap();

    assert_eq!(names, vec!["Alice", "Bob"]);
}

#[tokio::test]
async fn test_multiple_queries() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new()
            .with_response(
                InMemoryTestResponseBuilder::new()
                    .columns(&["id"])
                    .row([1])
                    .build(),
            )
            .with_response(
                InMemoryTestResponseBuilder::new()
                    .columns(&["name"])
                    .row(["Alice"])
                    .build(),
            ),
    );
    let db = database(&in_memory_test_driver);

    // First query
    let id: i64 = db
        .prepare("SELECT id FROM users")
        .fetch()
        .await
        .unwrap()
        .single()
        .await
        .unwrap()
        .get("id")
        .unwrap();

    // Second query
    let name: String = db
        .prepare("SELECT name FROM users")
        .fetch()
        .await
        .unwrap()
        .single()
        .await
        .unwrap()
        .get(0)
        .unwrap();

    // Verify both queries were recorded
    in_memory_test_driver.assert_query_count(2);

    let queries = in_memory_test_driver.recorded_queries();
    assert_eq!(queries[0].sql, "SELECT id FROM users");
    assert_eq!(queries[1].sql, "SELECT name FROM users");

    assert_eq!(id, 1);
    assert_eq!(name, "Alice");
}
