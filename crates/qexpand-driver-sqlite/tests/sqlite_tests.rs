/// Integration tests for running expanded queries against SQLite
use std::sync::Arc;

use qexpand_core::{Connection, FlatParams, ParamSet, ParamValue, QexpandError, Value};
use qexpand_driver_sqlite::SqliteConnection;
use qexpand_query::QueryService;

/// Helper to create a service over a fresh in-memory `test` table
async fn setup_service() -> QueryService {
    let conn = SqliteConnection::open_in_memory().expect("Failed to open in-memory database");
    let service = QueryService::new(Arc::new(conn));

    service
        .run("drop table if exists test", ParamSet::default())
        .await
        .expect("Failed to drop table");
    service
        .run("create table test (val int default null)", ParamSet::default())
        .await
        .expect("Failed to create table");

    service
}

fn ints(values: &[i64]) -> ParamValue {
    ParamValue::sequence(values.iter().copied())
}

fn column_values(result: &qexpand_core::QueryResult) -> Vec<Value> {
    result
        .rows
        .iter()
        .map(|row| row.get_by_name("val").cloned().unwrap_or(Value::Null))
        .collect()
}

#[tokio::test]
async fn test_run_with_single_values() {
    let service = setup_service().await;

    service
        .run(
            "insert into test (val) values (?), (?)",
            ParamSet::positional(vec![2i64.into(), 3i64.into()]),
        )
        .await
        .expect("Failed to insert");

    let result = service
        .run("select * from test order by val asc", ParamSet::default())
        .await
        .expect("Failed to select");

    assert_eq!(column_values(&result), vec![Value::Int64(2), Value::Int64(3)]);
}

#[tokio::test]
async fn test_run_with_array_values() {
    let service = setup_service().await;

    service
        .run(
            "insert into test (val) values (?), (?), (?)",
            ParamSet::positional(vec![5i64.into(), 6i64.into(), 7i64.into()]),
        )
        .await
        .expect("Failed to insert");

    let result = service
        .run(
            "select * from test where val = ? or val in ([?]) or val = ? order by val asc",
            ParamSet::positional(vec![0i64.into(), ints(&[6, 7]), 10i64.into()]),
        )
        .await
        .expect("Failed to select");

    assert_eq!(column_values(&result), vec![Value::Int64(6), Value::Int64(7)]);
}

#[tokio::test]
async fn test_run_with_named_array_values() {
    let service = setup_service().await;

    service
        .execute(
            "insert into test (val) values (:a), (:b), (:c)",
            ParamSet::named(vec![("a", 1i64.into()), ("b", 2i64.into()), ("c", 3i64.into())]),
        )
        .await
        .expect("Failed to insert");

    let result = service
        .run(
            "select val from test where val in ([:vals]) or val = :other order by val",
            ParamSet::named(vec![("vals", ints(&[1, 3])), ("other", 99i64.into())]),
        )
        .await
        .expect("Failed to select");

    assert_eq!(column_values(&result), vec![Value::Int64(1), Value::Int64(3)]);
}

#[tokio::test]
async fn test_run_with_two_arrays() {
    let service = setup_service().await;

    service
        .run(
            "insert into test (val) values (?), (?), (?), (?)",
            ParamSet::positional(vec![1i64.into(), 2i64.into(), 3i64.into(), 4i64.into()]),
        )
        .await
        .expect("Failed to insert");

    let result = service
        .run(
            "select val from test where val in ([?]) and val not in ([?]) order by val",
            ParamSet::positional(vec![ints(&[1, 2, 3]), ints(&[2])]),
        )
        .await
        .expect("Failed to select");

    assert_eq!(column_values(&result), vec![Value::Int64(1), Value::Int64(3)]);
}

#[tokio::test]
async fn test_quoted_placeholder_is_literal() {
    let conn = SqliteConnection::open_in_memory().expect("Failed to open database");
    let service = QueryService::new(Arc::new(conn));

    service
        .run(r#"create table q ("[?]" int, val int)"#, ParamSet::default())
        .await
        .expect("Failed to create table");
    service
        .execute(
            r#"insert into q ("[?]", val) values (?, ?), (?, ?)"#,
            ParamSet::positional(vec![1i64.into(), 10i64.into(), 2i64.into(), 20i64.into()]),
        )
        .await
        .expect("Failed to insert");

    let result = service
        .run(
            r#"select "[?]" as marker, val from q where val in ([?])"#,
            ParamSet::positional(vec![ints(&[20])]),
        )
        .await
        .expect("Failed to select");

    assert_eq!(result.row_count(), 1);
    assert_eq!(result.column_count(), 2);
    assert_eq!(result.rows[0].get_by_name("marker"), Some(&Value::Int64(2)));
    assert_eq!(result.rows[0].get_by_name("val"), Some(&Value::Int64(20)));
}

#[tokio::test]
async fn test_run_fails_with_mismatched_query_and_params() {
    let service = setup_service().await;

    let err = service
        .run(
            "select * from test where val = [?]",
            ParamSet::positional(vec!["not an array".into()]),
        )
        .await
        .expect_err("Scalar bound to [?] should fail");

    assert!(matches!(err, QexpandError::Shape(_)));
    assert!(err.to_string().contains("[?]"));
}

#[tokio::test]
async fn test_count_mismatch_is_reported_by_connection() {
    let service = setup_service().await;

    let err = service
        .run(
            "select * from test where val = ? or val = ?",
            ParamSet::positional(vec![1i64.into()]),
        )
        .await
        .expect_err("Too few values should fail");

    assert!(matches!(err, QexpandError::Query(_)));
}

#[tokio::test]
async fn test_sequence_on_plain_placeholder_is_rejected() {
    let service = setup_service().await;

    let err = service
        .run(
            "select * from test where val = ?",
            ParamSet::positional(vec![ints(&[1, 2])]),
        )
        .await
        .expect_err("Sequence bound to ? should fail");

    assert!(err.to_string().contains("bracketed placeholder"));
}

#[tokio::test]
async fn test_unknown_named_parameter_is_rejected() {
    let conn = SqliteConnection::open_in_memory().expect("Failed to open database");
    let mut params = indexmap_of(&[("missing", 1)]);
    params.insert("other".into(), Value::Int64(2));

    let err = conn
        .query("select :a as a, :b as b", &FlatParams::Named(params))
        .await
        .expect_err("Unknown names should fail");

    assert!(err.to_string().contains(":missing"));
}

fn indexmap_of(entries: &[(&str, i64)]) -> indexmap::IndexMap<String, Value> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), Value::Int64(*v)))
        .collect()
}

#[tokio::test]
async fn test_execute_reports_affected_rows() {
    let service = setup_service().await;

    let result = service
        .execute(
            "insert into test (val) values (?), (?), (?)",
            ParamSet::positional(vec![1i64.into(), 2i64.into(), 3i64.into()]),
        )
        .await
        .expect("Failed to insert");
    assert_eq!(result.affected_rows, 3);

    let result = service
        .execute(
            "delete from test where val in ([?])",
            ParamSet::positional(vec![ints(&[1, 3])]),
        )
        .await
        .expect("Failed to delete");
    assert_eq!(result.affected_rows, 2);
}

#[tokio::test]
async fn test_run_without_result_set_has_no_columns() {
    let service = setup_service().await;

    let result = service
        .run(
            "insert into test (val) values ([?])",
            ParamSet::positional(vec![ints(&[4])]),
        )
        .await
        .expect("Failed to insert");

    assert_eq!(result.column_count(), 0);
    assert_eq!(result.row_count(), 0);
    assert_eq!(result.affected_rows, 1);
}

#[tokio::test]
async fn test_closed_connection_refuses_queries() {
    let conn = SqliteConnection::open_in_memory().expect("Failed to open database");
    assert!(!conn.is_closed());

    conn.close().await.expect("Failed to close connection");
    assert!(conn.is_closed());

    let err = conn
        .query("select 1", &FlatParams::default())
        .await
        .expect_err("Closed connection should fail");
    assert!(matches!(err, QexpandError::Connection(_)));
}

#[tokio::test]
async fn test_file_database_round_trip() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("qexpand_test.db");
    let path = path.to_str().expect("temp path is UTF-8");

    let conn = SqliteConnection::open(path).expect("Failed to open file database");
    conn.execute_batch("create table t (id integer primary key, name text); insert into t (name) values ('a'), ('b'), ('c');")
        .await
        .expect("Failed to set up schema");

    let service = QueryService::new(Arc::new(conn));
    let result = service
        .run(
            "select name from t where id in ([?]) order by id",
            ParamSet::positional(vec![ints(&[1, 3])]),
        )
        .await
        .expect("Failed to select");

    let names: Vec<Option<&str>> = result.rows.iter().map(|r| r.get(0).and_then(Value::as_str)).collect();
    assert_eq!(names, vec![Some("a"), Some("c")]);
}

#[test]
fn test_open_rejects_missing_parent_directory() {
    let result = SqliteConnection::open("/definitely/not/a/real/dir/db.sqlite");
    assert!(matches!(result, Err(QexpandError::Connection(_))));
}
