// Integration tests against a live SQL Server.
//
// Ignored by default; run with a reachable server:
//   MSSQL_BRIDGE_TEST_SERVER=localhost \
//   MSSQL_BRIDGE_TEST_DATABASE=master \
//   MSSQL_BRIDGE_TEST_USER=sa \
//   MSSQL_BRIDGE_TEST_PASSWORD=... \
//   cargo test -- --ignored

use mssql_bridge::{CellValue, ConnectOptions, DatabaseManager};

fn options_from_env() -> ConnectOptions {
    let server = std::env::var("MSSQL_BRIDGE_TEST_SERVER").expect("MSSQL_BRIDGE_TEST_SERVER");
    let database = std::env::var("MSSQL_BRIDGE_TEST_DATABASE").expect("MSSQL_BRIDGE_TEST_DATABASE");
    let user = std::env::var("MSSQL_BRIDGE_TEST_USER").expect("MSSQL_BRIDGE_TEST_USER");
    let password = std::env::var("MSSQL_BRIDGE_TEST_PASSWORD").expect("MSSQL_BRIDGE_TEST_PASSWORD");

    ConnectOptions::new(database, server).user(user).password(password)
}

async fn connect() -> DatabaseManager {
    DatabaseManager::connect(options_from_env())
        .await
        .expect("live server connection")
}

#[tokio::test]
#[ignore = "requires a reachable SQL Server; set MSSQL_BRIDGE_TEST_*"]
async fn select_constants_come_back_as_named_columns() {
    let mut db = connect().await;

    let table = db.query_table("SELECT 1 AS a, 2 AS b").await.unwrap();
    assert_eq!(table.row_count, 1);
    assert_eq!(table.column_names(), vec!["a", "b"]);
    assert_eq!(table.get(0, "a"), Some(&CellValue::Int(1)));
    assert_eq!(table.get(0, "b"), Some(&CellValue::Int(2)));

    db.disconnect();
}

#[tokio::test]
#[ignore = "requires a reachable SQL Server; set MSSQL_BRIDGE_TEST_*"]
async fn committed_update_survives_a_reconnect() {
    let mut db = connect().await;
    db.run_query(
        "IF OBJECT_ID('bridge_commit_test') IS NOT NULL DROP TABLE bridge_commit_test",
        true,
    )
    .await
    .unwrap();
    db.run_query("CREATE TABLE bridge_commit_test (x INT)", true)
        .await
        .unwrap();
    db.run_query("INSERT INTO bridge_commit_test VALUES (1)", true)
        .await
        .unwrap();

    let summary = db
        .run_query("UPDATE bridge_commit_test SET x = 2", true)
        .await
        .unwrap();
    assert_eq!(summary.total(), 1);
    db.disconnect();

    let mut fresh = connect().await;
    let table = fresh
        .query_table("SELECT x FROM bridge_commit_test")
        .await
        .unwrap();
    assert_eq!(table.get(0, "x"), Some(&CellValue::Int(2)));

    fresh
        .run_query("DROP TABLE bridge_commit_test", true)
        .await
        .unwrap();
    fresh.disconnect();
}

#[tokio::test]
#[ignore = "requires a reachable SQL Server; set MSSQL_BRIDGE_TEST_*"]
async fn uncommitted_update_rolls_back_with_the_connection() {
    let mut setup = connect().await;
    setup
        .run_query(
            "IF OBJECT_ID('bridge_rollback_test') IS NOT NULL DROP TABLE bridge_rollback_test",
            true,
        )
        .await
        .unwrap();
    setup
        .run_query("CREATE TABLE bridge_rollback_test (x INT)", true)
        .await
        .unwrap();
    setup
        .run_query("INSERT INTO bridge_rollback_test VALUES (1)", true)
        .await
        .unwrap();
    setup.disconnect();

    // Implicit-transaction mode makes the update require an explicit commit;
    // commit=false leaves it open, and dropping the connection rolls it back.
    let mut db = connect().await;
    db.run_query(
        "SET IMPLICIT_TRANSACTIONS ON; UPDATE bridge_rollback_test SET x = 99",
        false,
    )
    .await
    .unwrap();
    db.disconnect();

    let mut fresh = connect().await;
    let table = fresh
        .query_table("SELECT x FROM bridge_rollback_test")
        .await
        .unwrap();
    assert_eq!(table.get(0, "x"), Some(&CellValue::Int(1)));

    fresh
        .run_query("DROP TABLE bridge_rollback_test", true)
        .await
        .unwrap();
    fresh.disconnect();
}

#[tokio::test]
#[ignore = "requires a reachable SQL Server; set MSSQL_BRIDGE_TEST_*"]
async fn disconnecting_one_instance_leaves_others_usable() {
    let mut first = connect().await;
    let mut second = connect().await;

    first.disconnect();
    first.disconnect(); // second call must not raise

    let table = second.query_table("SELECT 1 AS one").await.unwrap();
    assert_eq!(table.get(0, "one"), Some(&CellValue::Int(1)));
    second.disconnect();
}

#[tokio::test]
#[ignore = "requires a reachable SQL Server; set MSSQL_BRIDGE_TEST_*"]
async fn empty_result_sets_still_carry_column_names() {
    let mut db = connect().await;

    let table = db
        .query_table("SELECT name FROM sys.databases WHERE 1 = 0")
        .await
        .unwrap();
    assert!(table.is_empty());
    assert_eq!(table.column_names(), vec!["name"]);

    db.disconnect();
}
