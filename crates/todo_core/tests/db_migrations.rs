use todo_core::db::migrations::latest_version;
use todo_core::db::{open_db, open_db_in_memory, ConnectionError, ConnectionProvider};
use todo_core::{ConfigError, StoreConfig};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "person");
    assert_table_exists(&conn, "todo_item");
}

#[test]
fn opened_connections_enforce_foreign_keys() {
    let conn = open_db_in_memory().unwrap();

    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);

    let err = conn
        .execute(
            "INSERT INTO todo_item (title, done, assignee_id) VALUES ('orphan', 0, 42);",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY"), "unexpected error: {err}");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo_it.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    conn_first
        .execute(
            "INSERT INTO person (first_name, last_name) VALUES ('Ada', 'Lovelace');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let people: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM person;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(people, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        ConnectionError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unreachable_database_path_is_a_connection_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("todo_it.db");

    let err = open_db(&path).unwrap_err();
    match err {
        ConnectionError::Open { target, .. } => assert!(target.ends_with("todo_it.db")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn provider_opens_a_fresh_connection_per_call() {
    let dir = tempfile::tempdir().unwrap();
    let provider = ConnectionProvider::new(StoreConfig::for_path(dir.path().join("todo_it.db")));

    let first = provider.connect().unwrap();
    first
        .execute(
            "INSERT INTO person (first_name, last_name) VALUES ('Grace', 'Hopper');",
            [],
        )
        .unwrap();

    let second = provider.connect().unwrap();
    let people: i64 = second
        .query_row("SELECT COUNT(*) FROM person;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(people, 1);
}

#[test]
fn provider_rejects_empty_database_path() {
    let provider = ConnectionProvider::new(StoreConfig::for_path(""));

    match provider.connect() {
        Err(ConnectionError::InvalidConfig(ConfigError::Invalid(message))) => {
            assert!(message.contains("database_path"), "unexpected message: {message}")
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("empty database path must not open a temporary database"),
    }
}

#[test]
fn provider_rejects_zero_busy_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo_it.db");
    let mut config = StoreConfig::for_path(&path);
    config.busy_timeout_ms = 0;

    let err = ConnectionProvider::new(config).connect().unwrap_err();
    assert!(
        matches!(err, ConnectionError::InvalidConfig(ConfigError::Invalid(_))),
        "unexpected error: {err}"
    );
    assert!(!path.exists());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
