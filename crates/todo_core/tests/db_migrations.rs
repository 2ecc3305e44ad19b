use rusqlite::Connection;
use todo_core::db::migrations::latest_version;
use todo_core::db::{open_db, open_db_in_memory, DbStage};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "kv_slots");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todos.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO kv_slots (key, value) VALUES ('@todos', '[]');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let value: String = conn_second
        .query_row("SELECT value FROM kv_slots WHERE key = '@todos';", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(value, "[]");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    assert_eq!(err.location(), path.display().to_string());
    match err.stage() {
        DbStage::NewerSchema {
            found,
            latest_supported,
        } => {
            assert_eq!(*found, 999);
            assert_eq!(*latest_supported, latest_version());
        }
        other => panic!("unexpected stage: {other}"),
    }

    let reopened = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&reopened), 999);
}

#[test]
fn open_failure_names_the_database_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("todos.db");

    let err = open_db(&path).unwrap_err();
    assert!(matches!(err.stage(), DbStage::Connect(_)));
    assert_eq!(err.code(), "db_connect_failed");
    assert!(err.to_string().contains(&path.display().to_string()));
}

#[test]
fn blank_slot_keys_are_rejected_by_schema() {
    let conn = open_db_in_memory().unwrap();
    let result = conn.execute("INSERT INTO kv_slots (key, value) VALUES ('  ', '[]');", []);
    assert!(result.is_err());
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
