use choreprefs_core::db::{open_db, open_db_in_memory, schema_version, DbError, STORE_TABLES};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(stored_version(&conn), schema_version());
    for table in STORE_TABLES {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn reopening_file_database_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("choreprefs.db");

    let first = open_db(&path).unwrap();
    first
        .execute("INSERT INTO chores (name) VALUES ('Dishes');", [])
        .unwrap();
    drop(first);

    let second = open_db(&path).unwrap();
    assert_eq!(stored_version(&second), schema_version());
    let count: i64 = second
        .query_row("SELECT COUNT(*) FROM chores;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, schema_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn opening_database_with_dropped_store_table_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("damaged.db");

    let conn = open_db(&path).unwrap();
    conn.execute_batch("DROP TABLE preferences;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::MissingTable(table) => assert_eq!(table, "preferences"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn preference_score_range_is_enforced_by_schema() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO chores (name) VALUES ('Dishes');
         INSERT INTO roommates (id, name) VALUES ('00000000-0000-4000-8000-000000000001', 'Alex');",
    )
    .unwrap();

    let result = conn.execute(
        "INSERT INTO preferences (roommate_id, chore_id, preference_score)
         VALUES ('00000000-0000-4000-8000-000000000001', 1, 6);",
        [],
    );
    assert!(result.is_err());
}

fn stored_version(conn: &Connection) -> u32 {
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
