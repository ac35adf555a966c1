use finance_core::db::migrations::latest_version;
use finance_core::db::{open_db, open_db_in_memory, DbError};
use finance_core::{Account, CrudRepository, SqliteAccountRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "account",
        "expense_category",
        "income_source",
        "expense",
        "income",
    ] {
        assert_table_exists(&conn, table);
    }
    assert_index_exists(&conn, "idx_expense_account");
    assert_index_exists(&conn, "idx_income_source");
}

#[test]
fn connections_enforce_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn in_memory_databases_are_independent() {
    let first = open_db_in_memory().unwrap();
    let second = open_db_in_memory().unwrap();

    SqliteAccountRepository::try_new(&first)
        .unwrap()
        .save(&Account::builder().name("only here").build())
        .unwrap();

    let count = SqliteAccountRepository::try_new(&second)
        .unwrap()
        .count()
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn reopening_file_database_keeps_schema_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("finance.sqlite3");

    let conn_first = open_db(&path).unwrap();
    let saved = SqliteAccountRepository::try_new(&conn_first)
        .unwrap()
        .save(&Account::builder().name("Persistent").build())
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let loaded = SqliteAccountRepository::try_new(&conn_second)
        .unwrap()
        .find_by_id(saved.id.unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(loaded.name.as_deref(), Some("Persistent"));
}

#[test]
fn open_db_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("finance.sqlite3");

    let conn = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert!(path.exists());
}

#[test]
fn upgrades_database_left_at_first_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("v1.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE account (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            bank TEXT,
            balance REAL,
            is_active INTEGER
        );
        CREATE TABLE expense_category (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL);
        CREATE TABLE income_source (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL);
        CREATE TABLE expense (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount REAL NOT NULL,
            description TEXT,
            date TEXT,
            expense_category_id INTEGER NOT NULL REFERENCES expense_category(id),
            account_id INTEGER NOT NULL REFERENCES account(id)
        );
        CREATE TABLE income (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount REAL NOT NULL,
            date TEXT,
            income_source_id INTEGER NOT NULL REFERENCES income_source(id),
            account_id INTEGER NOT NULL REFERENCES account(id)
        );
        PRAGMA user_version = 1;",
    )
    .unwrap();
    drop(conn);

    let upgraded = open_db(&path).unwrap();
    assert_eq!(schema_version(&upgraded), latest_version());
    assert_index_exists(&upgraded, "idx_expense_category");
    assert_index_exists(&upgraded, "idx_income_account");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert!(
        sqlite_object_exists(conn, "table", table_name),
        "table {table_name} does not exist"
    );
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert!(
        sqlite_object_exists(conn, "index", index_name),
        "index {index_name} does not exist"
    );
}

fn sqlite_object_exists(conn: &Connection, kind: &str, name: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    exists == 1
}
