//! End-to-end introspection against a real SQLite file.

use std::time::Duration;

use tablegen_core::{DbConfig, Dialect, TableKind};
use tablegen_db::{connect, snapshot, test_connection};

fn seeded_config(dir: &tempfile::TempDir) -> DbConfig {
    let path = dir.path().join("app.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE user_accounts (
                 id INTEGER PRIMARY KEY,
                 email TEXT NOT NULL,
                 display_name TEXT,
                 created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
             );
             CREATE TABLE audit_log (
                 id INTEGER PRIMARY KEY,
                 account_id INTEGER NOT NULL,
                 action TEXT NOT NULL
             );
             CREATE INDEX idx_audit_account ON audit_log (account_id);",
        )
        .unwrap();
    }

    let mut cfg = DbConfig::new(Dialect::Sqlite);
    cfg.path = Some(path);
    cfg
}

#[tokio::test]
async fn connection_test_reports_table_count() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = seeded_config(&dir);

    let result = test_connection(&cfg).await;
    assert!(result.success, "unexpected failure: {:?}", result.error);
    assert!(result.connected);
    assert_eq!(result.tables, 2);
    assert!(result.server_version.is_some());
    assert!(result.error.is_none());
}

#[tokio::test]
async fn connection_test_succeeds_on_empty_database() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = DbConfig::new(Dialect::Sqlite);
    cfg.path = Some(dir.path().join("fresh.db"));

    // An empty database is a valid target, not an error.
    let result = test_connection(&cfg).await;
    assert!(result.success, "unexpected failure: {:?}", result.error);
    assert_eq!(result.tables, 0);
}

#[tokio::test]
async fn snapshot_captures_tables_and_columns_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = seeded_config(&dir);

    let conn = connect(&cfg).await.unwrap();
    let snap = snapshot(conn.as_ref(), Duration::from_secs(5))
        .await
        .unwrap();
    conn.close().await.unwrap();

    let names: Vec<_> = snap.tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["audit_log", "user_accounts"]);

    let accounts = &snap.tables[1];
    assert_eq!(accounts.kind, TableKind::BaseTable);
    assert_eq!(accounts.column_count, 4);

    let audit = &snap.tables[0];
    assert_eq!(audit.index_count, 1);

    // Columns come back in declaration order.
    let cols = snap.columns_for("user_accounts").unwrap();
    let col_names: Vec<_> = cols.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(col_names, vec!["id", "email", "display_name", "created_at"]);

    let id = &cols[0];
    assert!(id.primary_key);
    assert_eq!(id.sql_type, "integer");

    let email = &cols[1];
    assert!(!email.nullable);
    assert!(!email.primary_key);

    let display = &cols[2];
    assert!(display.nullable);

    let created = &cols[3];
    assert_eq!(created.default.as_deref(), Some("CURRENT_TIMESTAMP"));
}
