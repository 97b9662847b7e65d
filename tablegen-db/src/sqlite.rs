//! SQLite driver: embedded, file-based dialect.

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};
use tablegen_core::{ColumnInfo, DbConfig, DbError, Dialect, Result, TableInfo, TableKind};

use crate::driver::{DatabaseDriver, SchemaConnection};

/// SQLite database driver.
#[derive(Debug)]
pub struct SqliteDriver;

impl SqliteDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SqliteDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for SqliteDriver {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn open(&self, config: &DbConfig) -> Result<Box<dyn SchemaConnection>> {
        // The dsn override doubles as a path or "file:" URI for the
        // embedded dialect.
        let path = match (&config.dsn, &config.path) {
            (Some(dsn), _) => dsn.clone(),
            (None, Some(path)) => path.display().to_string(),
            (None, None) => {
                return Err(DbError::validation("sqlite requires a database file path"));
            }
        };

        let conn = SqliteConnection::open(&path)?;
        tracing::debug!(path = %path, "sqlite connection established");
        Ok(Box::new(conn))
    }
}

/// SQLite connection wrapper.
///
/// rusqlite is synchronous; calls run under a mutex on the current task.
/// Metadata queries are short, and one handle serves one in-flight query at
/// a time by contract.
pub struct SqliteConnection {
    conn: Mutex<Connection>,
}

impl SqliteConnection {
    fn open(path: &str) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        let conn = if path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open_with_flags(path, flags)
        }
        .map_err(|e| {
            DbError::network(format!("failed to open sqlite database at '{path}'"))
                .with_details(e)
        })?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn query_err(e: rusqlite::Error) -> DbError {
    DbError::schema_introspection("sqlite metadata query failed").with_details(e)
}

#[async_trait]
impl SchemaConnection for SqliteConnection {
    async fn server_version(&self) -> Result<String> {
        self.conn
            .lock()
            .query_row("SELECT sqlite_version()", [], |row| row.get(0))
            .map_err(query_err)
    }

    async fn table_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .lock()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
                [],
                |row| row.get(0),
            )
            .map_err(query_err)?;
        Ok(count as usize)
    }

    async fn list_tables(&self) -> Result<Vec<TableInfo>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT m.name, m.type, \
                        (SELECT COUNT(*) FROM pragma_table_info(m.name)), \
                        (SELECT COUNT(*) FROM pragma_index_list(m.name)) \
                 FROM sqlite_master m \
                 WHERE m.type = 'table' AND m.name NOT LIKE 'sqlite_%' \
                 ORDER BY m.name",
            )
            .map_err(query_err)?;

        let tables = stmt
            .query_map([], |row| {
                let kind: String = row.get(1)?;
                Ok(TableInfo {
                    name: row.get(0)?,
                    kind: TableKind::from_meta(&kind),
                    engine: None,
                    row_estimate: 0,
                    comment: None,
                    column_count: row.get::<_, i64>(2)? as usize,
                    index_count: row.get::<_, i64>(3)? as usize,
                    created: None,
                })
            })
            .map_err(query_err)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(query_err)?;

        Ok(tables)
    }

    async fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT name, type, \"notnull\", dflt_value, pk \
                 FROM pragma_table_info(?1) ORDER BY cid",
            )
            .map_err(query_err)?;

        let columns = stmt
            .query_map([table], |row| {
                let sql_type: String = row.get(1)?;
                let notnull: i64 = row.get(2)?;
                let pk: i64 = row.get(4)?;
                Ok(ColumnInfo {
                    name: row.get(0)?,
                    sql_type: sql_type.to_lowercase(),
                    nullable: notnull == 0,
                    primary_key: pk > 0,
                    default: row.get(3)?,
                    comment: None,
                    extra: None,
                })
            })
            .map_err(query_err)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(query_err)?;

        Ok(columns)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        // Dropping the rusqlite handle closes the file.
        Ok(())
    }
}
