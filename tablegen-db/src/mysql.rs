//! MySQL driver: networked dialect over mysql_async.

use async_trait::async_trait;
use mysql_async::{Conn, Opts, OptsBuilder, prelude::Queryable};
use tablegen_core::{ColumnInfo, DbConfig, DbError, Dialect, Result, TableInfo, TableKind};
use tokio::sync::Mutex;

use crate::driver::{DatabaseDriver, SchemaConnection};

/// MySQL database driver.
#[derive(Debug)]
pub struct MysqlDriver;

impl MysqlDriver {
    pub fn new() -> Self {
        Self
    }

    fn build_opts(config: &DbConfig) -> Result<Opts> {
        if let Some(dsn) = &config.dsn {
            return Opts::from_url(dsn)
                .map_err(|e| DbError::validation("invalid mysql dsn").with_details(e));
        }

        if config.ssl {
            // TLS support is compiled out of this driver build; a TLS
            // terminating proxy or tunnel is the supported path.
            return Err(DbError::validation(
                "tls is not supported for mysql connections",
            ));
        }

        let mut builder = OptsBuilder::default();
        if let Some(host) = &config.host {
            builder = builder.ip_or_hostname(host.clone());
        }
        if let Some(port) = config.port() {
            builder = builder.tcp_port(port);
        }
        builder = builder
            .user(config.username.clone())
            .pass(config.password.clone())
            .db_name(config.database.clone());
        Ok(builder.into())
    }
}

impl Default for MysqlDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for MysqlDriver {
    fn dialect(&self) -> Dialect {
        Dialect::Mysql
    }

    async fn open(&self, config: &DbConfig) -> Result<Box<dyn SchemaConnection>> {
        let opts = Self::build_opts(config)?;
        let conn = Conn::new(opts).await.map_err(classify)?;
        tracing::debug!("mysql connection established");
        Ok(Box::new(MysqlConnection {
            conn: Mutex::new(conn),
        }))
    }
}

pub struct MysqlConnection {
    conn: Mutex<Conn>,
}

fn classify(e: mysql_async::Error) -> DbError {
    match &e {
        mysql_async::Error::Server(server) => match server.code {
            // ER_ACCESS_DENIED_ERROR, ER_DBACCESS_DENIED_ERROR
            1044 | 1045 => DbError::auth("mysql rejected the credentials").with_details(e),
            // ER_BAD_DB_ERROR
            1049 => DbError::network("database does not exist").with_details(e),
            // ER_NO_SUCH_TABLE
            1146 => {
                DbError::schema_introspection("table vanished during introspection")
                    .with_details(e)
            }
            _ => DbError::network("mysql server error").with_details(e),
        },
        mysql_async::Error::Io(_) => DbError::network("mysql host unreachable").with_details(e),
        mysql_async::Error::Url(_) => DbError::validation("invalid mysql dsn").with_details(e),
        _ => DbError::network("mysql connection error").with_details(e),
    }
}

fn none_if_empty(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.is_empty())
}

const LIST_TABLES: &str = "\
SELECT t.TABLE_NAME, t.TABLE_TYPE, t.ENGINE, t.TABLE_ROWS,
       CAST(t.CREATE_TIME AS CHAR), t.TABLE_COMMENT,
       (SELECT COUNT(*) FROM information_schema.COLUMNS c
         WHERE c.TABLE_SCHEMA = t.TABLE_SCHEMA AND c.TABLE_NAME = t.TABLE_NAME),
       (SELECT COUNT(*) FROM information_schema.STATISTICS s
         WHERE s.TABLE_SCHEMA = t.TABLE_SCHEMA AND s.TABLE_NAME = t.TABLE_NAME)
FROM information_schema.TABLES t
WHERE t.TABLE_SCHEMA = DATABASE()
ORDER BY t.TABLE_NAME";

// COLUMN_TYPE already carries length/precision; COLUMN_KEY and IS_NULLABLE
// come from the same catalog row as the type.
const LIST_COLUMNS: &str = "\
SELECT COLUMN_NAME, COLUMN_TYPE, IS_NULLABLE, COLUMN_KEY,
       COLUMN_DEFAULT, COLUMN_COMMENT, EXTRA
FROM information_schema.COLUMNS
WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
ORDER BY ORDINAL_POSITION";

type TableRow = (
    String,
    String,
    Option<String>,
    Option<u64>,
    Option<String>,
    Option<String>,
    i64,
    i64,
);

type ColumnRow = (
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    String,
);

#[async_trait]
impl SchemaConnection for MysqlConnection {
    async fn server_version(&self) -> Result<String> {
        let mut conn = self.conn.lock().await;
        let version: Option<String> = conn.query_first("SELECT VERSION()").await.map_err(classify)?;
        version.ok_or_else(|| DbError::network("mysql returned no version row"))
    }

    async fn table_count(&self) -> Result<usize> {
        let mut conn = self.conn.lock().await;
        let count: Option<i64> = conn
            .query_first(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = DATABASE()",
            )
            .await
            .map_err(classify)?;
        Ok(count.unwrap_or(0) as usize)
    }

    async fn list_tables(&self) -> Result<Vec<TableInfo>> {
        let mut conn = self.conn.lock().await;
        let rows: Vec<TableRow> = conn.query(LIST_TABLES).await.map_err(classify)?;

        Ok(rows
            .into_iter()
            .map(
                |(name, kind, engine, rows, created, comment, columns, indexes)| TableInfo {
                    name,
                    kind: TableKind::from_meta(&kind),
                    engine: none_if_empty(engine),
                    row_estimate: rows.unwrap_or(0),
                    comment: none_if_empty(comment),
                    column_count: columns as usize,
                    index_count: indexes as usize,
                    created,
                },
            )
            .collect())
    }

    async fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let mut conn = self.conn.lock().await;
        let rows: Vec<ColumnRow> = conn
            .exec(LIST_COLUMNS, (table,))
            .await
            .map_err(classify)?;

        Ok(rows
            .into_iter()
            .map(
                |(name, sql_type, nullable, key, default, comment, extra)| ColumnInfo {
                    name,
                    sql_type,
                    nullable: nullable == "YES",
                    primary_key: key == "PRI",
                    default,
                    comment: none_if_empty(comment),
                    extra: none_if_empty(Some(extra)),
                },
            )
            .collect())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.conn.into_inner().disconnect().await.map_err(classify)
    }
}
