//! PostgreSQL driver: networked dialect over tokio-postgres.

use async_trait::async_trait;
use tablegen_core::{ColumnInfo, DbConfig, DbError, Dialect, Result, TableInfo, TableKind};
use tokio_postgres::{Client, NoTls, config::SslMode, error::SqlState};

use crate::driver::{DatabaseDriver, SchemaConnection};

/// PostgreSQL database driver.
#[derive(Debug)]
pub struct PostgresDriver;

impl PostgresDriver {
    pub fn new() -> Self {
        Self
    }

    fn build_config(config: &DbConfig) -> Result<tokio_postgres::Config> {
        if let Some(dsn) = &config.dsn {
            return dsn.parse().map_err(|e: tokio_postgres::Error| {
                DbError::validation("invalid postgres dsn").with_details(e)
            });
        }

        if config.ssl {
            // Connections are made with NoTls; an SslMode::Require config
            // would only fail later at the handshake with an opaque error.
            return Err(DbError::validation(
                "tls is not supported for postgres connections",
            ));
        }

        let mut pg = tokio_postgres::Config::new();
        if let Some(host) = &config.host {
            pg.host(host);
        }
        if let Some(port) = config.port() {
            pg.port(port);
        }
        if let Some(user) = &config.username {
            pg.user(user);
        }
        if let Some(password) = &config.password {
            pg.password(password);
        }
        if let Some(database) = &config.database {
            pg.dbname(database);
        }
        pg.ssl_mode(SslMode::Disable);
        Ok(pg)
    }
}

impl Default for PostgresDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for PostgresDriver {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn open(&self, config: &DbConfig) -> Result<Box<dyn SchemaConnection>> {
        let pg = Self::build_config(config)?;
        let (client, connection) = pg.connect(NoTls).await.map_err(classify)?;

        // The connection future drives the socket; it resolves once the
        // client is dropped.
        let handle = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::debug!(error = %e, "postgres connection task ended");
            }
        });

        tracing::debug!("postgres connection established");
        Ok(Box::new(PostgresConnection { client, handle }))
    }
}

pub struct PostgresConnection {
    client: Client,
    handle: tokio::task::JoinHandle<()>,
}

fn classify(e: tokio_postgres::Error) -> DbError {
    match e.code() {
        Some(code)
            if code == &SqlState::INVALID_PASSWORD
                || code == &SqlState::INVALID_AUTHORIZATION_SPECIFICATION =>
        {
            DbError::auth("postgres rejected the credentials").with_details(e)
        }
        Some(code) if code == &SqlState::UNDEFINED_TABLE => {
            DbError::schema_introspection("table vanished during introspection").with_details(e)
        }
        Some(_) => DbError::network("postgres connection error").with_details(e),
        None => DbError::network("postgres host unreachable").with_details(e),
    }
}

const LIST_TABLES: &str = "\
SELECT t.table_name,
       t.table_type,
       COALESCE(c.reltuples::bigint, 0) AS row_estimate,
       obj_description(c.oid) AS table_comment,
       (SELECT COUNT(*) FROM information_schema.columns col
         WHERE col.table_name = t.table_name AND col.table_schema = 'public') AS column_count,
       (SELECT COUNT(*) FROM pg_indexes i
         WHERE i.tablename = t.table_name AND i.schemaname = 'public') AS index_count
FROM information_schema.tables t
LEFT JOIN pg_class c ON c.relname = t.table_name
    AND c.relnamespace = 'public'::regnamespace
WHERE t.table_schema = 'public' AND t.table_type = 'BASE TABLE'
ORDER BY t.table_name";

// Primary-key membership and nullability come from the same pg_attribute
// scan so both observe one schema generation.
const LIST_COLUMNS: &str = "\
SELECT a.attname,
       pg_catalog.format_type(a.atttypid, a.atttypmod) AS sql_type,
       NOT a.attnotnull AS nullable,
       EXISTS (
           SELECT 1 FROM pg_constraint con
           WHERE con.conrelid = a.attrelid
             AND con.contype = 'p'
             AND a.attnum = ANY (con.conkey)
       ) AS primary_key,
       pg_get_expr(d.adbin, d.adrelid) AS column_default,
       col_description(a.attrelid, a.attnum) AS column_comment,
       CASE WHEN a.attidentity <> '' THEN 'generated' ELSE NULL END AS extra
FROM pg_attribute a
LEFT JOIN pg_attrdef d ON a.attrelid = d.adrelid AND a.attnum = d.adnum
WHERE a.attrelid = to_regclass('public.' || quote_ident($1::text))
  AND a.attnum > 0 AND NOT a.attisdropped
ORDER BY a.attnum";

#[async_trait]
impl SchemaConnection for PostgresConnection {
    async fn server_version(&self) -> Result<String> {
        let row = self
            .client
            .query_one("SELECT version()", &[])
            .await
            .map_err(classify)?;
        Ok(row.get(0))
    }

    async fn table_count(&self) -> Result<usize> {
        let row = self
            .client
            .query_one(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = 'public' AND table_type = 'BASE TABLE'",
                &[],
            )
            .await
            .map_err(classify)?;
        let count: i64 = row.get(0);
        Ok(count as usize)
    }

    async fn list_tables(&self) -> Result<Vec<TableInfo>> {
        let rows = self
            .client
            .query(LIST_TABLES, &[])
            .await
            .map_err(classify)?;

        Ok(rows
            .iter()
            .map(|row| {
                let kind: String = row.get(1);
                let row_estimate: i64 = row.get(2);
                let column_count: i64 = row.get(4);
                let index_count: i64 = row.get(5);
                TableInfo {
                    name: row.get(0),
                    kind: TableKind::from_meta(&kind),
                    engine: None,
                    row_estimate: row_estimate.max(0) as u64,
                    comment: row.get(3),
                    column_count: column_count as usize,
                    index_count: index_count as usize,
                    created: None,
                }
            })
            .collect())
    }

    async fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let rows = self
            .client
            .query(LIST_COLUMNS, &[&table])
            .await
            .map_err(classify)?;

        Ok(rows
            .iter()
            .map(|row| ColumnInfo {
                name: row.get(0),
                sql_type: row.get(1),
                nullable: row.get(2),
                primary_key: row.get(3),
                default: row.get(4),
                comment: row.get(5),
                extra: row.get(6),
            })
            .collect())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        drop(self.client);
        let _ = self.handle.await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tablegen_core::ErrorCode;

    use super::*;

    #[test]
    fn tls_request_is_rejected_before_connecting() {
        let mut cfg = DbConfig::new(Dialect::Postgres);
        cfg.host = Some("localhost".into());
        cfg.username = Some("app".into());
        cfg.ssl = true;

        let err = PostgresDriver::build_config(&cfg).unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);
        assert!(err.message.contains("tls"));
    }

    #[test]
    fn plain_config_disables_ssl_mode() {
        let mut cfg = DbConfig::new(Dialect::Postgres);
        cfg.host = Some("localhost".into());
        cfg.username = Some("app".into());

        let pg = PostgresDriver::build_config(&cfg).unwrap();
        assert_eq!(pg.get_ssl_mode(), SslMode::Disable);
    }
}
