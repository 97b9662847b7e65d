//! Connection management: bounded connect attempts with classified,
//! data-shaped outcomes.

use std::time::Instant;

use tablegen_core::{ConnectionResult, DbConfig, DbError, Result};
use tokio::time::timeout;

use crate::driver::SchemaConnection;
use crate::registry::DriverRegistry;

/// Open a connection through the default registry under the configured
/// timeout. The config is validated first; no I/O happens on a malformed
/// config.
pub async fn connect(config: &DbConfig) -> Result<Box<dyn SchemaConnection>> {
    connect_with(&DriverRegistry::with_defaults(), config).await
}

/// Open a connection through a caller-supplied registry.
pub async fn connect_with(
    registry: &DriverRegistry,
    config: &DbConfig,
) -> Result<Box<dyn SchemaConnection>> {
    config.validate()?;
    let driver = registry.get(config.dialect)?;

    match timeout(config.timeout(), driver.open(config)).await {
        Ok(result) => result,
        // Dropping the open future tears down any half-established session.
        Err(_) => Err(DbError::timeout(format!(
            "connecting to {} exceeded {:?}",
            config.dialect,
            config.timeout()
        ))),
    }
}

/// Test a connection and report a structured outcome.
///
/// Never returns an error: every failure is classified and carried inside
/// the [`ConnectionResult`] so the caller can re-prompt the user. The
/// handle is released before returning on every path.
pub async fn test_connection(config: &DbConfig) -> ConnectionResult {
    test_connection_with(&DriverRegistry::with_defaults(), config).await
}

/// Test a connection through a caller-supplied registry.
pub async fn test_connection_with(
    registry: &DriverRegistry,
    config: &DbConfig,
) -> ConnectionResult {
    let start = Instant::now();

    let conn = match connect_with(registry, config).await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::debug!(error = %e, "connection test failed");
            return ConnectionResult::failure(e, start.elapsed());
        }
    };

    let bound = config.timeout();

    // Version lookup failures are not fatal to the test.
    let version = match timeout(bound, conn.server_version()).await {
        Ok(Ok(raw)) => Some(clean_version(&raw)),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "failed to query server version");
            None
        }
        Err(_) => {
            let _ = conn.close().await;
            return ConnectionResult::failure(
                DbError::timeout("server version query exceeded the configured bound"),
                start.elapsed(),
            );
        }
    };

    let tables = match timeout(bound, conn.table_count()).await {
        Ok(Ok(count)) => count,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "failed to count tables");
            0
        }
        Err(_) => {
            let _ = conn.close().await;
            return ConnectionResult::failure(
                DbError::timeout("table count query exceeded the configured bound"),
                start.elapsed(),
            );
        }
    };

    if let Err(e) = conn.close().await {
        tracing::warn!(error = %e, "failed to close connection cleanly");
    }

    let database = config
        .database
        .clone()
        .or_else(|| config.path.as_ref().map(|p| p.display().to_string()));

    ConnectionResult::success(
        format!("connected to {} database", config.dialect),
        database,
        version,
        start.elapsed(),
        tables,
    )
}

/// Trim noisy engine banners down to the leading version token.
fn clean_version(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "unknown".to_string();
    }
    // "PostgreSQL 16.2 on x86_64..." and MySQL banners both lead with the
    // interesting part.
    match trimmed.split(" on ").next() {
        Some(lead) => lead.trim().to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use tablegen_core::{ColumnInfo, Dialect, ErrorCode, TableInfo};

    use super::*;
    use crate::driver::DatabaseDriver;

    /// Adapter spy that records open attempts.
    #[derive(Debug)]
    struct SpyDriver {
        dialect: Dialect,
        opens: Arc<AtomicUsize>,
        behavior: SpyBehavior,
    }

    #[derive(Debug)]
    enum SpyBehavior {
        Succeed { tables: usize },
        Fail(DbError),
        Hang,
    }

    struct SpyConnection {
        tables: usize,
    }

    #[async_trait]
    impl DatabaseDriver for SpyDriver {
        fn dialect(&self) -> Dialect {
            self.dialect
        }

        async fn open(&self, _config: &DbConfig) -> Result<Box<dyn SchemaConnection>> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                SpyBehavior::Succeed { tables } => {
                    Ok(Box::new(SpyConnection { tables: *tables }))
                }
                SpyBehavior::Fail(e) => Err(e.clone()),
                SpyBehavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    unreachable!("hang behavior should be cancelled by the timeout")
                }
            }
        }
    }

    #[async_trait]
    impl SchemaConnection for SpyConnection {
        async fn server_version(&self) -> Result<String> {
            Ok("TestDB 1.0 on test-arch".to_string())
        }

        async fn table_count(&self) -> Result<usize> {
            Ok(self.tables)
        }

        async fn list_tables(&self) -> Result<Vec<TableInfo>> {
            Ok(Vec::new())
        }

        async fn list_columns(&self, _table: &str) -> Result<Vec<ColumnInfo>> {
            Ok(Vec::new())
        }

        async fn close(self: Box<Self>) -> Result<()> {
            Ok(())
        }
    }

    fn spy_registry(behavior: SpyBehavior) -> (DriverRegistry, Arc<AtomicUsize>) {
        let opens = Arc::new(AtomicUsize::new(0));
        let mut registry = DriverRegistry::new();
        registry.register(Arc::new(SpyDriver {
            dialect: Dialect::Mysql,
            opens: opens.clone(),
            behavior,
        }));
        (registry, opens)
    }

    fn valid_config() -> DbConfig {
        let mut cfg = DbConfig::new(Dialect::Mysql);
        cfg.host = Some("db.internal".to_string());
        cfg.username = Some("svc".to_string());
        cfg.database = Some("app".to_string());
        cfg
    }

    #[tokio::test]
    async fn test_invalid_config_performs_no_io() {
        let (registry, opens) = spy_registry(SpyBehavior::Succeed { tables: 0 });
        let cfg = DbConfig::new(Dialect::Mysql); // missing host/username

        let result = test_connection_with(&registry, &cfg).await;

        assert!(!result.success);
        assert!(!result.connected);
        assert_eq!(result.error.as_ref().unwrap().code, ErrorCode::Validation);
        assert_eq!(opens.load(Ordering::SeqCst), 0, "no open may be attempted");
    }

    #[tokio::test]
    async fn test_unregistered_dialect_performs_no_io() {
        let registry = DriverRegistry::new();
        let result = test_connection_with(&registry, &valid_config()).await;
        assert_eq!(
            result.error.as_ref().unwrap().code,
            ErrorCode::UnsupportedDialect
        );
    }

    #[tokio::test]
    async fn test_successful_attempt_reports_snapshot() {
        let (registry, opens) = spy_registry(SpyBehavior::Succeed { tables: 4 });
        let result = test_connection_with(&registry, &valid_config()).await;

        assert!(result.success);
        assert!(result.connected);
        assert_eq!(result.tables, 4);
        assert_eq!(result.database.as_deref(), Some("app"));
        assert_eq!(result.server_version.as_deref(), Some("TestDB 1.0"));
        assert!(result.error.is_none());
        assert_eq!(opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_driver_failure_is_reported_as_data() {
        let (registry, _) = spy_registry(SpyBehavior::Fail(DbError::auth("denied")));
        let result = test_connection_with(&registry, &valid_config()).await;

        assert!(!result.success);
        assert_eq!(result.error.as_ref().unwrap().code, ErrorCode::Auth);
    }

    #[tokio::test]
    async fn test_connect_timeout_surfaces_timeout_error() {
        let (registry, _) = spy_registry(SpyBehavior::Hang);
        let mut cfg = valid_config();
        cfg.timeout_secs = Some(1);

        let result = test_connection_with(&registry, &cfg).await;

        assert!(!result.success);
        assert_eq!(result.error.as_ref().unwrap().code, ErrorCode::Timeout);
    }

    #[tokio::test]
    async fn test_sqlite_database_field_falls_back_to_path() {
        let opens = Arc::new(AtomicUsize::new(0));
        let mut registry = DriverRegistry::new();
        registry.register(Arc::new(SpyDriver {
            dialect: Dialect::Sqlite,
            opens,
            behavior: SpyBehavior::Succeed { tables: 0 },
        }));

        let mut cfg = DbConfig::new(Dialect::Sqlite);
        cfg.path = Some(PathBuf::from("/tmp/t.db"));

        let result = test_connection_with(&registry, &cfg).await;
        assert!(result.success);
        assert_eq!(result.tables, 0);
        assert_eq!(result.database.as_deref(), Some("/tmp/t.db"));
    }

    #[test]
    fn test_clean_version() {
        assert_eq!(clean_version("PostgreSQL 16.2 on x86_64-pc"), "PostgreSQL 16.2");
        assert_eq!(clean_version("8.4.0"), "8.4.0");
        assert_eq!(clean_version("  "), "unknown");
    }
}
