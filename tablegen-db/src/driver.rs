//! Database driver trait definitions.

use async_trait::async_trait;
use tablegen_core::{ColumnInfo, DbConfig, Dialect, Result, TableInfo};

/// A database engine's connect capability.
///
/// Drivers are stateless; all connection identity comes from the
/// [`DbConfig`] passed to [`DatabaseDriver::open`]. The config is assumed to
/// have passed [`DbConfig::validate`] already; drivers classify connection
/// failures, not configuration shape.
#[async_trait]
pub trait DatabaseDriver: Send + Sync + std::fmt::Debug {
    fn dialect(&self) -> Dialect;

    /// Open a live connection. The returned handle owns the underlying
    /// session and must be closed via [`SchemaConnection::close`].
    async fn open(&self, config: &DbConfig) -> Result<Box<dyn SchemaConnection>>;
}

/// Uniform metadata surface over a live connection.
///
/// Implementations normalize type names, nullability, and default-value
/// representation into the canonical [`ColumnInfo`] shape so downstream
/// components are dialect-agnostic. One handle serves one in-flight
/// metadata query at a time.
#[async_trait]
pub trait SchemaConnection: Send + Sync {
    /// Server (or library) version string, raw.
    async fn server_version(&self) -> Result<String>;

    /// Number of user tables in the connected database.
    async fn table_count(&self) -> Result<usize>;

    /// All user tables, in whatever order the engine returns them.
    async fn list_tables(&self) -> Result<Vec<TableInfo>>;

    /// Columns of one table, ordered by declaration position. An empty
    /// result means the table does not exist (vanished mid-run).
    async fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>>;

    /// Close the underlying session. Consumes the handle so it cannot
    /// outlive the connection.
    async fn close(self: Box<Self>) -> Result<()>;
}
