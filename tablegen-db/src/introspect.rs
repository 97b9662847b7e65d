//! Whole-schema introspection over an open connection.

use std::collections::BTreeMap;
use std::time::Duration;

use tablegen_core::{ColumnInfo, DbError, Result, TableInfo};
use tokio::time::timeout;

use crate::driver::SchemaConnection;

/// Everything the planner needs from a live database, captured in one pass.
#[derive(Debug, Clone, Default)]
pub struct SchemaSnapshot {
    /// Tables sorted by name.
    pub tables: Vec<TableInfo>,
    /// Columns per table, in declaration order.
    pub columns: BTreeMap<String, Vec<ColumnInfo>>,
}

impl SchemaSnapshot {
    pub fn columns_for(&self, table: &str) -> Option<&[ColumnInfo]> {
        self.columns.get(table).map(Vec::as_slice)
    }
}

/// Capture a schema snapshot, bounding each metadata query by `per_query`.
///
/// A table that lists but then reports zero columns has been dropped between
/// the two queries; that race is surfaced as an error rather than an empty
/// entry so the planner never generates from a phantom table.
pub async fn snapshot(
    conn: &dyn SchemaConnection,
    per_query: Duration,
) -> Result<SchemaSnapshot> {
    let mut tables = bounded(per_query, conn.list_tables(), "table listing").await?;
    tables.sort_by(|a, b| a.name.cmp(&b.name));

    let mut columns = BTreeMap::new();
    for table in &tables {
        let cols = bounded(
            per_query,
            conn.list_columns(&table.name),
            "column listing",
        )
        .await?;
        if cols.is_empty() {
            return Err(DbError::schema_introspection(format!(
                "table '{}' vanished during introspection",
                table.name
            )));
        }
        columns.insert(table.name.clone(), cols);
    }

    tracing::debug!(tables = tables.len(), "captured schema snapshot");
    Ok(SchemaSnapshot { tables, columns })
}

async fn bounded<T>(
    limit: Duration,
    fut: impl std::future::Future<Output = Result<T>>,
    what: &str,
) -> Result<T> {
    match timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(DbError::timeout(format!(
            "{what} exceeded {limit:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tablegen_core::{ErrorCode, TableKind};

    use super::*;

    struct FakeConnection {
        tables: Vec<&'static str>,
        /// Tables that list but report no columns.
        vanished: Vec<&'static str>,
    }

    fn table(name: &str) -> TableInfo {
        TableInfo {
            name: name.to_string(),
            kind: TableKind::BaseTable,
            engine: None,
            row_estimate: 0,
            comment: None,
            column_count: 1,
            index_count: 0,
            created: None,
        }
    }

    fn column(name: &str) -> ColumnInfo {
        ColumnInfo {
            name: name.to_string(),
            sql_type: "integer".to_string(),
            nullable: false,
            primary_key: false,
            default: None,
            comment: None,
            extra: None,
        }
    }

    #[async_trait]
    impl SchemaConnection for FakeConnection {
        async fn server_version(&self) -> Result<String> {
            Ok("fake".to_string())
        }

        async fn table_count(&self) -> Result<usize> {
            Ok(self.tables.len())
        }

        async fn list_tables(&self) -> Result<Vec<TableInfo>> {
            Ok(self.tables.iter().map(|t| table(t)).collect())
        }

        async fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
            if self.vanished.contains(&table) {
                return Ok(Vec::new());
            }
            Ok(vec![column("id"), column("name")])
        }

        async fn close(self: Box<Self>) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_snapshot_sorts_tables_by_name() {
        let conn = FakeConnection {
            tables: vec!["zebras", "accounts", "members"],
            vanished: vec![],
        };

        let snap = snapshot(&conn, Duration::from_secs(5)).await.unwrap();
        let names: Vec<_> = snap.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["accounts", "members", "zebras"]);
        assert_eq!(snap.columns_for("accounts").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_vanished_table_is_an_error_not_an_empty_entry() {
        let conn = FakeConnection {
            tables: vec!["accounts", "ghosts"],
            vanished: vec!["ghosts"],
        };

        let err = snapshot(&conn, Duration::from_secs(5)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SchemaIntrospection);
        assert!(err.message.contains("ghosts"));
    }

    #[tokio::test]
    async fn test_empty_database_yields_empty_snapshot() {
        let conn = FakeConnection {
            tables: vec![],
            vanished: vec![],
        };

        let snap = snapshot(&conn, Duration::from_secs(5)).await.unwrap();
        assert!(snap.tables.is_empty());
        assert!(snap.columns.is_empty());
    }
}
