use serde::{Deserialize, Serialize};

/// Table kind as reported by the engine's metadata catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    BaseTable,
    View,
}

impl TableKind {
    /// Normalize an engine-reported kind string ("BASE TABLE", "VIEW",
    /// "table", ...). Anything that is not recognizably a view counts as a
    /// base table.
    pub fn from_meta(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("view") {
            TableKind::View
        } else {
            TableKind::BaseTable
        }
    }
}

/// Table metadata, produced fresh on every introspection call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub name: String,
    pub kind: TableKind,
    /// Storage engine where the dialect has one (MySQL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    /// Estimated row count; engines report this approximately.
    pub row_estimate: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub column_count: usize,
    pub index_count: usize,
    /// Creation timestamp as reported by the engine, verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

/// Column metadata, ordered by declaration position within its table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Normalized type name, e.g. "varchar(255)" or "bigint".
    pub sql_type: String,
    pub nullable: bool,
    pub primary_key: bool,
    /// Default value as a literal string; absent means no default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Engine-specific attributes such as "auto_increment".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_kind_normalization() {
        assert_eq!(TableKind::from_meta("BASE TABLE"), TableKind::BaseTable);
        assert_eq!(TableKind::from_meta("table"), TableKind::BaseTable);
        assert_eq!(TableKind::from_meta("VIEW"), TableKind::View);
        assert_eq!(TableKind::from_meta("view"), TableKind::View);
    }
}
