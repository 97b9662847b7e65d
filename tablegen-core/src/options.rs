use serde::{Deserialize, Serialize};

use crate::to_snake_case;

/// One user decision per table.
///
/// A run supplies at most one authoritative option per table name; when
/// duplicates slip through, the planner lets the lowest id win. A table
/// without an option is included under a default service name derived from
/// the table name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOption {
    #[serde(default)]
    pub id: u32,
    pub name: String,
    /// Desired service grouping; absent or empty means "derive from the
    /// table name".
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub exclude: bool,
}

impl TableOption {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            service: None,
            exclude: false,
        }
    }

    /// Resolved service name: the explicit override when present and
    /// non-empty, otherwise the table name in the target naming convention.
    pub fn resolved_service(&self) -> String {
        match self.service.as_deref() {
            Some(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => default_service_name(&self.name),
        }
    }
}

/// Default service name for a table with no explicit option.
pub fn default_service_name(table: &str) -> String {
    to_snake_case(table)
}
