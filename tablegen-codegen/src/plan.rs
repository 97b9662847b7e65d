//! Turning schema metadata and per-table options into a deterministic plan.

use std::collections::BTreeMap;

use serde::Serialize;
use tablegen_core::{ColumnInfo, TableInfo, TableOption, default_service_name};
use tablegen_project::ProjectInfo;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("option references unknown table '{table}'")]
    UnknownTable { table: String },

    #[error("table '{table}' resolves to an empty service name")]
    EmptyService { table: String },

    #[error("no column metadata for table '{table}'")]
    MissingColumns { table: String },
}

/// How the emitter treats a service's target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Write a fresh service file.
    Create,
    /// Merge into a file the project already has.
    Augment,
}

/// One table and its resolved columns within a plan entry.
#[derive(Debug, Clone, Serialize)]
pub struct TablePlan {
    pub table: String,
    pub columns: Vec<ColumnInfo>,
}

/// All tables grouped under one service.
#[derive(Debug, Clone, Serialize)]
pub struct PlanEntry {
    pub service: String,
    pub mode: Mode,
    pub tables: Vec<TablePlan>,
}

/// The finalized description of what will be generated. Entries are ordered
/// by service name, tables within an entry by table name.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationPlan {
    pub entries: Vec<PlanEntry>,
}

impl GenerationPlan {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn table_count(&self) -> usize {
        self.entries.iter().map(|e| e.tables.len()).sum()
    }
}

/// Build a generation plan.
///
/// Option resolution is by exact table-name match; among duplicate options
/// for one table, the lowest id wins. Excluded tables are dropped entirely.
/// Remaining tables are grouped by resolved service name; a group whose
/// service already exists in the project is marked [`Mode::Augment`].
pub fn plan(
    tables: &[TableInfo],
    columns: &BTreeMap<String, Vec<ColumnInfo>>,
    options: &[TableOption],
    project: &ProjectInfo,
) -> Result<GenerationPlan, PlanError> {
    for option in options {
        if !tables.iter().any(|t| t.name == option.name) {
            return Err(PlanError::UnknownTable {
                table: option.name.clone(),
            });
        }
    }

    let mut groups: BTreeMap<String, Vec<TablePlan>> = BTreeMap::new();

    for table in tables {
        let resolved = match winning_option(options, &table.name) {
            Some(option) if option.exclude => continue,
            Some(option) => option.resolved_service(),
            None => default_service_name(&table.name),
        };
        if resolved.is_empty() {
            return Err(PlanError::EmptyService {
                table: table.name.clone(),
            });
        }

        let cols = columns
            .get(&table.name)
            .ok_or_else(|| PlanError::MissingColumns {
                table: table.name.clone(),
            })?;

        groups.entry(resolved).or_default().push(TablePlan {
            table: table.name.clone(),
            columns: cols.clone(),
        });
    }

    let entries = groups
        .into_iter()
        .map(|(service, mut tables)| {
            tables.sort_by(|a, b| a.table.cmp(&b.table));
            let mode = if project.has_service(&service) {
                Mode::Augment
            } else {
                Mode::Create
            };
            PlanEntry {
                service,
                mode,
                tables,
            }
        })
        .collect();

    let plan = GenerationPlan { entries };
    tracing::debug!(
        services = plan.entries.len(),
        tables = plan.table_count(),
        "built generation plan"
    );
    Ok(plan)
}

/// The authoritative option for a table: exact name match, lowest id wins.
fn winning_option<'a>(options: &'a [TableOption], table: &str) -> Option<&'a TableOption> {
    options
        .iter()
        .filter(|o| o.name == table)
        .min_by_key(|o| o.id)
}
