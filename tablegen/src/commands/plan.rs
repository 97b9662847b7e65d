use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use tablegen_codegen::{GenerationPlan, Mode};
use tablegen_db::{connect, snapshot};
use tablegen_project::ProjectInfo;

use super::UnwrapOrExit;
use super::json::print_json;
use crate::config::RunConfig;

#[derive(Args)]
pub struct PlanCommand {
    /// Path to tablegen.toml (defaults to ./tablegen.toml)
    #[arg(short, long, default_value = "tablegen.toml")]
    pub config: PathBuf,

    /// Where to start looking for the host project
    #[arg(short, long, default_value = ".")]
    pub project: PathBuf,

    /// Emit the plan as JSON
    #[arg(long)]
    pub json: bool,
}

impl PlanCommand {
    pub async fn run(&self) -> Result<()> {
        let config = RunConfig::open(&self.config).unwrap_or_exit();
        let project = tablegen_project::detect(&self.project).unwrap_or_exit();
        let plan = build_plan(&config, &project).await?;

        if self.json {
            return print_json(&plan);
        }
        print_plan(&plan);
        Ok(())
    }
}

/// Connect, introspect, and plan. Used by both `plan` and `generate`.
pub(super) async fn build_plan(
    config: &RunConfig,
    project: &ProjectInfo,
) -> Result<GenerationPlan> {
    tracing::debug!(dialect = %config.database.dialect, "connecting for schema snapshot");
    let conn = connect(&config.database).await?;
    let result = snapshot(conn.as_ref(), config.database.timeout()).await;
    conn.close().await?;
    let schema = result?;
    tracing::debug!(tables = schema.tables.len(), "schema snapshot complete");

    let plan = tablegen_codegen::plan(&schema.tables, &schema.columns, &config.tables, project)?;
    Ok(plan)
}

pub(super) fn print_plan(plan: &GenerationPlan) {
    if plan.is_empty() {
        println!("nothing to generate");
        return;
    }

    println!(
        "{} services, {} tables:",
        plan.entries.len(),
        plan.table_count()
    );
    for entry in &plan.entries {
        let mode = match entry.mode {
            Mode::Create => "create",
            Mode::Augment => "augment",
        };
        println!("  {} ({mode})", entry.service);
        for table in &entry.tables {
            println!("    {} ({} columns)", table.table, table.columns.len());
        }
    }
}
