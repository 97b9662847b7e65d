use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use tablegen_core::DbError;
use tablegen_db::connect;

use super::UnwrapOrExit;
use super::json::print_json;
use crate::config::RunConfig;

#[derive(Args)]
pub struct ColumnsCommand {
    /// Table to describe
    pub table: String,

    /// Path to tablegen.toml (defaults to ./tablegen.toml)
    #[arg(short, long, default_value = "tablegen.toml")]
    pub config: PathBuf,

    /// Emit the column list as JSON
    #[arg(long)]
    pub json: bool,
}

impl ColumnsCommand {
    pub async fn run(&self) -> Result<()> {
        let config = RunConfig::open(&self.config).unwrap_or_exit();

        let conn = connect(&config.database).await?;
        let result = conn.list_columns(&self.table).await;
        conn.close().await?;
        let columns = result?;

        if columns.is_empty() {
            return Err(
                DbError::schema_introspection(format!("table '{}' not found", self.table)).into(),
            );
        }

        if self.json {
            return print_json(&columns);
        }

        println!("{} ({} columns):", self.table, columns.len());
        for column in &columns {
            let mut flags = Vec::new();
            if column.primary_key {
                flags.push("primary key".to_string());
            }
            if column.nullable {
                flags.push("nullable".to_string());
            }
            if let Some(default) = &column.default {
                flags.push(format!("default {default}"));
            }
            let suffix = if flags.is_empty() {
                String::new()
            } else {
                format!("  [{}]", flags.join(", "))
            };
            println!("  {} {}{}", column.name, column.sql_type, suffix);
        }
        Ok(())
    }
}
