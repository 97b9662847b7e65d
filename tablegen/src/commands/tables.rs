use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use tablegen_db::connect;

use super::UnwrapOrExit;
use super::json::print_json;
use crate::config::RunConfig;

#[derive(Args)]
pub struct TablesCommand {
    /// Path to tablegen.toml (defaults to ./tablegen.toml)
    #[arg(short, long, default_value = "tablegen.toml")]
    pub config: PathBuf,

    /// Emit the table list as JSON
    #[arg(long)]
    pub json: bool,
}

impl TablesCommand {
    pub async fn run(&self) -> Result<()> {
        let config = RunConfig::open(&self.config).unwrap_or_exit();

        let conn = connect(&config.database).await?;
        let result = conn.list_tables().await;
        conn.close().await?;
        let mut tables = result?;
        tables.sort_by(|a, b| a.name.cmp(&b.name));

        if self.json {
            return print_json(&tables);
        }

        if tables.is_empty() {
            println!("no tables");
            return Ok(());
        }

        println!("{} tables:", tables.len());
        for table in &tables {
            let mut extras = vec![format!("{} columns", table.column_count)];
            if let Some(engine) = &table.engine {
                extras.push(engine.clone());
            }
            if let Some(comment) = &table.comment {
                extras.push(comment.clone());
            }
            println!("  {} ({})", table.name, extras.join(", "));
        }
        Ok(())
    }
}
