use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use tablegen_db::test_connection;

use super::UnwrapOrExit;
use super::json::print_json;
use crate::config::RunConfig;

#[derive(Args)]
pub struct PingCommand {
    /// Path to tablegen.toml (defaults to ./tablegen.toml)
    #[arg(short, long, default_value = "tablegen.toml")]
    pub config: PathBuf,

    /// Emit the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl PingCommand {
    pub async fn run(&self) -> Result<()> {
        let config = RunConfig::open(&self.config).unwrap_or_exit();
        let result = test_connection(&config.database).await;

        if self.json {
            print_json(&result)?;
        } else if result.success {
            println!("✓ {} ({} ms)", result.message, result.duration_ms);
            if let Some(version) = &result.server_version {
                println!("  server version: {version}");
            }
            if let Some(database) = &result.database {
                println!("  database: {database}");
            }
            println!("  tables: {}", result.tables);
        } else if let Some(error) = &result.error {
            eprintln!("✗ {}: {}", error.code.as_str(), error.message);
        }

        if !result.success {
            std::process::exit(1);
        }
        Ok(())
    }
}
