mod columns;
mod detect;
mod generate;
mod json;
mod ping;
mod plan;
mod tables;

use clap::{Parser, Subcommand};
use columns::ColumnsCommand;
use detect::DetectCommand;
use eyre::Result;
use generate::GenerateCommand;
use ping::PingCommand;
use plan::PlanCommand;
use tables::TablesCommand;

/// Extension trait for exiting on diagnostic errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for crate::config::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

impl<T> UnwrapOrExit<T> for tablegen_project::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "tablegen")]
#[command(version)]
#[command(about = "Generate database service code from live schema introspection")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Ping(cmd) => cmd.run().await,
            Commands::Tables(cmd) => cmd.run().await,
            Commands::Columns(cmd) => cmd.run().await,
            Commands::Detect(cmd) => cmd.run(),
            Commands::Plan(cmd) => cmd.run().await,
            Commands::Generate(cmd) => cmd.run().await,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Test the configured database connection
    Ping(PingCommand),

    /// List tables in the configured database
    Tables(TablesCommand),

    /// List columns of one table
    Columns(ColumnsCommand),

    /// Detect the host project that will receive generated code
    Detect(DetectCommand),

    /// Show what would be generated, without rendering file contents
    Plan(PlanCommand),

    /// Generate service code into the host project
    Generate(GenerateCommand),
}
