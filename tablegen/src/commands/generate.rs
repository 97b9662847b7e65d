use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use tablegen_codegen::{emit, preview};

use super::UnwrapOrExit;
use super::json::print_json;
use super::plan::{build_plan, print_plan};
use crate::config::RunConfig;

#[derive(Args)]
pub struct GenerateCommand {
    /// Path to tablegen.toml (defaults to ./tablegen.toml)
    #[arg(short, long, default_value = "tablegen.toml")]
    pub config: PathBuf,

    /// Where to start looking for the host project
    #[arg(short, long, default_value = ".")]
    pub project: PathBuf,

    /// Preview generated code without writing to disk
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl GenerateCommand {
    pub async fn run(&self) -> Result<()> {
        let config = RunConfig::open(&self.config).unwrap_or_exit();
        let project = tablegen_project::detect(&self.project).unwrap_or_exit();
        let plan = build_plan(&config, &project).await?;

        if self.dry_run {
            let files = preview(&plan, &project);
            if self.json {
                return print_json(&files);
            }
            for file in &files {
                println!("── {} ──", file.path);
                println!("{}", file.content);
            }
            println!("── Summary ──");
            println!("{} files would be generated", files.len());
            return Ok(());
        }

        let report = emit(&plan, &project);
        tracing::debug!(
            written = report.written.len(),
            unchanged = report.unchanged.len(),
            conflicts = report.conflicts.len(),
            "emission complete"
        );

        if self.json {
            print_json(&report)?;
        } else {
            print_plan(&plan);
            println!();
            for path in &report.written {
                println!("  + {}", path.display());
            }
            for path in &report.unchanged {
                println!("  = {} (unchanged)", path.display());
            }
            for conflict in &report.conflicts {
                eprintln!("  ! {}: {}", conflict.path.display(), conflict.reason);
            }
            println!(
                "{} written, {} unchanged, {} conflicts",
                report.written.len(),
                report.unchanged.len(),
                report.conflicts.len()
            );
        }

        if !report.is_clean() {
            std::process::exit(1);
        }
        Ok(())
    }
}
