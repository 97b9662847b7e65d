use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use tablegen_project::detect;

use super::UnwrapOrExit;
use super::json::print_json;

#[derive(Args)]
pub struct DetectCommand {
    /// Where to start looking for the host project
    #[arg(short, long, default_value = ".")]
    pub project: PathBuf,

    /// Emit the project info as JSON
    #[arg(long)]
    pub json: bool,
}

impl DetectCommand {
    pub fn run(&self) -> Result<()> {
        let info = detect(&self.project).unwrap_or_exit();

        if self.json {
            return print_json(&info);
        }

        println!("{} ({})", info.name, info.root.display());
        if let Some(version) = &info.version {
            println!("  version: {version}");
        }
        if let Some(edition) = &info.edition {
            println!("  edition: {edition}");
        }
        if let Some(rust_version) = &info.rust_version {
            println!("  rust-version: {rust_version}");
        }
        println!("  dependencies: {}", info.dependencies.len());
        for directive in &info.replace {
            println!("  replace: {} -> {}", directive.key, directive.target);
        }
        if info.services.is_empty() {
            println!("  services: none");
        } else {
            println!("  services: {}", info.services.join(", "));
        }
        println!("  api: {}", if info.has_api { "yes" } else { "no" });
        Ok(())
    }
}
