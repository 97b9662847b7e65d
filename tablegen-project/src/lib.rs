//! Host project detection for tablegen.
//!
//! Finds the cargo project the generator should emit into, parses the
//! slice of its manifest the planner needs, and scans for already-present
//! service modules.

mod error;
mod manifest;
mod scan;

use std::path::{Path, PathBuf};

use serde::Serialize;

pub use error::{Error, Result};
pub use manifest::{HostManifest, parse_manifest};
pub use scan::{collect_services, has_api};

/// How many parent directories discovery will climb past the start.
const MAX_ASCENT: usize = 8;

/// A dependency listed in the host manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Module {
    pub name: String,
    pub version: String,
}

/// A `[replace]` override, already validated against the dependency list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplaceDirective {
    /// Dependency name the override applies to.
    pub name: String,
    /// The literal override key ("name:version").
    pub key: String,
    /// Replacement source (version, or "path:..." for local overrides).
    pub target: String,
}

/// Everything the planner and the UI need to know about the host project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectInfo {
    /// Directory containing the detected Cargo.toml.
    pub root: PathBuf,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rust_version: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Module>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub replace: Vec<ReplaceDirective>,
    /// Service modules already present under `src/services/`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
    pub has_api: bool,
}

impl ProjectInfo {
    pub fn has_service(&self, name: &str) -> bool {
        self.services.iter().any(|s| s == name)
    }
}

/// Detect the host project at or above `start`.
///
/// Walks from `start` through at most [`MAX_ASCENT`] parents looking for a
/// Cargo.toml with a `[package]` section. Workspace-only manifests are
/// skipped and the climb continues; malformed manifests stop it with a
/// diagnostic.
pub fn detect(start: impl AsRef<Path>) -> Result<ProjectInfo> {
    let start = start.as_ref();

    let mut dir = Some(start);
    for _ in 0..=MAX_ASCENT {
        let Some(candidate) = dir else { break };
        let manifest_path = candidate.join("Cargo.toml");

        if manifest_path.is_file() {
            let src = std::fs::read_to_string(&manifest_path)
                .map_err(|e| Error::io(&manifest_path, e))?;
            let filename = manifest_path.display().to_string();

            if let Some(manifest) = parse_manifest(&src, &filename)? {
                tracing::debug!(root = %candidate.display(), name = %manifest.name, "detected host project");
                return Ok(build_info(candidate, manifest));
            }
            tracing::debug!(path = %manifest_path.display(), "workspace-only manifest, continuing upward");
        }

        dir = candidate.parent();
    }

    Err(Box::new(Error::NotFound {
        start: start.to_path_buf(),
    }))
}

fn build_info(root: &Path, manifest: HostManifest) -> ProjectInfo {
    let services = collect_services(root);
    let has_api = has_api(root);
    ProjectInfo {
        root: root.to_path_buf(),
        name: manifest.name,
        version: manifest.version,
        edition: manifest.edition,
        rust_version: manifest.rust_version,
        dependencies: manifest.dependencies,
        replace: manifest.replace,
        services,
        has_api,
    }
}
