//! Host manifest parsing: the subset of Cargo.toml the generator cares
//! about.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::{Module, ReplaceDirective};

#[derive(Debug, Deserialize)]
struct RawManifest {
    package: Option<RawPackage>,
    #[serde(default)]
    dependencies: toml::Table,
    #[serde(default)]
    replace: toml::Table,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    name: String,
    #[serde(default)]
    version: Option<toml::Value>,
    #[serde(default)]
    edition: Option<toml::Value>,
    #[serde(default, rename = "rust-version")]
    rust_version: Option<toml::Value>,
}

/// The parsed, validated view of a host Cargo.toml.
#[derive(Debug, Clone)]
pub struct HostManifest {
    pub name: String,
    pub version: Option<String>,
    pub edition: Option<String>,
    pub rust_version: Option<String>,
    pub dependencies: Vec<Module>,
    pub replace: Vec<ReplaceDirective>,
}

/// Parse a manifest, returning `Ok(None)` for workspace-only manifests
/// (no `[package]` section) so discovery can keep ascending.
pub fn parse_manifest(src: &str, filename: &str) -> Result<Option<HostManifest>> {
    let raw: RawManifest =
        toml::from_str(src).map_err(|e| Error::parse(e, src, filename))?;

    let Some(package) = raw.package else {
        return Ok(None);
    };

    let mut dependencies: Vec<Module> = raw
        .dependencies
        .iter()
        .map(|(name, value)| Module {
            name: name.clone(),
            version: dependency_version(value),
        })
        .collect();
    dependencies.sort_by(|a, b| a.name.cmp(&b.name));

    let mut replace = Vec::new();
    for (key, value) in &raw.replace {
        // Override keys are "name:version"; a bare name is tolerated.
        let dep_name = key.split(':').next().unwrap_or(key);
        if !dependencies.iter().any(|m| m.name == dep_name) {
            return Err(Error::replace_target(key, dep_name, src, filename));
        }
        replace.push(ReplaceDirective {
            name: dep_name.to_string(),
            key: key.clone(),
            target: dependency_version(value),
        });
    }

    Ok(Some(HostManifest {
        name: package.name,
        version: package.version.as_ref().map(toml_value_string),
        edition: package.edition.as_ref().map(toml_value_string),
        rust_version: package.rust_version.as_ref().map(toml_value_string),
        dependencies,
        replace,
    }))
}

/// Version string for a dependency entry: a bare string, a table with a
/// `version` key, or a path/git override without one.
fn dependency_version(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Table(t) => match t.get("version") {
            Some(toml::Value::String(s)) => s.clone(),
            _ => match t.get("path") {
                Some(toml::Value::String(p)) => format!("path:{p}"),
                _ => "*".to_string(),
            },
        },
        other => toml_value_string(other),
    }
}

/// Render a scalar toml value without surrounding quotes. `edition` and
/// workspace-inherited fields appear as strings or tables in the wild.
fn toml_value_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
