//! The run configuration file, `tablegen.toml`.

use std::path::{Path, PathBuf};

use miette::{Diagnostic, NamedSource, SourceSpan};
use serde::Deserialize;
use tablegen_core::{DbConfig, TableOption};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(help("create a tablegen.toml with a [database] section, or pass --config"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tablegen.toml")]
    #[diagnostic(code(tablegen::config_parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("{message}")]
    #[diagnostic(code(tablegen::config_error))]
    Invalid {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },
}

/// Everything one run needs: where the database is and what to do with each
/// table.
#[derive(Debug, Deserialize)]
pub struct RunConfig {
    pub database: DbConfig,
    /// `[[table]]` entries; absent means "include everything with
    /// defaults".
    #[serde(default, rename = "table")]
    pub tables: Vec<TableOption>,
}

impl RunConfig {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|e| {
            Box::new(Error::Io {
                path: path.to_path_buf(),
                source: e,
            })
        })?;
        let filename = path.display().to_string();
        Self::parse(&src, &filename)
    }

    pub fn parse(src: &str, filename: &str) -> Result<Self> {
        let mut config: RunConfig = toml::from_str(src).map_err(|e| {
            let span = e.span().map(SourceSpan::from);
            Box::new(Error::Parse {
                src: NamedSource::new(filename, src.to_string()),
                span,
                source: e,
            })
        })?;

        // Options written without ids get stable ones from file order, so
        // duplicate handling stays deterministic.
        for (i, option) in config.tables.iter_mut().enumerate() {
            if option.id == 0 {
                option.id = i as u32 + 1;
            }
        }

        if let Err(e) = config.database.validate() {
            let span = find_span(src, "[database]");
            return Err(Box::new(Error::Invalid {
                src: NamedSource::new(filename, src.to_string()),
                span,
                message: e.message,
            }));
        }

        Ok(config)
    }
}

fn find_span(src: &str, needle: &str) -> Option<SourceSpan> {
    src.find(needle).map(|at| (at, needle.len()).into())
}

#[cfg(test)]
mod tests {
    use tablegen_core::Dialect;

    use super::*;

    const CONFIG: &str = r#"
[database]
dialect = "sqlite"
path = "/tmp/app.db"

[[table]]
name = "users"

[[table]]
name = "orders"
service = "billing"

[[table]]
name = "audit_log"
exclude = true
"#;

    #[test]
    fn test_parse_full_config() {
        let config = RunConfig::parse(CONFIG, "tablegen.toml").unwrap();
        assert_eq!(config.database.dialect, Dialect::Sqlite);
        assert_eq!(config.tables.len(), 3);
        assert_eq!(config.tables[1].service.as_deref(), Some("billing"));
        assert!(config.tables[2].exclude);
    }

    #[test]
    fn test_missing_ids_are_assigned_in_file_order() {
        let config = RunConfig::parse(CONFIG, "tablegen.toml").unwrap();
        let ids: Vec<_> = config.tables.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_explicit_ids_are_kept() {
        let src = "[database]\ndialect = \"sqlite\"\npath = \"/tmp/t.db\"\n\n[[table]]\nid = 9\nname = \"users\"\n";
        let config = RunConfig::parse(src, "tablegen.toml").unwrap();
        assert_eq!(config.tables[0].id, 9);
    }

    #[test]
    fn test_invalid_database_section_is_a_diagnostic() {
        let src = "[database]\ndialect = \"sqlite\"\nhost = \"nope\"\npath = \"/tmp/t.db\"\n";
        let err = RunConfig::parse(src, "tablegen.toml").unwrap_err();
        assert!(matches!(*err, Error::Invalid { .. }));
    }

    #[test]
    fn test_unknown_dialect_fails_at_parse() {
        let src = "[database]\ndialect = \"oracle\"\n";
        let err = RunConfig::parse(src, "tablegen.toml").unwrap_err();
        assert!(matches!(*err, Error::Parse { .. }));
    }

    #[test]
    fn test_tables_are_optional() {
        let src = "[database]\ndialect = \"sqlite\"\npath = \"/tmp/t.db\"\n";
        let config = RunConfig::parse(src, "tablegen.toml").unwrap();
        assert!(config.tables.is_empty());
    }
}
