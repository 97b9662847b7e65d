use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for project detection (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("no Cargo.toml with a [package] section found near '{start}'")]
    #[diagnostic(
        code(tablegen::project_not_found),
        help("run inside a cargo project, or point --project at one")
    )]
    NotFound { start: PathBuf },

    #[error("failed to read '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse Cargo.toml")]
    #[diagnostic(code(tablegen::manifest_parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("replace target '{key}' does not match any dependency")]
    #[diagnostic(
        code(tablegen::replace_target),
        help("list '{name}' under [dependencies] or remove the override")
    )]
    ReplaceTarget {
        #[source_code]
        src: NamedSource<String>,
        #[label("no dependency matches this override")]
        span: Option<SourceSpan>,
        key: String,
        name: String,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Box<Self> {
        Box::new(Error::Io {
            path: path.into(),
            source,
        })
    }

    /// Create a parse error from a toml error with source context
    pub fn parse(source: toml::de::Error, src: &str, filename: &str) -> Box<Self> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            src: NamedSource::new(filename, src.to_string()),
            span,
            source,
        })
    }

    pub fn replace_target(
        key: impl Into<String>,
        name: impl Into<String>,
        src: &str,
        filename: &str,
    ) -> Box<Self> {
        let key = key.into();
        let span = find_span(src, &key);
        Box::new(Error::ReplaceTarget {
            src: NamedSource::new(filename, src.to_string()),
            span,
            key,
            name: name.into(),
        })
    }
}

/// Locate the first occurrence of `needle` in the manifest source, for
/// label placement. Quoted keys are matched including their quotes.
fn find_span(src: &str, needle: &str) -> Option<SourceSpan> {
    let quoted = format!("\"{needle}\"");
    if let Some(at) = src.find(&quoted) {
        return Some((at, quoted.len()).into());
    }
    src.find(needle).map(|at| (at, needle.len()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_span_prefers_quoted_key() {
        let src = "[replace]\n\"serde:1.0\" = { path = \"../serde\" }\n";
        let span = find_span(src, "serde:1.0").unwrap();
        assert_eq!(span.offset(), 10);
        assert_eq!(span.len(), "\"serde:1.0\"".len());
    }

    #[test]
    fn test_find_span_missing_needle() {
        assert!(find_span("[package]", "nothing").is_none());
    }
}
