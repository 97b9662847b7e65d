//! Generator-managed marker regions.
//!
//! A managed file interleaves hand-authored text with regions the generator
//! owns. A region looks like:
//!
//! ```text
//! // tablegen:begin users 1f2a9c0d3e4b5a69
//! ...generated code...
//! // tablegen:end users
//! ```
//!
//! The begin line carries a checksum of the region body so a later run can
//! tell generated content apart from hand edits inside the region.

use sha2::{Digest, Sha256};
use thiserror::Error;

pub const BEGIN_MARKER: &str = "// tablegen:begin";
pub const END_MARKER: &str = "// tablegen:end";

/// Truncated checksum length in hex characters.
const CHECKSUM_LEN: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarkerError {
    #[error("malformed begin marker at line {line}")]
    MalformedBegin { line: usize },

    #[error("begin marker for '{name}' has no matching end marker")]
    Unterminated { name: String },

    #[error("end marker at line {line} without a begin marker")]
    StrayEnd { line: usize },

    #[error("end marker at line {line} closes '{found}' but '{expected}' is open")]
    MismatchedEnd {
        line: usize,
        expected: String,
        found: String,
    },

    #[error("duplicate region '{name}'")]
    DuplicateRegion { name: String },
}

/// Checksum of a region body: truncated hex sha-256.
pub fn checksum(body: &str) -> String {
    let digest = Sha256::digest(body.as_bytes());
    let mut hex = String::with_capacity(CHECKSUM_LEN);
    for byte in digest.iter() {
        for c in [byte >> 4, byte & 0xf] {
            hex.push(char::from_digit(c as u32, 16).unwrap_or('0'));
            if hex.len() == CHECKSUM_LEN {
                return hex;
            }
        }
    }
    hex
}

/// A piece of a managed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Hand-authored text, preserved byte for byte.
    Raw(String),
    Region(Region),
}

/// One generator-owned region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub name: String,
    /// Checksum recorded on the begin line when the region was written.
    pub recorded: String,
    /// Body between the markers, including the trailing newline.
    pub body: String,
}

impl Region {
    /// Whether the body still matches the checksum it was written with.
    pub fn is_pristine(&self) -> bool {
        self.recorded == checksum(&self.body)
    }
}

/// Parsed form of a file containing marker regions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagedFile {
    pub segments: Vec<Segment>,
}

impl ManagedFile {
    /// A file consisting of a single raw preamble.
    pub fn with_preamble(preamble: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment::Raw(preamble.into())],
        }
    }

    /// Parse file content into raw and region segments.
    pub fn parse(content: &str) -> Result<Self, MarkerError> {
        let mut segments = Vec::new();
        let mut raw = String::new();
        let mut open: Option<(String, String, String)> = None; // name, recorded, body

        for (idx, line) in content.split_inclusive('\n').enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim_end_matches('\n').trim();

            if let Some(rest) = trimmed.strip_prefix(BEGIN_MARKER) {
                if open.is_some() {
                    // A begin inside a region is body text for the outer
                    // region only if it is malformed; nested regions are not
                    // a thing, so reject outright.
                    return Err(MarkerError::MalformedBegin { line: line_no });
                }
                let mut parts = rest.split_whitespace();
                let (Some(name), Some(recorded)) = (parts.next(), parts.next()) else {
                    return Err(MarkerError::MalformedBegin { line: line_no });
                };
                if parts.next().is_some() {
                    return Err(MarkerError::MalformedBegin { line: line_no });
                }
                if !raw.is_empty() {
                    segments.push(Segment::Raw(std::mem::take(&mut raw)));
                }
                open = Some((name.to_string(), recorded.to_string(), String::new()));
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix(END_MARKER) {
                let found = rest.trim();
                let Some((name, recorded, body)) = open.take() else {
                    return Err(MarkerError::StrayEnd { line: line_no });
                };
                if found != name {
                    return Err(MarkerError::MismatchedEnd {
                        line: line_no,
                        expected: name,
                        found: found.to_string(),
                    });
                }
                if segments.iter().any(
                    |s| matches!(s, Segment::Region(r) if r.name == name),
                ) {
                    return Err(MarkerError::DuplicateRegion { name });
                }
                segments.push(Segment::Region(Region {
                    name,
                    recorded,
                    body,
                }));
                continue;
            }

            match &mut open {
                Some((_, _, body)) => body.push_str(line),
                None => raw.push_str(line),
            }
        }

        if let Some((name, _, _)) = open {
            return Err(MarkerError::Unterminated { name });
        }
        if !raw.is_empty() {
            segments.push(Segment::Raw(raw));
        }
        Ok(Self { segments })
    }

    /// Render back to file content. Region checksums are recomputed from the
    /// current bodies, so render after upsert is always internally
    /// consistent.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Raw(text) => out.push_str(text),
                Segment::Region(region) => {
                    out.push_str(&format!(
                        "{BEGIN_MARKER} {} {}\n",
                        region.name,
                        checksum(&region.body)
                    ));
                    out.push_str(&region.body);
                    out.push_str(&format!("{END_MARKER} {}\n", region.name));
                }
            }
        }
        out
    }

    /// Replace the named region's body, or append a new region at the end.
    pub fn upsert(&mut self, name: &str, body: impl Into<String>) {
        let mut body = body.into();
        if !body.ends_with('\n') {
            body.push('\n');
        }

        for segment in &mut self.segments {
            if let Segment::Region(region) = segment {
                if region.name == name {
                    region.recorded = checksum(&body);
                    region.body = body;
                    return;
                }
            }
        }

        // Separate an appended region from preceding content.
        if !self.segments.is_empty() && !self.ends_with_blank_line() {
            self.segments.push(Segment::Raw("\n".to_string()));
        }
        self.segments.push(Segment::Region(Region {
            recorded: checksum(&body),
            name: name.to_string(),
            body,
        }));
    }

    pub fn region(&self, name: &str) -> Option<&Region> {
        self.segments.iter().find_map(|s| match s {
            Segment::Region(r) if r.name == name => Some(r),
            _ => None,
        })
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Region(r) => Some(r),
            _ => None,
        })
    }

    pub fn has_regions(&self) -> bool {
        self.regions().next().is_some()
    }

    /// Names of regions whose bodies no longer match their recorded
    /// checksums.
    pub fn modified_regions(&self) -> Vec<&str> {
        self.regions()
            .filter(|r| !r.is_pristine())
            .map(|r| r.name.as_str())
            .collect()
    }

    fn ends_with_blank_line(&self) -> bool {
        match self.segments.last() {
            Some(Segment::Raw(text)) => text.ends_with("\n\n") || text == "\n",
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_is_stable_and_truncated() {
        let a = checksum("pub struct Users;\n");
        let b = checksum("pub struct Users;\n");
        assert_eq!(a, b);
        assert_eq!(a.len(), CHECKSUM_LEN);
        assert_ne!(a, checksum("pub struct Orders;\n"));
    }

    #[test]
    fn test_parse_render_round_trip_preserves_bytes() {
        let mut file = ManagedFile::with_preamble("//! Services.\n\nfn hand_written() {}\n");
        file.upsert("users", "pub struct Users;\n");

        let rendered = file.render();
        let reparsed = ManagedFile::parse(&rendered).unwrap();
        assert_eq!(reparsed.render(), rendered);
        assert!(rendered.starts_with("//! Services.\n"));
        assert!(rendered.contains("fn hand_written() {}\n"));
    }

    #[test]
    fn test_upsert_replaces_existing_region() {
        let mut file = ManagedFile::default();
        file.upsert("users", "old\n");
        file.upsert("users", "new\n");

        let regions: Vec<_> = file.regions().collect();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].body, "new\n");
        assert!(regions[0].is_pristine());
    }

    #[test]
    fn test_hand_edit_inside_region_is_detected() {
        let mut file = ManagedFile::default();
        file.upsert("users", "pub struct Users;\n");
        let tampered = file.render().replace("struct Users", "struct People");

        let parsed = ManagedFile::parse(&tampered).unwrap();
        assert_eq!(parsed.modified_regions(), vec!["users"]);
    }

    #[test]
    fn test_hand_edit_outside_region_is_not_a_modification() {
        let mut file = ManagedFile::with_preamble("// mine\n");
        file.upsert("users", "pub struct Users;\n");
        let edited = format!("{}\n// more of mine\n", file.render());

        let parsed = ManagedFile::parse(&edited).unwrap();
        assert!(parsed.modified_regions().is_empty());
    }

    #[test]
    fn test_unterminated_region() {
        let content = format!("{BEGIN_MARKER} users abcd1234abcd1234\nbody\n");
        assert_eq!(
            ManagedFile::parse(&content).unwrap_err(),
            MarkerError::Unterminated {
                name: "users".to_string()
            }
        );
    }

    #[test]
    fn test_stray_end_marker() {
        let content = format!("{END_MARKER} users\n");
        assert_eq!(
            ManagedFile::parse(&content).unwrap_err(),
            MarkerError::StrayEnd { line: 1 }
        );
    }

    #[test]
    fn test_malformed_begin_marker() {
        let content = format!("{BEGIN_MARKER} users\n{END_MARKER} users\n");
        assert_eq!(
            ManagedFile::parse(&content).unwrap_err(),
            MarkerError::MalformedBegin { line: 1 }
        );
    }

    #[test]
    fn test_mismatched_end_marker() {
        let content = format!("{BEGIN_MARKER} users abcd1234abcd1234\n{END_MARKER} orders\n");
        assert!(matches!(
            ManagedFile::parse(&content).unwrap_err(),
            MarkerError::MismatchedEnd { line: 2, .. }
        ));
    }

    #[test]
    fn test_file_without_trailing_newline() {
        let parsed = ManagedFile::parse("// no newline at end").unwrap();
        assert_eq!(parsed.render(), "// no newline at end");
    }
}
