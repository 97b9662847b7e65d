//! Idempotent, conflict-aware emission of planned service files.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tablegen_project::ProjectInfo;

use crate::markers::{ManagedFile, MarkerError};
use crate::plan::{GenerationPlan, Mode, PlanEntry};
use crate::render::{mod_preamble, render_mod_list, render_table, service_preamble};

/// Region name used for the module list in `src/services/mod.rs`.
const MODULES_REGION: &str = "modules";

/// Why one target file was skipped. Sibling files are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    /// Create mode, but the file already exists without managed markers.
    UnmanagedExisting,
    /// Augment mode, but the target file does not exist.
    MissingAugmentTarget,
    /// The file's markers no longer parse.
    MalformedMarkers { detail: String },
    /// A managed region was edited by hand since the last generation.
    RegionModified { region: String },
    Io { detail: String },
}

impl std::fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictReason::UnmanagedExisting => {
                write!(f, "file exists but has no managed markers")
            }
            ConflictReason::MissingAugmentTarget => write!(f, "augment target does not exist"),
            ConflictReason::MalformedMarkers { detail } => {
                write!(f, "managed markers are malformed: {detail}")
            }
            ConflictReason::RegionModified { region } => {
                write!(f, "managed region '{region}' was modified by hand")
            }
            ConflictReason::Io { detail } => write!(f, "{detail}"),
        }
    }
}

/// A file the emitter refused to touch, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteConflict {
    pub path: PathBuf,
    pub reason: ConflictReason,
}

/// Outcome of one emission run. Conflicts are aggregated, never fatal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmitReport {
    pub written: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub conflicts: Vec<WriteConflict>,
}

impl EmitReport {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// A file as it would be written, for dry runs.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewFile {
    /// Path relative to the project root.
    pub path: String,
    pub content: String,
}

/// Emit a plan into the host project.
pub fn emit(plan: &GenerationPlan, project: &ProjectInfo) -> EmitReport {
    Emitter::new(project).run(plan, true).0
}

/// Render everything a run would write, without touching the filesystem.
pub fn preview(plan: &GenerationPlan, project: &ProjectInfo) -> Vec<PreviewFile> {
    Emitter::new(project).run(plan, false).1
}

pub struct Emitter<'a> {
    project: &'a ProjectInfo,
    services_dir: PathBuf,
}

impl<'a> Emitter<'a> {
    pub fn new(project: &'a ProjectInfo) -> Self {
        let services_dir = project.root.join("src").join("services");
        Self {
            project,
            services_dir,
        }
    }

    fn run(&self, plan: &GenerationPlan, write: bool) -> (EmitReport, Vec<PreviewFile>) {
        let mut report = EmitReport::default();
        let mut previews = Vec::new();

        if plan.is_empty() {
            return (report, previews);
        }

        let mut emitted_services = Vec::new();
        for entry in &plan.entries {
            let path = self.services_dir.join(format!("{}.rs", entry.service));
            match self.emit_entry(entry, &path) {
                Ok(Some(rendered)) => {
                    previews.push(preview_file(self.project, &path, &rendered));
                    if write {
                        self.write_file(&path, &rendered, &mut report);
                    }
                    emitted_services.push(entry.service.clone());
                }
                Ok(None) => {
                    report.unchanged.push(path);
                    emitted_services.push(entry.service.clone());
                }
                Err(reason) => {
                    tracing::warn!(path = %path.display(), %reason, "skipping conflicted file");
                    report.conflicts.push(WriteConflict { path, reason });
                }
            }
        }

        let mod_path = self.services_dir.join("mod.rs");
        match self.emit_mod_list(&emitted_services, &mod_path) {
            Ok(Some(rendered)) => {
                previews.push(preview_file(self.project, &mod_path, &rendered));
                if write {
                    self.write_file(&mod_path, &rendered, &mut report);
                }
            }
            Ok(None) => report.unchanged.push(mod_path),
            Err(reason) => {
                tracing::warn!(path = %mod_path.display(), %reason, "skipping module list");
                report.conflicts.push(WriteConflict {
                    path: mod_path,
                    reason,
                });
            }
        }

        (report, previews)
    }

    /// Produce the new content for one plan entry, or `None` when the file
    /// is already up to date.
    fn emit_entry(&self, entry: &PlanEntry, path: &Path) -> Result<Option<String>, ConflictReason> {
        let existing = read_existing(path)?;

        let mut file = match (&existing, entry.mode) {
            (None, Mode::Create) => ManagedFile::with_preamble(service_preamble(&entry.service)),
            (None, Mode::Augment) => return Err(ConflictReason::MissingAugmentTarget),
            (Some(content), _) => {
                let parsed = ManagedFile::parse(content).map_err(malformed)?;
                if entry.mode == Mode::Create && !parsed.has_regions() {
                    return Err(ConflictReason::UnmanagedExisting);
                }
                if let Some(region) = parsed.modified_regions().first() {
                    return Err(ConflictReason::RegionModified {
                        region: region.to_string(),
                    });
                }
                parsed
            }
        };

        for table in &entry.tables {
            file.upsert(&table.table, render_table(table));
        }

        let rendered = file.render();
        if existing.as_deref() == Some(rendered.as_str()) {
            return Ok(None);
        }
        Ok(Some(rendered))
    }

    /// Maintain the managed module list: the union of modules listed in the
    /// previous generation and the services emitted this run. Hand-declared
    /// modules outside the region are left alone.
    fn emit_mod_list(
        &self,
        emitted: &[String],
        path: &Path,
    ) -> Result<Option<String>, ConflictReason> {
        let existing = read_existing(path)?;

        let mut file = match &existing {
            None => ManagedFile::with_preamble(mod_preamble()),
            Some(content) => {
                let parsed = ManagedFile::parse(content).map_err(malformed)?;
                if !parsed.has_regions() {
                    return Err(ConflictReason::UnmanagedExisting);
                }
                if let Some(region) = parsed.modified_regions().first() {
                    return Err(ConflictReason::RegionModified {
                        region: region.to_string(),
                    });
                }
                parsed
            }
        };

        let mut modules: Vec<String> = file
            .region(MODULES_REGION)
            .map(|r| parse_mod_list(&r.body))
            .unwrap_or_default();
        modules.extend(emitted.iter().cloned());
        modules.sort();
        modules.dedup();

        file.upsert(MODULES_REGION, render_mod_list(&modules));

        let rendered = file.render();
        if existing.as_deref() == Some(rendered.as_str()) {
            return Ok(None);
        }
        Ok(Some(rendered))
    }

    fn write_file(&self, path: &Path, content: &str, report: &mut EmitReport) {
        let result = path
            .parent()
            .map(std::fs::create_dir_all)
            .transpose()
            .and_then(|_| std::fs::write(path, content));
        match result {
            Ok(()) => report.written.push(path.to_path_buf()),
            Err(e) => report.conflicts.push(WriteConflict {
                path: path.to_path_buf(),
                reason: ConflictReason::Io {
                    detail: format!("failed to write: {e}"),
                },
            }),
        }
    }
}

fn read_existing(path: &Path) -> Result<Option<String>, ConflictReason> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConflictReason::Io {
            detail: format!("failed to read: {e}"),
        }),
    }
}

fn malformed(e: MarkerError) -> ConflictReason {
    ConflictReason::MalformedMarkers {
        detail: e.to_string(),
    }
}

fn parse_mod_list(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| {
            line.trim()
                .strip_prefix("pub mod ")
                .and_then(|rest| rest.strip_suffix(';'))
                .map(|name| name.trim().to_string())
        })
        .collect()
}

fn preview_file(project: &ProjectInfo, path: &Path, content: &str) -> PreviewFile {
    let relative = path
        .strip_prefix(&project.root)
        .unwrap_or(path)
        .display()
        .to_string();
    PreviewFile {
        path: relative,
        content: content.to_string(),
    }
}
