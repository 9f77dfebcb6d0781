//! Pipeline orchestration: read, extract, filter, validate, render, write.
//!
//! ```text
//! routegen.toml ──► GeneratorConfig
//!                        │
//! source file ──► RouteSource ──► extract ──► filter ──► validate
//!                                                          │
//!                                    render both modules ◄─┘
//!                                          │
//!                         stage temp files, then persist both
//! ```
//!
//! Everything up to rendering is pure and happens in memory; [`build`] returns
//! both artifacts or an error, never one without the other. [`write_artifacts`]
//! then stages each artifact in a temp file beside its target and only renames
//! them into place once both are staged, so a failure part-way leaves the
//! previous outputs intact and a reader never observes a half-written file.
//!
//! ## Modes
//!
//! | `filtering.enabled` | Route module | Guarded module |
//! |---------------------|--------------|----------------|
//! | `true`  | header + source with only kept blocks | from kept blocks |
//! | `false` | source, byte for byte | from every block |
//!
//! Extraction and validation run in both modes, so a malformed source fails
//! the build either way.

use crate::config::GeneratorConfig;
use crate::descriptor::DescriptorReader;
use crate::filter::{Decision, FilterOutcome, ValidationError, filter_blocks, validate};
use crate::render::{Provenance, guarded_paths, render_guarded_module, render_routes_module};
use crate::source::{ExtractError, RouteSource};
use serde::Serialize;
use std::fmt;
use std::fs::{self, Permissions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Extract { path: PathBuf, source: ExtractError },
    #[error("{}: {source}", .path.display())]
    Validation {
        path: PathBuf,
        source: ValidationError,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid guard pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Whether feature filtering shaped the route module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Filtered,
    PassThrough,
}

impl Mode {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            Mode::Filtered
        } else {
            Mode::PassThrough
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Filtered => write!(f, "filtered"),
            Mode::PassThrough => write!(f, "pass-through"),
        }
    }
}

/// One rendered output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// Resolved target path.
    pub path: PathBuf,
    /// Path as configured, for display.
    pub label: String,
    pub contents: String,
}

/// Both outputs of one run. Always produced together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifacts {
    pub routes: GeneratedArtifact,
    pub guarded: GeneratedArtifact,
}

impl GeneratedArtifacts {
    /// Route module first, then the guarded-path module.
    pub fn iter(&self) -> impl Iterator<Item = &GeneratedArtifact> {
        [&self.routes, &self.guarded].into_iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WriteStatus {
    Written,
    /// Target already held identical content.
    Unchanged,
    /// Rendered but not written (`check`).
    Checked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactOutcome {
    pub label: String,
    pub status: WriteStatus,
}

/// What a run did, for the CLI summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub mode: Mode,
    pub source: String,
    pub total: usize,
    pub kept: usize,
    pub guarded_paths: Vec<String>,
    /// Paths missing from `[routes]`, sorted, each once.
    pub unknown_paths: Vec<String>,
    pub artifacts: Vec<ArtifactOutcome>,
}

/// Result of the in-memory pipeline: the report plus the rendered outputs.
#[derive(Debug, Clone)]
pub struct Generation {
    pub report: GenerationReport,
    pub artifacts: GeneratedArtifacts,
}

/// One extracted block, as shown by `routegen list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSummary {
    /// 1-based position in the route array.
    pub index: usize,
    pub line: usize,
    pub path: Option<String>,
    pub decision: Decision,
    /// Whether the block survives this run (always true in pass-through mode).
    pub kept: bool,
    pub guarded: bool,
}

// =============================================================================
// Pipeline stages
// =============================================================================

/// Read the configured source file.
pub fn read_source(config: &GeneratorConfig) -> Result<RouteSource, GenerateError> {
    let path = config.source_path();
    let text = fs::read_to_string(&path).map_err(|source| GenerateError::Read {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "source read");
    Ok(RouteSource::new(&config.source, text))
}

fn reader_for(config: &GeneratorConfig) -> Result<DescriptorReader, GenerateError> {
    Ok(DescriptorReader::new(
        &config.guard.field,
        &config.guard.identifier,
    )?)
}

/// Run every in-memory stage and render both artifacts.
///
/// Nothing is written. Any structural or validation failure is returned
/// before rendering starts.
pub fn build(source: &RouteSource, config: &GeneratorConfig) -> Result<Generation, GenerateError> {
    let reader = reader_for(config)?;
    let source_path = config.source_path();

    let (region, blocks) =
        source
            .extract(&config.export_name)
            .map_err(|source| GenerateError::Extract {
                path: source_path.clone(),
                source,
            })?;

    let mode = Mode::from_enabled(config.filtering.enabled);
    let outcome = match mode {
        Mode::Filtered => filter_blocks(&blocks, &config.routes, &reader),
        Mode::PassThrough => FilterOutcome::pass_through(&blocks),
    };
    tracing::debug!(
        %mode,
        total = blocks.len(),
        kept = outcome.kept.len(),
        unknown = outcome.unknown_paths.len(),
        "routes filtered"
    );

    validate(&blocks, &outcome.kept, &reader).map_err(|source| GenerateError::Validation {
        path: source_path.clone(),
        source,
    })?;

    let provenance = Provenance::new(source, config.filtering.enabled);
    let indent = &config.render.indent;
    let guarded = guarded_paths(&outcome.kept, &reader);

    let artifacts = GeneratedArtifacts {
        routes: GeneratedArtifact {
            path: config.routes_output_path(),
            label: config.routes_output.clone(),
            contents: render_routes_module(source, region, &outcome.kept, &provenance, indent),
        },
        guarded: GeneratedArtifact {
            path: config.guarded_output_path(),
            label: config.guarded_output.clone(),
            contents: render_guarded_module(&guarded, &config.guard, &provenance, indent),
        },
    };

    let report = GenerationReport {
        mode,
        source: config.source.clone(),
        total: blocks.len(),
        kept: outcome.kept.len(),
        guarded_paths: guarded,
        unknown_paths: outcome.unknown_paths.into_iter().collect(),
        artifacts: artifacts
            .iter()
            .map(|a| ArtifactOutcome {
                label: a.label.clone(),
                status: WriteStatus::Checked,
            })
            .collect(),
    };

    Ok(Generation { report, artifacts })
}

/// Write both artifacts atomically.
///
/// Each artifact is staged in a temp file in its target directory. Only when
/// both are staged are they persisted, route module first. Targets that
/// already hold identical bytes are left alone.
pub fn write_artifacts(artifacts: &GeneratedArtifacts) -> Result<Vec<WriteStatus>, GenerateError> {
    let mut staged = Vec::new();
    for artifact in artifacts.iter() {
        let current = fs::read(&artifact.path).ok();
        if current.as_deref() == Some(artifact.contents.as_bytes()) {
            staged.push(None);
        } else {
            staged.push(Some(stage(artifact)?));
        }
    }

    let mut statuses = Vec::new();
    for (artifact, temp) in artifacts.iter().zip(staged) {
        let Some(temp) = temp else {
            tracing::debug!(path = %artifact.path.display(), "artifact unchanged");
            statuses.push(WriteStatus::Unchanged);
            continue;
        };
        temp.persist(&artifact.path)
            .map_err(|e| GenerateError::Write {
                path: artifact.path.clone(),
                source: e.error,
            })?;
        tracing::info!(
            path = %artifact.path.display(),
            bytes = artifact.contents.len(),
            "artifact written"
        );
        statuses.push(WriteStatus::Written);
    }
    Ok(statuses)
}

/// Write `artifact` to a temp file next to its target, fully synced.
fn stage(artifact: &GeneratedArtifact) -> Result<NamedTempFile, GenerateError> {
    let write_err = |source| GenerateError::Write {
        path: artifact.path.clone(),
        source,
    };

    let dir = match artifact.path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_err)?;

    let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
    temp.write_all(artifact.contents.as_bytes())
        .map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;

    let permissions = match fs::metadata(&artifact.path) {
        Ok(meta) => Some(meta.permissions()),
        Err(_) => default_permissions(),
    };
    if let Some(permissions) = permissions {
        temp.as_file()
            .set_permissions(permissions)
            .map_err(write_err)?;
    }
    Ok(temp)
}

/// Temp files are created owner-only; new artifacts get ordinary source-file
/// permissions instead.
#[cfg(unix)]
fn default_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<Permissions> {
    None
}

// =============================================================================
// Entry points
// =============================================================================

/// Full pipeline run: build, then write both artifacts.
pub fn run(config: &GeneratorConfig) -> Result<GenerationReport, GenerateError> {
    let source = read_source(config)?;
    let Generation {
        mut report,
        artifacts,
    } = build(&source, config)?;

    let statuses = write_artifacts(&artifacts)?;
    for (outcome, status) in report.artifacts.iter_mut().zip(statuses) {
        outcome.status = status;
    }
    Ok(report)
}

/// Everything `run` does except writing.
pub fn check(config: &GeneratorConfig) -> Result<GenerationReport, GenerateError> {
    let source = read_source(config)?;
    Ok(build(&source, config)?.report)
}

/// Every extracted block with its filtering decision, in source order.
pub fn list(config: &GeneratorConfig) -> Result<Vec<BlockSummary>, GenerateError> {
    let source = read_source(config)?;
    let reader = reader_for(config)?;
    let (_, blocks) =
        source
            .extract(&config.export_name)
            .map_err(|source| GenerateError::Extract {
                path: config.source_path(),
                source,
            })?;

    Ok(blocks
        .iter()
        .enumerate()
        .map(|(i, block)| {
            let path = reader.path_of(block);
            let decision = Decision::of(path, &config.routes);
            BlockSummary {
                index: i + 1,
                line: block.line(),
                path: path.map(str::to_string),
                decision,
                kept: !config.filtering.enabled || decision.keeps(),
                guarded: reader.is_access_guarded(block),
            }
        })
        .collect())
}

/// Inclusion query for sibling generators, honoring the filtering switch.
pub fn is_route_enabled(config: &GeneratorConfig, path: &str) -> bool {
    !config.filtering.enabled || config.routes.is_enabled(path)
}
