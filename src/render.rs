//! Rendering of the two generated modules.
//!
//! ## Route module
//!
//! With filtering disabled the route module is the source file, byte for
//! byte. With filtering enabled it is rebuilt from three pieces:
//!
//! ```text
//! // @generated by routegen ...      provenance header
//! import { Routes } from '...';       source text up to and including `[`
//! export const routes: Routes = [
//!   { path: '', ... },                kept blocks, re-indented, `,\n`-joined
//!   { path: '**', ... }
//! ];                                  source text from the closing `]` on
//! ```
//!
//! Everything outside the array body is copied verbatim, so the result stays a
//! drop-in replacement for the hand-authored file.
//!
//! ## Guarded-path module
//!
//! A frozen array of the sorted, de-duplicated paths of kept blocks whose
//! guard field names the guard identifier. An empty list renders a
//! placeholder comment so the file explains itself.

use crate::config::GuardConfig;
use crate::descriptor::{DescriptorReader, RouteBlock};
use crate::source::{ArrayRegion, RouteSource};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// What the provenance header records about a run.
#[derive(Debug, Clone)]
pub struct Provenance {
    /// Source path as configured (relative, machine-independent).
    pub source: String,
    pub source_sha256: String,
    pub filtering_enabled: bool,
}

impl Provenance {
    pub fn new(source: &RouteSource, filtering_enabled: bool) -> Self {
        Self {
            source: source.path().display().to_string().replace('\\', "/"),
            source_sha256: format!("{:x}", Sha256::digest(source.text().as_bytes())),
            filtering_enabled,
        }
    }

    /// Header comment lines, each ending in a newline.
    pub fn header(&self) -> String {
        format!(
            "// @generated by routegen. Do not edit by hand.\n\
             // Source: {}\n\
             // Source SHA-256: {}\n\
             // Feature filtering: {}\n",
            self.source,
            self.source_sha256,
            if self.filtering_enabled {
                "enabled"
            } else {
                "disabled"
            },
        )
    }
}

/// Line terminator of `text`: `"\r\n"` if its first line ends that way.
pub fn line_ending(text: &str) -> &'static str {
    match text.find('\n') {
        Some(i) if text[..i].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

/// Re-indent one block for emission.
///
/// The first line is emitted as-is behind `indent`. Continuation lines lose
/// their common leading spaces/tabs (measured over non-blank lines only) and
/// gain `indent`. Blank lines are emitted empty. Lines are joined with `eol`.
pub fn reindent_block(block: &str, indent: &str, eol: &str) -> String {
    let mut lines = block.lines();
    let first = lines.next().unwrap_or_default();
    let rest: Vec<&str> = lines.collect();

    let common = rest
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    let mut out = format!("{indent}{first}");
    for line in rest {
        out.push_str(eol);
        if !line.trim().is_empty() {
            out.push_str(indent);
            out.push_str(&line[common..]);
        }
    }
    out
}

/// Render the primary route module.
///
/// `kept` must come from `source` and `region` must be its located array.
pub fn render_routes_module(
    source: &RouteSource,
    region: ArrayRegion,
    kept: &[RouteBlock<'_>],
    provenance: &Provenance,
    indent: &str,
) -> String {
    if !provenance.filtering_enabled {
        return source.text().to_string();
    }

    let text = source.text();
    let eol = line_ending(text);
    let body = kept
        .iter()
        .map(|block| reindent_block(block.text(), indent, eol))
        .collect::<Vec<_>>()
        .join(&format!(",{eol}"));

    let mut out = provenance.header().replace('\n', eol);
    out.push_str(eol);
    out.push_str(&text[..region.start]);
    out.push_str(eol);
    out.push_str(&body);
    out.push_str(eol);
    out.push_str(&text[region.end..]);
    out
}

/// Sorted, de-duplicated paths of guarded blocks. Blocks without a path are skipped.
pub fn guarded_paths(kept: &[RouteBlock<'_>], reader: &DescriptorReader) -> Vec<String> {
    kept.iter()
        .filter(|block| reader.is_access_guarded(block))
        .filter_map(|block| reader.path_of(block))
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Render the guarded-path module.
pub fn render_guarded_module(
    paths: &[String],
    guard: &GuardConfig,
    provenance: &Provenance,
    indent: &str,
) -> String {
    let mut out = provenance.header();
    out.push_str(&format!(
        "// Paths of routes whose `{}` list includes `{}`.\n\n",
        guard.field, guard.identifier
    ));
    out.push_str(&format!(
        "export const {}: readonly string[] = Object.freeze([\n",
        guard.export_name
    ));
    if paths.is_empty() {
        out.push_str(&format!("{indent}// (no guarded routes)\n"));
    }
    for path in paths {
        out.push_str(&format!("{indent}{},\n", quote_path(path)));
    }
    out.push_str("]);\n");
    out
}

/// Single-quote a path captured from source.
///
/// The captured text is already literal content, so escapes it contains are
/// kept; only bare single quotes (possible when it came from `"..."` or a
/// template) need escaping.
pub fn quote_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len() + 2);
    out.push('\'');
    let mut escaped = false;
    for c in path.chars() {
        if c == '\'' && !escaped {
            out.push('\\');
        }
        escaped = c == '\\' && !escaped;
        out.push(c);
    }
    out.push('\'');
    out
}
