//! CLI output formatting for generate, check, and list.
//!
//! # Output Format
//!
//! ## Generate / Check
//!
//! One summary line on stdout, plus at most one aggregated warning on stderr:
//!
//! ```text
//! Generated 4/5 routes (filtered), 1 guarded path(s) → src/app/app.routes.ts, src/app/guarded-routes.generated.ts
//! warning: 3 route path(s) not listed in [routes], included by default: '', '**', 'special'
//! ```
//!
//! Unchanged artifacts are marked `(unchanged)`; `check` says `Checked` and
//! marks both artifacts `(not written)`.
//!
//! ## List
//!
//! ```text
//! 001 '' (line 12) included
//! 002 'content' (line 18) excluded
//! 003 'special' (line 23) unlisted, guarded
//! 004 (no path) (line 28) no path
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (pure, returns lines) for testability
//! and a `print_*` wrapper that writes them out.

use crate::filter::Decision;
use crate::generate::{ArtifactOutcome, BlockSummary, GenerationReport, WriteStatus};
use crate::render::quote_path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{pos:03}")
}

fn artifact_label(artifact: &ArtifactOutcome) -> String {
    match artifact.status {
        WriteStatus::Written => artifact.label.clone(),
        WriteStatus::Unchanged => format!("{} (unchanged)", artifact.label),
        WriteStatus::Checked => format!("{} (not written)", artifact.label),
    }
}

fn decision_label(decision: Decision) -> &'static str {
    match decision {
        Decision::NoPath => "no path",
        Decision::Included => "included",
        Decision::Excluded => "excluded",
        Decision::Unlisted => "unlisted",
    }
}

// ============================================================================
// Generate / Check
// ============================================================================

/// The one-line run summary.
pub fn format_summary(report: &GenerationReport) -> String {
    let verb = if report
        .artifacts
        .iter()
        .all(|a| a.status == WriteStatus::Checked)
    {
        "Checked"
    } else {
        "Generated"
    };
    let targets: Vec<String> = report.artifacts.iter().map(artifact_label).collect();
    format!(
        "{} {}/{} routes ({}), {} guarded path(s) → {}",
        verb,
        report.kept,
        report.total,
        report.mode,
        report.guarded_paths.len(),
        targets.join(", ")
    )
}

/// Aggregated warning for paths missing from the inclusion map, if any.
///
/// Paths arrive sorted and de-duplicated; each is quoted so the root path
/// reads as `''`.
pub fn format_unknown_paths_warning(paths: &[String]) -> Option<String> {
    if paths.is_empty() {
        return None;
    }
    let quoted: Vec<String> = paths.iter().map(|p| quote_path(p)).collect();
    Some(format!(
        "warning: {} route path(s) not listed in [routes], included by default: {}",
        paths.len(),
        quoted.join(", ")
    ))
}

pub fn print_report(report: &GenerationReport) {
    println!("{}", format_summary(report));
    if let Some(warning) = format_unknown_paths_warning(&report.unknown_paths) {
        eprintln!("{}", warning);
    }
}

// ============================================================================
// List
// ============================================================================

/// One line per extracted block, in source order.
pub fn format_block_listing(blocks: &[BlockSummary]) -> Vec<String> {
    blocks
        .iter()
        .map(|block| {
            let path = match &block.path {
                Some(path) => quote_path(path),
                None => "(no path)".to_string(),
            };
            let mut line = format!(
                "{} {} (line {}) {}",
                format_index(block.index),
                path,
                block.line,
                decision_label(block.decision)
            );
            if block.decision == Decision::Excluded && block.kept {
                line.push_str(" (filtering disabled)");
            }
            if block.guarded {
                line.push_str(", guarded");
            }
            line
        })
        .collect()
}

pub fn print_block_listing(blocks: &[BlockSummary]) {
    for line in format_block_listing(blocks) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::Mode;

    fn report(status: WriteStatus) -> GenerationReport {
        GenerationReport {
            mode: Mode::Filtered,
            source: "src/app/app.routes.source.ts".into(),
            total: 3,
            kept: 2,
            guarded_paths: vec!["special".into()],
            unknown_paths: vec!["".into(), "special".into()],
            artifacts: vec![
                ArtifactOutcome {
                    label: "src/app/app.routes.ts".into(),
                    status,
                },
                ArtifactOutcome {
                    label: "src/app/guarded.ts".into(),
                    status,
                },
            ],
        }
    }

    fn block(index: usize, path: Option<&str>, decision: Decision, kept: bool) -> BlockSummary {
        BlockSummary {
            index,
            line: index * 5,
            path: path.map(str::to_string),
            decision,
            kept,
            guarded: false,
        }
    }

    // =========================================================================
    // Summary
    // =========================================================================

    #[test]
    fn summary_line() {
        assert_eq!(
            format_summary(&report(WriteStatus::Written)),
            "Generated 2/3 routes (filtered), 1 guarded path(s) → src/app/app.routes.ts, src/app/guarded.ts"
        );
    }

    #[test]
    fn summary_marks_unchanged_artifacts() {
        let mut r = report(WriteStatus::Written);
        r.artifacts[1].status = WriteStatus::Unchanged;
        assert!(format_summary(&r).ends_with("src/app/app.routes.ts, src/app/guarded.ts (unchanged)"));
    }

    #[test]
    fn summary_for_check() {
        let mut r = report(WriteStatus::Checked);
        r.mode = Mode::PassThrough;
        let line = format_summary(&r);
        assert!(line.starts_with("Checked 2/3 routes (pass-through)"));
        assert!(line.contains("src/app/app.routes.ts (not written)"));
    }

    // =========================================================================
    // Unknown-path warning
    // =========================================================================

    #[test]
    fn warning_lists_quoted_paths() {
        let warning =
            format_unknown_paths_warning(&["".to_string(), "special".to_string()]).unwrap();
        assert_eq!(
            warning,
            "warning: 2 route path(s) not listed in [routes], included by default: '', 'special'"
        );
    }

    #[test]
    fn no_warning_without_unknown_paths() {
        assert_eq!(format_unknown_paths_warning(&[]), None);
    }

    // =========================================================================
    // Listing
    // =========================================================================

    #[test]
    fn listing_lines() {
        let mut guarded = block(3, Some("special"), Decision::Unlisted, true);
        guarded.guarded = true;
        let lines = format_block_listing(&[
            block(1, Some(""), Decision::Included, true),
            block(2, Some("content"), Decision::Excluded, false),
            guarded,
            block(4, None, Decision::NoPath, true),
        ]);
        assert_eq!(
            lines,
            vec![
                "001 '' (line 5) included",
                "002 'content' (line 10) excluded",
                "003 'special' (line 15) unlisted, guarded",
                "004 (no path) (line 20) no path",
            ]
        );
    }

    #[test]
    fn listing_notes_excluded_but_kept() {
        let lines = format_block_listing(&[block(7, Some("content"), Decision::Excluded, true)]);
        assert_eq!(lines, vec!["007 'content' (line 35) excluded (filtering disabled)"]);
    }

    #[test]
    fn format_index_pads_to_three() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }
}
