//! The hand-authored route file and the structural passes over it.
//!
//! A [`RouteSource`] holds the file text together with its sanitized copy
//! (comments blanked, see [`sanitize`]). Structure is always found by scanning
//! the sanitized copy through a [`LiteralScanner`](crate::scanner::LiteralScanner),
//! and the resulting byte offsets slice the original text, so every extracted
//! block keeps its exact formatting and comments.
//!
//! ## Passes
//!
//! ```text
//! locate_array   export const routes: Routes = [ ... ];
//!                                               ^^^^^   ArrayRegion
//! split_blocks   [ {..}, {..}, {..} ]
//!                  ^^^^  ^^^^  ^^^^                      RouteBlocks
//! ```
//!
//! 1. **Locate**: find the unique `export const <name> ... = [` anchor, then
//!    walk forward counting structural `[`/`]` until the anchor's bracket is
//!    closed.
//! 2. **Split**: walk the region counting structural `{`/`}`; every span that
//!    goes from depth 0 to 1 and back to 0 is one route block.
//!
//! Both passes fail with a line number when brackets or braces do not balance.
//! Nothing is written by the pipeline after a failure here.

use crate::descriptor::RouteBlock;
use crate::sanitize::sanitize;
use crate::scanner::{line_of, structural_chars};
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("route array `export const {export_name} = [` not found")]
    AnchorNotFound { export_name: String },
    #[error("route array `export const {export_name}` is declared more than once (lines {lines:?})")]
    AmbiguousAnchor {
        export_name: String,
        lines: Vec<usize>,
    },
    #[error("route array opened on line {line} is never closed")]
    UnbalancedArray { line: usize },
    #[error("route object opened on line {line} is never closed")]
    UnterminatedObject { line: usize },
    #[error("unmatched `}}` on line {line}")]
    StrayBrace { line: usize },
    #[error("invalid anchor pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Byte offsets of the route array inside the source.
///
/// `start..end` is the text between the anchor's `[` and its matching `]`;
/// `anchor_start` is where the `export` keyword begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayRegion {
    pub anchor_start: usize,
    pub start: usize,
    pub end: usize,
}

impl ArrayRegion {
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// The hand-authored route file: its display path, text, and sanitized copy.
#[derive(Debug, Clone)]
pub struct RouteSource {
    path: PathBuf,
    text: String,
    sanitized: String,
}

impl RouteSource {
    /// `path` is used for diagnostics and provenance only.
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        let sanitized = sanitize(&text);
        Self {
            path: path.into(),
            text,
            sanitized,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sanitized(&self) -> &str {
        &self.sanitized
    }

    /// Locate the exported route array.
    pub fn locate_array(&self, export_name: &str) -> Result<ArrayRegion, ExtractError> {
        locate_array(&self.sanitized, export_name)
    }

    /// Split a located region into top-level route blocks, in source order.
    pub fn split_blocks(&self, region: ArrayRegion) -> Result<Vec<RouteBlock<'_>>, ExtractError> {
        split_blocks(&self.text, &self.sanitized, region)
    }

    /// Locate and split in one step.
    pub fn extract(
        &self,
        export_name: &str,
    ) -> Result<(ArrayRegion, Vec<RouteBlock<'_>>), ExtractError> {
        let region = self.locate_array(export_name)?;
        let blocks = self.split_blocks(region)?;
        tracing::debug!(
            path = %self.path.display(),
            line = line_of(&self.sanitized, region.anchor_start),
            start = region.start,
            end = region.end,
            blocks = blocks.len(),
            "route array extracted"
        );
        Ok((region, blocks))
    }
}

/// Anchor for `export const <name>`, an optional type annotation, `=`, `[`.
fn anchor_pattern(export_name: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"\bexport\s+const\s+{}\b\s*(?::[^=;]*)?=\s*\[",
        regex::escape(export_name)
    ))
}

/// Find the route array in `sanitized` text.
///
/// The anchor must occur exactly once. Scanning starts after its `[` with a
/// depth of one and stops at the `]` that brings the depth back to zero.
pub fn locate_array(sanitized: &str, export_name: &str) -> Result<ArrayRegion, ExtractError> {
    let pattern = anchor_pattern(export_name)?;
    let anchors: Vec<_> = pattern.find_iter(sanitized).collect();
    let anchor = match anchors.as_slice() {
        [] => {
            return Err(ExtractError::AnchorNotFound {
                export_name: export_name.to_string(),
            });
        }
        [only] => *only,
        many => {
            return Err(ExtractError::AmbiguousAnchor {
                export_name: export_name.to_string(),
                lines: many.iter().map(|m| line_of(sanitized, m.start())).collect(),
            });
        }
    };

    let start = anchor.end();
    let mut depth = 1usize;
    for (offset, c) in structural_chars(&sanitized[start..]) {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(ArrayRegion {
                        anchor_start: anchor.start(),
                        start,
                        end: start + offset,
                    });
                }
            }
            _ => {}
        }
    }

    Err(ExtractError::UnbalancedArray {
        line: line_of(sanitized, anchor.end() - 1),
    })
}

/// Split the array region into top-level object literals.
///
/// `text` and `sanitized` are the full original and sanitized sources; the
/// returned blocks borrow from both, trimmed of surrounding whitespace.
pub fn split_blocks<'a>(
    text: &'a str,
    sanitized: &'a str,
    region: ArrayRegion,
) -> Result<Vec<RouteBlock<'a>>, ExtractError> {
    let mut blocks = Vec::new();
    let mut depth = 0usize;
    let mut open_at = 0usize;
    let mut loose_at: Option<usize> = None;

    for (offset, c) in structural_chars(region.slice(sanitized)) {
        let at = region.start + offset;
        match c {
            '{' => {
                if depth == 0 {
                    open_at = at;
                }
                depth += 1;
            }
            '}' => {
                if depth == 0 {
                    return Err(ExtractError::StrayBrace {
                        line: line_of(sanitized, at),
                    });
                }
                depth -= 1;
                if depth == 0 {
                    blocks.push(make_block(text, sanitized, open_at, at + 1));
                }
            }
            c if depth == 0 && !c.is_whitespace() && c != ',' => {
                loose_at.get_or_insert(at);
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(ExtractError::UnterminatedObject {
            line: line_of(sanitized, open_at),
        });
    }
    if let Some(at) = loose_at {
        // Spreads and identifier references between objects are not blocks
        // and are not carried into filtered output.
        tracing::warn!(
            line = line_of(sanitized, at),
            "route array contains entries that are not object literals"
        );
    }
    Ok(blocks)
}

fn make_block<'a>(text: &'a str, sanitized: &'a str, from: usize, to: usize) -> RouteBlock<'a> {
    let raw = &text[from..to];
    let trimmed = raw.trim();
    let lead = raw.len() - raw.trim_start().len();
    let start = from + lead;
    let end = start + trimmed.len();
    RouteBlock::new(
        &text[start..end],
        &sanitized[start..end],
        line_of(text, start),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use proptest::prelude::*;

    fn blocks(text: &str) -> Vec<String> {
        let source = RouteSource::new("routes.ts", text);
        let (_, blocks) = source.extract("routes").unwrap();
        blocks.iter().map(|b| b.text().to_string()).collect()
    }

    // =========================================================================
    // locate_array
    // =========================================================================

    #[test]
    fn locate_simple_array() {
        let source = RouteSource::new("r.ts", "export const routes = [ {a: 1} ];\n");
        let region = source.locate_array("routes").unwrap();
        assert_eq!(region.slice(source.text()), " {a: 1} ");
        assert_eq!(region.anchor_start, 0);
    }

    #[test]
    fn locate_with_type_annotation() {
        let text = "import x;\nexport const routes: Routes = [\n  {}\n];";
        let source = RouteSource::new("r.ts", text);
        let region = source.locate_array("routes").unwrap();
        assert_eq!(region.slice(text), "\n  {}\n");
        assert_eq!(&text[region.anchor_start..region.start], "export const routes: Routes = [");
        assert_eq!(&text[region.end..], "];");
    }

    #[test]
    fn locate_with_array_type_annotation() {
        let text = "export const routes: Route[] = [{}];";
        let region = locate_array(&sanitize(text), "routes").unwrap();
        assert_eq!(region.slice(text), "{}");
    }

    #[test]
    fn locate_skips_nested_brackets() {
        let text = "export const routes = [{ canActivate: [A, [B]] }];";
        let region = locate_array(text, "routes").unwrap();
        assert_eq!(region.slice(text), "{ canActivate: [A, [B]] }");
    }

    #[test]
    fn locate_ignores_brackets_in_strings_and_comments() {
        let text = "export const routes = [{ t: ']' }, // ]\n{ u: \"[\" }];";
        let source = RouteSource::new("r.ts", text);
        let region = source.locate_array("routes").unwrap();
        assert_eq!(&text[region.end..], "];");
    }

    #[test]
    fn locate_does_not_match_other_exports() {
        let text = "export const routesExtra = [1];\nexport const routes = [2];";
        let region = locate_array(text, "routes").unwrap();
        assert_eq!(region.slice(text), "2");
    }

    #[test]
    fn locate_ignores_commented_anchor() {
        let text = "// export const routes = [\nexport const routes = [{}];";
        let source = RouteSource::new("r.ts", text);
        assert!(source.locate_array("routes").is_ok());
    }

    #[test]
    fn missing_anchor_is_error() {
        let result = locate_array("const routes = [];", "routes");
        assert!(matches!(result, Err(ExtractError::AnchorNotFound { .. })));
    }

    #[test]
    fn duplicate_anchor_is_error() {
        let text = "export const routes = [];\n\nexport const routes = [];";
        match locate_array(text, "routes") {
            Err(ExtractError::AmbiguousAnchor { lines, .. }) => assert_eq!(lines, vec![1, 3]),
            other => panic!("expected ambiguous anchor, got {other:?}"),
        }
    }

    #[test]
    fn unclosed_array_is_error() {
        let text = "\nexport const routes = [{ a: [1] }";
        match locate_array(text, "routes") {
            Err(ExtractError::UnbalancedArray { line }) => assert_eq!(line, 2),
            other => panic!("expected unbalanced array, got {other:?}"),
        }
    }

    // =========================================================================
    // split_blocks
    // =========================================================================

    #[test]
    fn split_three_blocks_in_order() {
        let found = blocks(
            "export const routes = [\n  { path: 'a' },\n  { path: 'b' },\n  { path: 'c' },\n];",
        );
        assert_eq!(found, vec!["{ path: 'a' }", "{ path: 'b' }", "{ path: 'c' }"]);
    }

    #[test]
    fn split_keeps_nested_objects_inside_parent() {
        let found = blocks(
            "export const routes = [{ path: 'p', children: [{ path: 'c' }], data: { x: {} } }];",
        );
        assert_eq!(found.len(), 1);
        assert!(found[0].contains("children"));
    }

    #[test]
    fn split_preserves_original_formatting_and_comments() {
        let text = "export const routes = [\n  {\n    // landing\n    path: '', /* } */\n  },\n];";
        let found = blocks(text);
        assert_eq!(found, vec!["{\n    // landing\n    path: '', /* } */\n  }"]);
    }

    #[test]
    fn split_ignores_braces_in_strings() {
        let found = blocks(r#"export const routes = [{ t: '}{', u: "{", v: `}` }, { w: 1 }];"#);
        assert_eq!(found.len(), 2);
        assert_eq!(found[1], "{ w: 1 }");
    }

    #[test]
    fn split_records_block_lines() {
        let source = RouteSource::new(
            "r.ts",
            "export const routes = [\n  {\n  },\n\n  { path: 'x' }\n];",
        );
        let (_, blocks) = source.extract("routes").unwrap();
        let lines: Vec<usize> = blocks.iter().map(|b| b.line()).collect();
        assert_eq!(lines, vec![2, 5]);
    }

    #[test]
    fn split_empty_array() {
        assert!(blocks("export const routes = [];").is_empty());
    }

    #[test]
    fn unterminated_object_is_error() {
        // The array itself balances; the object inside does not.
        let text = "export const routes = [\n  { a: [1] \n];";
        let source = RouteSource::new("r.ts", text);
        match source.extract("routes") {
            Err(ExtractError::UnterminatedObject { line }) => assert_eq!(line, 2),
            other => panic!("expected unterminated object, got {other:?}"),
        }
    }

    #[test]
    fn stray_brace_is_error() {
        let text = "export const routes = [\n  { a: 1 } },\n];";
        let source = RouteSource::new("r.ts", text);
        match source.extract("routes") {
            Err(ExtractError::StrayBrace { line }) => assert_eq!(line, 2),
            other => panic!("expected stray brace, got {other:?}"),
        }
    }

    #[test]
    fn comment_with_structural_characters_changes_nothing() {
        let plain = ROUTES_FIXTURE;
        let noisy = ROUTES_FIXTURE.replace(
            "  {\n    path: 'content'",
            "  // }, { [ ] stray\n  /* { ] */\n  {\n    path: 'content'",
        );
        assert_ne!(plain, noisy);

        let plain_source = RouteSource::new("a.ts", plain);
        let noisy_source = RouteSource::new("b.ts", noisy.as_str());
        let (_, a) = plain_source.extract("routes").unwrap();
        let (_, b) = noisy_source.extract("routes").unwrap();
        let a: Vec<&str> = a.iter().map(|b| b.text()).collect();
        let b: Vec<&str> = b.iter().map(|b| b.text()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn fixture_blocks_in_source_order() {
        let source = RouteSource::new("fixture.ts", ROUTES_FIXTURE);
        let (_, blocks) = source.extract("routes").unwrap();
        assert_eq!(
            paths(&blocks),
            vec![Some(""), Some("content"), Some("special"), None, Some("**")]
        );
    }

    proptest! {
        #[test]
        fn prop_comments_between_blocks_are_opaque(
            noise in r"[{}\[\]'`a-z ]{0,24}",
            block_comment in any::<bool>(),
        ) {
            let comment = if block_comment {
                format!("  /* {noise} */\n")
            } else {
                format!("  // {noise}\n")
            };
            let noisy = ROUTES_FIXTURE.replace("  {\n    path: 'special'", &format!("{comment}  {{\n    path: 'special'"));

            let plain = RouteSource::new("a.ts", ROUTES_FIXTURE);
            let noisy = RouteSource::new("b.ts", noisy);
            let (_, a) = plain.extract("routes").unwrap();
            let (_, b) = noisy.extract("routes").unwrap();
            let a: Vec<&str> = a.iter().map(|b| b.text()).collect();
            let b: Vec<&str> = b.iter().map(|b| b.text()).collect();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_string_values_do_not_move_boundaries(noise in r#"[{}\[\]"`a-z ]{0,24}"#) {
            let text = ROUTES_FIXTURE.replace("Content {draft}", &noise);
            let source = RouteSource::new("a.ts", text);
            let (_, blocks) = source.extract("routes").unwrap();
            prop_assert_eq!(
                paths(&blocks),
                vec![Some(""), Some("content"), Some("special"), None, Some("**")]
            );
        }
    }

    #[test]
    fn source_accessors() {
        let source = RouteSource::new("dir/r.ts", "a // b");
        assert_eq!(source.path(), Path::new("dir/r.ts"));
        assert_eq!(source.text(), "a // b");
        assert_eq!(source.sanitized(), "a     ");
    }
}
