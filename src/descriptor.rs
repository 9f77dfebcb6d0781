//! Route descriptor blocks and the readers that pull fields out of them.
//!
//! A [`RouteBlock`] is the verbatim text of one top-level object literal from
//! the route array, carried together with its comment-blanked twin. Readers
//! match against the blanked twin, so a commented-out `// path: 'old'` or
//! `// AuthGuard` never counts, and return slices of the original text.
//!
//! Two fields matter to the generator:
//!
//! - **path**: the first `path: '...'` entry in the block, in any of the three
//!   quote styles. Descriptors without one (e.g. bare redirects) read as `None`.
//! - **access guard**: whether the configured array field (`canActivate` by
//!   default) lists the configured guard identifier as a whole word.
//!
//! Matching is regex-based and tolerant of whitespace and newlines; it is not
//! a parser. Nested `children` arrays are part of their parent's block, so the
//! first `path` found is the parent's own.

use regex::Regex;

/// One top-level route object, in original formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteBlock<'a> {
    text: &'a str,
    sanitized: &'a str,
    line: usize,
}

impl<'a> RouteBlock<'a> {
    /// `sanitized` must be the comment-blanked copy of `text` (same length).
    pub fn new(text: &'a str, sanitized: &'a str, line: usize) -> Self {
        debug_assert_eq!(text.len(), sanitized.len());
        Self {
            text,
            sanitized,
            line,
        }
    }

    /// Original text, comments included.
    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn sanitized(&self) -> &'a str {
        self.sanitized
    }

    /// 1-based source line of the opening brace.
    pub fn line(&self) -> usize {
        self.line
    }
}

/// Field readers configured for one guard field/identifier pair.
#[derive(Debug, Clone)]
pub struct DescriptorReader {
    path_re: Regex,
    guard_re: Regex,
}

impl DescriptorReader {
    pub fn new(guard_field: &str, guard_identifier: &str) -> Result<Self, regex::Error> {
        let path_re = Regex::new(
            r#"\bpath\s*:\s*(?:'((?:[^'\\\n]|\\.)*)'|"((?:[^"\\\n]|\\.)*)"|`((?:[^`\\]|\\[\s\S])*)`)"#,
        )?;
        // `$` is an identifier character, so `\b` cannot delimit names here.
        let guard_re = Regex::new(&format!(
            r"(?:^|[^A-Za-z0-9_$]){field}\s*:\s*\[(?:[^\]]*[^A-Za-z0-9_$\]])?{ident}(?:[^A-Za-z0-9_$\]][^\]]*)?\]",
            field = regex::escape(guard_field),
            ident = regex::escape(guard_identifier),
        ))?;
        Ok(Self { path_re, guard_re })
    }

    /// Declared path of the block, without quotes.
    ///
    /// `Some("")` is the root route; `None` means the block has no `path` key.
    pub fn path_of<'a>(&self, block: &RouteBlock<'a>) -> Option<&'a str> {
        let caps = self.path_re.captures(block.sanitized)?;
        let value = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
        Some(&block.text[value.range()])
    }

    /// Whether the guard field's bracketed value names the guard identifier.
    pub fn is_access_guarded(&self, block: &RouteBlock<'_>) -> bool {
        self.guard_re.is_match(block.sanitized)
    }
}
