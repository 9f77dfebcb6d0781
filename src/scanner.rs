//! String-literal tracking shared by every structural pass.
//!
//! Route files are brace/bracket-delimited text full of quoted values, and a
//! `'}'` inside a string must never close an object. Rather than parsing the
//! host language, every stage that looks at structure feeds characters through
//! a [`LiteralScanner`] and only acts on the ones it reports as structural.
//!
//! ## Supported literals
//!
//! | Delimiter | Kind |
//! |-----------|------|
//! | `'`       | single-quoted string |
//! | `"`       | double-quoted string |
//! | `` ` ``   | template literal (interpolations are treated as opaque text) |
//!
//! A backslash inside a literal escapes exactly one following character, so
//! `'it\'s'` stays open across the escaped quote. A quote of a different style
//! inside an open literal is inert.
//!
//! Comments are not handled here: the [`sanitize`](crate::sanitize) pass blanks
//! them first, and every later pass scans the sanitized copy.

/// Characters that open (and close) a literal.
const QUOTES: [char; 3] = ['\'', '"', '`'];

/// Character automaton tracking whether the cursor sits inside a literal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiteralScanner {
    quote: Option<char>,
    escape_next: bool,
}

impl LiteralScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the last fed character left the cursor inside a literal.
    pub fn in_string(&self) -> bool {
        self.quote.is_some()
    }

    /// The delimiter of the currently open literal, if any.
    pub fn quote_char(&self) -> Option<char> {
        self.quote
    }

    /// Advance past one character.
    ///
    /// Returns `true` when `c` is structural code: outside any literal and not
    /// itself a literal delimiter. Callers only interpret braces, brackets and
    /// comment markers when this returns `true`.
    pub fn feed(&mut self, c: char) -> bool {
        match self.quote {
            Some(open) => {
                if self.escape_next {
                    self.escape_next = false;
                } else if c == '\\' {
                    self.escape_next = true;
                } else if c == open {
                    self.quote = None;
                }
                false
            }
            None if QUOTES.contains(&c) => {
                self.quote = Some(c);
                false
            }
            None => true,
        }
    }
}

/// Iterate over the structural characters of `text` with their byte offsets.
///
/// Offsets are relative to the start of `text`.
pub fn structural_chars(text: &str) -> impl Iterator<Item = (usize, char)> + '_ {
    let mut scanner = LiteralScanner::new();
    text.char_indices().filter(move |&(_, c)| scanner.feed(c))
}

/// 1-based line number of a byte offset.
pub fn line_of(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structural(text: &str) -> String {
        structural_chars(text).map(|(_, c)| c).collect()
    }

    #[test]
    fn plain_code_is_structural() {
        assert_eq!(structural("{ a: [1] }"), "{ a: [1] }");
    }

    #[test]
    fn single_quoted_content_is_inert() {
        assert_eq!(structural("{ a: '}]' }"), "{ a:  }");
    }

    #[test]
    fn double_quoted_content_is_inert() {
        assert_eq!(structural(r#"[ "{[" ]"#), "[  ]");
    }

    #[test]
    fn template_content_is_inert() {
        assert_eq!(structural("x = `${ {a} }`;"), "x = ;");
    }

    #[test]
    fn escaped_quote_does_not_close() {
        assert_eq!(structural(r"{ t: 'it\'s }' }"), "{ t:  }");
    }

    #[test]
    fn escaped_backslash_then_quote_closes() {
        // `'a\\'` is a complete literal: the backslash escapes the backslash.
        assert_eq!(structural(r"['a\\']"), "[]");
    }

    #[test]
    fn other_quote_style_inside_literal_is_inert() {
        assert_eq!(structural(r#"{ t: "it's" }"#), "{ t:  }");
        assert_eq!(structural(r#"{ t: `say "hi" it's` }"#), "{ t:  }");
    }

    #[test]
    fn offsets_point_into_original_text() {
        let text = "'x' {";
        let found: Vec<(usize, char)> = structural_chars(text).collect();
        assert_eq!(found, vec![(3, ' '), (4, '{')]);
    }

    #[test]
    fn offsets_are_byte_offsets_across_multibyte_chars() {
        let text = "'é' {";
        let (offset, c) = structural_chars(text).last().unwrap();
        assert_eq!(c, '{');
        assert_eq!(&text[offset..], "{");
    }

    #[test]
    fn state_reports_open_quote() {
        let mut scanner = LiteralScanner::new();
        assert!(!scanner.in_string());
        assert!(!scanner.feed('"'));
        assert!(scanner.in_string());
        assert_eq!(scanner.quote_char(), Some('"'));
        assert!(!scanner.feed('\''));
        assert!(scanner.in_string());
        assert!(!scanner.feed('"'));
        assert!(!scanner.in_string());
        assert!(scanner.feed('x'));
    }

    #[test]
    fn unterminated_literal_swallows_rest() {
        assert_eq!(structural("{ 'open }"), "{ ");
    }

    #[test]
    fn line_of_counts_newlines_before_offset() {
        let text = "a\nb\nc";
        assert_eq!(line_of(text, 0), 1);
        assert_eq!(line_of(text, 2), 2);
        assert_eq!(line_of(text, 4), 3);
        assert_eq!(line_of(text, 100), 3);
    }
}
