//! Comment blanking.
//!
//! Produces a copy of the source in which every byte of every `//` and `/* */`
//! comment is replaced by a space. String and template literals pass through
//! untouched, and so do newlines, including the ones inside block comments.
//!
//! The sanitized copy has exactly the same byte length and the same `\n`/`\r`
//! positions as the input. Offsets found by scanning it can therefore be used
//! to slice the original text, and line numbers computed from it are the
//! source's line numbers.
//!
//! ```text
//! { path: 'a' }, // { stray
//! { path: 'a' },
//! ```
//!
//! This pass cannot fail. An unterminated block comment blanks to the end of
//! input; the balance checks that run afterwards report the resulting damage.

use crate::scanner::LiteralScanner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Code,
    LineComment,
    BlockComment,
}

/// Blank all comment content in `text`, preserving length and line breaks.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut scanner = LiteralScanner::new();
    let mut mode = Mode::Code;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match mode {
            Mode::Code => {
                if !scanner.in_string() && c == '/' {
                    match chars.peek() {
                        Some('/') => {
                            chars.next();
                            out.push_str("  ");
                            mode = Mode::LineComment;
                            continue;
                        }
                        Some('*') => {
                            chars.next();
                            out.push_str("  ");
                            mode = Mode::BlockComment;
                            continue;
                        }
                        _ => {}
                    }
                }
                scanner.feed(c);
                out.push(c);
            }
            Mode::LineComment => {
                if c == '\n' {
                    out.push(c);
                    mode = Mode::Code;
                } else {
                    blank(&mut out, c);
                }
            }
            Mode::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    mode = Mode::Code;
                } else {
                    blank(&mut out, c);
                }
            }
        }
    }

    out
}

/// Replace a comment character with as many spaces as it has bytes.
/// Line breaks are kept so line numbering survives.
fn blank(out: &mut String, c: char) {
    if c == '\n' || c == '\r' {
        out.push(c);
    } else {
        out.extend(std::iter::repeat_n(' ', c.len_utf8()));
    }
}
