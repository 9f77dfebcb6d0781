//! # routegen
//!
//! Build-time generator for an application's route table. It reads a
//! hand-authored file holding an exported array of route descriptors, drops
//! the descriptors whose features are switched off, checks that navigation
//! still works, and writes two modules the application loads at start-up:
//!
//! - the **route module**, a drop-in replacement for the hand-authored file
//!   containing only the enabled routes;
//! - the **guarded-path module**, a frozen list of paths whose routes carry
//!   the access-control guard.
//!
//! # Architecture: Text In, Text Out
//!
//! The source is never parsed into a syntax tree. Instead a small automaton
//! finds structure, and everything else is copied through as text:
//!
//! ```text
//! 1. Sanitize  source    →  same-length copy with comments blanked
//! 2. Locate    sanitized →  byte range of the exported route array
//! 3. Split     range     →  one block of original text per top-level object
//! 4. Filter    blocks    →  kept blocks, unknown paths      (routegen.toml [routes])
//! 5. Validate  kept      →  root and fallback routes still present
//! 6. Render    kept      →  route module + guarded-path module
//! 7. Write     modules   →  both staged, then renamed into place
//! ```
//!
//! Offsets found in the sanitized copy index the original text directly, so
//! every kept descriptor keeps its comments and formatting.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scanner`] | String/template-literal automaton shared by every structural pass |
//! | [`sanitize`] | Comment blanking that preserves length and newline offsets |
//! | [`source`] | The source file, array location, and block splitting |
//! | [`descriptor`] | Route blocks and the `path` / guard field readers |
//! | [`filter`] | Inclusion map, feature filtering, and the pre-write validator |
//! | [`render`] | Re-indentation and rendering of both generated modules |
//! | [`generate`] | Pipeline orchestration and atomic artifact writes |
//! | [`config`] | `routegen.toml` loading, layering over stock defaults, validation |
//! | [`output`] | CLI output formatting for summaries, warnings, and listings |
//!
//! # Design Decisions
//!
//! ## Scanner Over Parser
//!
//! Route files are ordinary source code with imports, comments, and arbitrary
//! expressions around the array. A full grammar would have to understand all
//! of it; the generator only needs to know where strings and comments are.
//! The [`scanner::LiteralScanner`] tracks exactly that, and every pass that
//! counts brackets or braces goes through it.
//!
//! ## Fail Open on Unknown Paths
//!
//! A route path missing from `[routes]` is kept and reported in one
//! aggregated warning. Silently dropping a newly added route is worse than
//! shipping one that should have been hidden.
//!
//! ## All or Nothing
//!
//! Structural errors and validation failures abort before any file is touched.
//! Both modules are rendered in memory, staged as temp files next to their
//! targets, and only then renamed, so a failed run leaves the previous build's
//! outputs in place. [`generate::run`] returns a `Result`; only the binary
//! decides the exit code.
//!
//! ## Pass-Through Mode
//!
//! With `filtering.enabled = false` the route module is the source file byte
//! for byte. Extraction and validation still run so a broken source fails the
//! build in either mode.

pub mod config;
pub mod descriptor;
pub mod filter;
pub mod generate;
pub mod output;
pub mod render;
pub mod sanitize;
pub mod scanner;
pub mod source;

#[cfg(test)]
pub(crate) mod test_helpers;
