//! Shared test utilities for the routegen test suite.
//!
//! Provides the route fixture, a default descriptor reader, and a throwaway
//! project layout for tests that exercise the full generate pipeline.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = fixture_source();
//! let (_, blocks) = source.extract("routes").unwrap();
//! assert_eq!(paths(&blocks)[0], Some(""));
//!
//! let tmp = setup_project("[routes]\ncontent = false\n");
//! let config = load_project_config(&tmp);
//! ```

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::config::{GeneratorConfig, load_config};
use crate::descriptor::{DescriptorReader, RouteBlock};
use crate::source::RouteSource;

/// Hand-authored route file with root, content, guarded, redirect, and
/// fallback descriptors, in that order.
pub const ROUTES_FIXTURE: &str = include_str!("../fixtures/routes/app.routes.source.ts");

// =========================================================================
// Fixture access
// =========================================================================

pub fn fixture_source() -> RouteSource {
    RouteSource::new("src/app/app.routes.source.ts", ROUTES_FIXTURE)
}

/// Reader for the stock guard settings (`canActivate` / `AuthGuard`).
pub fn reader() -> DescriptorReader {
    DescriptorReader::new("canActivate", "AuthGuard").unwrap()
}

/// Declared path of each block, in order.
pub fn paths<'a>(blocks: &[RouteBlock<'a>]) -> Vec<Option<&'a str>> {
    let reader = reader();
    blocks.iter().map(|b| reader.path_of(b)).collect()
}

// =========================================================================
// Project setup
// =========================================================================

/// Lay out a project in a temp directory: the fixture at the stock source
/// path and `config_toml` as `routegen.toml`.
pub fn setup_project(config_toml: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_file(tmp.path(), "src/app/app.routes.source.ts", ROUTES_FIXTURE);
    write_file(tmp.path(), "routegen.toml", config_toml);
    tmp
}

/// Load the project's `routegen.toml`.
pub fn load_project_config(tmp: &TempDir) -> GeneratorConfig {
    load_config(&tmp.path().join("routegen.toml")).unwrap()
}

/// Write `contents` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Read `root/relative`, panicking with the path on failure.
pub fn read_file(root: &Path, relative: &str) -> String {
    let path = root.join(relative);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
}
