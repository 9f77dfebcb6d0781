//! Feature filtering of route blocks and the checks that guard its result.
//!
//! The inclusion map comes from `[routes]` in the config: route path to
//! enabled. Filtering walks the blocks in source order and decides each one:
//!
//! | Block | Decision |
//! |-------|----------|
//! | no `path` key (e.g. redirect) | keep, never filtered |
//! | path mapped to `true` | keep |
//! | path mapped to `false` | drop |
//! | path not in the map | keep, and report as unknown |
//!
//! Unknown paths fail open: a new route nobody classified yet stays reachable
//! and the build warns, instead of silently disappearing.
//!
//! ## Invariants
//!
//! [`validate`] runs before anything is written and rejects a result that
//! would ship a broken route table:
//!
//! - the source had at least one block, and at least one survived
//! - filtering never produced more blocks than it was given
//! - a root route (`path: ''`) in the source is still present
//! - a fallback route (`path: '**'`) in the source is still present

use crate::descriptor::{DescriptorReader, RouteBlock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Path of the landing route.
pub const ROOT_PATH: &str = "";
/// Path of the catch-all not-found route.
pub const FALLBACK_PATH: &str = "**";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no route descriptors found in the route array")]
    NoRoutes,
    #[error("feature filtering removed all {total} routes")]
    AllFiltered { total: usize },
    #[error("feature filtering kept {kept} routes out of {total}")]
    KeptExceedsSource { kept: usize, total: usize },
    #[error("mandatory {0} route was removed by feature filtering")]
    MandatoryPathRemoved(MandatoryRoute),
}

/// Routes whose loss breaks navigation without any other symptom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MandatoryRoute {
    Root,
    Fallback,
}

impl MandatoryRoute {
    pub fn path(self) -> &'static str {
        match self {
            MandatoryRoute::Root => ROOT_PATH,
            MandatoryRoute::Fallback => FALLBACK_PATH,
        }
    }
}

impl fmt::Display for MandatoryRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MandatoryRoute::Root => write!(f, "root ('')"),
            MandatoryRoute::Fallback => write!(f, "fallback ('**')"),
        }
    }
}

/// Route path -> enabled, queried by exact path string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InclusionMap(BTreeMap<String, bool>);

impl InclusionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, enabled: bool) {
        self.0.insert(path.into(), enabled);
    }

    /// The explicit setting for `path`, if it has one.
    pub fn get(&self, path: &str) -> Option<bool> {
        self.0.get(path).copied()
    }

    /// Whether `path` is enabled. Unlisted paths are enabled.
    ///
    /// This is the query sibling generators (sitemap, static menus) use so
    /// their notion of "enabled" matches the route table's.
    pub fn is_enabled(&self, path: &str) -> bool {
        self.get(path).unwrap_or(true)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for InclusionMap {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// How the inclusion map treats one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    /// No `path` key; never subject to filtering.
    NoPath,
    Included,
    Excluded,
    /// Path absent from the map; kept and reported.
    Unlisted,
}

impl Decision {
    pub fn of(path: Option<&str>, inclusion: &InclusionMap) -> Self {
        match path.map(|p| inclusion.get(p)) {
            None => Decision::NoPath,
            Some(Some(true)) => Decision::Included,
            Some(Some(false)) => Decision::Excluded,
            Some(None) => Decision::Unlisted,
        }
    }

    pub fn keeps(self) -> bool {
        self != Decision::Excluded
    }
}

/// Result of filtering: surviving blocks in source order, plus unmapped paths.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome<'a> {
    pub kept: Vec<RouteBlock<'a>>,
    pub unknown_paths: BTreeSet<String>,
}

impl<'a> FilterOutcome<'a> {
    /// Keep every block; used when feature filtering is disabled.
    pub fn pass_through(blocks: &[RouteBlock<'a>]) -> Self {
        Self {
            kept: blocks.to_vec(),
            unknown_paths: BTreeSet::new(),
        }
    }
}

/// Filter `blocks` against `inclusion`, preserving source order.
pub fn filter_blocks<'a>(
    blocks: &[RouteBlock<'a>],
    inclusion: &InclusionMap,
    reader: &DescriptorReader,
) -> FilterOutcome<'a> {
    let mut outcome = FilterOutcome::default();
    for block in blocks {
        let path = reader.path_of(block);
        let decision = Decision::of(path, inclusion);
        if let (Decision::Unlisted, Some(path)) = (decision, path) {
            outcome.unknown_paths.insert(path.to_string());
        }
        if decision.keeps() {
            outcome.kept.push(*block);
        } else {
            tracing::debug!(line = block.line(), "route excluded by feature filtering");
        }
    }
    outcome
}

/// Check the filtered set against the source set before anything is written.
pub fn validate(
    blocks: &[RouteBlock<'_>],
    kept: &[RouteBlock<'_>],
    reader: &DescriptorReader,
) -> Result<(), ValidationError> {
    if blocks.is_empty() {
        return Err(ValidationError::NoRoutes);
    }
    if kept.is_empty() {
        return Err(ValidationError::AllFiltered {
            total: blocks.len(),
        });
    }
    if kept.len() > blocks.len() {
        return Err(ValidationError::KeptExceedsSource {
            kept: kept.len(),
            total: blocks.len(),
        });
    }
    for route in [MandatoryRoute::Root, MandatoryRoute::Fallback] {
        if has_path(blocks, reader, route.path()) && !has_path(kept, reader, route.path()) {
            return Err(ValidationError::MandatoryPathRemoved(route));
        }
    }
    Ok(())
}

fn has_path(blocks: &[RouteBlock<'_>], reader: &DescriptorReader, path: &str) -> bool {
    blocks.iter().any(|block| reader.path_of(block) == Some(path))
}
