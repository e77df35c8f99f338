//! Construction options for `LocalConfig`.
//!
//! Responsibilities:
//! - Collect the explicit path, candidate override, force flag and cache a
//!   handle is built with.
//!
//! Does NOT handle:
//! - Resolving or loading anything; options are inert until
//!   `LocalConfig::with_options` consumes them.

use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::ConfigCache;

/// Options for building a [`LocalConfig`](super::LocalConfig).
///
/// Unset options fall back to candidate lookup over the shared default
/// list, a non-forced load, and the process-wide cache.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub(super) file_path: Option<PathBuf>,
    pub(super) candidates: Option<Vec<PathBuf>>,
    pub(super) force: bool,
    pub(super) cache: Option<Arc<ConfigCache>>,
}

impl LoadOptions {
    /// Create options with every value unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load this file instead of looking one up.
    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Look up candidates in this list instead of the shared default list.
    ///
    /// The handle keeps its own copy; later edits to the default list do not
    /// reach it.
    pub fn with_candidates<I, P>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.candidates = Some(candidates.into_iter().map(Into::into).collect());
        self
    }

    /// Parse the file on construction even if it is already cached.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Load through `cache` instead of the process-wide cache.
    pub fn with_cache(mut self, cache: Arc<ConfigCache>) -> Self {
        self.cache = Some(cache);
        self
    }
}
