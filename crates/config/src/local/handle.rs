//! `LocalConfig` handle implementation.
//!
//! Responsibilities:
//! - Track the handle lifecycle: unresolved, resolved, loaded.
//! - Pick the path to load: explicit path, then memoized path, then lookup.
//! - Delegate loading to the shared cache and keep the returned document.
//!
//! Does NOT handle:
//! - Deciding whether a file is re-parsed (the cache owns that decision).
//!
//! Invariants / Assumptions:
//! - A lookup that finds no file leaves the path unresolved, so the next
//!   load looks again.
//! - The loaded document is shared with the cache and never mutated.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use serde_yaml::{Mapping, Value};

use super::options::LoadOptions;
use crate::cache::ConfigCache;
use crate::candidates::CandidateList;
use crate::document::ConfigDocument;

static EMPTY_MAPPING: LazyLock<Mapping> = LazyLock::new(Mapping::new);

/// Lifecycle state of a [`LocalConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// No path chosen yet.
    Unresolved,
    /// A path is chosen but nothing has been loaded from it.
    ///
    /// Only exists inside [`LocalConfig::load`] and [`LocalConfig::reset`],
    /// which pick the path and load it in one call, so `state` never
    /// reports it once they return.
    ResolvedUnloaded,
    /// A document has been loaded (it may be empty).
    Loaded,
}

/// A handle onto one local configuration file.
///
/// The handle picks its file once, from an explicit path or the first
/// existing candidate, and serves lookups from the cached document.
///
/// ```rust,ignore
/// let config = LocalConfig::with_options(LoadOptions::new().with_file_path("./dh_easy.yaml"));
/// if let Some(value) = config.get("my_config") {
///     println!("{value:?}");
/// }
/// ```
#[derive(Debug)]
pub struct LocalConfig {
    cache: Arc<ConfigCache>,
    candidates: CandidateList,
    file_path: Option<PathBuf>,
    local: Option<ConfigDocument>,
}

impl LocalConfig {
    /// Creates a handle over the shared default candidates and loads it.
    pub fn new() -> Self {
        Self::with_options(LoadOptions::default())
    }

    /// Creates a handle from `options` and loads it.
    pub fn with_options(options: LoadOptions) -> Self {
        let LoadOptions {
            file_path,
            candidates,
            force,
            cache,
        } = options;

        let mut config = Self {
            cache: cache.unwrap_or_else(ConfigCache::global),
            candidates: candidates.map_or_else(CandidateList::defaults, CandidateList::new),
            file_path: None,
            local: None,
        };
        config.load(file_path.as_deref(), force);
        config
    }

    /// Loads the configuration file.
    ///
    /// The file is `path` if given, else the memoized path, else the first
    /// existing candidate. The chosen path is memoized. With `force`, the
    /// cache re-parses the file instead of returning a cached document.
    pub fn load(&mut self, path: Option<&Path>, force: bool) -> &ConfigDocument {
        self.file_path = path
            .map(Path::to_path_buf)
            .or_else(|| self.file_path.take())
            .or_else(|| self.lookup_file_path());

        let document = match &self.file_path {
            Some(file_path) => self.cache.load_file(file_path, force),
            None => ConfigDocument::empty(),
        };

        self.local.insert(document)
    }

    /// Re-parses the currently bound file.
    ///
    /// Candidate lookup only runs again if no file was bound.
    pub fn reload(&mut self) -> &ConfigDocument {
        self.load(None, true)
    }

    /// Forgets the bound file, looks up candidates again, and re-parses.
    ///
    /// Use after editing [`LocalConfig::candidates`] to switch files.
    pub fn reset(&mut self) -> &ConfigDocument {
        self.file_path = None;
        self.local = None;
        self.load(None, true)
    }

    /// Returns the value stored under a top-level `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.local.as_ref().and_then(|document| document.get(key))
    }

    /// Returns the loaded mapping, or an empty one if nothing is loaded.
    pub fn as_mapping(&self) -> &Mapping {
        self.local
            .as_ref()
            .map_or(&*EMPTY_MAPPING, ConfigDocument::as_mapping)
    }

    /// Returns the loaded document.
    pub fn document(&self) -> ConfigDocument {
        self.local.clone().unwrap_or_default()
    }

    /// Returns the bound file path in the spelling it was given.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Returns the candidate list this handle looks files up in.
    ///
    /// Unless the handle was built with its own candidates, this is the
    /// shared default list and edits through it are seen process-wide.
    pub fn candidates(&self) -> &CandidateList {
        &self.candidates
    }

    /// Returns the first existing candidate without binding to it.
    pub fn lookup_file_path(&self) -> Option<PathBuf> {
        self.candidates.resolve()
    }

    pub fn state(&self) -> HandleState {
        match (&self.file_path, &self.local) {
            (_, Some(_)) => HandleState::Loaded,
            (Some(_), None) => HandleState::ResolvedUnloaded,
            (None, None) => HandleState::Unresolved,
        }
    }
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self::new()
    }
}
