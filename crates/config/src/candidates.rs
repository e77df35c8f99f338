//! Prioritized configuration file candidate lists.
//!
//! Responsibilities:
//! - Hold an ordered list of candidate paths behind a lock.
//! - Own the process-wide default list and its explicit restore operation.
//! - Resolve a list against the filesystem without holding the lock.
//!
//! Does NOT handle:
//! - The existence check itself (see `resolver.rs`).
//! - Remembering which candidate a handle picked (see `local/handle.rs`).
//!
//! Invariants:
//! - Clones of a `CandidateList` alias the same list; a mutation through any
//!   clone is visible through every other clone.
//! - `detached()` is the only way to obtain an independent copy.
//! - The default list is initialized on first access from
//!   `DEFAULT_CANDIDATE_PATHS` and is never replaced, only edited.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::constants::DEFAULT_CANDIDATE_PATHS;
use crate::resolver::resolve;

static DEFAULT_CANDIDATES: OnceLock<CandidateList> = OnceLock::new();

/// A shared, ordered list of configuration file candidates.
///
/// Priority follows list order: the first existing file wins.
#[derive(Clone)]
pub struct CandidateList {
    paths: Arc<RwLock<Vec<PathBuf>>>,
}

impl CandidateList {
    /// Creates a new, independent candidate list.
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: Arc::new(RwLock::new(paths.into_iter().map(Into::into).collect())),
        }
    }

    /// Returns the process-wide default candidate list.
    ///
    /// Every call returns a handle to the same list, so edits made here are
    /// seen by every `LocalConfig` built without its own candidate override.
    pub fn defaults() -> Self {
        DEFAULT_CANDIDATES
            .get_or_init(|| Self::new(DEFAULT_CANDIDATE_PATHS.iter().copied()))
            .clone()
    }

    /// Puts the default list back to `DEFAULT_CANDIDATE_PATHS`.
    ///
    /// Existing handles keep pointing at the same list and observe the reset.
    pub fn restore_defaults() {
        let defaults = Self::defaults();
        let mut paths = defaults.write();
        paths.clear();
        paths.extend(DEFAULT_CANDIDATE_PATHS.iter().map(PathBuf::from));
    }

    /// Returns an independent copy of the current contents.
    pub fn detached(&self) -> Self {
        Self::new(self.snapshot())
    }

    /// Returns true when both handles point at the same underlying list.
    pub fn is_shared_with(&self, other: &CandidateList) -> bool {
        Arc::ptr_eq(&self.paths, &other.paths)
    }

    /// Copies the current contents out of the list.
    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.read().clone()
    }

    /// Appends a candidate with the lowest priority.
    pub fn push(&self, path: impl Into<PathBuf>) {
        self.write().push(path.into());
    }

    /// Inserts a candidate at `index`, clamped to the end of the list.
    pub fn insert(&self, index: usize, path: impl Into<PathBuf>) {
        let mut paths = self.write();
        let index = index.min(paths.len());
        paths.insert(index, path.into());
    }

    /// Removes every entry equal to `path`.
    ///
    /// Returns true if at least one entry was removed.
    pub fn remove(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let mut paths = self.write();
        let before = paths.len();
        paths.retain(|candidate| candidate != path);
        paths.len() != before
    }

    /// Removes and returns the highest priority candidate.
    pub fn pop_front(&self) -> Option<PathBuf> {
        let mut paths = self.write();
        if paths.is_empty() {
            None
        } else {
            Some(paths.remove(0))
        }
    }

    /// Returns true if the list holds an entry equal to `path`.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        self.read().iter().any(|candidate| candidate == path)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Returns the first candidate that currently exists as a regular file.
    ///
    /// The list is copied first so filesystem checks run without the lock.
    pub fn resolve(&self) -> Option<PathBuf> {
        resolve(&self.snapshot())
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<PathBuf>> {
        self.paths
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<PathBuf>> {
        self.paths
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for CandidateList {
    fn default() -> Self {
        Self::defaults()
    }
}

impl fmt::Debug for CandidateList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.read().iter()).finish()
    }
}

impl PartialEq for CandidateList {
    fn eq(&self, other: &Self) -> bool {
        self.is_shared_with(other) || self.snapshot() == other.snapshot()
    }
}

impl<P: Into<PathBuf>> FromIterator<P> for CandidateList {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Returns the process-wide default candidate list.
///
/// Shorthand for [`CandidateList::defaults`].
pub fn default_candidates() -> CandidateList {
    CandidateList::defaults()
}
