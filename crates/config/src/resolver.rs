//! Candidate path resolution.
//!
//! Responsibilities:
//! - Pick the first candidate, in priority order, that is a regular file.
//!
//! Does NOT handle:
//! - Owning or mutating candidate lists (see `candidates.rs`).
//! - Loading the chosen file (see `cache.rs`).
//!
//! Invariants:
//! - The returned path is the caller-supplied spelling, not the expanded one.
//! - The answer reflects the filesystem only at the instant of the call.

use std::path::{Path, PathBuf};

use crate::path::is_regular_file;

/// Returns the first candidate that exists as a regular file.
///
/// Directories, dangling symlinks and paths that cannot be expanded are
/// skipped. Returns `None` when no candidate qualifies.
pub fn resolve<P: AsRef<Path>>(candidates: &[P]) -> Option<PathBuf> {
    let found = candidates
        .iter()
        .map(AsRef::as_ref)
        .find(|candidate| is_regular_file(candidate))
        .map(Path::to_path_buf);

    match &found {
        Some(path) => tracing::debug!(path = %path.display(), "Resolved configuration file"),
        None => tracing::debug!(
            candidates = candidates.len(),
            "No configuration file candidate exists"
        ),
    }

    found
}
