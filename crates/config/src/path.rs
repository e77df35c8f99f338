//! Path helpers for configuration file locations.
//!
//! Responsibilities:
//! - Expand caller-supplied paths into the absolute form used as cache keys.
//! - Answer "is this a regular file right now?" for candidate resolution.
//! - Use `directories` crate for the platform home directory.
//!
//! Does NOT handle:
//! - Reading or parsing file contents (see `parser.rs`).
//! - Choosing between candidates (see `resolver.rs`).
//!
//! Invariants:
//! - Expansion is lexical: `.` and `..` are folded without touching the
//!   filesystem, so symlinks are never resolved.
//! - Equivalent relative and absolute spellings expand to the same path.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Expands `path` into an absolute, lexically normalized path.
///
/// A leading `~` component is replaced by the user's home directory when one
/// can be determined. Relative paths are joined onto the current working
/// directory.
///
/// # Errors
/// Returns an error if the path is relative and the current working
/// directory cannot be determined.
pub fn expand_path(path: impl AsRef<Path>) -> io::Result<PathBuf> {
    let path = path.as_ref();
    let expanded = expand_home(path);

    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()?.join(expanded)
    };

    Ok(normalize(&absolute))
}

/// Returns true when `path` exists and is a regular file.
///
/// Symlinks are followed. Any failure (missing file, permission error,
/// symlink loop, unexpandable path) is reported as `false`.
pub fn is_regular_file(path: impl AsRef<Path>) -> bool {
    expand_path(path)
        .and_then(std::fs::metadata)
        .map(|metadata| metadata.is_file())
        .unwrap_or(false)
}

fn expand_home(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            match directories::BaseDirs::new() {
                Some(base_dirs) => base_dirs.home_dir().join(components.as_path()),
                None => path.to_path_buf(),
            }
        }
        _ => path.to_path_buf(),
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                // `pop` refuses to remove the root, matching `/..` == `/`.
                normalized.pop();
            }
            Component::Normal(segment) => normalized.push(segment),
        }
    }
    normalized
}
