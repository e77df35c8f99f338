//! Per-instance handles onto a local configuration file.
//!
//! Responsibilities:
//! - Bind a handle to one configuration file, chosen explicitly or by
//!   candidate lookup, and remember that choice.
//! - Load the bound file through the shared cache and expose it read-only.
//! - Provide a builder-pattern `LoadOptions` for handle construction.
//!
//! Does NOT handle:
//! - Parsing or caching (see `cache.rs`).
//! - Merging several files or applying environment overrides.
//!
//! Invariants / Assumptions:
//! - A constructed handle is always loaded, possibly with an empty document.
//! - The resolved path is memoized until `reset()`; `reload()` keeps it.

mod handle;
mod options;

pub use handle::{HandleState, LocalConfig};
pub use options::LoadOptions;

#[cfg(test)]
mod tests;
