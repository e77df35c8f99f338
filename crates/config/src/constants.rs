//! Centralized constants for the local configuration crate.

/// Default configuration file candidates, highest priority first.
///
/// Relative entries are resolved against the process working directory at
/// the time of lookup, not at the time the list was built.
pub const DEFAULT_CANDIDATE_PATHS: &[&str] = &["./dh_easy.yaml", "./dh_easy.yml"];
