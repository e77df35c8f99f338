//! Tests for `LocalConfig` handles.
//!
//! Responsibilities:
//! - Test construction, load, reload and reset against real files.
//! - Test candidate lookup and how handles share the default list.
//!
//! Invariants:
//! - Tests that touch the process-wide cache or default candidate list use
//!   `serial_test`; the rest load through a private cache.
//! - Fixtures live in `tempfile` directories and are cleaned up on drop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_yaml::Mapping;

use crate::cache::ConfigCache;


/// A config file fixture and the mapping it is expected to parse into.
pub struct Fixture {
    pub path: PathBuf,
    pub expected: Mapping,
}

/// Writes a `my_config` document whose values are derived from `seed`.
pub fn write_fixture(dir: &Path, name: &str, seed: u64) -> Fixture {
    let yaml = format!(
        "my_config:\n  hash:\n    ddd: {seed}\n    eee: E{seed}\n  value_f: 'f{seed}'\n"
    );
    let path = dir.join(name);
    std::fs::write(&path, &yaml).unwrap();

    Fixture {
        path,
        expected: serde_yaml::from_str(&yaml).unwrap(),
    }
}

pub fn private_cache() -> Arc<ConfigCache> {
    Arc::new(ConfigCache::new())
}
