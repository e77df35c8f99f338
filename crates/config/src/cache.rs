//! Process-wide cache of parsed configuration files.
//!
//! Responsibilities:
//! - Map absolute file paths to immutable parsed documents.
//! - Decide between reusing a cached document and parsing the file again.
//! - Apply the lenient policy: every parse failure becomes an empty document.
//! - Keep the last failure per path and hit/miss counters for diagnostics.
//!
//! Does NOT handle:
//! - Choosing which file to load (see `resolver.rs` and `local/handle.rs`).
//! - Watching files for changes; staleness is resolved by `force` or `clear`.
//!
//! Invariants:
//! - Keys are always expanded paths, so `./a.yaml` and `/cwd/a.yaml` share
//!   one entry.
//! - Entries are replaced wholesale, never mutated in place.
//! - The entry lock is never held while a parser runs.
//! - An unforced load never overwrites an entry stored while it parsed.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::document::ConfigDocument;
use crate::parser::{DocumentParser, ParseError, YamlParser};
use crate::path::expand_path;

static GLOBAL_CACHE: OnceLock<Arc<ConfigCache>> = OnceLock::new();

/// A cached document plus the failure that produced it, if any.
#[derive(Clone)]
struct CacheEntry {
    document: ConfigDocument,
    failure: Option<Arc<ParseError>>,
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Loads answered from an existing entry.
    pub hits: u64,
    /// Loads that invoked the parser (including forced reloads).
    pub misses: u64,
    /// Parser invocations that failed and were stored as empty documents.
    pub parse_failures: u64,
}

/// Cache of parsed configuration documents keyed by absolute path.
pub struct ConfigCache {
    entries: RwLock<HashMap<PathBuf, CacheEntry>>,
    parser: Box<dyn DocumentParser>,
    hits: AtomicU64,
    misses: AtomicU64,
    parse_failures: AtomicU64,
}

impl ConfigCache {
    /// Creates an empty cache that parses YAML.
    pub fn new() -> Self {
        Self::with_parser(YamlParser)
    }

    /// Creates an empty cache that parses through `parser`.
    pub fn with_parser(parser: impl DocumentParser + 'static) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            parser: Box::new(parser),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            parse_failures: AtomicU64::new(0),
        }
    }

    /// Returns the process-wide cache, creating a YAML cache on first use.
    pub fn global() -> Arc<ConfigCache> {
        Arc::clone(GLOBAL_CACHE.get_or_init(|| Arc::new(ConfigCache::new())))
    }

    /// Installs `cache` as the process-wide cache.
    ///
    /// Must run before anything calls [`ConfigCache::global`].
    ///
    /// # Errors
    /// Returns `cache` back if a global cache already exists.
    pub fn install_global(cache: ConfigCache) -> Result<Arc<ConfigCache>, ConfigCache> {
        let mut pending = Some(cache);
        let installed = GLOBAL_CACHE.get_or_init(|| {
            let cache = pending.take().unwrap_or_default();
            Arc::new(cache)
        });

        match pending {
            None => Ok(Arc::clone(installed)),
            Some(rejected) => Err(rejected),
        }
    }

    /// Loads a configuration file, reusing the cached document when allowed.
    ///
    /// - An empty `path` yields an empty document and leaves the cache alone.
    /// - Without `force`, a cached document is returned as is, unparsed.
    /// - Otherwise the file is parsed. A forced result replaces any entry;
    ///   an unforced one is only stored if no other load stored one first.
    ///
    /// Missing, unreadable and malformed files all produce an empty document;
    /// the reason is available from [`ConfigCache::last_failure`].
    pub fn load_file(&self, path: impl AsRef<Path>, force: bool) -> ConfigDocument {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return ConfigDocument::empty();
        }

        let key = match expand_path(path) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to expand config path, using empty config"
                );
                return ConfigDocument::empty();
            }
        };

        if !force {
            if let Some(entry) = self.read().get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(path = %key.display(), "Config cache hit");
                return entry.document.clone();
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(path = %key.display(), force, "Parsing config file");

        let entry = self.parse_entry(&key);
        let mut entries = self.write();
        if force {
            let document = entry.document.clone();
            entries.insert(key, entry);
            return document;
        }

        // A load that finished while this one parsed wins, forced or not.
        entries.entry(key).or_insert(entry).document.clone()
    }

    /// Drops every cached entry; the next load of any path parses again.
    pub fn clear(&self) {
        let mut entries = self.write();
        let dropped = entries.len();
        entries.clear();
        tracing::debug!(entries = dropped, "Config cache cleared");
    }

    /// Returns the failure behind the cached entry for `path`, if any.
    ///
    /// `None` means the path is not cached or its last parse succeeded.
    pub fn last_failure(&self, path: impl AsRef<Path>) -> Option<Arc<ParseError>> {
        let key = expand_path(path).ok()?;
        self.read()
            .get(&key)
            .and_then(|entry| entry.failure.clone())
    }

    /// Returns true when `path` has a cached entry.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        expand_path(path)
            .map(|key| self.read().contains_key(&key))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            parse_failures: self.parse_failures.load(Ordering::Relaxed),
        }
    }

    fn parse_entry(&self, key: &Path) -> CacheEntry {
        match self.parser.parse(key) {
            Ok(mapping) => CacheEntry {
                document: ConfigDocument::new(mapping),
                failure: None,
            },
            Err(e) => {
                self.parse_failures.fetch_add(1, Ordering::Relaxed);
                if e.is_not_found() {
                    tracing::debug!(path = %key.display(), "Config file not found, using empty config");
                } else {
                    tracing::warn!(
                        path = %key.display(),
                        error = %e,
                        "Config file could not be parsed, using empty config"
                    );
                }
                CacheEntry {
                    document: ConfigDocument::empty(),
                    failure: Some(Arc::new(e)),
                }
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<PathBuf, CacheEntry>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<PathBuf, CacheEntry>> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ConfigCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConfigCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigCache")
            .field("entries", &self.len())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Loads a configuration file through the process-wide cache.
///
/// See [`ConfigCache::load_file`].
pub fn load_file(path: impl AsRef<Path>, force: bool) -> ConfigDocument {
    ConfigCache::global().load_file(path, force)
}

/// Clears the process-wide cache.
pub fn clear_cache() {
    ConfigCache::global().clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::{Mapping, Value};
    use std::io::Write;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Mutex, mpsc};

    /// Parser that counts invocations and delegates to YAML.
    #[derive(Clone, Default)]
    struct CountingParser {
        calls: Arc<AtomicUsize>,
    }

    impl CountingParser {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DocumentParser for CountingParser {
        fn parse(&self, path: &Path) -> Result<Mapping, ParseError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            YamlParser.parse(path)
        }
    }

    /// Parser whose first call reports `v: 1` only after being released.
    /// Every later call reports `v: 2` at once.
    struct GatedParser {
        calls: AtomicUsize,
        entered: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl DocumentParser for GatedParser {
        fn parse(&self, _path: &Path) -> Result<Mapping, ParseError> {
            let version = if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.entered.lock().unwrap().send(()).unwrap();
                self.release.lock().unwrap().recv().unwrap();
                1
            } else {
                2
            };

            let mut mapping = Mapping::new();
            mapping.insert(Value::from("v"), Value::from(version));
            Ok(mapping)
        }
    }

    fn counting_cache() -> (ConfigCache, CountingParser) {
        let parser = CountingParser::default();
        (ConfigCache::with_parser(parser.clone()), parser)
    }

    fn write_config(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn append(path: &Path, content: &str) {
        let mut file = std::fs::OpenOptions::new().append(true).open(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
    }

    #[test]
    fn test_second_load_is_a_cache_hit() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_config(temp_dir.path(), "config.yaml", "a: 1\n");
        let (cache, parser) = counting_cache();

        let first = cache.load_file(&path, false);
        let second = cache.load_file(&path, false);

        assert_eq!(parser.calls(), 1);
        assert!(first.ptr_eq(&second));
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                parse_failures: 0
            }
        );
    }

    #[test]
    fn test_force_reparses_and_replaces_entry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_config(temp_dir.path(), "config.yaml", "a: 1\n");
        let (cache, parser) = counting_cache();

        let original = cache.load_file(&path, false);
        append(&path, "b: 2\n");

        let stale = cache.load_file(&path, false);
        assert!(stale.ptr_eq(&original));
        assert_eq!(stale.get("b"), None);

        let fresh = cache.load_file(&path, true);
        assert_eq!(parser.calls(), 2);
        assert_eq!(fresh.get("b"), Some(&Value::from(2)));

        let after = cache.load_file(&path, false);
        assert!(after.ptr_eq(&fresh));
    }

    #[test]
    fn test_clear_forces_reparse() {
        let temp_dir = tempfile::tempdir().unwrap();
        let a = write_config(temp_dir.path(), "a.yaml", "a: 1\n");
        let b = write_config(temp_dir.path(), "b.yaml", "b: 1\n");
        let (cache, parser) = counting_cache();

        cache.load_file(&a, false);
        cache.load_file(&b, false);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());

        cache.load_file(&a, false);
        cache.load_file(&b, false);
        assert_eq!(parser.calls(), 4);
    }

    #[test]
    fn test_empty_path_does_not_touch_cache() {
        let (cache, parser) = counting_cache();

        let doc = cache.load_file("", false);

        assert!(doc.is_empty());
        assert!(cache.is_empty());
        assert_eq!(parser.calls(), 0);
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_equivalent_spellings_share_an_entry() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_config(temp_dir.path(), "config.yaml", "a: 1\n");
        let noisy = temp_dir.path().join(".").join("x").join("..").join("config.yaml");
        let (cache, parser) = counting_cache();

        let first = cache.load_file(&path, false);
        let second = cache.load_file(&noisy, false);

        assert!(first.ptr_eq(&second));
        assert_eq!(parser.calls(), 1);
        assert!(cache.contains(&noisy));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_relative_and_absolute_spellings_share_an_entry() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile_in(".")
            .unwrap();
        file.write_all(b"a: 1\n").unwrap();
        file.flush().unwrap();

        let relative = file.path().to_path_buf();
        assert!(relative.is_relative());
        let absolute = std::env::current_dir()
            .unwrap()
            .join(relative.file_name().unwrap());
        let (cache, parser) = counting_cache();

        let first = cache.load_file(&relative, false);
        let second = cache.load_file(&absolute, false);

        assert_eq!(first.get("a"), Some(&Value::from(1)));
        assert!(first.ptr_eq(&second));
        assert_eq!(parser.calls(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_slow_plain_load_does_not_overwrite_forced_reload() {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let cache = ConfigCache::with_parser(GatedParser {
            calls: AtomicUsize::new(0),
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        });
        let path = PathBuf::from("/gated/config.yaml");

        std::thread::scope(|scope| {
            let slow = scope.spawn(|| cache.load_file(&path, false));
            entered_rx.recv().unwrap();

            let forced = cache.load_file(&path, true);
            assert_eq!(forced.get("v"), Some(&Value::from(2)));

            release_tx.send(()).unwrap();
            let slow_result = slow.join().unwrap();
            assert!(slow_result.ptr_eq(&forced));
        });

        let after = cache.load_file(&path, false);
        assert_eq!(after.get("v"), Some(&Value::from(2)));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_malformed_file_is_cached_as_empty_with_failure() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_config(temp_dir.path(), "bad.yaml", "key: [unclosed\n");
        let (cache, parser) = counting_cache();

        let doc = cache.load_file(&path, false);
        assert!(doc.is_empty());
        assert!(matches!(
            cache.last_failure(&path).as_deref(),
            Some(ParseError::Syntax { .. })
        ));

        // The empty result is cached like any other.
        assert!(cache.load_file(&path, false).is_empty());
        assert_eq!(parser.calls(), 1);
        assert_eq!(cache.stats().parse_failures, 1);
    }

    #[test]
    fn test_missing_file_is_empty_and_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing.yaml");
        let cache = ConfigCache::new();

        assert!(cache.load_file(&missing, false).is_empty());

        let failure = cache.last_failure(&missing).unwrap();
        assert!(failure.is_not_found());
    }

    #[test]
    fn test_fixed_file_clears_failure_on_forced_reload() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_config(temp_dir.path(), "config.yaml", "- not\n- a mapping\n");
        let cache = ConfigCache::new();

        assert!(cache.load_file(&path, false).is_empty());
        assert!(cache.last_failure(&path).is_some());

        std::fs::write(&path, "fixed: true\n").unwrap();
        let doc = cache.load_file(&path, true);

        assert_eq!(doc.get("fixed"), Some(&Value::from(true)));
        assert!(cache.last_failure(&path).is_none());
    }

    #[test]
    fn test_concurrent_loads_agree() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = write_config(temp_dir.path(), "config.yaml", "shared: value\n");
        let cache = Arc::new(ConfigCache::new());

        let documents: Vec<ConfigDocument> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let cache = Arc::clone(&cache);
                    let path = path.clone();
                    scope.spawn(move || cache.load_file(&path, false))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for document in &documents {
            assert_eq!(document, &documents[0]);
            assert_eq!(document.get("shared"), Some(&Value::from("value")));
        }
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_install_global_after_first_use_is_rejected() {
        let existing = ConfigCache::global();

        let rejected = ConfigCache::install_global(ConfigCache::new());

        assert!(rejected.is_err());
        assert!(Arc::ptr_eq(&existing, &ConfigCache::global()));
    }
}
