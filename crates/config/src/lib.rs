//! Local configuration file lookup and caching.
//!
//! This crate finds a configuration file among a prioritized list of
//! candidates, parses it once, and serves it read-only from a process-wide
//! cache keyed by absolute path.
//!
//! Missing, unreadable and malformed files are never errors for callers:
//! they load as an empty document. [`ConfigCache::last_failure`] reports why
//! a document came back empty.
//!
//! ```rust,ignore
//! use dh_easy_config::{LocalConfig, LoadOptions};
//!
//! // Looks up ./dh_easy.yaml, then ./dh_easy.yml.
//! let config = LocalConfig::new();
//! let value = config.get("my_config");
//!
//! // Or bind to a specific file.
//! let config = LocalConfig::with_options(LoadOptions::new().with_file_path("conf/app.yaml"));
//! ```

mod cache;
mod candidates;
pub mod constants;
mod document;
mod local;
mod parser;
pub mod path;
mod resolver;

pub use cache::{CacheStats, ConfigCache, clear_cache, load_file};
pub use candidates::{CandidateList, default_candidates};
pub use document::ConfigDocument;
pub use local::{HandleState, LoadOptions, LocalConfig};
pub use parser::{DocumentParser, ParseError, YamlParser};
pub use resolver::resolve;

pub use serde_yaml::{Mapping, Value};
