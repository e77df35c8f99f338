//! Structured document parsing at the file boundary.
//!
//! Responsibilities:
//! - Define the `DocumentParser` seam the cache parses through.
//! - Provide the YAML implementation used by default.
//! - Report every failure as a typed `ParseError`.
//!
//! Does NOT handle:
//! - Deciding what a failure means for callers (the cache maps all of them
//!   to an empty document, see `cache.rs`).
//! - Path expansion or candidate lookup.
//!
//! Invariants:
//! - An empty or null document parses to an empty mapping, not an error.
//! - Any top-level value other than a mapping is a `NotAMapping` error.
//! - A stream of several documents yields its first document.

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

/// Errors that can occur when parsing a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Syntax {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Config file at {path} holds {found}, expected a mapping at the top level")]
    NotAMapping { path: PathBuf, found: &'static str },
}

impl ParseError {
    /// Returns the path of the file that failed to parse.
    pub fn path(&self) -> &Path {
        match self {
            ParseError::Read { path, .. }
            | ParseError::Syntax { path, .. }
            | ParseError::NotAMapping { path, .. } => path,
        }
    }

    /// Returns true when the file simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ParseError::Read { source, .. } if source.kind() == io::ErrorKind::NotFound
        )
    }
}

/// Turns a file on disk into a top-level mapping.
///
/// Implementations must be safe to share across threads: the cache may call
/// `parse` concurrently for different paths.
pub trait DocumentParser: Send + Sync {
    /// Parses the file at `path`.
    ///
    /// # Errors
    /// Returns a `ParseError` if the file cannot be read, is not valid for
    /// the format, or does not hold a mapping at the top level.
    fn parse(&self, path: &Path) -> Result<Mapping, ParseError>;
}

/// YAML parser backed by `serde_yaml`.
///
/// Merge keys (`<<: *anchor`) are applied before the mapping is returned.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl YamlParser {
    /// Parses YAML text that was read from `path`.
    ///
    /// `path` is only used to label errors.
    pub fn parse_str(&self, content: &str, path: &Path) -> Result<Mapping, ParseError> {
        let syntax_error = |source| ParseError::Syntax {
            path: path.to_path_buf(),
            source,
        };

        if content.trim().is_empty() {
            return Ok(Mapping::new());
        }

        // Only the first document of a multi-document stream is read.
        let mut value = match serde_yaml::Deserializer::from_str(content).next() {
            Some(document) => Value::deserialize(document).map_err(syntax_error)?,
            None => Value::Null,
        };
        value.apply_merge().map_err(syntax_error)?;

        match value {
            Value::Null => Ok(Mapping::new()),
            Value::Mapping(mapping) => Ok(mapping),
            other => Err(ParseError::NotAMapping {
                path: path.to_path_buf(),
                found: value_kind(&other),
            }),
        }
    }
}

impl DocumentParser for YamlParser {
    fn parse(&self, path: &Path) -> Result<Mapping, ParseError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParseError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        self.parse_str(&content, path)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
