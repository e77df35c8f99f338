//! Immutable parsed configuration documents.
//!
//! Responsibilities:
//! - Wrap a parsed top-level mapping so it can be shared without copying.
//! - Provide read-only key lookup, optionally deserialized into a caller type.
//!
//! Does NOT handle:
//! - Parsing (see `parser.rs`) or caching (see `cache.rs`).
//! - Validating the shape of values against a schema.
//!
//! Invariants:
//! - A document's mapping is never mutated after construction; a reload
//!   produces a new document.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

/// A parsed configuration document.
///
/// Cloning is cheap: clones share the same mapping.
#[derive(Clone, Default, PartialEq)]
pub struct ConfigDocument {
    mapping: Arc<Mapping>,
}

impl ConfigDocument {
    /// Wraps a parsed mapping.
    pub fn new(mapping: Mapping) -> Self {
        Self {
            mapping: Arc::new(mapping),
        }
    }

    /// Returns a document with no keys.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the value stored under a top-level `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.mapping.get(key)
    }

    /// Deserializes the value stored under a top-level `key`.
    ///
    /// Returns `None` if the key is absent.
    ///
    /// # Errors
    /// The inner result is an error if the value does not fit `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<Result<T, serde_yaml::Error>> {
        self.get(key).cloned().map(serde_yaml::from_value)
    }

    /// Returns the top-level mapping.
    pub fn as_mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    /// Returns true when both documents share the same parsed mapping.
    ///
    /// Two cache hits for the same path return identical documents; a
    /// re-parse never does, even when the contents are equal.
    pub fn ptr_eq(&self, other: &ConfigDocument) -> bool {
        Arc::ptr_eq(&self.mapping, &other.mapping)
    }
}

impl fmt::Debug for ConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.mapping, f)
    }
}

impl From<Mapping> for ConfigDocument {
    fn from(mapping: Mapping) -> Self {
        Self::new(mapping)
    }
}

impl PartialEq<Mapping> for ConfigDocument {
    fn eq(&self, other: &Mapping) -> bool {
        *self.mapping == *other
    }
}
