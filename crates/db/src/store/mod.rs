//! Document store abstraction.
//!
//! The society books live in a hierarchical document store: every document
//! sits at a path of alternating collection and id segments
//! (`organizations/{org}/flats/{flat}`), holds a JSON body, and carries a
//! version that increases on every write. Conditional writes on that version
//! give optimistic concurrency for read-then-write sequences.

mod memory;
mod query;

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

pub use memory::InMemoryDocumentStore;
pub use query::{Direction, Filter, FilterOp, Query, QueryScope};

/// Errors raised by a document store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Document does not exist.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Conditional write lost against a concurrent writer.
    #[error("Version conflict on {path}: expected {expected:?}, found {actual:?}")]
    VersionConflict {
        /// Document path.
        path: String,
        /// Version the writer expected (`None` = must not exist).
        expected: Option<u64>,
        /// Version actually stored (`None` = missing).
        actual: Option<u64>,
    },

    /// Body could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Backend I/O failure.
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns true if retrying the whole operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Escapes a value for use as one path segment.
#[must_use]
pub fn escape_segment(raw: &str) -> String {
    raw.replace('%', "%25").replace('/', "%2F")
}

/// Path of a collection: odd number of segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Top-level collection.
    #[must_use]
    pub fn root(name: &str) -> Self {
        Self(escape_segment(name))
    }

    /// Document with the given id in this collection.
    #[must_use]
    pub fn doc(&self, id: &str) -> DocPath {
        DocPath(format!("{}/{}", self.0, escape_segment(id)))
    }

    /// Collection name (last segment).
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Full path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Path of a document: even number of segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath(String);

impl DocPath {
    /// Sub-collection under this document.
    #[must_use]
    pub fn collection(&self, name: &str) -> CollectionPath {
        CollectionPath(format!("{}/{}", self.0, escape_segment(name)))
    }

    /// Collection holding this document.
    #[must_use]
    pub fn parent(&self) -> CollectionPath {
        let parent = self.0.rsplit_once('/').map_or("", |(p, _)| p);
        CollectionPath(parent.to_string())
    }

    /// Document id (last segment, still escaped).
    #[must_use]
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Full path.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Where it lives.
    pub path: DocPath,
    /// JSON body.
    pub data: Value,
    /// Write version, starting at 1.
    pub version: u64,
}

impl Document {
    /// Decodes the body.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if the body does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(self.data.clone()).map_err(StoreError::from)
    }
}

/// Encodes a value as a document body.
///
/// # Errors
///
/// Returns `Serialization` if `T` cannot be encoded.
pub fn encode<T: Serialize>(value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(StoreError::from)
}

/// Hierarchical document store.
///
/// Every write returns the new version of the document.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads a document.
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError>;

    /// Creates or replaces a document.
    async fn set(&self, path: &DocPath, data: Value) -> Result<u64, StoreError>;

    /// Creates or replaces a document only if its version still matches.
    ///
    /// `expected = None` requires the document not to exist.
    async fn set_if_version(
        &self,
        path: &DocPath,
        data: Value,
        expected: Option<u64>,
    ) -> Result<u64, StoreError>;

    /// Merges top-level fields into an existing document. A `null` value
    /// removes the field.
    async fn update(&self, path: &DocPath, fields: Map<String, Value>) -> Result<u64, StoreError>;

    /// Deletes a document. Deleting a missing document is not an error.
    async fn delete(&self, path: &DocPath) -> Result<(), StoreError>;

    /// Runs a query.
    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError>;
}
