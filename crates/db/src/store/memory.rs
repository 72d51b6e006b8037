//! In-memory document store.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::query::{Direction, Query, compare_values, field_value};
use super::{DocPath, Document, DocumentStore, StoreError};

#[derive(Debug, Clone)]
struct Stored {
    data: Value,
    version: u64,
}

#[derive(Debug, Default)]
struct State {
    docs: BTreeMap<DocPath, Stored>,
    /// One-shot write failures keyed by a path fragment.
    write_faults: Vec<String>,
}

impl State {
    fn take_fault(&mut self, path: &DocPath) -> Result<(), StoreError> {
        if let Some(pos) = self
            .write_faults
            .iter()
            .position(|fragment| path.as_str().contains(fragment.as_str()))
        {
            let fragment = self.write_faults.remove(pos);
            return Err(StoreError::Backend(format!(
                "injected write failure on {path} (matched {fragment})"
            )));
        }
        Ok(())
    }

    fn write(&mut self, path: &DocPath, data: Value) -> u64 {
        let version = self.docs.get(path).map_or(1, |d| d.version + 1);
        self.docs.insert(path.clone(), Stored { data, version });
        version
    }
}

/// Document store kept in process memory.
///
/// Writes are serialized by one lock, so conditional writes are atomic.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    state: RwLock<State>,
}

impl InMemoryDocumentStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next write to a path containing `fragment` fail once.
    pub async fn fail_next_write(&self, fragment: impl Into<String>) {
        self.state.write().await.write_faults.push(fragment.into());
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.state.read().await.docs.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.docs.is_empty()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, path: &DocPath) -> Result<Option<Document>, StoreError> {
        let state = self.state.read().await;
        Ok(state.docs.get(path).map(|d| Document {
            path: path.clone(),
            data: d.data.clone(),
            version: d.version,
        }))
    }

    async fn set(&self, path: &DocPath, data: Value) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        state.take_fault(path)?;
        Ok(state.write(path, data))
    }

    async fn set_if_version(
        &self,
        path: &DocPath,
        data: Value,
        expected: Option<u64>,
    ) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        state.take_fault(path)?;
        let actual = state.docs.get(path).map(|d| d.version);
        if actual != expected {
            return Err(StoreError::VersionConflict {
                path: path.to_string(),
                expected,
                actual,
            });
        }
        Ok(state.write(path, data))
    }

    async fn update(&self, path: &DocPath, fields: Map<String, Value>) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        state.take_fault(path)?;
        let mut data = state
            .docs
            .get(path)
            .map(|d| d.data.clone())
            .ok_or_else(|| StoreError::NotFound(path.to_string()))?;

        let Value::Object(body) = &mut data else {
            return Err(StoreError::Serialization(format!(
                "{path} is not an object document"
            )));
        };
        for (key, value) in fields {
            if value.is_null() {
                body.remove(&key);
            } else {
                body.insert(key, value);
            }
        }
        Ok(state.write(path, data))
    }

    async fn delete(&self, path: &DocPath) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.take_fault(path)?;
        state.docs.remove(path);
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let state = self.state.read().await;
        let mut results: Vec<Document> = state
            .docs
            .iter()
            .filter(|(path, doc)| query.in_scope(path) && query.matches(&doc.data))
            .map(|(path, doc)| Document {
                path: path.clone(),
                data: doc.data.clone(),
                version: doc.version,
            })
            .collect();

        if let Some((field, direction)) = &query.order_by {
            results.sort_by(|a, b| {
                let ordering = match (field_value(&a.data, field), field_value(&b.data, field)) {
                    (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = query.limit {
            results.truncate(limit);
        }
        Ok(results)
    }
}
