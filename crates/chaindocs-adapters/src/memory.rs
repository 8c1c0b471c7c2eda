//! In-memory storage adapter.
//!
//! Suitable for testing, fixtures, and embedded deployments.
//! Thread-safe via `Arc<RwLock<Inner>>`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chaindocs_core::{AdapterError, Document, StorageAdapter};

/// Stores documents keyed by their full reference string.
///
/// Clones cheaply (`Arc` interior), so a test can keep a handle for
/// inserting fixtures while the registry hands the same store to
/// resolvers.
#[derive(Clone, Default)]
pub struct InMemoryAdapter {
    documents: Arc<RwLock<HashMap<String, Document>>>,
}

impl InMemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `document` under `reference`, replacing any previous value.
    pub fn insert(&self, reference: impl Into<String>, document: Document) {
        self.documents
            .write()
            .unwrap()
            .insert(reference.into(), document);
    }

    /// Remove the document stored under `reference`, if any.
    pub fn remove(&self, reference: &str) -> Option<Document> {
        self.documents.write().unwrap().remove(reference)
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StorageAdapter for InMemoryAdapter {
    async fn download(&self, uri: &str) -> Result<Document, AdapterError> {
        self.documents
            .read()
            .unwrap()
            .get(uri)
            .cloned()
            .ok_or_else(|| AdapterError::NotFound(uri.to_string()))
    }
}

impl std::fmt::Debug for InMemoryAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryAdapter")
            .field("documents", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn download_returns_stored_document() {
        let adapter = InMemoryAdapter::new();
        adapter.insert("in-memory://doc", doc(json!({"a": 1})));

        let fetched = adapter.download("in-memory://doc").await.unwrap();
        assert_eq!(fetched["a"], 1);
    }

    #[tokio::test]
    async fn download_missing_is_not_found() {
        let adapter = InMemoryAdapter::new();
        let err = adapter.download("in-memory://missing").await.unwrap_err();
        assert!(matches!(err, AdapterError::NotFound(uri) if uri == "in-memory://missing"));
    }

    #[tokio::test]
    async fn remove_forgets_the_document() {
        let adapter = InMemoryAdapter::new();
        adapter.insert("in-memory://doc", doc(json!({"a": 1})));
        assert_eq!(adapter.len(), 1);

        adapter.remove("in-memory://doc");
        assert!(adapter.is_empty());
        assert!(adapter.download("in-memory://doc").await.is_err());
    }

    #[tokio::test]
    async fn download_clones_do_not_alias_the_store() {
        let adapter = InMemoryAdapter::new();
        adapter.insert("in-memory://doc", doc(json!({"a": 1})));

        let mut fetched = adapter.download("in-memory://doc").await.unwrap();
        fetched.insert("a".into(), json!(2));

        let refetched = adapter.download("in-memory://doc").await.unwrap();
        assert_eq!(refetched["a"], 1);
    }
}
