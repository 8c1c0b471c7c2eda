//! The `StorageAdapter` trait — the core abstraction for all off-chain
//! storage backends.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::AdapterError;

/// A JSON-shaped document: the top-level key/value map fetched from
/// off-chain storage.
pub type Document = Map<String, Value>;

/// The central async trait every storage backend implements.
///
/// One adapter serves one URI scheme (`in-memory://`, `https://`, …); the
/// resolver looks adapters up by scheme through the
/// [`AdapterRegistry`](crate::registry::AdapterRegistry).
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
///
/// # Object Safety
/// The trait is object-safe and is stored as `Arc<dyn StorageAdapter>`.
#[async_trait]
pub trait StorageAdapter: Send + Sync + 'static {
    /// Fetch the document stored at `uri`.
    ///
    /// The fault path covers not-found, network and malformed-payload
    /// cases; each adapter owns the mapping from its wire protocol.
    async fn download(&self, uri: &str) -> Result<Document, AdapterError>;
}
