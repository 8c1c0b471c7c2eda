//! chaindocs-adapters — concrete storage adapters for ChainDocs.
//!
//! Each adapter serves one URI scheme and is registered with an
//! [`AdapterRegistry`](chaindocs_core::AdapterRegistry) under that scheme:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chaindocs_adapters::{HttpAdapter, InMemoryAdapter};
//! use chaindocs_core::{AdapterFactory, AdapterRegistry, StorageAdapter};
//!
//! let registry = AdapterRegistry::new();
//! let memory = InMemoryAdapter::new();
//! registry.configure([
//!     ("in-memory".to_string(), {
//!         let memory = memory.clone();
//!         Box::new(move || Arc::new(memory.clone()) as Arc<dyn StorageAdapter>) as AdapterFactory
//!     }),
//!     ("https".to_string(),
//!      Box::new(|| Arc::new(HttpAdapter::default()) as Arc<dyn StorageAdapter>) as AdapterFactory),
//! ]).unwrap();
//! ```

pub mod http;
pub mod memory;

pub use http::{HttpAdapter, HttpAdapterConfig};
pub use memory::InMemoryAdapter;
