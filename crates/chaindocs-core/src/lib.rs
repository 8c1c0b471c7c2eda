//! chaindocs-core — schema-aware lazy resolution of off-chain document
//! trees.
//!
//! # Overview
//!
//! ChainDocs lets applications treat a fragmented dataset — a handful of
//! fields recorded on a blockchain plus a much larger JSON document tree
//! hosted off-chain — as one navigable, lazily-resolved object graph.
//! The core crate defines:
//!
//! - [`DocumentResolver`] — the recursive, lazily-downloading node of the
//!   document tree
//! - [`AdapterRegistry`] — scheme-to-adapter dispatch with lazy, memoized
//!   instantiation
//! - [`StorageAdapter`] — the async trait every storage backend implements
//! - [`ChildrenSchema`] / [`FieldSchema`] — the declarative pointer-field
//!   schema
//! - [`ResolvePolicy`] / [`DocumentSnapshot`] — partial-materialization
//!   policy and the plain `{ reference, contents }` export
//! - [`DocumentError`] — structured error taxonomy
//!
//! # Quick start
//! ```rust,no_run
//! use chaindocs_core::{AdapterRegistry, ChildrenSchema, DocumentResolver, FieldSchema};
//!
//! # async fn run(registry: AdapterRegistry) -> Result<(), Box<dyn std::error::Error>> {
//! let mut schema = ChildrenSchema::new();
//! schema.insert("descriptionUri", FieldSchema::pointer());
//!
//! let hotel = DocumentResolver::create("ipfs://hotel-record", schema, registry)?;
//! let contents = hotel.contents().await?; // downloads on first access
//! # let _ = contents;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod error;
pub mod reference;
pub mod registry;
pub mod resolver;
pub mod schema;
pub mod snapshot;

pub use adapter::{Document, StorageAdapter};
pub use error::{AdapterError, DataError, DocumentError, SchemaError};
pub use reference::scheme_of;
pub use registry::{AdapterFactory, AdapterRegistry};
pub use resolver::{DocumentResolver, ResolvedDocument, ResolvedField};
pub use schema::{ChildrenSchema, FieldSchema};
pub use snapshot::{DocumentSnapshot, ResolvePolicy};
