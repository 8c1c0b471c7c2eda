//! The recursive, lazily-downloading document resolver.
//!
//! A [`DocumentResolver`] holds one URI reference plus the schema of its
//! pointer fields. The document is downloaded at most once per resolver:
//! the first contents access resolves the adapter for the reference's
//! scheme, downloads, and materializes child resolvers for every pointer
//! field; concurrent accesses issued while that download is in flight all
//! await the same shared future. A failed download leaves the resolver
//! unmaterialized, so the next access is the retry.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use futures::future::{self, BoxFuture, FutureExt, Shared};
use serde_json::{Map, Value};

use crate::adapter::{Document, StorageAdapter};
use crate::error::{DataError, DocumentError, SchemaError};
use crate::reference::scheme_of;
use crate::registry::AdapterRegistry;
use crate::schema::{self, ChildrenSchema};
use crate::snapshot::{DocumentSnapshot, ResolvePolicy};

/// One top-level field of a materialized document.
#[derive(Debug, Clone)]
pub enum ResolvedField {
    /// A plain value, copied verbatim from the download.
    Scalar(Value),
    /// A schema-declared pointer, replaced by its child resolver.
    Pointer(Arc<DocumentResolver>),
    /// A schema-declared keyed collection of pointers, one child resolver
    /// per key.
    Nested(BTreeMap<String, Arc<DocumentResolver>>),
}

/// A successfully downloaded document with pointer fields replaced by
/// child resolvers.
#[derive(Debug)]
pub struct ResolvedDocument {
    fields: BTreeMap<String, ResolvedField>,
}

impl ResolvedDocument {
    /// Look up one top-level field.
    pub fn get(&self, field: &str) -> Option<&ResolvedField> {
        self.fields.get(field)
    }

    /// Iterate over all top-level fields.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ResolvedField)> {
        self.fields.iter()
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the document has no top-level fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

type DownloadResult = Result<Arc<ResolvedDocument>, DocumentError>;
type DownloadFuture = Shared<BoxFuture<'static, DownloadResult>>;

/// Download lifecycle: not requested → in flight → materialized.
enum State {
    Idle,
    InFlight(DownloadFuture),
    Ready(Arc<ResolvedDocument>),
}

/// Lazy, schema-aware resolver for one node of an off-chain document
/// tree.
pub struct DocumentResolver {
    reference: String,
    schema: ChildrenSchema,
    registry: AdapterRegistry,
    /// Adapter bound on first access, reused thereafter.
    adapter: Mutex<Option<Arc<dyn StorageAdapter>>>,
    state: Arc<Mutex<State>>,
}

impl DocumentResolver {
    /// Create a resolver for `reference` with the given pointer-field
    /// schema. Performs no I/O.
    ///
    /// Fails if the reference is empty or the schema contains two field
    /// names differing only by case (checked recursively).
    pub fn create(
        reference: impl Into<String>,
        schema: ChildrenSchema,
        registry: AdapterRegistry,
    ) -> Result<Self, SchemaError> {
        let reference = reference.into();
        if reference.is_empty() {
            return Err(SchemaError::EmptyReference);
        }
        schema::validate(&schema)?;
        Ok(Self {
            reference,
            schema,
            registry,
            adapter: Mutex::new(None),
            state: Arc::new(Mutex::new(State::Idle)),
        })
    }

    /// The URI this resolver reads from.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Returns `true` once a download has completed and its result is
    /// cached.
    pub fn is_materialized(&self) -> bool {
        matches!(&*self.state.lock().unwrap(), State::Ready(_))
    }

    /// The materialized document, downloading it first if necessary.
    ///
    /// Exactly one download runs no matter how many concurrent callers
    /// arrive before it settles; all of them observe the same success or
    /// failure. After a failure the resolver returns to the
    /// unmaterialized state and the next access retries.
    pub async fn contents(&self) -> Result<Arc<ResolvedDocument>, DocumentError> {
        let download = {
            let mut state = self.state.lock().unwrap();
            match &*state {
                State::Ready(doc) => return Ok(doc.clone()),
                State::InFlight(download) => download.clone(),
                State::Idle => {
                    let download = self.start_download()?;
                    *state = State::InFlight(download.clone());
                    download
                }
            }
        };
        download.await
    }

    /// Wait for any in-flight download to settle, then discard the
    /// materialized state. The next access re-downloads.
    pub async fn reset(&self) {
        // Check-and-clear happens under one lock acquisition: clearing is
        // only valid when no download is in flight at write time, so a
        // download that started while we awaited sends us back around.
        loop {
            let in_flight = {
                let mut state = self.state.lock().unwrap();
                match &*state {
                    State::InFlight(download) => download.clone(),
                    _ => {
                        *state = State::Idle;
                        return;
                    }
                }
            };
            let _ = in_flight.await;
        }
    }

    /// Produce a plain `{ reference, contents }` snapshot of this node,
    /// resolving pointer fields per `policy`.
    ///
    /// Downloads the document if it is not already materialized. Pointer
    /// fields the policy does not select stay bare URI strings; fields
    /// absent from the raw download never appear.
    pub fn snapshot<'a>(
        &'a self,
        policy: &'a ResolvePolicy,
    ) -> BoxFuture<'a, Result<DocumentSnapshot, DocumentError>> {
        async move {
            let document = self.contents().await?;
            let mut contents = Map::new();
            for (field, resolved) in document.iter() {
                let rendered = match resolved {
                    ResolvedField::Scalar(value) => value.clone(),
                    ResolvedField::Pointer(child) => {
                        if policy.allows(field) {
                            let child_policy = policy.descend(field);
                            child.snapshot(&child_policy).await?.into_value()
                        } else {
                            Value::String(child.reference().to_string())
                        }
                    }
                    ResolvedField::Nested(children) => {
                        if policy.allows(field) {
                            let child_policy = policy.descend(field);
                            let entries = future::try_join_all(children.iter().map(
                                |(key, child)| {
                                    let child_policy = &child_policy;
                                    async move {
                                        child
                                            .snapshot(child_policy)
                                            .await
                                            .map(|snapshot| (key.clone(), snapshot.into_value()))
                                    }
                                },
                            ))
                            .await?;
                            Value::Object(entries.into_iter().collect())
                        } else {
                            Value::Object(
                                children
                                    .iter()
                                    .map(|(key, child)| {
                                        (key.clone(), Value::String(child.reference().to_string()))
                                    })
                                    .collect(),
                            )
                        }
                    }
                };
                contents.insert(field.clone(), rendered);
            }
            Ok(DocumentSnapshot {
                reference: self.reference.clone(),
                contents,
            })
        }
        .boxed()
    }

    /// Bind (and memoize) the adapter for this resolver's scheme.
    fn bound_adapter(&self) -> Result<Arc<dyn StorageAdapter>, DocumentError> {
        let mut slot = self.adapter.lock().unwrap();
        if let Some(adapter) = &*slot {
            return Ok(adapter.clone());
        }
        let scheme = scheme_of(&self.reference).ok_or_else(|| DocumentError::MissingScheme {
            reference: self.reference.clone(),
        })?;
        let adapter = self.registry.resolve_adapter(&scheme)?;
        *slot = Some(adapter.clone());
        Ok(adapter)
    }

    /// Build the shared download future. The future owns everything it
    /// needs and records its own outcome in the resolver's state before
    /// settling, so every awaiter wakes to a consistent view.
    fn start_download(&self) -> Result<DownloadFuture, DocumentError> {
        let adapter = self.bound_adapter()?;
        let reference = self.reference.clone();
        let schema = self.schema.clone();
        let registry = self.registry.clone();
        let state = Arc::clone(&self.state);

        Ok(async move {
            tracing::debug!(reference = %reference, "downloading document");
            let result = match adapter.download(&reference).await {
                Ok(raw) => materialize(&reference, raw, &schema, &registry).map(Arc::new),
                Err(source) => Err(DocumentError::Read {
                    reference: reference.clone(),
                    source,
                }),
            };

            let mut guard = state.lock().unwrap();
            match &result {
                Ok(document) => {
                    tracing::debug!(
                        reference = %reference,
                        fields = document.len(),
                        "document materialized"
                    );
                    *guard = State::Ready(document.clone());
                }
                Err(error) => {
                    tracing::warn!(reference = %reference, error = %error, "download failed");
                    *guard = State::Idle;
                }
            }
            result
        }
        .boxed()
        .shared())
    }
}

impl std::fmt::Debug for DocumentResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentResolver")
            .field("reference", &self.reference)
            .field("materialized", &self.is_materialized())
            .finish()
    }
}

/// JSON falsiness: absent-equivalent values an optional pointer field may
/// hold without producing a child resolver.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Turn a raw download into a [`ResolvedDocument`]: copy the top-level
/// map, then replace each schema-declared pointer field with child
/// resolver(s) in schema order.
fn materialize(
    reference: &str,
    raw: Document,
    schema: &ChildrenSchema,
    registry: &AdapterRegistry,
) -> Result<ResolvedDocument, DocumentError> {
    let mut fields: BTreeMap<String, ResolvedField> = raw
        .into_iter()
        .map(|(field, value)| (field, ResolvedField::Scalar(value)))
        .collect();

    for (field, entry) in schema.iter() {
        let value = match fields.get(field) {
            Some(ResolvedField::Scalar(value)) if !is_falsy(value) => value.clone(),
            _ => {
                if entry.required {
                    return Err(DataError::MissingField {
                        field: field.clone(),
                        reference: reference.to_string(),
                    }
                    .into());
                }
                // Optional and absent/falsy: no child resolver; any raw
                // value stays in place as a scalar.
                continue;
            }
        };

        let resolved = if entry.nested {
            let map = value.as_object().ok_or_else(|| DataError::InvalidNestedMap {
                field: field.clone(),
                reference: reference.to_string(),
            })?;
            let mut children = BTreeMap::new();
            for (key, pointer) in map {
                let uri = pointer
                    .as_str()
                    .ok_or_else(|| DataError::InvalidNestedPointer {
                        field: field.clone(),
                        key: key.clone(),
                        reference: reference.to_string(),
                    })?;
                let child =
                    DocumentResolver::create(uri, entry.children.clone(), registry.clone())?;
                children.insert(key.clone(), Arc::new(child));
            }
            ResolvedField::Nested(children)
        } else {
            let uri = value.as_str().ok_or_else(|| DataError::InvalidPointer {
                field: field.clone(),
                reference: reference.to_string(),
            })?;
            let child = DocumentResolver::create(uri, entry.children.clone(), registry.clone())?;
            ResolvedField::Pointer(Arc::new(child))
        };
        fields.insert(field.clone(), resolved);
    }

    Ok(ResolvedDocument { fields })
}
