//! Scheme-to-adapter registry.
//!
//! Maps a URI scheme (the part before `://`) to a factory for a
//! [`StorageAdapter`]. Factories run lazily: an adapter is instantiated on
//! the first lookup of its scheme and memoized for every lookup after.
//!
//! The registry is an explicit context object, not process-global state:
//! clone it cheaply (`Arc` interior) and inject it into each resolver, so
//! independent configurations can coexist (tests, multi-tenant use).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::adapter::StorageAdapter;
use crate::error::{DocumentError, SchemaError};

/// Factory for one scheme's adapter, invoked at most once per
/// configuration epoch.
pub type AdapterFactory = Box<dyn Fn() -> Arc<dyn StorageAdapter> + Send + Sync>;

struct Inner {
    factories: HashMap<String, AdapterFactory>,
    instances: HashMap<String, Arc<dyn StorageAdapter>>,
}

impl Inner {
    fn new() -> Self {
        Self {
            factories: HashMap::new(),
            instances: HashMap::new(),
        }
    }
}

/// Thread-safe scheme → adapter registry with lazy, memoized
/// instantiation.
#[derive(Clone)]
pub struct AdapterRegistry {
    inner: Arc<RwLock<Inner>>,
}

impl AdapterRegistry {
    /// Create an empty registry. Every lookup fails until
    /// [`configure`](Self::configure) is called.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::new())),
        }
    }

    /// Replace the registry's configuration with the given
    /// scheme → factory table.
    ///
    /// Schemes are matched case-insensitively; two entries whose schemes
    /// differ only by case are a configuration fault. Memoized adapter
    /// instances from the previous configuration are discarded.
    pub fn configure<I>(&self, factories: I) -> Result<(), SchemaError>
    where
        I: IntoIterator<Item = (String, AdapterFactory)>,
    {
        let mut table: HashMap<String, AdapterFactory> = HashMap::new();
        for (scheme, factory) in factories {
            let folded = scheme.to_lowercase();
            if table.insert(folded, factory).is_some() {
                return Err(SchemaError::DuplicateScheme { scheme });
            }
        }

        let mut inner = self.inner.write().unwrap();
        tracing::debug!(schemes = table.len(), "adapter registry configured");
        inner.factories = table;
        inner.instances.clear();
        Ok(())
    }

    /// Return the memoized adapter for `scheme`, instantiating it through
    /// the registered factory on first use.
    pub fn resolve_adapter(&self, scheme: &str) -> Result<Arc<dyn StorageAdapter>, DocumentError> {
        let folded = scheme.to_lowercase();

        if let Some(adapter) = self.inner.read().unwrap().instances.get(&folded) {
            return Ok(adapter.clone());
        }

        let mut inner = self.inner.write().unwrap();
        // Another caller may have instantiated it between the locks.
        if let Some(adapter) = inner.instances.get(&folded) {
            return Ok(adapter.clone());
        }
        let factory = inner
            .factories
            .get(&folded)
            .ok_or_else(|| DocumentError::UnsupportedScheme {
                scheme: scheme.to_string(),
            })?;
        let adapter = factory();
        inner.instances.insert(folded, adapter.clone());
        Ok(adapter)
    }

    /// Drop all factories and memoized adapters. Lookups fail until the
    /// next [`configure`](Self::configure).
    pub fn reset(&self) {
        let mut inner = self.inner.write().unwrap();
        inner.factories.clear();
        inner.instances.clear();
        tracing::debug!("adapter registry reset");
    }

    /// Number of configured schemes.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().factories.len()
    }

    /// Returns `true` if no scheme is configured.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("schemes", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Document;
    use crate::error::AdapterError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NullAdapter;

    #[async_trait]
    impl StorageAdapter for NullAdapter {
        async fn download(&self, _uri: &str) -> Result<Document, AdapterError> {
            Ok(Document::new())
        }
    }

    fn null_factory() -> AdapterFactory {
        Box::new(|| Arc::new(NullAdapter))
    }

    #[test]
    fn resolve_is_case_insensitive() {
        let registry = AdapterRegistry::new();
        registry
            .configure([("In-Memory".to_string(), null_factory())])
            .unwrap();
        assert!(registry.resolve_adapter("in-memory").is_ok());
        assert!(registry.resolve_adapter("IN-MEMORY").is_ok());
    }

    #[test]
    fn unknown_scheme_is_unsupported() {
        let registry = AdapterRegistry::new();
        registry
            .configure([("https".to_string(), null_factory())])
            .unwrap();
        let err = match registry.resolve_adapter("ipfs") {
            Err(err) => err,
            Ok(_) => panic!("expected resolve_adapter to fail for an unsupported scheme"),
        };
        assert!(matches!(err, DocumentError::UnsupportedScheme { scheme } if scheme == "ipfs"));
    }

    #[test]
    fn duplicate_scheme_rejected() {
        let registry = AdapterRegistry::new();
        let err = registry
            .configure([
                ("https".to_string(), null_factory()),
                ("HTTPS".to_string(), null_factory()),
            ])
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateScheme { .. }));
    }

    #[test]
    fn factory_runs_once_per_epoch() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let registry = AdapterRegistry::new();
        let factory: AdapterFactory = Box::new(|| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            Arc::new(NullAdapter)
        });
        registry
            .configure([("in-memory".to_string(), factory)])
            .unwrap();

        registry.resolve_adapter("in-memory").unwrap();
        registry.resolve_adapter("in-memory").unwrap();
        registry.resolve_adapter("IN-MEMORY").unwrap();
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn reset_clears_configuration() {
        let registry = AdapterRegistry::new();
        registry
            .configure([("https".to_string(), null_factory())])
            .unwrap();
        assert_eq!(registry.len(), 1);

        registry.reset();
        assert!(registry.is_empty());
        assert!(registry.resolve_adapter("https").is_err());
    }

    #[test]
    fn configure_replaces_previous_epoch() {
        let registry = AdapterRegistry::new();
        registry
            .configure([("https".to_string(), null_factory())])
            .unwrap();
        registry
            .configure([("ipfs".to_string(), null_factory())])
            .unwrap();

        assert!(registry.resolve_adapter("https").is_err());
        assert!(registry.resolve_adapter("ipfs").is_ok());
    }
}
