//! Error types for document resolution.
//!
//! Three kinds of failure, kept as distinct types so callers can tell
//! whether a retry could help:
//! - [`SchemaError`] — invalid caller input (construction/configuration)
//! - [`DataError`] — a downloaded document does not match its schema
//! - [`AdapterError`] — the storage fetch itself failed
//!
//! [`DocumentError`] is the umbrella type the resolver returns. All enums
//! carry `String` payloads and are `Clone`: a single in-flight download is
//! shared by every concurrent caller, and each awaiter receives a clone of
//! the settled result.

use thiserror::Error;

/// Construction and configuration faults — programmer errors, raised
/// synchronously before any I/O happens.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// A resolver cannot be constructed without a reference.
    #[error("Document reference must not be empty")]
    EmptyReference,

    /// Two schema field names differ only by case.
    #[error("Duplicate schema field '{field}' (field names are case-insensitive)")]
    DuplicateField { field: String },

    /// Two registry schemes differ only by case.
    #[error("Duplicate storage scheme '{scheme}' (schemes are case-insensitive)")]
    DuplicateScheme { scheme: String },
}

/// Document-shape faults: the downloaded document does not conform to the
/// declared schema. Retrying the download cannot fix these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DataError {
    /// A `required` pointer field is missing (or falsy) in the document.
    #[error("Required field '{field}' is missing from {reference}")]
    MissingField { field: String, reference: String },

    /// A pointer field is present but its value is not a URI string.
    #[error("Field '{field}' in {reference} must be a URI string")]
    InvalidPointer { field: String, reference: String },

    /// A nested pointer field is present but its value is not a map.
    #[error("Nested field '{field}' in {reference} must be a map of URI strings")]
    InvalidNestedMap { field: String, reference: String },

    /// One key of a nested pointer map holds a non-string value.
    #[error("Key '{key}' of nested field '{field}' in {reference} must be a URI string")]
    InvalidNestedPointer {
        field: String,
        key: String,
        reference: String,
    },
}

/// Storage-level faults produced by adapters.
///
/// The core wraps these into [`DocumentError::Read`] at the download
/// boundary; each adapter owns the mapping from its wire protocol.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdapterError {
    /// No document exists at the given reference.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// Network-level failure (connection, timeout, non-success status).
    #[error("Network error: {0}")]
    Network(String),

    /// The payload was fetched but is not a JSON document.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// An unexpected adapter error.
    #[error("{0}")]
    Other(String),
}

/// The error type returned by resolver operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// Construction/configuration fault.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The document does not match its schema.
    #[error(transparent)]
    Data(#[from] DataError),

    /// The reference has no `scheme://` prefix, so no adapter can serve it.
    #[error("Reference '{reference}' has no storage scheme")]
    MissingScheme { reference: String },

    /// No adapter factory is registered for the scheme.
    #[error("Unsupported storage type '{scheme}'")]
    UnsupportedScheme { scheme: String },

    /// The adapter's download failed.
    #[error("Failed to read document {reference}: {source}")]
    Read {
        reference: String,
        #[source]
        source: AdapterError,
    },
}

impl DocumentError {
    /// Returns `true` if the failure is a storage fault — the document may
    /// appear (or the network recover) on a later access.
    pub fn is_storage_fault(&self) -> bool {
        matches!(
            self,
            Self::Read { .. } | Self::UnsupportedScheme { .. } | Self::MissingScheme { .. }
        )
    }

    /// Returns `true` if the downloaded document itself is malformed —
    /// retrying the download cannot help.
    pub fn is_data_fault(&self) -> bool {
        matches!(self, Self::Data(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_fault_names_the_field() {
        let err = DataError::MissingField {
            field: "ratePlansUri".into(),
            reference: "in-memory://hotel".into(),
        };
        assert!(err.to_string().contains("ratePlansUri"));
        assert!(err.to_string().contains("in-memory://hotel"));
    }

    #[test]
    fn nested_fault_names_the_key() {
        let err = DataError::InvalidNestedPointer {
            field: "plans".into(),
            key: "weekend".into(),
            reference: "in-memory://index".into(),
        };
        assert!(err.to_string().contains("weekend"));
    }

    #[test]
    fn read_error_is_storage_fault() {
        let err = DocumentError::Read {
            reference: "https://example.com/doc".into(),
            source: AdapterError::Network("connection refused".into()),
        };
        assert!(err.is_storage_fault());
        assert!(!err.is_data_fault());
    }

    #[test]
    fn data_error_is_not_retryable() {
        let err: DocumentError = DataError::InvalidPointer {
            field: "descriptionUri".into(),
            reference: "in-memory://hotel".into(),
        }
        .into();
        assert!(err.is_data_fault());
        assert!(!err.is_storage_fault());
    }
}
