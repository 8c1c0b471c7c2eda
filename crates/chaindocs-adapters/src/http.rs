//! HTTP(S) storage adapter backed by `reqwest`.
//!
//! Read-only: a document reference is fetched with a plain GET and the
//! body must decode to a JSON object. There is no retry or backoff —
//! the resolver's next caller-triggered access is the retry.

use std::time::Duration;

use async_trait::async_trait;
use chaindocs_core::{AdapterError, Document, StorageAdapter};
use serde_json::Value;

/// Configuration for [`HttpAdapter`].
#[derive(Debug, Clone)]
pub struct HttpAdapterConfig {
    /// Timeout per GET request.
    pub request_timeout: Duration,
}

impl Default for HttpAdapterConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Fetches documents over HTTP(S).
pub struct HttpAdapter {
    http: reqwest::Client,
}

impl HttpAdapter {
    pub fn new(config: HttpAdapterConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("failed to build reqwest client");
        Self { http }
    }
}

impl Default for HttpAdapter {
    fn default() -> Self {
        Self::new(HttpAdapterConfig::default())
    }
}

#[async_trait]
impl StorageAdapter for HttpAdapter {
    async fn download(&self, uri: &str) -> Result<Document, AdapterError> {
        let resp = self
            .http
            .get(uri)
            .send()
            .await
            .map_err(|e| AdapterError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AdapterError::NotFound(uri.to_string()));
        }
        if !status.is_success() {
            tracing::warn!(uri = %uri, status = %status, "document fetch failed");
            return Err(AdapterError::Network(format!("HTTP {status}: {uri}")));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| AdapterError::InvalidPayload(e.to_string()))?;
        match body {
            Value::Object(map) => Ok(map),
            other => Err(AdapterError::InvalidPayload(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_object_payload_is_named() {
        assert_eq!(json_kind(&Value::Array(vec![])), "an array");
        assert_eq!(json_kind(&Value::Null), "null");
    }

    #[test]
    fn default_config_has_timeout() {
        let config = HttpAdapterConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }
}
