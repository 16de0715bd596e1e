//! Outbound transport seam
//!
//! Handlers never talk to reqwest directly: every upstream call goes through
//! [`UpstreamTransport`], which the server wires to [`HttpClient`] and tests
//! replace with an in-memory double.
//!
//! [`HttpClient`]: crate::http::client::HttpClient

use async_trait::async_trait;
use http::{Method, StatusCode};
use secrecy::SecretString;

use crate::errors::{Operation, ProxyError};

/// A single call to the upstream API
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    /// Operation this call performs, used to label failures
    pub operation: Operation,

    pub method: Method,

    /// Path segments appended to the base URL, percent-encoded by the transport
    pub segments: Vec<String>,

    /// Query string pairs
    pub query: Vec<(String, String)>,

    /// Optional JSON body
    pub body: Option<serde_json::Value>,
}

impl UpstreamRequest {
    pub fn new(operation: Operation, method: Method, segments: &[&str]) -> Self {
        Self {
            operation,
            method,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of the first query pair named `key`
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw upstream response: status plus the unparsed body
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Transport trait for testability
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    /// Send `request` with `token` as bearer credential.
    ///
    /// Non-success statuses are returned as responses; only failures to
    /// complete the exchange are errors.
    async fn send(
        &self,
        token: &SecretString,
        request: UpstreamRequest,
    ) -> Result<UpstreamResponse, ProxyError>;
}
