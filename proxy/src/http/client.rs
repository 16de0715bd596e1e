//! HTTP client implementation

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::errors::{Operation, ProxyError};
use crate::http::transport::{UpstreamRequest, UpstreamResponse, UpstreamTransport};

/// reqwest-backed transport to the upstream API
pub struct HttpClient {
    client: Client,
    base_url: Url,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProxyError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ProxyError::ConfigError(format!("invalid upstream URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ProxyError::ConfigError(format!(
                "upstream URL cannot carry a path: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ccproxy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProxyError::ConfigError(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve the full URL for a request
    pub fn url_for(&self, request: &UpstreamRequest) -> Result<Url, ProxyError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| transport_error(request.operation, "upstream URL cannot carry a path"))?
            .pop_if_empty()
            .extend(&request.segments);
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }
}

fn transport_error(operation: Operation, detail: impl Into<String>) -> ProxyError {
    ProxyError::Transport {
        operation,
        detail: detail.into(),
    }
}

/// Render an error with its sources, e.g. "error sending request: connection refused"
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

#[async_trait]
impl UpstreamTransport for HttpClient {
    async fn send(
        &self,
        token: &SecretString,
        request: UpstreamRequest,
    ) -> Result<UpstreamResponse, ProxyError> {
        let url = self.url_for(&request)?;
        debug!("{} {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token.expose_secret()))
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(request.operation, error_chain(&e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(request.operation, error_chain(&e)))?;

        Ok(UpstreamResponse { status, body })
    }
}
