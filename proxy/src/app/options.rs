//! Application configuration options

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use vercel_models::DEFAULT_PROJECT_NAME;

use crate::errors::ProxyError;

/// Main application options
#[derive(Debug)]
pub struct AppOptions {
    /// Server configuration
    pub server: ServerOptions,

    /// Upstream API configuration
    pub upstream: UpstreamOptions,

    /// Configuration handed to the request handlers
    pub proxy: ProxyConfig,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            server: ServerOptions::default(),
            upstream: UpstreamOptions::default(),
            proxy: ProxyConfig::default(),
        }
    }
}

/// HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// Upstream API options
#[derive(Debug, Clone)]
pub struct UpstreamOptions {
    /// Base URL of the Vercel REST API
    pub base_url: String,

    /// Timeout for a single upstream request
    pub timeout: Duration,
}

impl Default for UpstreamOptions {
    fn default() -> Self {
        Self {
            base_url: "https://api.vercel.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Per-request handler configuration
#[derive(Debug)]
pub struct ProxyConfig {
    /// Bearer credential for the upstream API
    pub token: Option<SecretString>,

    /// Project the status query is scoped to
    pub project_id: Option<String>,

    /// Project deployed when the request names none
    pub default_project: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            token: None,
            project_id: None,
            default_project: DEFAULT_PROJECT_NAME.to_string(),
        }
    }
}

impl ProxyConfig {
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// The upstream credential, or [`ProxyError::MissingCredential`] if unset or empty
    pub fn token(&self) -> Result<&SecretString, ProxyError> {
        match &self.token {
            Some(token) if !token.expose_secret().is_empty() => Ok(token),
            _ => Err(ProxyError::MissingCredential),
        }
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref().filter(|id| !id.is_empty())
    }
}
