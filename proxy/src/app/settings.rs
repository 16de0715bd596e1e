//! Settings file management
//!
//! Settings come from an optional JSON file, then environment variables,
//! then `--key=value` command line arguments, each layer overriding the
//! previous one. The upstream credential is only ever read from the
//! environment.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vercel_models::DEFAULT_PROJECT_NAME;

use crate::app::options::{AppOptions, ProxyConfig, ServerOptions, UpstreamOptions};
use crate::errors::ProxyError;
use crate::logs::{LogLevel, LogOptions};

/// Environment variable holding the upstream bearer credential
pub const TOKEN_ENV: &str = "VERCEL_TOKEN";

/// Environment variable scoping status queries to one project
pub const PROJECT_ID_ENV: &str = "VERCEL_PROJECT_ID";

pub const HOST_ENV: &str = "CCPROXY_HOST";
pub const PORT_ENV: &str = "CCPROXY_PORT";

/// Proxy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit JSON logs
    #[serde(default)]
    pub json_logs: bool,

    /// Listener configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Upstream API configuration
    #[serde(default)]
    pub upstream: UpstreamSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            json_logs: false,
            server: ServerSettings::default(),
            upstream: UpstreamSettings::default(),
        }
    }
}

/// Listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    ServerOptions::default().host
}

fn default_port() -> u16 {
    ServerOptions::default().port
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Upstream API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Project the status query is scoped to
    #[serde(default)]
    pub project_id: Option<String>,

    /// Project deployed when a request names none
    #[serde(default = "default_project")]
    pub default_project: String,
}

fn default_base_url() -> String {
    UpstreamOptions::default().base_url
}

fn default_timeout_secs() -> u64 {
    UpstreamOptions::default().timeout.as_secs()
}

fn default_project() -> String {
    DEFAULT_PROJECT_NAME.to_string()
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            project_id: None,
            default_project: default_project(),
        }
    }
}

fn parse_port(value: &str, source: &str) -> Result<u16, ProxyError> {
    value
        .parse()
        .map_err(|_| ProxyError::ConfigError(format!("invalid port in {}: {}", source, value)))
}

impl Settings {
    /// Read settings from a JSON file
    pub async fn load(path: &Path) -> Result<Self, ProxyError> {
        debug!("Reading settings from {}", path.display());
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            ProxyError::ConfigError(format!("unable to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            ProxyError::ConfigError(format!("invalid settings file {}: {}", path.display(), e))
        })
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ProxyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(project_id) = lookup(PROJECT_ID_ENV) {
            self.upstream.project_id = Some(project_id);
        }
        if let Some(host) = lookup(HOST_ENV) {
            self.server.host = host;
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = parse_port(&port, PORT_ENV)?;
        }
        Ok(())
    }

    /// Apply `--key=value` command line overrides
    pub fn apply_args(&mut self, args: &HashMap<String, String>) -> Result<(), ProxyError> {
        if let Some(host) = args.get("host") {
            self.server.host = host.clone();
        }
        if let Some(port) = args.get("port") {
            self.server.port = parse_port(port, "--port")?;
        }
        if let Some(level) = args.get("log-level") {
            self.log_level = level.parse().map_err(ProxyError::ConfigError)?;
        }
        if let Some(json_logs) = args.get("json-logs") {
            self.json_logs = json_logs != "false";
        }
        if let Some(base_url) = args.get("upstream") {
            self.upstream.base_url = base_url.clone();
        }
        Ok(())
    }

    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            log_level: self.log_level,
            json_format: self.json_logs,
        }
    }

    /// Resolve into application options, reading the credential through `lookup`
    pub fn into_options<F>(self, lookup: F) -> Result<AppOptions, ProxyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.upstream.timeout_secs == 0 {
            return Err(ProxyError::ConfigError(
                "upstream timeout_secs must be greater than zero".to_string(),
            ));
        }

        let token = lookup(TOKEN_ENV)
            .filter(|token| !token.is_empty())
            .map(SecretString::from);

        Ok(AppOptions {
            server: ServerOptions {
                host: self.server.host,
                port: self.server.port,
            },
            upstream: UpstreamOptions {
                base_url: self.upstream.base_url,
                timeout: Duration::from_secs(self.upstream.timeout_secs),
            },
            proxy: ProxyConfig {
                token,
                project_id: self.upstream.project_id.filter(|id| !id.is_empty()),
                default_project: self.upstream.default_project,
            },
        })
    }
}
