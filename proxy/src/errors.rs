//! Error types for the command center proxy

use std::fmt;

use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use thiserror::Error;
use vercel_models::ErrorBody;

/// Remediation hint returned when the upstream credential is missing
pub const MISSING_CREDENTIAL_HINT: &str =
    "Set VERCEL_TOKEN in the proxy environment (or your Vercel project Settings → Environment Variables), then restart or redeploy.";

/// Upstream operation a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateDeployment,
    ListDeployments,
    ListEvents,
}

impl Operation {
    /// Label used when the upstream rejects the call
    pub fn rejected_label(&self) -> &'static str {
        match self {
            Operation::CreateDeployment => "Deploy failed",
            Operation::ListDeployments | Operation::ListEvents => "Vercel API error",
        }
    }

    /// Label used when the call could not be completed
    pub fn failed_label(&self) -> &'static str {
        match self {
            Operation::CreateDeployment => "Deploy request failed",
            Operation::ListDeployments => "Status check failed",
            Operation::ListEvents => "Logs fetch failed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::CreateDeployment => write!(f, "create deployment"),
            Operation::ListDeployments => write!(f, "list deployments"),
            Operation::ListEvents => write!(f, "list deployment events"),
        }
    }
}

/// Main error type for the proxy
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("VERCEL_TOKEN not set")]
    MissingCredential,

    #[error("Invalid JSON body: {0}")]
    InvalidBody(String),

    #[error("Missing {0} query")]
    MissingParameter(&'static str),

    #[error("{operation} rejected by upstream ({status}): {detail}")]
    Upstream {
        operation: Operation,
        status: StatusCode,
        detail: String,
    },

    #[error("{operation} failed: {detail}")]
    Transport { operation: Operation, detail: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::MissingCredential => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::InvalidBody(_) | ProxyError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            ProxyError::Upstream { status, .. } => *status,
            ProxyError::Transport { .. }
            | ProxyError::ConfigError(_)
            | ProxyError::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body describing this error to the client
    pub fn body(&self) -> ErrorBody {
        match self {
            ProxyError::MethodNotAllowed => ErrorBody::new("Method not allowed"),
            ProxyError::MissingCredential => {
                ErrorBody::new("VERCEL_TOKEN not set").with_hint(MISSING_CREDENTIAL_HINT)
            }
            ProxyError::InvalidBody(_) => ErrorBody::new("Invalid JSON body"),
            ProxyError::MissingParameter(name) => ErrorBody::new(format!("Missing {} query", name)),
            ProxyError::Upstream {
                operation, detail, ..
            } => ErrorBody::new(operation.rejected_label()).with_detail(detail.clone()),
            ProxyError::Transport { operation, detail } => {
                ErrorBody::new(operation.failed_label()).with_detail(detail.clone())
            }
            ProxyError::ConfigError(_) | ProxyError::ServerError(_) => {
                ErrorBody::new("Internal server error")
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}
