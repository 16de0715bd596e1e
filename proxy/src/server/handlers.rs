//! HTTP request handlers shared by every route

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::errors::ProxyError;
use crate::utils::version_info;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "ccproxy".to_string(),
        version: version_info().version,
    })
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    Json(version_info())
}

/// CORS preflight: 200 with an empty body
pub async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

/// Fallback for every verb a route does not accept
pub async fn method_not_allowed() -> ProxyError {
    ProxyError::MethodNotAllowed
}
