//! Deploy trigger handler

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use tracing::info;
use vercel_models::{normalize_project_name, DeployRequest, DeployResult};

use crate::errors::ProxyError;
use crate::server::state::ServerState;

/// Decode the deploy body. An empty body is an empty request.
pub fn decode_deploy_request(body: &[u8]) -> Result<DeployRequest, ProxyError> {
    if body.is_empty() {
        return Ok(DeployRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ProxyError::InvalidBody(e.to_string()))
}

/// `POST /api/deploy`: trigger a fresh production deployment
pub async fn deploy_handler(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> Result<Json<DeployResult>, ProxyError> {
    let token = state.config.token()?;
    let request = decode_deploy_request(&body)?;

    let project = normalize_project_name(
        request.project_name.as_deref(),
        &state.config.default_project,
    );
    info!("Deploy requested for project {}", project);

    let result = state.vercel.create_deployment(token, project).await?;
    info!(
        "Deployment {} created ({})",
        result.id.as_deref().unwrap_or("?"),
        result.status.as_deref().unwrap_or("unknown state")
    );
    Ok(Json(result))
}
