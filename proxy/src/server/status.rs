//! Status query handler

use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::debug;
use vercel_models::StatusResponse;

use crate::errors::ProxyError;
use crate::server::state::ServerState;

/// `GET /api/vercel-status`: recent production deployments
pub async fn status_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<StatusResponse>, ProxyError> {
    let token = state.config.token()?;

    let response = state
        .vercel
        .list_deployments(token, state.config.project_id())
        .await?;
    debug!("Listed {} deployments", response.deployments.len());
    Ok(Json(response))
}
