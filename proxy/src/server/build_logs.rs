//! Log fetch handler

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use vercel_models::LogsResponse;

use crate::errors::ProxyError;
use crate::server::state::ServerState;

/// Query parameter naming the deployment
pub const DEPLOYMENT_ID_PARAM: &str = "deploymentId";

/// First non-empty `deploymentId` among the query pairs
pub fn deployment_id(pairs: &[(String, String)]) -> Option<&str> {
    pairs
        .iter()
        .filter(|(key, _)| key == DEPLOYMENT_ID_PARAM)
        .map(|(_, value)| value.as_str())
        .find(|value| !value.is_empty())
}

/// `GET /api/vercel-logs?deploymentId=...`: build log of one deployment
pub async fn build_logs_handler(
    State(state): State<Arc<ServerState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<LogsResponse>, ProxyError> {
    let deployment_id =
        deployment_id(&pairs).ok_or(ProxyError::MissingParameter(DEPLOYMENT_ID_PARAM))?;
    let token = state.config.token()?;

    let response = state.vercel.deployment_logs(token, deployment_id).await?;
    Ok(Json(response))
}
