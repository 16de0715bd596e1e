//! Vercel deployments API client

use std::sync::Arc;

use http::Method;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};
use vercel_models::{
    parse_events, truncate_detail, CreateDeploymentRequest, CreatedDeployment, DeployResult,
    DeploymentList, LogsResponse, StatusResponse, EVENTS_LIMIT, PRODUCTION_TARGET,
};

use crate::errors::{Operation, ProxyError};
use crate::http::transport::{UpstreamRequest, UpstreamTransport};

/// Number of deployments listed by a status query
pub const STATUS_LIMIT: u32 = 20;

/// Typed operations over an [`UpstreamTransport`]
#[derive(Clone)]
pub struct VercelClient {
    transport: Arc<dyn UpstreamTransport>,
}

impl VercelClient {
    pub fn new(transport: Arc<dyn UpstreamTransport>) -> Self {
        Self { transport }
    }

    /// Send a request and decode a successful JSON body.
    ///
    /// Non-success statuses become [`ProxyError::Upstream`] carrying the
    /// upstream status and a truncated copy of the body.
    async fn call<T: DeserializeOwned>(
        &self,
        token: &SecretString,
        request: UpstreamRequest,
    ) -> Result<T, ProxyError> {
        let operation = request.operation;

        let response = match self.transport.send(token, request).await {
            Ok(response) => response,
            Err(e) => {
                error!("Upstream {} failed: {}", operation, e);
                return Err(e);
            }
        };

        if !response.status.is_success() {
            warn!("Upstream {} rejected: {}", operation, response.status);
            return Err(ProxyError::Upstream {
                operation,
                status: response.status,
                detail: truncate_detail(&response.body),
            });
        }

        serde_json::from_str(&response.body).map_err(|e| {
            error!("Upstream {} returned an undecodable body: {}", operation, e);
            ProxyError::Transport {
                operation,
                detail: e.to_string(),
            }
        })
    }

    /// Create a fresh production deployment of `project`
    pub async fn create_deployment(
        &self,
        token: &SecretString,
        project: String,
    ) -> Result<DeployResult, ProxyError> {
        debug!("Creating production deployment of {}", project);

        let body = serde_json::to_value(CreateDeploymentRequest::production(project))
            .map_err(|e| ProxyError::Transport {
                operation: Operation::CreateDeployment,
                detail: e.to_string(),
            })?;
        let request = UpstreamRequest::new(
            Operation::CreateDeployment,
            Method::POST,
            &["v13", "deployments"],
        )
        .query("forceNew", "1")
        .json(body);

        let created: CreatedDeployment = self.call(token, request).await?;
        Ok(DeployResult::from(created))
    }

    /// List the most recent production deployments, optionally scoped to a project
    pub async fn list_deployments(
        &self,
        token: &SecretString,
        project_id: Option<&str>,
    ) -> Result<StatusResponse, ProxyError> {
        let mut request = UpstreamRequest::new(
            Operation::ListDeployments,
            Method::GET,
            &["v6", "deployments"],
        )
        .query("limit", STATUS_LIMIT.to_string())
        .query("target", PRODUCTION_TARGET);
        if let Some(project_id) = project_id.filter(|id| !id.is_empty()) {
            request = request.query("projectId", project_id);
        }

        let list: DeploymentList = self.call(token, request).await?;
        Ok(StatusResponse::from(list))
    }

    /// Fetch the latest events of a deployment as a plain-text log
    pub async fn deployment_logs(
        &self,
        token: &SecretString,
        deployment_id: &str,
    ) -> Result<LogsResponse, ProxyError> {
        let request = UpstreamRequest::new(
            Operation::ListEvents,
            Method::GET,
            &["v3", "deployments", deployment_id, "events"],
        )
        .query("limit", EVENTS_LIMIT.to_string())
        .query("direction", "backward");

        let body: serde_json::Value = self.call(token, request).await?;
        let events = parse_events(body);
        debug!("Deployment {} returned {} events", deployment_id, events.len());
        Ok(LogsResponse::from_events(&events))
    }
}
