//! Main application run loop

use std::future::Future;
use std::sync::Arc;

use tracing::{info, warn};

use crate::app::options::AppOptions;
use crate::errors::ProxyError;
use crate::http::client::HttpClient;
use crate::http::deployments::VercelClient;
use crate::server::serve::serve;
use crate::server::state::ServerState;

/// Run the proxy until `shutdown_signal` resolves
pub async fn run(
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ProxyError> {
    info!("Initializing command center proxy...");

    if options.proxy.token().is_err() {
        warn!("VERCEL_TOKEN is not set, API endpoints will answer 503 until it is");
    }
    match options.proxy.project_id() {
        Some(project_id) => info!("Status queries scoped to project {}", project_id),
        None => info!("Status queries are not scoped to a project"),
    }

    let http_client = HttpClient::new(&options.upstream.base_url, options.upstream.timeout)?;
    info!("Proxying to {}", http_client.base_url());
    let vercel = VercelClient::new(Arc::new(http_client));

    let state = Arc::new(ServerState::new(options.proxy, vercel));
    let server_handle = serve(&options.server, state, shutdown_signal).await?;

    let result = server_handle
        .await
        .map_err(|e| ProxyError::ServerError(format!("server task panicked: {}", e)))?;
    info!("Server stopped");
    result
}
