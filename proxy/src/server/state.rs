//! Server state

use crate::app::options::ProxyConfig;
use crate::http::deployments::VercelClient;

/// Server state shared across handlers
pub struct ServerState {
    pub config: ProxyConfig,
    pub vercel: VercelClient,
}

impl ServerState {
    pub fn new(config: ProxyConfig, vercel: VercelClient) -> Self {
        Self { config, vercel }
    }
}
