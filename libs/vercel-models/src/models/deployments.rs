//! Deployment models

use serde::{Deserialize, Serialize};

/// Project deployed when a request names none
pub const DEFAULT_PROJECT_NAME: &str = "ai-command-center";

/// State reported when the upstream record carries neither `state` nor `readyState`
pub const UNKNOWN_STATE: &str = "UNKNOWN";

/// Environment targeted by created and listed deployments
pub const PRODUCTION_TARGET: &str = "production";

/// Normalise a project name into an upstream deployment name.
///
/// Empty or absent names fall back to `default`. The result is trimmed,
/// lower-cased and has every `.` replaced with `-`, since upstream project
/// names cannot contain dots.
pub fn normalize_project_name(name: Option<&str>, default: &str) -> String {
    let name = match name {
        Some(name) if !name.is_empty() => name,
        _ => default,
    };
    name.trim().to_lowercase().replace('.', "-")
}

// ================================ DEPLOY ==================================== //

/// Body accepted by the deploy endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployRequest {
    #[serde(default, rename = "projectName")]
    pub project_name: Option<String>,
}

/// Body sent upstream to create a deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDeploymentRequest {
    pub name: String,
    pub project: String,
    pub target: String,
}

impl CreateDeploymentRequest {
    /// Production deployment of `project`
    pub fn production(project: String) -> Self {
        Self {
            name: project.clone(),
            project,
            target: PRODUCTION_TARGET.to_string(),
        }
    }
}

/// Upstream response to a deployment creation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedDeployment {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default, rename = "readyState")]
    pub ready_state: Option<String>,

    #[serde(default)]
    pub alias: Option<Vec<String>>,
}

/// Result returned by the deploy endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub alias: Vec<String>,
}

impl From<CreatedDeployment> for DeployResult {
    fn from(deployment: CreatedDeployment) -> Self {
        Self {
            url: deployment.url,
            status: deployment.ready_state,
            id: deployment.id,
            alias: deployment.alias.unwrap_or_default(),
        }
    }
}

// ================================ STATUS ==================================== //

/// Upstream deployment list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeploymentList {
    #[serde(default)]
    pub deployments: Option<Vec<DeploymentRecord>>,
}

/// A single record of the upstream deployment list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeploymentRecord {
    #[serde(default)]
    pub uid: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub alias: Option<Vec<String>>,

    #[serde(default)]
    pub state: Option<String>,

    #[serde(default, rename = "readyState")]
    pub ready_state: Option<String>,
}

/// Compact deployment state returned by the status endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub id: String,
    pub url: String,
    pub state: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl From<DeploymentRecord> for StatusEntry {
    fn from(record: DeploymentRecord) -> Self {
        let url = non_empty(record.url)
            .or_else(|| non_empty(record.alias.and_then(|a| a.into_iter().next())))
            .unwrap_or_default();
        let state = non_empty(record.state)
            .or_else(|| non_empty(record.ready_state))
            .unwrap_or_else(|| UNKNOWN_STATE.to_string());

        Self {
            id: record.uid.unwrap_or_default(),
            url,
            state,
        }
    }
}

/// Status endpoint response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub deployments: Vec<StatusEntry>,
}

impl From<DeploymentList> for StatusResponse {
    fn from(list: DeploymentList) -> Self {
        Self {
            deployments: list
                .deployments
                .unwrap_or_default()
                .into_iter()
                .map(StatusEntry::from)
                .collect(),
        }
    }
}
