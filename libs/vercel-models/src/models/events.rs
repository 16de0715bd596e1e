//! Deployment event models

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Returned in place of an empty log
pub const NO_EVENTS_PLACEHOLDER: &str = "No build log events returned.";

/// Number of events requested per log fetch
pub const EVENTS_LIMIT: u32 = 200;

/// A single upstream build/runtime event
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeploymentEvent {
    #[serde(default)]
    pub payload: Option<EventPayload>,
}

/// Free-text fields an event may carry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub text: Option<Value>,

    #[serde(default)]
    pub message: Option<Value>,
}

fn as_line(value: &Option<Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

impl DeploymentEvent {
    /// Log line carried by this event, preferring `text` over `message`
    pub fn line(&self) -> Option<String> {
        let payload = self.payload.as_ref()?;
        as_line(&payload.text).or_else(|| as_line(&payload.message))
    }
}

/// Decode an upstream event list.
///
/// Bodies that are not arrays yield no events, and array elements that are
/// not event objects are skipped.
pub fn parse_events(body: Value) -> Vec<DeploymentEvent> {
    match body {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// Flatten events into a newline-joined log, or the placeholder if no line survives
pub fn flatten_events(events: &[DeploymentEvent]) -> String {
    let lines: Vec<String> = events.iter().filter_map(DeploymentEvent::line).collect();
    if lines.is_empty() {
        return NO_EVENTS_PLACEHOLDER.to_string();
    }
    lines.join("\n")
}

/// Logs endpoint response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsResponse {
    pub logs: String,
}

impl LogsResponse {
    pub fn from_events(events: &[DeploymentEvent]) -> Self {
        Self {
            logs: flatten_events(events),
        }
    }
}
