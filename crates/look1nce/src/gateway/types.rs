use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Response of both preprocessing endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct PreprocessResponse {
    pub processed_path: String,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

/// Response of the try-on endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TryOnResponse {
    pub result_path: String,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

/// Liveness report from the health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,

    /// Readiness of the individual service components.
    #[serde(default)]
    pub services: HashMap<String, String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// Error body returned by the service for failed requests.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    /// Either a plain message or a list of validation errors.
    pub detail: serde_json::Value,
}

impl ErrorBody {
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            serde_json::Value::String(_) | serde_json::Value::Null => None,
            serde_json::Value::Array(items) => {
                let messages: Vec<String> = items
                    .iter()
                    .map(|item| {
                        item.get("msg")
                            .and_then(|m| m.as_str())
                            .map(str::to_string)
                            .unwrap_or_else(|| item.to_string())
                    })
                    .collect();
                if messages.is_empty() {
                    None
                } else {
                    Some(messages.join("; "))
                }
            }
            other => Some(other.to_string()),
        }
    }
}
