use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub time: chrono::DateTime<chrono::Utc>,
    pub service: String,
}

/// Error response for requests rejected locally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Body returned when the backend cannot be reached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamErrorResponse {
    pub error: String,
    pub detail: String,
}

impl UpstreamErrorResponse {
    pub const UNAVAILABLE: &'static str = "Backend service unavailable";

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self {
            error: Self::UNAVAILABLE.to_string(),
            detail: detail.into(),
        }
    }
}

/// Backend connectivity diagnostic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendProbeResponse {
    pub status: String,
    #[serde(rename = "flask_response", skip_serializing_if = "Option::is_none")]
    pub backend_response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "flask_url")]
    pub backend_url: String,
}
