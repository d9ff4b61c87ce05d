use actix_web::web::Bytes;
use reqwest::Client;
use serde::de::IgnoredAny;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the matching backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// HTTP verbs the relay forwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamMethod {
    Get,
    Post,
}

impl fmt::Display for UpstreamMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// Status and JSON body exactly as the backend produced them
#[derive(Debug, Clone, PartialEq)]
pub struct Forwarded {
    pub status: u16,
    /// Raw bytes, already checked to be a JSON document
    pub body: Bytes,
}

/// Client for the soul mate matching backend
///
/// Holds no state besides the pooled HTTP client, so one instance is
/// shared by every worker.
pub struct BackendClient {
    base_url: String,
    client: Client,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one request upstream and hand back whatever came back
    ///
    /// Non-2xx statuses are not errors here: the caller mirrors them. Only
    /// transport failures and non-JSON bodies are reported as errors.
    pub async fn forward(
        &self,
        method: UpstreamMethod,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Forwarded, BackendError> {
        let url = format!("{}{}", self.base_url, path);

        let request = match method {
            UpstreamMethod::Get => self.client.get(&url),
            UpstreamMethod::Post => self.client.post(&url).header("Content-Type", "application/json"),
        };
        let request = match body {
            Some(json) => request.json(json),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        serde_json::from_slice::<IgnoredAny>(&bytes)
            .map_err(|e| BackendError::InvalidResponse(format!("backend returned non-JSON body: {}", e)))?;

        tracing::debug!("Backend {} {} -> {} ({} bytes)", method, path, status, bytes.len());

        Ok(Forwarded { status, body: bytes })
    }

    /// Backend health endpoint, used by the connectivity diagnostic
    pub async fn health(&self) -> Result<Value, BackendError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;

        Ok(response.json().await?)
    }
}

/// Encode a token for use as a single path segment
pub fn token_segment(token: &str) -> String {
    urlencoding::encode(token).into_owned()
}
