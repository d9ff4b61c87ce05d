use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::models::{ConversionAck, SoulMateResult, SoulMateResultWithDate, SoulMateSubmission};
use crate::services::backend::token_segment;

/// Errors seen by the visitor-side workflow when calling the public API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Client for the gateway's `/api` surface
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub async fn submit(&self, submission: &SoulMateSubmission) -> Result<SoulMateResult, ApiError> {
        tracing::info!("Submitting soul mate data for {}", submission.name);

        let response = self
            .client
            .post(format!("{}/api/submit", self.base_url))
            .json(submission)
            .send()
            .await?;

        let result: SoulMateResult = Self::parse(response).await?;
        tracing::info!("Submission accepted, token {}", result.token);
        Ok(result)
    }

    pub async fn get_result(&self, token: &str) -> Result<SoulMateResultWithDate, ApiError> {
        let response = self
            .client
            .get(format!("{}/api/result/{}", self.base_url, token_segment(token)))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(token.to_string()));
        }
        Self::parse(response).await
    }

    pub async fn track_conversion(&self, token: &str) -> Result<ConversionAck, ApiError> {
        let response = self
            .client
            .post(format!("{}/api/track-conversion/{}", self.base_url, token_segment(token)))
            .send()
            .await?;

        Self::parse(response).await
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}
