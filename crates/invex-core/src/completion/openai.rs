//! HTTP client for an OpenAI-compatible chat-completion endpoint.

use std::time::Duration;

use tracing::debug;

use super::{ChatRequest, ChatResponse, CompletionService};
use crate::error::CompletionError;
use crate::models::CompletionConfig;

/// Client for the chat-completion API.
///
/// Holds no per-request state; one outbound call per `complete`, no retries.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl OpenAiClient {
    /// Build a client from the completion config and an API key.
    pub fn new(config: &CompletionConfig, api_key: impl Into<String>) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

impl CompletionService for OpenAiClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.api_base);
        debug!(model = %request.model, "Sending completion request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(CompletionError::EmptyResponse)?
            .message
            .content;

        debug!(chars = content.len(), "Completion response received");
        Ok(content)
    }
}
