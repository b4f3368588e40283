//! Text generation client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::{MlError, MlResult};
use crate::types::{
    ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
    GenerationRequest,
};

/// Capability that turns a prompt into text.
///
/// Implementations report a rate-limit condition as
/// [`MlError::RateLimited`] and every other failure as a different variant.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> MlResult<String>;
}

/// Configuration for the OpenAI client.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API base URL
    pub base_url: String,
    /// API key
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// OpenAI chat completions client.
pub struct OpenAiClient {
    http: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Create a new client.
    pub fn new(config: OpenAiConfig) -> MlResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(MlError::config_error("OpenAI API key is empty"));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MlError::Network)?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, request: &GenerationRequest) -> MlResult<String> {
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        debug!("Requesting completion from {} ({})", request.model, url);

        let body = ChatCompletionRequest {
            model: &request.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(MlError::from_http_status(status, message));
        }

        let completion: ChatCompletionResponse = response.json().await?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| MlError::invalid_response("No content in completion response"))?;

        Ok(content.trim().to_string())
    }
}
