//! OpenAI-compatible chat-completions client
//!
//! Works against any `/chat/completions` endpoint that accepts the OpenAI
//! request shape. The defaults target DeepSeek.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use super::client::{ChatModel, LlmError};
use super::types::Message;

/// Default chat-completions endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/chat/completions";

/// Default model to use
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Environment variable holding the API key
pub const DEFAULT_API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

/// Fallback delay when a 429 carries no usable `retry-after`
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Configuration for the chat-completions client
#[derive(Debug, Clone)]
pub struct OpenAiCompatConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl Default for OpenAiCompatConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            max_tokens: None,
            timeout: Duration::from_secs(300),
        }
    }
}

impl OpenAiCompatConfig {
    /// Create a new config with a specific model
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Non-streaming chat-completions client
pub struct OpenAiCompatClient {
    client: Client,
    api_key: String,
    config: OpenAiCompatConfig,
}

impl OpenAiCompatClient {
    /// Create a client, reading the API key from `config.api_key_env`
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| LlmError::MissingApiKey {
                env_var: config.api_key_env.clone(),
            })?;

        Self::with_api_key(api_key, config)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(api_key: impl Into<String>, config: OpenAiCompatConfig) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build the request body for a transcript
    fn build_request(&self, messages: &[Message]) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "messages": messages,
            "stream": false,
        });

        if let Some(max_tokens) = self.config.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        body
    }

    /// Pull the first choice's message content out of a response body
    fn parse_response(body: &Value) -> Result<String, LlmError> {
        let choice = body
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .ok_or_else(|| LlmError::InvalidResponse("no choices".to_string()))?;

        choice
            .pointer("/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| LlmError::InvalidResponse("choice has no message content".to_string()))
    }

    async fn send_request(&self, body: &Value) -> Result<Value, LlmError> {
        let response = self
            .client
            .post(&self.config.base_url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(LlmError::Unauthorized);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(LlmError::RateLimited {
                retry_after: Duration::from_secs(retry_after),
            });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Model API returned {}: {}", status, message);
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatClient {
    async fn chat_with_history(&self, messages: &[Message]) -> Result<String, LlmError> {
        debug!("Sending {} messages to {}", messages.len(), self.config.model);
        let body = self.build_request(messages);
        let response = self.send_request(&body).await?;
        Self::parse_response(&response)
    }
}

impl std::fmt::Debug for OpenAiCompatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}
