//! Minimal blocking client for OpenAI-compatible chat-completion endpoints.

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::ClientConfig;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    #[error("Rate limit exceeded: retry after {retry_after:?}s")]
    RateLimitExceeded { retry_after: Option<u64> },

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Timeout")]
    Timeout,

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Response contained no message content")]
    EmptyResponse,
}

/// Role of a chat message participant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// One chat-completion call. An empty `model` selects the client default.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatResponse {
    pub content: String,
    pub model: String,
    pub finish_reason: Option<String>,
}

/// Seam between the pipeline and the model provider.
pub trait ChatClient {
    fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError>;
}

impl<C: ChatClient + ?Sized> ChatClient for &C {
    fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        (**self).complete(request)
    }
}

impl<C: ChatClient + ?Sized> ChatClient for Box<C> {
    fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
        (**self).complete(request)
    }
}

pub struct OpenAiChatClient {
    config: ClientConfig,
    client: Client,
}

impl OpenAiChatClient {
    pub fn new(config: ClientConfig) -> Result<Self, LlmError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| LlmError::InvalidRequest(e.to_string()))?;
        Ok(Self { config, client })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn build_headers(&self) -> Result<HeaderMap, LlmError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", self.config.api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).map_err(|e| LlmError::InvalidRequest(e.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn parse_response(body: &Value, fallback_model: &str) -> Result<ChatResponse, LlmError> {
        let choice = body
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|arr| arr.first());

        let content = choice
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)?
            .to_string();

        let finish_reason = choice
            .and_then(|c| c.get("finish_reason"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let model = body
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or(fallback_model)
            .to_string();

        Ok(ChatResponse {
            content,
            model,
            finish_reason,
        })
    }

    fn map_error(status: u16, retry_after: Option<u64>, body: &str) -> LlmError {
        match status {
            401 | 403 => LlmError::AuthenticationError(body.to_string()),
            429 => LlmError::RateLimitExceeded { retry_after },
            _ => LlmError::ApiError {
                status,
                message: body.to_string(),
            },
        }
    }

    fn map_transport(err: &reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::NetworkError(err.to_string())
        }
    }
}

impl ChatClient for OpenAiChatClient {
    fn complete(&self, mut request: ChatRequest) -> Result<ChatResponse, LlmError> {
        if request.model.is_empty() {
            request.model.clone_from(&self.config.model);
        }

        let headers = self.build_headers()?;
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        log::debug!("POST {url} model={} messages={}", request.model, request.messages.len());

        let response = self
            .client
            .post(url)
            .headers(headers)
            .json(&request)
            .send()
            .map_err(|e| Self::map_transport(&e))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let text = response.text().map_err(|e| Self::map_transport(&e))?;

        if !status.is_success() {
            return Err(Self::map_error(status.as_u16(), retry_after, &text));
        }

        let body: Value = serde_json::from_str(&text).map_err(|e| LlmError::SerializationError(e.to_string()))?;
        Self::parse_response(&body, &request.model)
    }
}
