//! Query provider abstraction
//!
//! The pet asks a remote language model for a short reply during an
//! interaction. Providers implement [`Provider`]; the only shipped one is
//! the `OpenAI`-compatible chat-completions client.

mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use openai::OpenAIProvider;

use crate::config::QuerySettings;

/// Chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: &str) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
        }
    }

    pub fn system(content: &str) -> Self {
        Self {
            role: Role::System,
            content: content.to_string(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// Per-request options
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub system: Option<String>,
}

/// Completed reply
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub usage: Option<Usage>,
    pub finish_reason: Option<String>,
}

/// Token usage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    fn default_model(&self) -> &str;

    /// Options applied by [`complete`](Provider::complete).
    fn default_options(&self) -> ChatOptions {
        ChatOptions::default()
    }

    async fn chat(
        &self,
        messages: &[Message],
        options: &ChatOptions,
    ) -> Result<ChatResponse, ProviderError>;

    /// Single-prompt completion with the provider's default options.
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let response = self
            .chat(&[Message::user(prompt)], &self.default_options())
            .await?;
        if response.content.trim().is_empty() {
            return Err(ProviderError::ParseError("Empty completion".to_string()));
        }
        Ok(response.content)
    }
}

/// Provider errors
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Provider used when no API key is configured; every query fails.
#[derive(Debug, Default)]
pub struct UnconfiguredProvider;

#[async_trait]
impl Provider for UnconfiguredProvider {
    fn name(&self) -> &str {
        "unconfigured"
    }

    fn default_model(&self) -> &str {
        ""
    }

    async fn chat(
        &self,
        _messages: &[Message],
        _options: &ChatOptions,
    ) -> Result<ChatResponse, ProviderError> {
        Err(ProviderError::ConfigError(
            "no API key; set OPENAI_API_KEY or [query].api_key".to_string(),
        ))
    }
}

/// Build the configured provider, or one that always fails when no API key
/// is available.
pub fn from_settings(settings: &QuerySettings) -> Box<dyn Provider> {
    match OpenAIProvider::from_settings(settings) {
        Some(provider) => {
            tracing::info!(
                "Using {} provider with model {}",
                provider.name(),
                provider.default_model()
            );
            Box::new(provider)
        }
        None => {
            tracing::warn!("No API key configured; chat interactions will fail");
            Box::new(UnconfiguredProvider)
        }
    }
}
