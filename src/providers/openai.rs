//! `OpenAI` Provider
//!
//! Chat-completions client for `OpenAI` and compatible endpoints.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{ChatOptions, ChatResponse, Message, Provider, ProviderError, Usage};
use crate::config::QuerySettings;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
    options: ChatOptions,
}

impl OpenAIProvider {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            base_url: OPENAI_API_URL.to_string(),
            default_model: "gpt-4o-mini".to_string(),
            options: ChatOptions::default(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = normalize_endpoint(url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                Client::new()
            });
        self
    }

    /// Build from settings, falling back to `OPENAI_API_KEY` / `OPENAI_BASE_URL`.
    ///
    /// Returns `None` when no API key is available.
    pub fn from_settings(settings: &QuerySettings) -> Option<Self> {
        let api_key = settings
            .api_key
            .clone()
            .or_else(|| env::var("OPENAI_API_KEY").ok())?;

        let mut provider = Self::new(&api_key).with_timeout(settings.timeout());

        if let Some(url) = settings
            .base_url
            .clone()
            .or_else(|| env::var("OPENAI_BASE_URL").ok())
        {
            provider = provider.with_base_url(&url);
        }

        provider.default_model = settings.model.clone();
        provider.options = ChatOptions {
            model: None,
            temperature: Some(settings.temperature),
            max_tokens: Some(settings.max_tokens),
            system: settings.system_prompt.clone(),
        };

        Some(provider)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_body(&self, messages: &[Message], options: &ChatOptions) -> serde_json::Value {
        let model = options
            .model
            .clone()
            .unwrap_or_else(|| self.default_model.clone());

        // System prompt goes first
        let mut all_messages = Vec::with_capacity(messages.len() + 1);
        if let Some(ref system) = options.system {
            all_messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        all_messages.extend(messages.iter().map(|m| OpenAIMessage {
            role: m.role.as_str().to_string(),
            content: m.content.clone(),
        }));

        let mut body = json!({
            "model": model,
            "messages": all_messages,
        });

        if let Some(max_tokens) = options.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        if let Some(temp) = options.temperature {
            body["temperature"] = json!(temp);
        }

        body
    }
}

/// Ensure the URL points at the chat/completions endpoint.
fn normalize_endpoint(url: &str) -> String {
    if url.ends_with("/v1") {
        format!("{url}/chat/completions")
    } else if !url.contains("/chat/completions") {
        format!("{}/chat/completions", url.trim_end_matches('/'))
    } else {
        url.to_string()
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn default_options(&self) -> ChatOptions {
        self.options.clone()
    }

    async fn chat(
        &self,
        messages: &[Message],
        options: &ChatOptions,
    ) -> Result<ChatResponse, ProviderError> {
        let body = self.request_body(messages, options);

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(match status.as_u16() {
                401 => ProviderError::InvalidApiKey,
                429 => ProviderError::RateLimited,
                _ => ProviderError::ApiError(format!("{status}: {text}")),
            });
        }

        let api_response: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        parse_response(api_response)
    }
}

fn parse_response(api_response: OpenAIResponse) -> Result<ChatResponse, ProviderError> {
    let choice = api_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::ParseError("No choices in response".to_string()))?;

    Ok(ChatResponse {
        content: choice.message.content.unwrap_or_default(),
        usage: api_response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }),
        finish_reason: choice.finish_reason,
    })
}

// Wire types for the OpenAI API

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}
