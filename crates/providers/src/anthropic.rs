//! Anthropic native backend.
//!
//! Uses Anthropic's Messages API directly:
//! - `x-api-key` header authentication (not Bearer)
//! - `anthropic-version` header
//! - System prompt as top-level field

use std::time::Duration;

use async_trait::async_trait;
use promptgauge_core::backend::Backend;
use promptgauge_core::error::ProviderError;
use promptgauge_core::message::{ChatMessage, CompiledPrompt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::{build_client, check_status, transport_error, DEFAULT_TIMEOUT};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
/// An assessment object with an optimized rewrite runs long.
const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Anthropic native Messages API backend.
pub struct AnthropicBackend {
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl AnthropicBackend {
    /// Create a new Anthropic backend.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            client: build_client(DEFAULT_TIMEOUT),
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    fn request_body(&self, prompt: &CompiledPrompt) -> MessagesRequest {
        MessagesRequest {
            model: self.model.clone(),
            system: prompt.system.clone(),
            messages: vec![ChatMessage::user(prompt.user.clone())],
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl Backend for AnthropicBackend {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn dispatch(&self, prompt: &CompiledPrompt) -> Result<String, ProviderError> {
        let url = format!("{}/v1/messages", self.base_url);

        debug!(backend = "anthropic", model = %self.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let response = check_status("anthropic", &self.model, response).await?;

        let api_resp: MessagesResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse Anthropic response: {e}"))
        })?;

        api_resp.into_text()
    }
}

// --- Anthropic API types (internal) ---

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    system: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl MessagesResponse {
    fn into_text(self) -> Result<String, ProviderError> {
        let text: String = self
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(ProviderError::InvalidResponse(
                "Anthropic response contained no text".into(),
            ));
        }
        Ok(text)
    }
}
