//! OpenAI-compatible backend.
//!
//! Works with: OpenAI, OpenRouter, the managed gateway, and any custom
//! endpoint exposing `/chat/completions` with bearer-token auth (Together,
//! LM Studio, vLLM, ...).

use std::time::Duration;

use async_trait::async_trait;
use promptgauge_core::backend::Backend;
use promptgauge_core::error::ProviderError;
use promptgauge_core::message::{ChatMessage, CompiledPrompt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::{build_client, check_status, transport_error, DEFAULT_TIMEOUT};

/// OpenAI's public API.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// OpenRouter's OpenAI-compatible API.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// An OpenAI-compatible backend.
pub struct OpenAiCompatBackend {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiCompatBackend {
    /// Create a new OpenAI-compatible backend.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client: build_client(DEFAULT_TIMEOUT),
        }
    }

    /// Create an OpenAI backend (convenience constructor).
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new("openai", OPENAI_BASE_URL, api_key, model)
    }

    /// Create an OpenRouter backend (convenience constructor).
    pub fn openrouter(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new("openrouter", OPENROUTER_BASE_URL, api_key, model)
    }

    /// Create a custom-endpoint backend (convenience constructor).
    pub fn custom(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self::new("custom", base_url, api_key, model)
    }

    /// Replace the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_body(&self, prompt: &CompiledPrompt) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: prompt.to_messages(),
            stream: false,
        }
    }
}

#[async_trait]
impl Backend for OpenAiCompatBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn dispatch(&self, prompt: &CompiledPrompt) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.request_body(prompt);

        debug!(backend = %self.name, model = %self.model, "Sending completion request");

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await.map_err(|e| transport_error(&e))?;
        let response = check_status(&self.name, &self.model, response).await?;

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        api_response.into_text()
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, ProviderError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".into()))?;

        choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ProviderError::InvalidResponse("Empty assistant message".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openrouter_constructor() {
        let backend = OpenAiCompatBackend::openrouter("sk-test", "anthropic/claude-sonnet-4");
        assert_eq!(backend.name(), "openrouter");
        assert!(backend.base_url.contains("openrouter.ai"));
    }

    #[test]
    fn custom_constructor_trims_slash() {
        let backend = OpenAiCompatBackend::custom("http://localhost:1234/v1/", "k", "local-model");
        assert_eq!(backend.base_url(), "http://localhost:1234/v1");
        assert_eq!(backend.model(), "local-model");
    }

    #[test]
    fn request_body_shape() {
        let backend = OpenAiCompatBackend::openai("sk", "gpt-4o");
        let body = backend.request_body(&CompiledPrompt::new("sys", "usr"));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "usr");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn parse_choice_content() {
        let data = r#"{"id":"x","model":"gpt-4o","choices":[{"index":0,"message":{"role":"assistant","content":"{\"score\":1}"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.into_text().unwrap(), r#"{"score":1}"#);
    }

    #[test]
    fn empty_choices_is_invalid() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            parsed.into_text(),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn null_content_is_invalid() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(parsed.into_text().is_err());
    }
}
