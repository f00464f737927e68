//! Local Ollama daemon backend.
//!
//! Talks to Ollama's native API rather than its OpenAI shim: `/api/chat` for
//! dispatch and `/api/tags` for the installed-model listing the preflight
//! check needs.

use std::time::Duration;

use async_trait::async_trait;
use promptgauge_core::backend::Backend;
use promptgauge_core::error::ProviderError;
use promptgauge_core::message::{ChatMessage, CompiledPrompt};
use promptgauge_core::request::{DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::{build_client, check_status, transport_error, DEFAULT_TIMEOUT};

/// Backend for a locally running Ollama daemon.
pub struct OllamaBackend {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client: build_client(DEFAULT_TIMEOUT),
        }
    }

    /// Replace the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Names of the models installed in the daemon, in listing order.
    pub async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        list_models(&self.client, &self.base_url).await
    }
}

impl Default for OllamaBackend {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_URL, DEFAULT_OLLAMA_MODEL)
    }
}

/// `GET {base}/api/tags`, shared with the preflight checker so it can use its
/// own short-timeout client.
pub(crate) async fn list_models(
    client: &reqwest::Client,
    base_url: &str,
) -> Result<Vec<String>, ProviderError> {
    let url = format!("{base_url}/api/tags");
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| transport_error(&e))?;
    let response = check_status("ollama", "", response).await?;

    let tags: TagsResponse = response.json().await.map_err(|e| {
        ProviderError::InvalidResponse(format!("Failed to parse Ollama model list: {e}"))
    })?;
    Ok(tags.models.into_iter().map(|m| m.name).collect())
}

#[async_trait]
impl Backend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn dispatch(&self, prompt: &CompiledPrompt) -> Result<String, ProviderError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = ChatRequest {
            model: self.model.clone(),
            messages: prompt.to_messages(),
            stream: false,
        };

        debug!(backend = "ollama", model = %self.model, url = %url, "Sending chat request");

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        let response = check_status("ollama", &self.model, response).await?;

        let chat: ChatResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse Ollama response: {e}"))
        })?;

        chat.message
            .map(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ProviderError::InvalidResponse("Ollama returned an empty message".into()))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let backend = OllamaBackend::default();
        assert_eq!(backend.base_url(), "http://localhost:11434");
        assert_eq!(backend.model(), "llama3.2");
        assert_eq!(backend.name(), "ollama");
    }

    #[test]
    fn chat_body_disables_streaming() {
        let body = ChatRequest {
            model: "llama3.2".into(),
            messages: CompiledPrompt::new("s", "u").to_messages(),
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["messages"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn parse_tags() {
        let data = r#"{"models":[{"name":"llama3.2:latest","size":1},{"name":"gpt-oss:20b"}]}"#;
        let tags: TagsResponse = serde_json::from_str(data).unwrap();
        let names: Vec<_> = tags.models.into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["llama3.2:latest", "gpt-oss:20b"]);
    }
}
