//! Google Gemini backend over the `generateContent` REST API.

use std::time::Duration;

use async_trait::async_trait;
use promptgauge_core::backend::Backend;
use promptgauge_core::error::ProviderError;
use promptgauge_core::message::CompiledPrompt;
use serde_json::{json, Value};
use tracing::debug;

use crate::http::{build_client, check_status, transport_error, DEFAULT_TIMEOUT};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini backend.
pub struct GoogleBackend {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GoogleBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: model.into(),
            client: build_client(DEFAULT_TIMEOUT),
        }
    }

    /// Create with a custom base URL (e.g., for testing).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    fn request_body(prompt: &CompiledPrompt) -> Value {
        json!({
            "systemInstruction": { "parts": [{ "text": prompt.system }] },
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt.user }],
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
            },
        })
    }

    fn extract_text(body: &Value) -> Result<String, ProviderError> {
        let text: String = body["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = body["promptFeedback"]["blockReason"]
                .as_str()
                .or_else(|| body["candidates"][0]["finishReason"].as_str())
                .unwrap_or("no candidates");
            return Err(ProviderError::InvalidResponse(format!(
                "Gemini returned no text ({reason})"
            )));
        }
        Ok(text)
    }
}

#[async_trait]
impl Backend for GoogleBackend {
    fn name(&self) -> &str {
        "google"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn dispatch(&self, prompt: &CompiledPrompt) -> Result<String, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        debug!(backend = "google", model = %self.model, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&Self::request_body(prompt))
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        // Gemini reports a bad key as 400 rather than 401.
        if response.status().as_u16() == 400 {
            let body = response.text().await.unwrap_or_default();
            if body.contains("API_KEY_INVALID") || body.contains("API key not valid") {
                return Err(ProviderError::AuthenticationFailed("Invalid Google API key".into()));
            }
            return Err(ProviderError::ApiError {
                status_code: 400,
                message: body,
            });
        }

        let response = check_status("google", &self.model, response).await?;
        let body: Value = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse Gemini response: {e}"))
        })?;

        Self::extract_text(&body)
    }
}
