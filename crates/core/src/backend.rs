//! Backend traits: the seams between the orchestrator and the network.
//!
//! A [`Backend`] knows how to send a compiled prompt to one LLM family and
//! return the assistant's raw text. It never interprets that text: parsing
//! happens once, centrally, in the result normalizer.
//!
//! Implementations: managed session, Ollama, OpenAI-compatible (OpenAI,
//! OpenRouter, custom endpoints), Anthropic, Google Gemini.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::CompiledPrompt;
use crate::request::ModeConfig;

/// The uniform dispatch interface every adapter exposes.
#[async_trait]
pub trait Backend: Send + Sync {
    /// A human-readable name for this backend (e.g., "ollama", "anthropic").
    fn name(&self) -> &str;

    /// The model this backend will request.
    fn model(&self) -> &str;

    /// Send the compiled prompt and return the raw assistant text.
    async fn dispatch(&self, prompt: &CompiledPrompt) -> std::result::Result<String, ProviderError>;
}

/// Builds the adapter for a request's mode configuration.
pub trait BackendFactory: Send + Sync {
    fn backend_for(&self, config: &ModeConfig) -> Arc<dyn Backend>;
}

/// Outcome of a reachability/model-availability probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreflightOutcome {
    pub ok: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Advisory only: an installed model worth switching to. Never changes
    /// which model is dispatched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_suggestion: Option<String>,
}

impl PreflightOutcome {
    pub fn ready() -> Self {
        Self {
            ok: true,
            error: None,
            model_suggestion: None,
        }
    }

    pub fn ready_with_suggestion(model: impl Into<String>) -> Self {
        Self {
            ok: true,
            error: None,
            model_suggestion: Some(model.into()),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            model_suggestion: None,
        }
    }
}

/// Probe run before dispatch for local-daemon and custom-endpoint modes.
#[async_trait]
pub trait Preflight: Send + Sync {
    /// Check the backend described by `config`. Modes that need no probe
    /// report ready.
    async fn check(&self, config: &ModeConfig) -> PreflightOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_wire_shape() {
        let json = serde_json::to_value(PreflightOutcome::ready_with_suggestion("gpt-oss:20b")).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["modelSuggestion"], "gpt-oss:20b");
        assert!(json.get("error").is_none());

        let failed = serde_json::to_value(PreflightOutcome::failed("unreachable")).unwrap();
        assert_eq!(failed["ok"], false);
        assert_eq!(failed["error"], "unreachable");
    }
}
