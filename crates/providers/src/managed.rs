//! Managed-session backend.
//!
//! Authentication belongs to a session the adapter does not own. The
//! adapter only asks the session for a completion; any failure comes back
//! as [`ProviderError::SessionUnavailable`], which the orchestrator turns
//! into the "switch to the local daemon" fallback signal.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use promptgauge_core::backend::Backend;
use promptgauge_core::error::ProviderError;
use promptgauge_core::message::CompiledPrompt;
use tracing::{debug, warn};

use crate::openai_compat::OpenAiCompatBackend;

/// Hosted OpenAI-compatible gateway used by the default session.
pub const MANAGED_GATEWAY_URL: &str = "https://api.puter.com/puterai/openai/v1";
/// Environment variable holding the session token.
pub const SESSION_TOKEN_ENV: &str = "PUTER_AUTH_TOKEN";
/// Environment variable overriding the gateway URL.
pub const GATEWAY_URL_ENV: &str = "PROMPTGAUGE_MANAGED_URL";

/// An authenticated session able to run a chat completion.
#[async_trait]
pub trait ManagedSession: Send + Sync {
    async fn chat(&self, model: &str, prompt: &CompiledPrompt) -> Result<String, ProviderError>;
}

/// Session backed by the hosted gateway and a bearer token.
pub struct GatewaySession {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl GatewaySession {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.filter(|t| !t.trim().is_empty()),
            timeout: crate::http::DEFAULT_TIMEOUT,
        }
    }

    /// Session configured from `PUTER_AUTH_TOKEN` and, if set,
    /// `PROMPTGAUGE_MANAGED_URL`.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(GATEWAY_URL_ENV).unwrap_or_else(|_| MANAGED_GATEWAY_URL.to_string());
        Self::new(base_url, std::env::var(SESSION_TOKEN_ENV).ok())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.is_some()
    }
}

#[async_trait]
impl ManagedSession for GatewaySession {
    async fn chat(&self, model: &str, prompt: &CompiledPrompt) -> Result<String, ProviderError> {
        let Some(token) = &self.token else {
            return Err(ProviderError::SessionUnavailable(format!(
                "Not signed in to the managed service (set {SESSION_TOKEN_ENV})"
            )));
        };
        OpenAiCompatBackend::new("managed", &self.base_url, token, model)
            .with_timeout(self.timeout)
            .dispatch(prompt)
            .await
    }
}

/// The managed-mode adapter.
pub struct ManagedBackend {
    session: Arc<dyn ManagedSession>,
    model: String,
}

impl ManagedBackend {
    pub fn new(session: Arc<dyn ManagedSession>, model: impl Into<String>) -> Self {
        Self {
            session,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Backend for ManagedBackend {
    fn name(&self) -> &str {
        "managed"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn dispatch(&self, prompt: &CompiledPrompt) -> Result<String, ProviderError> {
        debug!(backend = "managed", model = %self.model, "Dispatching through managed session");

        self.session
            .chat(&self.model, prompt)
            .await
            .map_err(|e| match e {
                ProviderError::SessionUnavailable(_) => e,
                other => {
                    warn!(error = %other, "Managed session call failed");
                    ProviderError::SessionUnavailable(describe(&other))
                }
            })
    }
}

/// User-facing reason for a failed managed call.
fn describe(err: &ProviderError) -> String {
    match err {
        ProviderError::AuthenticationFailed(_) => {
            "The managed session was rejected. Sign in again or switch to a local model.".into()
        }
        ProviderError::RateLimited { .. } => {
            "The managed service's usage limit was reached. Try again later or switch to a local model.".into()
        }
        ProviderError::Network(_) | ProviderError::Timeout(_) => {
            format!("The managed service could not be reached ({err}).")
        }
        other => other.to_string(),
    }
}
