//! Backend router: maps a request's mode configuration to its adapter.

use std::sync::Arc;
use std::time::Duration;

use promptgauge_core::backend::{Backend, BackendFactory};
use promptgauge_core::request::{CloudProvider, ModeConfig};
use tracing::debug;

use crate::anthropic::AnthropicBackend;
use crate::google::GoogleBackend;
use crate::http::DEFAULT_TIMEOUT;
use crate::managed::{GatewaySession, ManagedBackend, ManagedSession};
use crate::ollama::OllamaBackend;
use crate::openai_compat::OpenAiCompatBackend;

/// Builds one adapter per request. Adapters are cheap; nothing is cached.
pub struct BackendRouter {
    request_timeout: Duration,
    session: Arc<dyn ManagedSession>,
}

impl BackendRouter {
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            request_timeout,
            session: Arc::new(GatewaySession::from_env().with_timeout(request_timeout)),
        }
    }

    /// Replace the managed session (e.g., with an already signed-in one).
    pub fn with_session(mut self, session: Arc<dyn ManagedSession>) -> Self {
        self.session = session;
        self
    }
}

impl Default for BackendRouter {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl BackendFactory for BackendRouter {
    fn backend_for(&self, config: &ModeConfig) -> Arc<dyn Backend> {
        let model = config.effective_model().to_string();
        let timeout = self.request_timeout;
        debug!(mode = %config.mode(), model = %model, "Selecting backend");

        match config {
            ModeConfig::Managed { .. } => Arc::new(ManagedBackend::new(self.session.clone(), model)),
            ModeConfig::LocalDaemon { .. } => Arc::new(
                OllamaBackend::new(config.effective_base_url().unwrap_or_default(), model)
                    .with_timeout(timeout),
            ),
            ModeConfig::KeyedCloud {
                provider, api_key, ..
            } => match provider {
                CloudProvider::OpenRouter => {
                    Arc::new(OpenAiCompatBackend::openrouter(api_key, model).with_timeout(timeout))
                }
                CloudProvider::OpenAi => {
                    Arc::new(OpenAiCompatBackend::openai(api_key, model).with_timeout(timeout))
                }
                CloudProvider::Anthropic => {
                    Arc::new(AnthropicBackend::new(api_key, model).with_timeout(timeout))
                }
                CloudProvider::Google => {
                    Arc::new(GoogleBackend::new(api_key, model).with_timeout(timeout))
                }
            },
            ModeConfig::CustomEndpoint { api_key, .. } => Arc::new(
                OpenAiCompatBackend::custom(
                    config.effective_base_url().unwrap_or_default(),
                    api_key,
                    model,
                )
                .with_timeout(timeout),
            ),
        }
    }
}
