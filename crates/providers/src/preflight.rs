//! Reachability checks run before the costly assessment call.

use std::time::Duration;

use async_trait::async_trait;
use promptgauge_core::backend::{Preflight, PreflightOutcome};
use promptgauge_core::error::ProviderError;
use promptgauge_core::request::ModeConfig;
use tracing::{debug, warn};

use crate::http::build_client;
use crate::ollama;

/// Default timeout for a probe.
pub const DEFAULT_PREFLIGHT_TIMEOUT: Duration = Duration::from_secs(5);

/// Model family worth recommending when it is installed locally.
const SUGGESTED_FAMILY: &str = "gpt-oss";

/// HTTP preflight checker for the local daemon and custom endpoints.
pub struct HttpPreflight {
    client: reqwest::Client,
}

impl HttpPreflight {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
        }
    }

    async fn check_ollama(&self, base_url: &str, model: &str) -> PreflightOutcome {
        let installed = match ollama::list_models(&self.client, base_url).await {
            Ok(models) => models,
            Err(e) => {
                warn!(url = %base_url, error = %e, "Ollama unreachable");
                return PreflightOutcome::failed(format!(
                    "Cannot reach Ollama at {base_url}. Make sure Ollama is installed and running \
                     (`ollama serve`), and that OLLAMA_ORIGINS allows this client. ({e})"
                ));
            }
        };

        let configured_present = installed.iter().any(|name| model_matches(model, name));
        let suggestion = installed
            .iter()
            .find(|name| is_suggested_family(name) && !model_matches(model, name))
            .cloned();

        match (configured_present, suggestion) {
            (_, Some(tip)) => {
                debug!(model = %model, suggestion = %tip, "Suggesting installed model");
                PreflightOutcome::ready_with_suggestion(tip)
            }
            (true, None) => PreflightOutcome::ready(),
            (false, None) => {
                let listing = if installed.is_empty() {
                    "no models are installed".to_string()
                } else {
                    format!("installed: {}", installed.join(", "))
                };
                PreflightOutcome::failed(format!(
                    "Model \"{model}\" is not installed in Ollama ({listing}). \
                     Run `ollama pull {model}` and try again."
                ))
            }
        }
    }

    async fn check_custom(&self, base_url: &str, api_key: &str) -> PreflightOutcome {
        let url = format!("{base_url}/models");
        let mut request = self.client.get(&url);
        if !api_key.is_empty() {
            request = request.bearer_auth(api_key);
        }

        match request.send().await {
            Err(e) => {
                let err = ProviderError::transport(e.to_string(), e.is_timeout());
                warn!(url = %base_url, error = %err, "Custom endpoint unreachable");
                PreflightOutcome::failed(format!(
                    "Cannot reach endpoint at {base_url}. Check the base URL and your network. ({err})"
                ))
            }
            Ok(resp) if matches!(resp.status().as_u16(), 401 | 403) => {
                PreflightOutcome::failed(format!(
                    "Endpoint at {base_url} rejected the API key (status {}).",
                    resp.status().as_u16()
                ))
            }
            Ok(_) => PreflightOutcome::ready(),
        }
    }
}

impl Default for HttpPreflight {
    fn default() -> Self {
        Self::new(DEFAULT_PREFLIGHT_TIMEOUT)
    }
}

#[async_trait]
impl Preflight for HttpPreflight {
    async fn check(&self, config: &ModeConfig) -> PreflightOutcome {
        let base_url = config.effective_base_url().unwrap_or_default();
        match config {
            ModeConfig::LocalDaemon { .. } => {
                self.check_ollama(base_url, config.effective_model()).await
            }
            ModeConfig::CustomEndpoint { api_key, .. } => {
                self.check_custom(base_url, api_key).await
            }
            ModeConfig::Managed { .. } | ModeConfig::KeyedCloud { .. } => {
                PreflightOutcome::ready()
            }
        }
    }
}

/// Whether an installed Ollama model name satisfies the configured one.
///
/// A configured name without a tag matches any tag of that name.
pub fn model_matches(configured: &str, installed: &str) -> bool {
    if configured == installed {
        return true;
    }
    if configured.contains(':') {
        return false;
    }
    installed
        .split_once(':')
        .is_some_and(|(name, _tag)| name == configured)
}

fn is_suggested_family(name: &str) -> bool {
    name.split(':')
        .next()
        .is_some_and(|base| base.starts_with(SUGGESTED_FAMILY))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_name_matches_any_tag() {
        assert!(model_matches("llama3.2", "llama3.2:latest"));
        assert!(model_matches("llama3.2", "llama3.2:3b"));
        assert!(model_matches("llama3.2:3b", "llama3.2:3b"));
        assert!(!model_matches("llama3.2:3b", "llama3.2:latest"));
        assert!(!model_matches("llama3", "llama3.2:latest"));
    }

    #[test]
    fn gpt_oss_family() {
        assert!(is_suggested_family("gpt-oss:20b"));
        assert!(is_suggested_family("gpt-oss"));
        assert!(!is_suggested_family("llama3.2:latest"));
    }

    #[tokio::test]
    async fn cloud_modes_skip_probe() {
        let preflight = HttpPreflight::default();
        let outcome = preflight
            .check(&ModeConfig::Managed { model: None })
            .await;
        assert!(outcome.ok);
    }
}
