pub mod assess;
pub mod check;
pub mod init;
pub mod pricing;
pub mod providers;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Args;
use promptgauge_config::{AppConfig, RequestOverrides};
use promptgauge_core::ProviderMode;
use promptgauge_engine::{NarrationSchedule, Orchestrator};
use promptgauge_providers::{BackendRouter, HttpPreflight};

/// Backend selection flags shared by `assess` and `check`.
#[derive(Args, Default)]
pub struct BackendArgs {
    /// Backend mode: managed, ollama, openrouter, anthropic, openai, google, custom
    #[arg(long)]
    pub mode: Option<ProviderMode>,

    /// Model to request
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL (Ollama daemon or custom endpoint)
    #[arg(long)]
    pub base_url: Option<String>,

    /// API key for keyed-cloud and custom modes
    #[arg(long)]
    pub api_key: Option<String>,
}

impl BackendArgs {
    pub fn overrides(&self) -> RequestOverrides {
        RequestOverrides {
            mode: self.mode,
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
        }
    }
}

pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    AppConfig::load_with_env(path).with_context(|| format!("loading {}", path.display()))
}

pub fn preflight(config: &AppConfig) -> HttpPreflight {
    HttpPreflight::new(Duration::from_secs(config.http.preflight_timeout_secs))
}

/// Wire the orchestrator from settings.
pub fn orchestrator(config: &AppConfig) -> anyhow::Result<Orchestrator> {
    let catalog = Arc::new(config.catalog()?);
    let router = BackendRouter::new(Duration::from_secs(config.http.request_timeout_secs));
    let narration = if config.narration.enabled {
        NarrationSchedule::default()
    } else {
        NarrationSchedule::silent()
    };

    Ok(
        Orchestrator::new(catalog, Arc::new(router), Arc::new(preflight(config)))
            .with_narration(narration),
    )
}
