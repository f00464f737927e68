//! Configuration loading, validation, and persistence for promptgauge.
//!
//! Loads settings from `~/.promptgauge/config.toml` with environment
//! variable overrides, and resolves them into a fully formed
//! [`AssessmentRequest`]. The assessment engine never reads this store
//! directly; it only ever sees the resolved request.

use promptgauge_core::request::{AssessmentRequest, ModeConfig, ProviderMode};
use promptgauge_pricing::{PricingCatalog, PricingEntry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "PROMPTGAUGE_CONFIG";

/// The root configuration structure.
///
/// Maps directly to `~/.promptgauge/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Last-used backend mode
    #[serde(default = "default_mode")]
    pub mode: String,

    /// API key for keyed-cloud and custom modes (persisted only when
    /// `save_credentials` is set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL for the custom endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Model for keyed-cloud and custom modes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Model for the managed session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_model: Option<String>,

    /// Ollama daemon URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ollama_url: Option<String>,

    /// Ollama model name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ollama_model: Option<String>,

    /// Opt-in: write credentials to disk when saving
    #[serde(default)]
    pub save_credentials: bool,

    /// HTTP timeouts
    #[serde(default)]
    pub http: HttpConfig,

    /// Progress narration
    #[serde(default)]
    pub narration: NarrationConfig,

    /// Replacement pricing catalog; empty means the built-in one
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pricing: Vec<PricingEntry>,
}

fn default_mode() -> String {
    "managed".into()
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("mode", &self.mode)
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("managed_model", &self.managed_model)
            .field("ollama_url", &self.ollama_url)
            .field("ollama_model", &self.ollama_model)
            .field("save_credentials", &self.save_credentials)
            .field("http", &self.http)
            .field("narration", &self.narration)
            .field("pricing", &self.pricing.len())
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Timeout for the assessment call itself
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout for the preflight probe
    #[serde(default = "default_preflight_timeout")]
    pub preflight_timeout_secs: u64,
}

fn default_request_timeout() -> u64 {
    120
}
fn default_preflight_timeout() -> u64 {
    5
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            preflight_timeout_secs: default_preflight_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Per-invocation overrides, typically from CLI flags.
#[derive(Clone, Default)]
pub struct RequestOverrides {
    pub mode: Option<ProviderMode>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for RequestOverrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOverrides")
            .field("mode", &self.mode)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from `path`, then apply environment overrides:
    /// - `PROMPTGAUGE_MODE`
    /// - `PROMPTGAUGE_API_KEY`
    /// - `PROMPTGAUGE_MODEL`
    /// - `PROMPTGAUGE_BASE_URL`
    /// - `OLLAMA_HOST`
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(mode) = lookup("PROMPTGAUGE_MODE") {
            self.mode = mode;
        }
        if let Some(key) = lookup("PROMPTGAUGE_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(model) = lookup("PROMPTGAUGE_MODEL") {
            self.model = Some(model);
        }
        if let Some(url) = lookup("PROMPTGAUGE_BASE_URL") {
            self.base_url = Some(url);
        }
        if let Some(host) = lookup("OLLAMA_HOST") {
            self.ollama_url = Some(normalize_ollama_host(&host));
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".promptgauge")
    }

    /// Get the configuration file path, honouring `PROMPTGAUGE_CONFIG`.
    pub fn config_path() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::config_dir().join("config.toml"))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.provider_mode()?;

        if self.http.request_timeout_secs == 0 || self.http.preflight_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "http timeouts must be greater than 0".into(),
            ));
        }

        if !self.pricing.is_empty() {
            self.catalog()?;
        }

        Ok(())
    }

    /// The configured mode.
    pub fn provider_mode(&self) -> Result<ProviderMode, ConfigError> {
        self.mode.parse().map_err(ConfigError::ValidationError)
    }

    /// The pricing catalog: the configured replacement, or the built-in one.
    pub fn catalog(&self) -> Result<PricingCatalog, ConfigError> {
        if self.pricing.is_empty() {
            return Ok(PricingCatalog::builtin());
        }
        PricingCatalog::new(self.pricing.clone())
            .map_err(|e| ConfigError::ValidationError(format!("pricing: {e}")))
    }

    /// Build the mode-specific backend settings, reading only the fields
    /// that belong to the selected mode.
    pub fn mode_config(&self, overrides: &RequestOverrides) -> Result<ModeConfig, ConfigError> {
        let mode = match overrides.mode {
            Some(mode) => mode,
            None => self.provider_mode()?,
        };
        let pick = |over: &Option<String>, saved: &Option<String>| {
            present(over).or_else(|| present(saved))
        };

        let config = match mode {
            ProviderMode::Managed => ModeConfig::Managed {
                model: pick(&overrides.model, &self.managed_model),
            },
            ProviderMode::LocalDaemon => ModeConfig::LocalDaemon {
                base_url: pick(&overrides.base_url, &self.ollama_url),
                model: pick(&overrides.model, &self.ollama_model),
            },
            ProviderMode::KeyedCloud(provider) => ModeConfig::KeyedCloud {
                provider,
                api_key: pick(&overrides.api_key, &self.api_key).unwrap_or_default(),
                model: pick(&overrides.model, &self.model),
            },
            ProviderMode::CustomEndpoint => ModeConfig::CustomEndpoint {
                api_key: pick(&overrides.api_key, &self.api_key).unwrap_or_default(),
                base_url: pick(&overrides.base_url, &self.base_url),
                model: pick(&overrides.model, &self.model),
            },
        };
        Ok(config)
    }

    /// Resolve a complete request for the engine.
    pub fn resolve_request(
        &self,
        prompt: impl Into<String>,
        context: Option<String>,
        overrides: &RequestOverrides,
    ) -> Result<AssessmentRequest, ConfigError> {
        Ok(AssessmentRequest {
            prompt: prompt.into(),
            context,
            config: self.mode_config(overrides)?,
        })
    }

    /// Remember the settings used for a request (last-used mode, model,
    /// URLs). Credentials are only kept when `save_credentials` is on.
    pub fn remember(&mut self, config: &ModeConfig) {
        self.mode = config.mode().as_str().to_string();
        match config {
            ModeConfig::Managed { model } => {
                self.managed_model = model.clone();
            }
            ModeConfig::LocalDaemon { base_url, model } => {
                self.ollama_url = base_url.clone();
                self.ollama_model = model.clone();
            }
            ModeConfig::KeyedCloud { api_key, model, .. } => {
                self.api_key = Some(api_key.clone());
                self.model = model.clone();
            }
            ModeConfig::CustomEndpoint {
                api_key,
                base_url,
                model,
            } => {
                self.api_key = Some(api_key.clone());
                self.base_url = base_url.clone();
                self.model = model.clone();
            }
        }
    }

    /// Write the configuration to `path`. Without the credentials opt-in,
    /// the API key and custom base URL are scrubbed from the file.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let mut persisted = self.clone();
        if !persisted.save_credentials {
            persisted.api_key = None;
            persisted.base_url = None;
        }

        let content = toml::to_string_pretty(&persisted).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        std::fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        tracing::debug!(path = %path.display(), credentials = persisted.save_credentials, "Saved settings");
        Ok(())
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            api_key: None,
            base_url: None,
            model: None,
            managed_model: None,
            ollama_url: None,
            ollama_model: None,
            save_credentials: false,
            http: HttpConfig::default(),
            narration: NarrationConfig::default(),
            pricing: Vec::new(),
        }
    }
}

/// Trimmed, non-empty value.
fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// `OLLAMA_HOST` may be a bare `host:port`.
fn normalize_ollama_host(host: &str) -> String {
    let host = host.trim();
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Failed to write config file at {path}: {reason}")]
    WriteError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
