//! Assessment requests and the per-mode backend configuration.
//!
//! The mode is not stored separately: it is derived from the
//! [`ModeConfig`] variant, so a request can never carry fields that belong
//! to another mode.

use serde::{Deserialize, Serialize};

use crate::error::AssessError;

/// Default base URL of a local Ollama daemon.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// Default model requested from a local Ollama daemon.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";
/// Default base URL for a custom OpenAI-compatible endpoint.
pub const DEFAULT_CUSTOM_BASE_URL: &str = "https://api.openai.com/v1";
/// Default model for a custom OpenAI-compatible endpoint.
pub const DEFAULT_CUSTOM_MODEL: &str = "gpt-4o";
/// Default model used through the managed session.
pub const DEFAULT_MANAGED_MODEL: &str = "gpt-4o-mini";

/// A named commercial API family reachable with a user-supplied key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    OpenRouter,
    Anthropic,
    OpenAi,
    Google,
}

impl CloudProvider {
    pub const ALL: [CloudProvider; 4] = [
        CloudProvider::OpenRouter,
        CloudProvider::Anthropic,
        CloudProvider::OpenAi,
        CloudProvider::Google,
    ];

    /// Config/CLI identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenRouter => "openrouter",
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Google => "google",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenRouter => "OpenRouter",
            Self::Anthropic => "Anthropic",
            Self::OpenAi => "OpenAI",
            Self::Google => "Google Gemini",
        }
    }

    /// Model used when the request does not name one.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenRouter => "anthropic/claude-sonnet-4",
            Self::Anthropic => "claude-sonnet-4-5-20250929",
            Self::OpenAi => "gpt-4o",
            Self::Google => "gemini-2.0-flash",
        }
    }
}

/// Which backend family handles a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderMode {
    Managed,
    LocalDaemon,
    KeyedCloud(CloudProvider),
    CustomEndpoint,
}

impl ProviderMode {
    /// Modes that run a reachability check before dispatch.
    pub fn needs_preflight(&self) -> bool {
        matches!(self, Self::LocalDaemon | Self::CustomEndpoint)
    }

    /// Config/CLI identifier (`managed`, `ollama`, `openai`, `custom`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Managed => "managed",
            Self::LocalDaemon => "ollama",
            Self::KeyedCloud(p) => p.as_str(),
            Self::CustomEndpoint => "custom",
        }
    }

    /// Human-readable name used in status text.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Managed => "managed session",
            Self::LocalDaemon => "Ollama",
            Self::KeyedCloud(p) => p.display_name(),
            Self::CustomEndpoint => "custom endpoint",
        }
    }
}

impl std::fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "managed" | "puter" => Ok(Self::Managed),
            "ollama" | "local" | "local-daemon" => Ok(Self::LocalDaemon),
            "openrouter" => Ok(Self::KeyedCloud(CloudProvider::OpenRouter)),
            "anthropic" => Ok(Self::KeyedCloud(CloudProvider::Anthropic)),
            "openai" => Ok(Self::KeyedCloud(CloudProvider::OpenAi)),
            "google" | "gemini" => Ok(Self::KeyedCloud(CloudProvider::Google)),
            "custom" | "custom-endpoint" => Ok(Self::CustomEndpoint),
            other => Err(format!(
                "unknown mode '{other}' (expected managed, ollama, openrouter, anthropic, openai, google or custom)"
            )),
        }
    }
}

/// Mode-specific backend settings. Exactly one variant is active per request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum ModeConfig {
    Managed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
    },
    LocalDaemon {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
    },
    KeyedCloud {
        provider: CloudProvider,
        api_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
    },
    CustomEndpoint {
        api_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        model: Option<String>,
    },
}

impl ModeConfig {
    pub fn mode(&self) -> ProviderMode {
        match self {
            Self::Managed { .. } => ProviderMode::Managed,
            Self::LocalDaemon { .. } => ProviderMode::LocalDaemon,
            Self::KeyedCloud { provider, .. } => ProviderMode::KeyedCloud(*provider),
            Self::CustomEndpoint { .. } => ProviderMode::CustomEndpoint,
        }
    }

    /// The model that will actually be dispatched, defaults applied.
    pub fn effective_model(&self) -> &str {
        match self {
            Self::Managed { model } => non_empty(model).unwrap_or(DEFAULT_MANAGED_MODEL),
            Self::LocalDaemon { model, .. } => non_empty(model).unwrap_or(DEFAULT_OLLAMA_MODEL),
            Self::KeyedCloud {
                provider, model, ..
            } => non_empty(model).unwrap_or(provider.default_model()),
            Self::CustomEndpoint { model, .. } => {
                non_empty(model).unwrap_or(DEFAULT_CUSTOM_MODEL)
            }
        }
    }

    /// The base URL for modes that take one, defaults applied, without a
    /// trailing slash.
    pub fn effective_base_url(&self) -> Option<&str> {
        match self {
            Self::LocalDaemon { base_url, .. } => Some(
                non_empty(base_url)
                    .unwrap_or(DEFAULT_OLLAMA_URL)
                    .trim_end_matches('/'),
            ),
            Self::CustomEndpoint { base_url, .. } => Some(
                non_empty(base_url)
                    .unwrap_or(DEFAULT_CUSTOM_BASE_URL)
                    .trim_end_matches('/'),
            ),
            Self::Managed { .. } | Self::KeyedCloud { .. } => None,
        }
    }

    /// The credential for modes that require one.
    pub fn api_key(&self) -> Option<&str> {
        match self {
            Self::KeyedCloud { api_key, .. } | Self::CustomEndpoint { api_key, .. } => {
                Some(api_key.as_str())
            }
            Self::Managed { .. } | Self::LocalDaemon { .. } => None,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Redact secrets for Debug output.
impl std::fmt::Debug for ModeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Managed { model } => f.debug_struct("Managed").field("model", model).finish(),
            Self::LocalDaemon { base_url, model } => f
                .debug_struct("LocalDaemon")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
            Self::KeyedCloud {
                provider, model, ..
            } => f
                .debug_struct("KeyedCloud")
                .field("provider", provider)
                .field("api_key", &"[REDACTED]")
                .field("model", model)
                .finish(),
            Self::CustomEndpoint {
                base_url, model, ..
            } => f
                .debug_struct("CustomEndpoint")
                .field("api_key", &"[REDACTED]")
                .field("base_url", base_url)
                .field("model", model)
                .finish(),
        }
    }
}

/// One assessment invocation, fully resolved by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRequest {
    /// The prompt under review. Required, non-empty after trimming.
    pub prompt: String,

    /// Optional description of the prompt's intended use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Backend selection and credentials.
    pub config: ModeConfig,
}

impl AssessmentRequest {
    pub fn new(prompt: impl Into<String>, config: ModeConfig) -> Self {
        Self {
            prompt: prompt.into(),
            context: None,
            config,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn mode(&self) -> ProviderMode {
        self.config.mode()
    }

    /// Trimmed prompt text.
    pub fn prompt_text(&self) -> &str {
        self.prompt.trim()
    }

    /// Trimmed context, `None` when absent or blank.
    pub fn context_text(&self) -> Option<&str> {
        non_empty(&self.context)
    }

    /// Check the request before anything touches the network.
    pub fn validate(&self) -> std::result::Result<(), AssessError> {
        if let Some(key) = self.config.api_key() {
            if key.trim().is_empty() {
                return Err(AssessError::Validation(format!(
                    "Please enter your API key for {} in the settings.",
                    self.mode().display_name()
                )));
            }
        }
        if self.prompt_text().is_empty() {
            return Err(AssessError::Validation(
                "Please enter a prompt to assess.".into(),
            ));
        }
        Ok(())
    }
}
