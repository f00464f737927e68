//! Backend adapters for promptgauge.
//!
//! Every adapter implements `promptgauge_core::Backend`. The router maps a
//! request's `ModeConfig` to the right adapter, and [`HttpPreflight`] probes
//! the local daemon and custom endpoints before dispatch.

pub mod anthropic;
pub mod google;
pub mod http;
pub mod managed;
pub mod ollama;
pub mod openai_compat;
pub mod preflight;
pub mod router;

pub use anthropic::AnthropicBackend;
pub use google::GoogleBackend;
pub use managed::{GatewaySession, ManagedBackend, ManagedSession};
pub use ollama::OllamaBackend;
pub use openai_compat::OpenAiCompatBackend;
pub use preflight::{model_matches, HttpPreflight, DEFAULT_PREFLIGHT_TIMEOUT};
pub use router::BackendRouter;
