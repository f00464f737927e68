//! Error types for the promptgauge domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error type; [`AssessError`] is the
//! taxonomy surfaced to whoever calls `run_assessment`.

use thiserror::Error;

/// The top-level error returned by an assessment run.
#[derive(Debug, Error)]
pub enum AssessError {
    /// Missing prompt or missing required credential. Raised before any
    /// network activity.
    #[error("{0}")]
    Validation(String),

    /// The local daemon or custom endpoint failed its reachability check.
    /// Carries the probe's diagnostic text verbatim.
    #[error("{message}")]
    Preflight { message: String },

    /// The backend call itself failed.
    #[error("{backend} request failed: {source}")]
    Dispatch {
        backend: String,
        #[source]
        source: ProviderError,
    },

    /// The managed session failed. The caller should offer switching to
    /// the local daemon instead of treating this as a dead end.
    #[error("{reason}")]
    Fallback { reason: String },

    /// The backend answered, but not with a usable assessment object.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl AssessError {
    /// Stable machine-readable kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Preflight { .. } => "preflight_error",
            Self::Dispatch { .. } => "dispatch_error",
            Self::Fallback { .. } => "fallback_signal",
            Self::Parse(_) => "parse_error",
        }
    }

    /// Whether the caller should offer a backend switch.
    pub fn offers_mode_switch(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// The mode a caller should offer when [`offers_mode_switch`](Self::offers_mode_switch) is set.
    pub fn suggested_mode(&self) -> Option<crate::request::ProviderMode> {
        self.offers_mode_switch()
            .then_some(crate::request::ProviderMode::LocalDaemon)
    }
}

/// Result type alias for assessment runs.
pub type Result<T> = std::result::Result<T, AssessError>;

// --- Bounded context errors ---

/// A failed dispatch or probe against one backend.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unusable response: {0}")]
    InvalidResponse(String),

    /// The managed session could not complete the call (not signed in,
    /// quota exhausted, service down).
    #[error("Managed session unavailable: {0}")]
    SessionUnavailable(String),
}

impl ProviderError {
    /// Stable machine-readable kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ApiError { .. } => "api_error",
            Self::RateLimited { .. } => "rate_limited",
            Self::AuthenticationFailed(_) => "authentication_failed",
            Self::ModelNotFound(_) => "model_not_found",
            Self::Timeout(_) => "timeout",
            Self::Network(_) => "network",
            Self::InvalidResponse(_) => "invalid_response",
            Self::SessionUnavailable(_) => "session_unavailable",
        }
    }

    /// Only managed-session failures are recoverable: they come with a
    /// "switch backend" next step.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::SessionUnavailable(_))
    }

    /// Map a `reqwest`-style transport failure message into the right variant.
    pub fn transport(message: impl Into<String>, timed_out: bool) -> Self {
        if timed_out {
            Self::Timeout(message.into())
        } else {
            Self::Network(message.into())
        }
    }
}

/// The backend's text could not be turned into an assessment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Backend returned malformed JSON: {0}")]
    MalformedJson(String),

    #[error("Backend returned JSON that is not an object (found {0})")]
    NotAnObject(&'static str),

    #[error("Backend response is incomplete: missing required field `{0}`")]
    MissingField(&'static str),

    #[error("Backend response field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ParseError {
    /// True for well-formed JSON that lacks or mistypes a field, false for
    /// text that is not a JSON object at all.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Self::MissingField(_) | Self::InvalidField { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ProviderMode;

    #[test]
    fn provider_error_displays_correctly() {
        let err = ProviderError::ApiError {
            status_code: 500,
            message: "upstream exploded".into(),
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("upstream exploded"));
        assert_eq!(err.kind(), "api_error");
    }

    #[test]
    fn only_session_failures_are_recoverable() {
        assert!(ProviderError::SessionUnavailable("signed out".into()).is_recoverable());
        assert!(!ProviderError::Network("refused".into()).is_recoverable());
        assert!(!ProviderError::AuthenticationFailed("bad key".into()).is_recoverable());
    }

    #[test]
    fn fallback_is_distinguishable() {
        let fallback = AssessError::Fallback {
            reason: "not signed in".into(),
        };
        assert!(fallback.offers_mode_switch());
        assert_eq!(fallback.suggested_mode(), Some(ProviderMode::LocalDaemon));
        assert_eq!(fallback.kind(), "fallback_signal");

        let dispatch = AssessError::Dispatch {
            backend: "openai".into(),
            source: ProviderError::Network("refused".into()),
        };
        assert!(!dispatch.offers_mode_switch());
        assert!(dispatch.suggested_mode().is_none());
        assert!(dispatch.to_string().contains("openai"));
    }

    #[test]
    fn parse_error_distinguishes_malformed_from_incomplete() {
        assert!(!ParseError::MalformedJson("eof".into()).is_incomplete());
        assert!(!ParseError::NotAnObject("array").is_incomplete());
        assert!(ParseError::MissingField("score").is_incomplete());
        let err = AssessError::from(ParseError::MissingField("score"));
        assert!(err.to_string().contains("score"));
        assert_eq!(err.kind(), "parse_error");
    }
}
