//! Shared HTTP plumbing for the adapters.

use std::time::Duration;

use promptgauge_core::error::ProviderError;
use tracing::warn;

/// Default timeout for an assessment call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Build a client with the given timeout.
pub fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// Map a transport failure.
pub fn transport_error(e: &reqwest::Error) -> ProviderError {
    ProviderError::transport(e.to_string(), e.is_timeout())
}

/// Turn a non-success response into the matching [`ProviderError`].
///
/// Returns the response untouched on 2xx.
pub async fn check_status(
    backend: &str,
    model: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();
    if response.status().is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!(backend, status, body = %body, "Backend returned error");
    Err(classify_status(status, model, body))
}

/// Status-code to error mapping shared by every HTTP adapter. An empty
/// `model` means the call was not for a model, so a 404 is never
/// `ModelNotFound`.
pub fn classify_status(status: u16, model: &str, body: String) -> ProviderError {
    match status {
        401 | 403 => ProviderError::AuthenticationFailed(if body.is_empty() {
            "Invalid API key or insufficient permissions".into()
        } else {
            body
        }),
        429 => ProviderError::RateLimited {
            retry_after_secs: 5,
        },
        404 if !model.is_empty() && mentions_model(&body, model) => {
            ProviderError::ModelNotFound(model.to_string())
        }
        _ => ProviderError::ApiError {
            status_code: status,
            message: body,
        },
    }
}

fn mentions_model(body: &str, model: &str) -> bool {
    let lower = body.to_lowercase();
    lower.contains("model") && (lower.contains("not found") || lower.contains(&model.to_lowercase()))
}
