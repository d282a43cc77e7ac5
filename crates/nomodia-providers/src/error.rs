//! Provider error types and HTTP status classification.

pub use nomodia_core::error::ProviderError;

/// Seconds to wait when a 429 carries no usable `retry-after` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Map a transport failure to a provider error.
///
/// The URL is stripped from the message since it may carry an API key.
pub(crate) fn from_reqwest(e: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else {
        ProviderError::NetworkError(e.without_url().to_string())
    }
}

/// Pass successful responses through; classify everything else.
///
/// `extract_message` pulls a human-readable message out of the provider's
/// error body, falling back to the raw body when it returns `None`.
pub(crate) async fn check_status(
    response: reqwest::Response,
    model: &str,
    extract_message: fn(&str) -> Option<String>,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();
    if status < 400 {
        return Ok(response);
    }

    if status == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
            * 1000;
        return Err(ProviderError::RateLimited {
            retry_after_ms: retry_after,
        });
    }

    if status == 404 {
        return Err(ProviderError::ModelNotFound(model.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract_message(&body).unwrap_or(body);

    match status {
        401 | 403 => Err(ProviderError::AuthenticationFailed(message)),
        _ => Err(ProviderError::ApiError { status, message }),
    }
}

/// Error for a 2xx body that does not match the expected shape.
pub(crate) fn malformed_response(e: impl std::fmt::Display) -> ProviderError {
    ProviderError::ApiError {
        status: 0,
        message: format!("failed to parse response: {e}"),
    }
}
