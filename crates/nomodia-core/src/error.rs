//! Error types shared across the nomodia crates.
//!
//! `ProviderError` lives here rather than in `nomodia-providers` so the
//! question supply adapter can downcast provider failures and note
//! permanent ones or a requested retry delay in the fallback reason.

use thiserror::Error;

/// Errors that can occur when interacting with a generative text provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (missing or invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

impl ProviderError {
    /// Returns `true` if retrying the same request cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ProviderError::AuthenticationFailed(_) | ProviderError::ModelNotFound(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            ProviderError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// Why a request for replacement general questions did not produce any.
#[derive(Debug, Error)]
pub enum SupplyError {
    /// The provider call itself failed.
    #[error("question provider failed: {0:#}")]
    Provider(#[source] anyhow::Error),

    /// The provider answered, but no question list could be extracted.
    #[error("could not parse questions from response: {0}")]
    Parse(String),

    /// A list was extracted but held no usable statements.
    #[error("provider returned no questions")]
    Empty,
}

/// Failures of the key-value session store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Keys become file names, so path separators are rejected.
    #[error("invalid store key: '{0}'")]
    InvalidKey(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Problems found while validating a set of question pools.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("spiral pool needs exactly {expected} statements, found {found}")]
    SpiralLength { expected: usize, found: usize },

    #[error("emotional pool needs exactly {expected} statements, found {found}")]
    EmotionalLength { expected: usize, found: usize },

    #[error("general pool must not be empty")]
    EmptyGeneral,

    #[error("{pool} statement {index} is blank")]
    BlankStatement { pool: &'static str, index: usize },
}
