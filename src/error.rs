//! Tolk error types

use std::time::Duration;

/// Tolk error types.
///
/// Translation calls on [`TranslationCache`](crate::TranslationCache) never
/// return these; they degrade to the source text instead. Errors surface only
/// from providers, stores, the builder and configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum TolkError {
    // Provider/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("request timed out")]
    Timeout,

    // Data errors
    #[error("empty response from provider")]
    EmptyResponse,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Persistence errors
    #[error("storage error: {0}")]
    Storage(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl TolkError {
    /// Whether a retry has a reasonable chance of succeeding.
    ///
    /// Rate limiting is not transient here: a 429 must reach the cache so it
    /// can start a cooldown.
    pub fn is_transient(&self) -> bool {
        match self {
            TolkError::Http(_) | TolkError::Timeout => true,
            TolkError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Whether the provider signalled overload (HTTP 429).
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, TolkError::RateLimited { .. })
    }

    /// Provider-supplied retry hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            TolkError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

/// Result type alias for Tolk operations
pub type Result<T> = std::result::Result<T, TolkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        let err = TolkError::Api {
            status: 503,
            message: "unavailable".into(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn client_errors_are_permanent() {
        let err = TolkError::Api {
            status: 403,
            message: "forbidden".into(),
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn rate_limit_is_not_transient() {
        let err = TolkError::RateLimited {
            retry_after: Some(Duration::from_secs(30)),
        };
        assert!(!err.is_transient());
        assert!(err.is_rate_limited());
        assert_eq!(err.retry_after(), Some(Duration::from_secs(30)));
    }
}
