/// Errors reported by a provider call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("request throttled: {0}")]
    Throttled(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("not authorized: {0}")]
    Unauthorized(String),

    #[error("invalid continuation token: {0}")]
    InvalidToken(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("cancelled")]
    Cancelled,
}

impl ProviderError {
    /// Worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Throttled(_) | ProviderError::Timeout(_))
    }

    /// Aborts the whole scan, not just one region.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProviderError::Unauthorized(_))
    }
}
