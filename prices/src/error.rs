//! Price lookup error types.

/// Errors a price feed can raise for one lookup.
///
/// A symbol the provider simply has no price for is not an error; feeds
/// return `Ok(PriceQuote::Unavailable)` for that.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PriceError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("rate limit exceeded")]
    RateLimit,

    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("{0}")]
    Other(String),
}

impl PriceError {
    /// Whether another attempt might succeed.
    ///
    /// Transport failures, timeouts and rate limiting are transient. A bad
    /// symbol or an unparseable payload will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PriceError::Connection(_) | PriceError::Timeout(_) | PriceError::RateLimit
        )
    }
}
