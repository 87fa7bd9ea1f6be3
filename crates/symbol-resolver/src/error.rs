//! Error types for symbol resolution providers

use thiserror::Error;

/// Provider and configuration errors
///
/// These never cross a strategy boundary: strategies log them and treat the
/// lookup as a miss.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// API request failed
    #[error("API error: {0}")]
    ApiError(String),

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Alpha Vantage API error
    #[error("Alpha Vantage error: {0}")]
    AlphaVantageError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, ResolveError>;
