//! Configuration for symbol resolution

use crate::error::{ResolveError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the Alpha Vantage API key
pub const ALPHA_VANTAGE_KEY_VAR: &str = "ALPHA_VANTAGE_API_KEY";

/// Reference instruments used to seed the candidate cache
pub const DEFAULT_WATCHLIST: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "TSLA", "BRK-B", "JPM", "V", "WMT", "BAC",
    "DIS", "NFLX", "KO",
];

/// Configuration for symbol resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Quiet window before a typed query is resolved
    pub debounce_window: Duration,

    /// Maximum candidates returned by the cached fuzzy match
    pub max_fuzzy_results: usize,

    /// Maximum directory hits that get enriched
    pub max_directory_results: usize,

    /// Maximum derived ticker patterns tried
    pub max_ticker_patterns: usize,

    /// Longest derived ticker pattern considered
    pub max_pattern_len: usize,

    /// Symbols the candidate cache is populated from, in display order
    pub watchlist: Vec<String>,

    /// Transport timeout for HTTP providers
    pub request_timeout: Duration,

    /// Lifetime of memoized company profiles
    pub profile_ttl: Duration,

    /// Alpha Vantage requests allowed per minute
    pub alpha_vantage_rate_limit: u32,

    /// Alpha Vantage API key (optional)
    pub alpha_vantage_api_key: Option<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            debounce_window: Duration::from_millis(300),
            max_fuzzy_results: 5,
            max_directory_results: 5,
            max_ticker_patterns: 3,
            max_pattern_len: 4,
            watchlist: DEFAULT_WATCHLIST.iter().map(|s| (*s).to_string()).collect(),
            request_timeout: Duration::from_secs(10),
            profile_ttl: Duration::from_secs(3600), // 1 hour
            alpha_vantage_rate_limit: 5,            // free tier
            alpha_vantage_api_key: None,
        }
    }
}

impl ResolverConfig {
    /// Create a new configuration builder
    pub fn builder() -> ResolverConfigBuilder {
        ResolverConfigBuilder::default()
    }

    /// Load Alpha Vantage API key from environment
    pub fn with_env_api_key(mut self) -> Self {
        if let Ok(key) = std::env::var(ALPHA_VANTAGE_KEY_VAR) {
            self.alpha_vantage_api_key = Some(key);
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.debounce_window.is_zero() {
            return Err(ResolveError::ConfigError(
                "debounce_window must be greater than 0".to_string(),
            ));
        }

        if self.max_fuzzy_results == 0
            || self.max_directory_results == 0
            || self.max_ticker_patterns == 0
        {
            return Err(ResolveError::ConfigError(
                "result caps must be greater than 0".to_string(),
            ));
        }

        if self.max_pattern_len == 0 {
            return Err(ResolveError::ConfigError(
                "max_pattern_len must be greater than 0".to_string(),
            ));
        }

        if self.watchlist.iter().all(|s| s.trim().is_empty()) {
            return Err(ResolveError::ConfigError(
                "watchlist must name at least one symbol".to_string(),
            ));
        }

        if self.alpha_vantage_rate_limit == 0 {
            return Err(ResolveError::ConfigError(
                "alpha_vantage_rate_limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for ResolverConfig
#[derive(Debug, Default)]
pub struct ResolverConfigBuilder {
    debounce_window: Option<Duration>,
    max_fuzzy_results: Option<usize>,
    max_directory_results: Option<usize>,
    max_ticker_patterns: Option<usize>,
    max_pattern_len: Option<usize>,
    watchlist: Option<Vec<String>>,
    request_timeout: Option<Duration>,
    profile_ttl: Option<Duration>,
    alpha_vantage_rate_limit: Option<u32>,
    alpha_vantage_api_key: Option<String>,
}

impl ResolverConfigBuilder {
    /// Set the debounce quiet window
    pub fn debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = Some(window);
        self
    }

    /// Set the fuzzy match cap
    pub fn max_fuzzy_results(mut self, cap: usize) -> Self {
        self.max_fuzzy_results = Some(cap);
        self
    }

    /// Set the directory enrichment cap
    pub fn max_directory_results(mut self, cap: usize) -> Self {
        self.max_directory_results = Some(cap);
        self
    }

    /// Set the derived pattern cap
    pub fn max_ticker_patterns(mut self, cap: usize) -> Self {
        self.max_ticker_patterns = Some(cap);
        self
    }

    /// Set the longest derived pattern
    pub fn max_pattern_len(mut self, len: usize) -> Self {
        self.max_pattern_len = Some(len);
        self
    }

    /// Replace the cache watchlist
    pub fn watchlist<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.watchlist = Some(symbols.into_iter().map(Into::into).collect());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set profile memo lifetime
    pub fn profile_ttl(mut self, duration: Duration) -> Self {
        self.profile_ttl = Some(duration);
        self
    }

    /// Set Alpha Vantage requests per minute
    pub fn alpha_vantage_rate_limit(mut self, per_minute: u32) -> Self {
        self.alpha_vantage_rate_limit = Some(per_minute);
        self
    }

    /// Set Alpha Vantage API key
    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Load Alpha Vantage API key from environment
    pub fn with_env_api_key(mut self) -> Self {
        if let Ok(key) = std::env::var(ALPHA_VANTAGE_KEY_VAR) {
            self.alpha_vantage_api_key = Some(key);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ResolverConfig> {
        let defaults = ResolverConfig::default();

        let config = ResolverConfig {
            debounce_window: self.debounce_window.unwrap_or(defaults.debounce_window),
            max_fuzzy_results: self.max_fuzzy_results.unwrap_or(defaults.max_fuzzy_results),
            max_directory_results: self
                .max_directory_results
                .unwrap_or(defaults.max_directory_results),
            max_ticker_patterns: self
                .max_ticker_patterns
                .unwrap_or(defaults.max_ticker_patterns),
            max_pattern_len: self.max_pattern_len.unwrap_or(defaults.max_pattern_len),
            watchlist: self.watchlist.unwrap_or(defaults.watchlist),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            profile_ttl: self.profile_ttl.unwrap_or(defaults.profile_ttl),
            alpha_vantage_rate_limit: self
                .alpha_vantage_rate_limit
                .unwrap_or(defaults.alpha_vantage_rate_limit),
            alpha_vantage_api_key: self.alpha_vantage_api_key,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResolverConfig::default();
        assert_eq!(config.debounce_window, Duration::from_millis(300));
        assert_eq!(config.max_fuzzy_results, 5);
        assert_eq!(config.max_directory_results, 5);
        assert_eq!(config.max_ticker_patterns, 3);
        assert_eq!(config.max_pattern_len, 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ResolverConfig::builder()
            .debounce_window(Duration::from_millis(150))
            .watchlist(["AAPL", "MSFT"])
            .alpha_vantage_api_key("demo")
            .build()
            .unwrap();

        assert_eq!(config.debounce_window, Duration::from_millis(150));
        assert_eq!(config.watchlist, vec!["AAPL".to_string(), "MSFT".to_string()]);
        assert_eq!(config.alpha_vantage_api_key.as_deref(), Some("demo"));
    }

    #[test]
    fn test_validation_rejects_zero_window() {
        let result = ResolverConfig::builder()
            .debounce_window(Duration::ZERO)
            .build();
        assert!(matches!(result, Err(ResolveError::ConfigError(_))));
    }

    #[test]
    fn test_validation_rejects_empty_watchlist() {
        let config = ResolverConfig {
            watchlist: vec![" ".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_caps() {
        let config = ResolverConfig {
            max_fuzzy_results: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ResolverConfig {
            alpha_vantage_rate_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
