//! Configuration management utilities

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`Config::environment`]
pub const ENV_VAR: &str = "SYMBOL_SEARCH_ENV";

/// Environment variable overriding [`Config::log_filter`]
pub const LOG_VAR: &str = "SYMBOL_SEARCH_LOG";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Environment (dev, prod, etc.)
    pub environment: String,
    /// Default tracing filter directive when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "symbol-search".to_string(),
            environment: "development".to_string(),
            log_filter: "warn,symbol_resolver=info,symbol_cli=info".to_string(),
        }
    }
}

impl Config {
    /// Build a configuration from defaults plus environment overrides
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration using `lookup` to resolve override variables
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(environment) = lookup(ENV_VAR).filter(|v| !v.trim().is_empty()) {
            config.environment = environment;
        }
        if let Some(filter) = lookup(LOG_VAR).filter(|v| !v.trim().is_empty()) {
            config.log_filter = filter;
        }
        config
    }

    /// Whether this is a production deployment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
            || self.environment.eq_ignore_ascii_case("prod")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.app_name, "symbol-search");
        assert!(!config.is_production());
    }

    #[test]
    fn test_overrides_from_lookup() {
        let config = Config::from_lookup(|key| match key {
            ENV_VAR => Some("prod".to_string()),
            LOG_VAR => Some("debug".to_string()),
            _ => None,
        });

        assert!(config.is_production());
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_blank_overrides_are_ignored() {
        let config = Config::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_serde_roundtrip_shape() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["app_name"], "symbol-search");
    }
}
