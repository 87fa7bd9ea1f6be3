//! Alpha Vantage API client

use super::{DirectorySearch, ProfileProvider};
use crate::config::{ALPHA_VANTAGE_KEY_VAR, ResolverConfig};
use crate::error::{ResolveError, Result};
use crate::model::{CompanyProfile, DirectoryEntry};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER: &str = "Alpha Vantage";

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Alpha Vantage API client
///
/// Serves company profiles (`OVERVIEW`) and the instrument directory
/// (`SYMBOL_SEARCH`). All requests share one per-minute rate limiter.
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    rate_limiter: SharedRateLimiter,
}

/// Subset of the company overview payload
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct CompanyOverview {
    name: Option<String>,
    sector: Option<String>,
    industry: Option<String>,
    market_capitalization: Option<String>,
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `rate_limit` - Maximum requests per minute (5 on the free tier)
    /// * `timeout` - Per-request transport timeout
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Result<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Create from a resolver configuration, which must carry an API key
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let api_key = config.alpha_vantage_api_key.as_deref().ok_or_else(|| {
            ResolveError::ConfigError(format!("{ALPHA_VANTAGE_KEY_VAR} environment variable not set"))
        })?;
        Self::new(api_key, config.alpha_vantage_rate_limit, config.request_timeout)
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<serde_json::Value> {
        // Wait for rate limiter
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(BASE_URL)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ResolveError::AlphaVantageError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let data: serde_json::Value = response.json().await?;
        check_api_errors(&data)?;
        Ok(data)
    }
}

/// Map Alpha Vantage's in-body error conventions onto errors
fn check_api_errors(data: &serde_json::Value) -> Result<()> {
    if let Some(error) = data.get("Error Message") {
        return Err(ResolveError::AlphaVantageError(error.to_string()));
    }

    // Throttled responses carry a "Note" or, more recently, "Information"
    if data.get("Note").is_some() || data.get("Information").is_some() {
        return Err(ResolveError::RateLimitExceeded {
            provider: PROVIDER.to_string(),
        });
    }

    Ok(())
}

/// Alpha Vantage reports missing fields as "None" or "-"
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != "None" && v != "-")
}

fn parse_overview(data: serde_json::Value) -> Result<Option<CompanyProfile>> {
    // Unknown symbols come back as an empty object
    if data.as_object().is_none_or(serde_json::Map::is_empty) {
        return Ok(None);
    }

    let overview: CompanyOverview = serde_json::from_value(data)?;
    let market_capitalization = present(overview.market_capitalization)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|cap| cap.is_finite() && *cap > 0.0);

    Ok(Some(CompanyProfile {
        display_name: present(overview.name),
        sector_or_industry: present(overview.sector).or_else(|| present(overview.industry)),
        market_capitalization,
    }))
}

fn parse_search(data: &serde_json::Value) -> Vec<DirectoryEntry> {
    let Some(matches) = data.get("bestMatches").and_then(serde_json::Value::as_array) else {
        return Vec::new();
    };

    matches
        .iter()
        .filter_map(|m| {
            let symbol = m["1. symbol"].as_str()?.trim();
            if symbol.is_empty() {
                return None;
            }
            Some(DirectoryEntry::new(symbol, m["2. name"].as_str()))
        })
        .collect()
}

#[async_trait]
impl ProfileProvider for AlphaVantageClient {
    async fn get_profile(&self, symbol: &str) -> Result<Option<CompanyProfile>> {
        let data = self.query(&[("function", "OVERVIEW"), ("symbol", symbol)]).await?;
        let profile = parse_overview(data)?;
        if profile.is_none() {
            debug!(symbol, "no company overview");
        }
        Ok(profile)
    }
}

#[async_trait]
impl DirectorySearch for AlphaVantageClient {
    async fn search(&self, text: &str) -> Result<Vec<DirectoryEntry>> {
        let data = self
            .query(&[("function", "SYMBOL_SEARCH"), ("keywords", text)])
            .await?;
        Ok(parse_search(&data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = AlphaVantageClient::new("test_key", 5, Duration::from_secs(5)).unwrap();
        assert_eq!(client.api_key, "test_key");
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = ResolverConfig::default();
        let err = AlphaVantageClient::from_config(&config).unwrap_err();
        assert!(matches!(err, ResolveError::ConfigError(_)));

        let config = ResolverConfig::builder().alpha_vantage_api_key("demo").build().unwrap();
        assert!(AlphaVantageClient::from_config(&config).is_ok());
    }

    #[test]
    fn test_api_errors() {
        let err = check_api_errors(&json!({"Error Message": "Invalid API call"})).unwrap_err();
        assert!(matches!(err, ResolveError::AlphaVantageError(_)));

        let err = check_api_errors(&json!({"Note": "call frequency"})).unwrap_err();
        assert!(matches!(err, ResolveError::RateLimitExceeded { .. }));

        let err = check_api_errors(&json!({"Information": "rate limit"})).unwrap_err();
        assert!(matches!(err, ResolveError::RateLimitExceeded { .. }));

        assert!(check_api_errors(&json!({"bestMatches": []})).is_ok());
    }

    #[test]
    fn test_parse_overview() {
        let data = json!({
            "Symbol": "IBM",
            "Name": "International Business Machines",
            "Sector": "TECHNOLOGY",
            "Industry": "COMPUTER & OFFICE EQUIPMENT",
            "MarketCapitalization": "180000000000",
            "PERatio": "22.1"
        });

        let profile = parse_overview(data).unwrap().unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("International Business Machines"));
        assert_eq!(profile.sector_or_industry.as_deref(), Some("TECHNOLOGY"));
        assert_eq!(profile.market_capitalization, Some(180_000_000_000.0));
    }

    #[test]
    fn test_parse_overview_falls_back_to_industry() {
        let data = json!({
            "Name": "Tiny Co",
            "Sector": "None",
            "Industry": "SHELL COMPANIES",
            "MarketCapitalization": "-"
        });

        let profile = parse_overview(data).unwrap().unwrap();
        assert_eq!(profile.sector_or_industry.as_deref(), Some("SHELL COMPANIES"));
        assert_eq!(profile.market_capitalization, None);
    }

    #[test]
    fn test_parse_overview_unknown_symbol() {
        assert!(parse_overview(json!({})).unwrap().is_none());
    }

    #[test]
    fn test_parse_search() {
        let data = json!({
            "bestMatches": [
                {"1. symbol": "TSCO.LON", "2. name": "Tesco PLC", "4. region": "United Kingdom"},
                {"1. symbol": "TSCDY", "2. name": "Tesco plc"},
                {"1. symbol": "", "2. name": "Blank"},
                {"2. name": "No symbol"}
            ]
        });

        let entries = parse_search(&data);
        assert_eq!(
            entries,
            vec![
                DirectoryEntry::new("TSCO.LON", Some("Tesco PLC")),
                DirectoryEntry::new("TSCDY", Some("Tesco plc")),
            ]
        );
        assert!(parse_search(&json!({})).is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires API key and network access
    async fn test_get_profile() {
        let config = ResolverConfig::default().with_env_api_key();
        let client = AlphaVantageClient::from_config(&config).unwrap();
        let profile = client.get_profile("AAPL").await.unwrap().unwrap();
        assert!(profile.display_name.unwrap().contains("Apple"));
    }
}
