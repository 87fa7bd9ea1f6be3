//! In-memory market used for offline runs and tests

use super::{DirectorySearch, ProfileProvider, QuoteProvider};
use crate::error::{ResolveError, Result};
use crate::model::{CompanyProfile, DirectoryEntry, QuoteSnapshot};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// One instrument known to the in-memory market
#[derive(Debug, Clone)]
pub struct Listing {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub market_cap: Option<f64>,
    pub quote: QuoteSnapshot,
}

impl Listing {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        sector: impl Into<String>,
        price: f64,
        previous_close: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            sector: sector.into(),
            market_cap: None,
            quote: QuoteSnapshot {
                current_price: Some(price),
                previous_close: Some(previous_close),
                day_high: Some(price.max(previous_close)),
                day_low: Some(price.min(previous_close)),
            },
        }
    }

    pub fn with_market_cap(mut self, market_cap: f64) -> Self {
        self.market_cap = Some(market_cap);
        self
    }

    pub fn with_quote(mut self, quote: QuoteSnapshot) -> Self {
        self.quote = quote;
        self
    }
}

/// Deterministic quote/profile/directory provider
///
/// Listings keep insertion order, which is also the directory result order.
/// Every call is counted so tests can assert which collaborators were hit.
#[derive(Debug, Default)]
pub struct InMemoryMarket {
    listings: Vec<Listing>,
    latency: Duration,
    symbol_latency: HashMap<String, Duration>,
    search_latency: Duration,
    failing_quotes: HashSet<String>,
    failing_profiles: bool,
    failing_directory: bool,
    quote_calls: AtomicUsize,
    profile_calls: AtomicUsize,
    search_calls: AtomicUsize,
    quote_log: Mutex<Vec<String>>,
}

impl InMemoryMarket {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small fixed market of well-known US listings
    pub fn sample() -> Self {
        Self::new()
            .with_listing(
                Listing::new("AAPL", "Apple Inc.", "Technology", 229.87, 226.05)
                    .with_market_cap(3.45e12),
            )
            .with_listing(
                Listing::new("MSFT", "Microsoft Corporation", "Technology", 415.10, 418.32)
                    .with_market_cap(3.09e12),
            )
            .with_listing(
                Listing::new("GOOGL", "Alphabet Inc. Class A", "Communication Services", 165.30, 163.95)
                    .with_market_cap(2.03e12),
            )
            .with_listing(
                Listing::new("AMZN", "Amazon.com Inc.", "Consumer Cyclical", 186.40, 184.72)
                    .with_market_cap(1.95e12),
            )
            .with_listing(
                Listing::new("NVDA", "NVIDIA Corporation", "Technology", 121.44, 118.85)
                    .with_market_cap(2.98e12),
            )
            .with_listing(
                Listing::new("META", "Meta Platforms Inc.", "Communication Services", 563.33, 559.10)
                    .with_market_cap(1.42e12),
            )
            .with_listing(
                Listing::new("TSLA", "Tesla Inc.", "Consumer Cyclical", 248.50, 251.52)
                    .with_market_cap(7.9e11),
            )
            .with_listing(
                Listing::new("JPM", "JPMorgan Chase & Co.", "Financial Services", 211.67, 210.04)
                    .with_market_cap(6.0e11),
            )
            .with_listing(
                Listing::new("V", "Visa Inc.", "Financial Services", 279.05, 277.64)
                    .with_market_cap(5.5e11),
            )
            .with_listing(
                Listing::new("WMT", "Walmart Inc.", "Consumer Defensive", 80.12, 79.65)
                    .with_market_cap(6.4e11),
            )
            .with_listing(
                Listing::new("BAC", "Bank of America Corp", "Financial Services", 39.91, 40.22)
                    .with_market_cap(3.1e11),
            )
            .with_listing(
                Listing::new("DIS", "The Walt Disney Company", "Communication Services", 94.30, 93.10)
                    .with_market_cap(1.71e11),
            )
            .with_listing(
                Listing::new("NFLX", "Netflix Inc.", "Communication Services", 707.35, 701.03)
                    .with_market_cap(3.03e11),
            )
            .with_listing(
                Listing::new("KO", "The Coca-Cola Company", "Consumer Defensive", 69.72, 70.15)
                    .with_market_cap(3.0e11),
            )
            .with_listing(
                Listing::new("IBM", "International Business Machines", "Technology", 231.20, 229.58)
                    .with_market_cap(2.14e11),
            )
            .with_listing(
                Listing::new("GE", "General Electric Company", "Industrials", 187.55, 185.90)
                    .with_market_cap(2.03e11),
            )
            .with_listing(
                Listing::new("F", "Ford Motor Company", "Consumer Cyclical", 10.85, 10.93)
                    .with_market_cap(4.3e10),
            )
            .with_listing(
                Listing::new("SBUX", "Starbucks Corporation", "Consumer Cyclical", 97.80, 96.95)
                    .with_market_cap(1.11e11),
            )
    }

    pub fn with_listing(mut self, listing: Listing) -> Self {
        self.listings.push(listing);
        self
    }

    /// Delay applied to every quote and profile call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Delay applied to quote and profile calls for one symbol, replacing the default
    pub fn with_symbol_latency(mut self, symbol: impl Into<String>, latency: Duration) -> Self {
        self.symbol_latency.insert(symbol.into(), latency);
        self
    }

    /// Delay applied to directory searches
    pub fn with_search_latency(mut self, latency: Duration) -> Self {
        self.search_latency = latency;
        self
    }

    /// Make quote lookups for `symbol` fail with a provider error
    pub fn with_failing_quote(mut self, symbol: impl Into<String>) -> Self {
        self.failing_quotes.insert(symbol.into());
        self
    }

    /// Make every profile lookup fail
    pub fn with_failing_profiles(mut self) -> Self {
        self.failing_profiles = true;
        self
    }

    /// Make every directory search fail
    pub fn with_failing_directory(mut self) -> Self {
        self.failing_directory = true;
        self
    }

    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Symbols passed to `get_quote`, in call order
    pub async fn quote_requests(&self) -> Vec<String> {
        self.quote_log.lock().await.clone()
    }

    fn listing(&self, symbol: &str) -> Option<&Listing> {
        self.listings.iter().find(|l| l.symbol == symbol)
    }

    async fn delay_for(&self, symbol: &str) {
        let latency = self
            .symbol_latency
            .get(symbol)
            .copied()
            .unwrap_or(self.latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl QuoteProvider for InMemoryMarket {
    async fn get_quote(&self, symbol: &str) -> Result<Option<QuoteSnapshot>> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        self.quote_log.lock().await.push(symbol.to_string());
        self.delay_for(symbol).await;

        if self.failing_quotes.contains(symbol) {
            return Err(ResolveError::ApiError(format!("quote feed unavailable for {symbol}")));
        }
        Ok(self.listing(symbol).map(|l| l.quote.clone()))
    }
}

#[async_trait]
impl ProfileProvider for InMemoryMarket {
    async fn get_profile(&self, symbol: &str) -> Result<Option<CompanyProfile>> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.delay_for(symbol).await;

        if self.failing_profiles {
            return Err(ResolveError::ApiError("profile feed unavailable".to_string()));
        }
        Ok(self.listing(symbol).map(|l| CompanyProfile {
            display_name: Some(l.name.clone()),
            sector_or_industry: Some(l.sector.clone()),
            market_capitalization: l.market_cap,
        }))
    }
}

#[async_trait]
impl DirectorySearch for InMemoryMarket {
    async fn search(&self, text: &str) -> Result<Vec<DirectoryEntry>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if !self.search_latency.is_zero() {
            tokio::time::sleep(self.search_latency).await;
        }

        if self.failing_directory {
            return Err(ResolveError::ApiError("directory unavailable".to_string()));
        }

        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .listings
            .iter()
            .filter(|l| {
                l.name.to_lowercase().contains(&needle) || l.symbol.eq_ignore_ascii_case(&needle)
            })
            .map(|l| DirectoryEntry::new(l.symbol.clone(), Some(&l.name)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_quote_and_profile() {
        let market = InMemoryMarket::sample();

        let quote = market.get_quote("AAPL").await.unwrap().unwrap();
        assert!(quote.validate().is_some());
        assert!(market.get_quote("NOPE").await.unwrap().is_none());

        let profile = market.get_profile("AAPL").await.unwrap().unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("Apple Inc."));

        assert_eq!(market.quote_calls(), 2);
        assert_eq!(market.profile_calls(), 1);
        assert_eq!(market.quote_requests().await, vec!["AAPL", "NOPE"]);
    }

    #[tokio::test]
    async fn test_directory_search_keeps_listing_order() {
        let market = InMemoryMarket::sample();
        let hits = market.search("corporation").await.unwrap();
        let symbols: Vec<_> = hits.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["MSFT", "NVDA", "SBUX"]);
    }

    #[tokio::test]
    async fn test_failures() {
        let market = InMemoryMarket::sample()
            .with_failing_quote("AAPL")
            .with_failing_profiles()
            .with_failing_directory();

        assert!(market.get_quote("AAPL").await.is_err());
        assert!(market.get_profile("MSFT").await.is_err());
        assert!(market.search("apple").await.is_err());
    }
}
