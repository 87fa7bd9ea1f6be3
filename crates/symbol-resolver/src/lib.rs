//! Stock symbol resolution engine
//!
//! Turns free-form input (a ticker, part of a company name, a loose spelling)
//! into a short list of priced candidates. It includes:
//!
//! - A fuzzy matcher over symbols and display names
//! - A write-once candidate cache seeded from a watchlist of popular symbols
//! - An ordered strategy pipeline that stops at the first strategy with hits
//! - A quiet-window debouncer for keystroke input
//! - A coordinator that tags each search with a generation id and cancels
//!   superseded ones, so only the latest search ever reaches the consumer
//!
//! # Architecture
//!
//! The pipeline tries, in order:
//! - `ExactSymbolLookup`: the query taken as a ticker
//! - `CachedFuzzyMatch`: fuzzy match against the watchlist snapshot
//! - `DirectorySearchByName`: free-text directory search, enriched with quotes
//! - `TickerPatternFallback`: tickers derived from the query's letters
//!
//! Market data comes from three traits in [`providers`]. Yahoo Finance serves
//! quotes and Alpha Vantage serves profiles and the directory;
//! [`providers::InMemoryMarket`] stands in for both offline.
//!
//! # Example
//!
//! ```rust,ignore
//! use symbol_resolver::{InMemoryMarket, Providers, ResolveEvent, ResolverConfig, SearchSession};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ResolverConfig::default();
//!     let providers = Providers::in_memory(Arc::new(InMemoryMarket::sample()));
//!
//!     let (session, mut events) = SearchSession::new(&config, providers);
//!     session.observe("starbucks");
//!
//!     if let Some(ResolveEvent::Resolved(result)) = events.recv().await {
//!         for candidate in &result.candidates {
//!             println!("{} {}", candidate.symbol, candidate.display_name);
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod cancel;
pub mod config;
pub mod coordinator;
pub mod debounce;
pub mod error;
pub mod fuzzy;
pub mod lookup;
pub mod model;
pub mod pipeline;
pub mod providers;
pub mod session;

// Re-export main types for convenience
pub use cache::CandidateCache;
pub use cancel::Cancelled;
pub use config::{DEFAULT_WATCHLIST, ResolverConfig, ResolverConfigBuilder};
pub use coordinator::{ResolveEvent, SearchCoordinator, SearchPhase};
pub use debounce::Debouncer;
pub use error::{ResolveError, Result};
pub use fuzzy::{FuzzyMatcher, MatchRule};
pub use model::{
    Candidate, CandidateSet, CompanyProfile, DirectoryEntry, MarketCapBucket, QuoteSnapshot,
    SearchResult, StrategyKind,
};
pub use pipeline::{PipelineHit, ResolutionStrategy, StrategyPipeline};
pub use providers::{
    AlphaVantageClient, DirectorySearch, InMemoryMarket, MemoizedProfiles, ProfileProvider,
    Providers, QuoteProvider, YahooQuoteProvider,
};
pub use session::SearchSession;
