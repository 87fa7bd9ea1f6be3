//! Market data collaborators consumed by the resolution engine
//!
//! The engine only sees the three traits below. Concrete clients live in the
//! submodules: Yahoo Finance for quotes, Alpha Vantage for profiles and the
//! instrument directory, plus an in-memory market for offline use.

pub mod alpha_vantage;
pub mod memo;
pub mod memory;
pub mod yahoo;

use crate::error::Result;
use crate::model::{CompanyProfile, DirectoryEntry, QuoteSnapshot};
use async_trait::async_trait;
use std::sync::Arc;

pub use alpha_vantage::AlphaVantageClient;
pub use memo::MemoizedProfiles;
pub use memory::InMemoryMarket;
pub use yahoo::YahooQuoteProvider;

/// Latest quote lookup; `Ok(None)` means the symbol is unknown
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn get_quote(&self, symbol: &str) -> Result<Option<QuoteSnapshot>>;
}

/// Company profile lookup, always best-effort
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileProvider: Send + Sync {
    async fn get_profile(&self, symbol: &str) -> Result<Option<CompanyProfile>>;
}

/// Free-text instrument directory, results in provider order
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectorySearch: Send + Sync {
    async fn search(&self, text: &str) -> Result<Vec<DirectoryEntry>>;
}

/// The set of collaborators one resolver instance talks to
#[derive(Clone)]
pub struct Providers {
    pub quotes: Arc<dyn QuoteProvider>,
    pub profiles: Arc<dyn ProfileProvider>,
    pub directory: Arc<dyn DirectorySearch>,
}

impl Providers {
    pub fn new(
        quotes: Arc<dyn QuoteProvider>,
        profiles: Arc<dyn ProfileProvider>,
        directory: Arc<dyn DirectorySearch>,
    ) -> Self {
        Self {
            quotes,
            profiles,
            directory,
        }
    }

    /// Use one in-memory market for all three roles
    pub fn in_memory(market: Arc<InMemoryMarket>) -> Self {
        Self {
            quotes: market.clone(),
            profiles: market.clone(),
            directory: market,
        }
    }
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Providers").finish_non_exhaustive()
    }
}
