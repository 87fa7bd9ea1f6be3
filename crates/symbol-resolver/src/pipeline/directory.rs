//! Company-name search through the instrument directory

use super::ResolutionStrategy;
use crate::cancel::{Cancelled, guarded};
use crate::lookup::{Lookup, lookup_symbol};
use crate::model::{CandidateSet, StrategyKind};
use crate::providers::Providers;
use async_trait::async_trait;
use futures::future::join_all;
use regex::Regex;
use std::sync::LazyLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Plain listed-equity tickers: one to five uppercase letters
static TICKER_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{1,5}$").expect("ticker shape regex is valid"));

/// Whether a directory symbol has the plain-ticker shape
pub fn is_plain_ticker(symbol: &str) -> bool {
    TICKER_SHAPE.is_match(symbol)
}

/// Searches the directory by free text and enriches the top hits
pub struct DirectorySearchByName {
    providers: Providers,
    limit: usize,
}

impl DirectorySearchByName {
    pub fn new(providers: Providers, limit: usize) -> Self {
        Self { providers, limit }
    }
}

#[async_trait]
impl ResolutionStrategy for DirectorySearchByName {
    fn kind(&self) -> StrategyKind {
        StrategyKind::DirectoryByName
    }

    async fn resolve(
        &self,
        query: &str,
        token: &CancellationToken,
    ) -> Result<CandidateSet, Cancelled> {
        let entries = match guarded(token, || self.providers.directory.search(query)).await? {
            Ok(entries) => entries,
            Err(e) => {
                warn!(query, error = %e, "directory search failed");
                return Ok(CandidateSet::new());
            }
        };

        let symbols: Vec<String> = entries
            .into_iter()
            .map(|entry| entry.symbol)
            .filter(|symbol| is_plain_ticker(symbol))
            .take(self.limit)
            .collect();
        debug!(query, ?symbols, "directory hits to enrich");

        let lookups = join_all(
            symbols
                .iter()
                .map(|symbol| lookup_symbol(&self.providers, symbol, token)),
        )
        .await;

        let mut candidates = CandidateSet::new();
        for lookup in lookups {
            if let Lookup::Found(candidate) = lookup? {
                candidates.push(candidate);
            }
        }
        Ok(candidates)
    }
}
