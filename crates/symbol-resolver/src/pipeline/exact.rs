//! Direct ticker lookup

use super::ResolutionStrategy;
use crate::cancel::Cancelled;
use crate::lookup::lookup_symbol;
use crate::model::{CandidateSet, StrategyKind};
use crate::providers::Providers;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Trim and uppercase a query into ticker form
pub fn normalize_symbol(query: &str) -> String {
    query.trim().to_uppercase()
}

/// Treats the whole query as a ticker symbol
pub struct ExactSymbolLookup {
    providers: Providers,
}

impl ExactSymbolLookup {
    pub fn new(providers: Providers) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl ResolutionStrategy for ExactSymbolLookup {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ExactSymbol
    }

    async fn resolve(
        &self,
        query: &str,
        token: &CancellationToken,
    ) -> Result<CandidateSet, Cancelled> {
        let symbol = normalize_symbol(query);
        if symbol.is_empty() {
            return Ok(CandidateSet::new());
        }

        let lookup = lookup_symbol(&self.providers, &symbol, token).await?;
        Ok(lookup.into_candidate().into_iter().collect())
    }
}
