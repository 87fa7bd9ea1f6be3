//! Ordered resolution strategies with first-success-wins semantics
//!
//! Strategies run one after another until one returns candidates. The
//! cancellation token is checked around every strategy; a fired token ends the
//! run without a result.

mod cached_fuzzy;
mod directory;
mod exact;
mod ticker_pattern;

pub use cached_fuzzy::CachedFuzzyMatch;
pub use directory::DirectorySearchByName;
pub use exact::{ExactSymbolLookup, normalize_symbol};
pub use ticker_pattern::{TickerPatternFallback, derive_patterns};

use crate::cache::CandidateCache;
use crate::cancel::Cancelled;
use crate::config::ResolverConfig;
use crate::model::{CandidateSet, StrategyKind};
use crate::providers::Providers;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// One self-contained resolution technique
///
/// Provider failures are handled inside the strategy and surface as an empty
/// result; the only early exit is [`Cancelled`].
#[async_trait]
pub trait ResolutionStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    async fn resolve(
        &self,
        query: &str,
        token: &CancellationToken,
    ) -> Result<CandidateSet, Cancelled>;
}

/// Candidates from the first strategy that produced any
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineHit {
    pub strategy: StrategyKind,
    pub candidates: CandidateSet,
}

/// Ordered strategy list
pub struct StrategyPipeline {
    strategies: Vec<Arc<dyn ResolutionStrategy>>,
}

impl StrategyPipeline {
    pub fn new(strategies: Vec<Arc<dyn ResolutionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Exact symbol, cached fuzzy, directory by name, then ticker patterns
    pub fn standard(
        providers: Providers,
        cache: Arc<CandidateCache>,
        config: &ResolverConfig,
    ) -> Self {
        Self::new(vec![
            Arc::new(ExactSymbolLookup::new(providers.clone())),
            Arc::new(CachedFuzzyMatch::new(cache, config.max_fuzzy_results)),
            Arc::new(DirectorySearchByName::new(
                providers.clone(),
                config.max_directory_results,
            )),
            Arc::new(TickerPatternFallback::new(
                providers,
                config.max_ticker_patterns,
                config.max_pattern_len,
            )),
        ])
    }

    pub fn kinds(&self) -> Vec<StrategyKind> {
        self.strategies.iter().map(|s| s.kind()).collect()
    }

    /// Run strategies in order; `Ok(None)` when all of them come back empty
    pub async fn run(
        &self,
        query: &str,
        token: &CancellationToken,
    ) -> Result<Option<PipelineHit>, Cancelled> {
        for strategy in &self.strategies {
            Cancelled::check(token)?;
            let candidates = strategy.resolve(query, token).await?;
            Cancelled::check(token)?;

            if !candidates.is_empty() {
                debug!(strategy = %strategy.kind(), count = candidates.len(), "strategy matched");
                return Ok(Some(PipelineHit {
                    strategy: strategy.kind(),
                    candidates,
                }));
            }
            debug!(strategy = %strategy.kind(), "strategy came back empty");
        }

        Ok(None)
    }
}

impl std::fmt::Debug for StrategyPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyPipeline")
            .field("strategies", &self.kinds())
            .finish()
    }
}
