//! Fuzzy match against the popular-instrument cache

use super::ResolutionStrategy;
use crate::cache::CandidateCache;
use crate::cancel::{Cancelled, guarded};
use crate::fuzzy::FuzzyMatcher;
use crate::model::{CandidateSet, StrategyKind};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Matches the query against cached candidates in cache order.
///
/// Matches are not re-ranked: the first `limit` hits in iteration order win.
pub struct CachedFuzzyMatch {
    cache: Arc<CandidateCache>,
    matcher: FuzzyMatcher,
    limit: usize,
}

impl CachedFuzzyMatch {
    pub fn new(cache: Arc<CandidateCache>, limit: usize) -> Self {
        Self {
            cache,
            matcher: FuzzyMatcher::new(),
            limit,
        }
    }
}

#[async_trait]
impl ResolutionStrategy for CachedFuzzyMatch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::CachedFuzzy
    }

    async fn resolve(
        &self,
        query: &str,
        token: &CancellationToken,
    ) -> Result<CandidateSet, Cancelled> {
        let entries = guarded(token, || self.cache.ensure_populated()).await?;

        Ok(entries
            .iter()
            .filter(|c| {
                let rule = self.matcher.matched_rule(query, &c.symbol, &c.display_name);
                if let Some(rule) = rule {
                    debug!(symbol = %c.symbol, ?rule, "cached candidate matched");
                }
                rule.is_some()
            })
            .take(self.limit)
            .cloned()
            .collect())
    }
}
