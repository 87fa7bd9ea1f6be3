//! Last-resort guesses at a ticker derived from the query text

use super::ResolutionStrategy;
use super::exact::normalize_symbol;
use crate::cancel::Cancelled;
use crate::lookup::lookup_symbol;
use crate::model::{CandidateSet, StrategyKind};
use crate::providers::Providers;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Derive candidate tickers from `query`, in trial order.
///
/// The three derivations are: every whitespace character removed, every
/// space removed, and the initials of each word. The first two agree for
/// ordinary input and are both kept. Only the first `max_patterns`
/// derivations are considered, and any outside `1..=max_len` characters
/// is dropped.
pub fn derive_patterns(query: &str, max_patterns: usize, max_len: usize) -> Vec<String> {
    let derived = [
        query.chars().filter(|c| !c.is_whitespace()).collect::<String>(),
        query.chars().filter(|c| *c != ' ').collect::<String>(),
        query
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .collect::<String>(),
    ];

    derived
        .into_iter()
        .take(max_patterns)
        .map(|pattern| normalize_symbol(&pattern))
        .filter(|pattern| (1..=max_len).contains(&pattern.chars().count()))
        .collect()
}

/// Tries derived ticker patterns until one resolves
pub struct TickerPatternFallback {
    providers: Providers,
    max_patterns: usize,
    max_len: usize,
}

impl TickerPatternFallback {
    pub fn new(providers: Providers, max_patterns: usize, max_len: usize) -> Self {
        Self {
            providers,
            max_patterns,
            max_len,
        }
    }
}

#[async_trait]
impl ResolutionStrategy for TickerPatternFallback {
    fn kind(&self) -> StrategyKind {
        StrategyKind::TickerPattern
    }

    async fn resolve(
        &self,
        query: &str,
        token: &CancellationToken,
    ) -> Result<CandidateSet, Cancelled> {
        for pattern in derive_patterns(query, self.max_patterns, self.max_len) {
            Cancelled::check(token)?;
            debug!(query, pattern = %pattern, "trying derived ticker");
            if let Some(candidate) = lookup_symbol(&self.providers, &pattern, token)
                .await?
                .into_candidate()
            {
                return Ok(vec![candidate]);
            }
        }
        Ok(CandidateSet::new())
    }
}
