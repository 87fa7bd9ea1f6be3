//! Debounced input wired to a search coordinator
//!
//! A session is what an input box talks to: every keystroke goes to
//! [`SearchSession::observe`], settled queries are resolved by the
//! coordinator, and results arrive on the event receiver.

use crate::cache::CandidateCache;
use crate::config::ResolverConfig;
use crate::coordinator::{ResolveEvent, SearchCoordinator};
use crate::debounce::Debouncer;
use crate::pipeline::StrategyPipeline;
use crate::providers::Providers;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Debouncer plus coordinator for one input surface
#[derive(Debug)]
pub struct SearchSession {
    debouncer: Debouncer,
    coordinator: SearchCoordinator,
    forwarder: JoinHandle<()>,
}

impl SearchSession {
    /// Build the standard pipeline over `providers` and start a session.
    ///
    /// Must be called inside a tokio runtime.
    pub fn new(
        config: &ResolverConfig,
        providers: Providers,
    ) -> (Self, mpsc::UnboundedReceiver<ResolveEvent>) {
        let cache = Arc::new(CandidateCache::new(providers.clone(), config.watchlist.clone()));
        let pipeline = Arc::new(StrategyPipeline::standard(providers, cache, config));
        Self::with_pipeline(pipeline, config.debounce_window)
    }

    /// Start a session over an existing pipeline
    pub fn with_pipeline(
        pipeline: Arc<StrategyPipeline>,
        window: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<ResolveEvent>) {
        let (coordinator, events) = SearchCoordinator::new(pipeline);
        let (settled_tx, mut settled_rx) = mpsc::unbounded_channel::<String>();
        let debouncer = Debouncer::spawn(window, settled_tx);

        let forward_to = coordinator.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(query) = settled_rx.recv().await {
                debug!(query = %query, "query settled");
                forward_to.resolve(&query).await;
            }
        });

        let session = Self {
            debouncer,
            coordinator,
            forwarder,
        };
        (session, events)
    }

    /// Record the latest input text
    pub fn observe(&self, text: impl Into<String>) {
        self.debouncer.observe(text);
    }

    /// Resolve `text` without waiting for the quiet window
    pub fn flush(&self, text: impl Into<String>) {
        self.debouncer.flush(text);
    }

    /// Cancel whatever is in flight; the visible result stays
    pub async fn cancel(&self) {
        self.coordinator.cancel().await;
    }

    pub fn coordinator(&self) -> &SearchCoordinator {
        &self.coordinator
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::SearchPhase;
    use crate::model::StrategyKind;
    use crate::providers::InMemoryMarket;
    use tokio_test::{assert_err, assert_ok};

    fn session_over(
        market: Arc<InMemoryMarket>,
    ) -> (SearchSession, mpsc::UnboundedReceiver<ResolveEvent>) {
        let config = ResolverConfig::builder()
            .debounce_window(Duration::from_millis(300))
            .watchlist(["AAPL", "MSFT", "BAC"])
            .build()
            .unwrap();
        SearchSession::new(&config, Providers::in_memory(market))
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_burst_resolves_once() {
        let market = Arc::new(InMemoryMarket::sample());
        let (session, mut events) = session_over(market.clone());

        for prefix in ["n", "nf", "nfl", "nflx"] {
            session.observe(prefix);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_err!(events.try_recv());

        tokio::time::sleep(Duration::from_millis(500)).await;

        let event = assert_ok!(events.try_recv());
        let ResolveEvent::Resolved(result) = event else {
            panic!("expected a resolved event");
        };
        assert_eq!(result.generation_id, 1);
        assert_eq!(result.strategy, Some(StrategyKind::ExactSymbol));
        assert_eq!(result.candidates[0].symbol, "NFLX");
        assert_eq!(market.quote_requests().await, vec!["NFLX"]);
        assert_err!(events.try_recv());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_skips_the_window() {
        let (session, mut events) = session_over(Arc::new(InMemoryMarket::sample()));

        session.observe("bank");
        session.flush("bank");
        tokio::time::sleep(Duration::from_millis(10)).await;

        let event = assert_ok!(events.try_recv());
        let ResolveEvent::Resolved(result) = event else {
            panic!("expected a resolved event");
        };
        assert_eq!(result.strategy, Some(StrategyKind::CachedFuzzy));
        assert_eq!(result.candidates[0].symbol, "BAC");

        // the pending observe was discarded by the flush
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_err!(events.try_recv());
        assert_eq!(session.coordinator().last_generation().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_input_clears_results() {
        let market = Arc::new(InMemoryMarket::sample());
        let (session, mut events) = session_over(market.clone());

        session.flush("AAPL");
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(matches!(assert_ok!(events.try_recv()), ResolveEvent::Resolved(_)));
        let quotes_before = market.quote_calls();

        session.observe("");
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(assert_ok!(events.try_recv()), ResolveEvent::Cleared);
        assert_eq!(session.coordinator().phase().await, SearchPhase::Idle);
        assert_eq!(market.quote_calls(), quotes_before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_silences_in_flight_search() {
        let market = Arc::new(
            InMemoryMarket::sample().with_latency(Duration::from_millis(200)),
        );
        let (session, mut events) = session_over(market);

        session.flush("MSFT");
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(session.coordinator().phase().await, SearchPhase::Resolving(1));

        session.cancel().await;
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert_err!(events.try_recv());
        assert_eq!(session.coordinator().phase().await, SearchPhase::Idle);
    }
}
