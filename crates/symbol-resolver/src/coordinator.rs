//! Generation-tagged search orchestration
//!
//! Every non-blank `resolve` call supersedes the previous one: the old
//! generation's token is fired and a new generation id is allocated. Pipeline
//! results come back through [`SearchCoordinator::commit`], the only place the
//! visible result changes, and are dropped unless their generation is still
//! current.

use crate::cancel::Cancelled;
use crate::model::SearchResult;
use crate::pipeline::{PipelineHit, StrategyPipeline};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Notification delivered to the consumer; each one is terminal for its request
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveEvent {
    /// A blank query cleared the visible result
    Cleared,
    /// A generation finished, possibly with no candidates
    Resolved(SearchResult),
}

impl ResolveEvent {
    pub fn generation_id(&self) -> Option<u64> {
        match self {
            Self::Cleared => None,
            Self::Resolved(result) => Some(result.generation_id),
        }
    }
}

/// Where the coordinator's most recent request stands
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPhase {
    Idle,
    Resolving(u64),
    Resolved(SearchResult),
    Empty(u64),
}

#[derive(Debug, Default)]
struct CoordinatorState {
    last_generation: u64,
    current: Option<u64>,
    active: Option<CancellationToken>,
    visible: Option<SearchResult>,
}

impl CoordinatorState {
    fn cancel_active(&mut self) {
        if let Some(token) = self.active.take() {
            token.cancel();
        }
    }
}

/// Owns generation numbering, cancellation and the visible result.
///
/// Cheap to clone; clones share state. Construct one per screen or session.
#[derive(Clone)]
pub struct SearchCoordinator {
    pipeline: Arc<StrategyPipeline>,
    state: Arc<Mutex<CoordinatorState>>,
    events: mpsc::UnboundedSender<ResolveEvent>,
}

impl SearchCoordinator {
    /// Create a coordinator and the receiver its events are delivered to
    pub fn new(pipeline: Arc<StrategyPipeline>) -> (Self, mpsc::UnboundedReceiver<ResolveEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            pipeline,
            state: Arc::new(Mutex::new(CoordinatorState::default())),
            events,
        };
        (coordinator, rx)
    }

    /// Start resolving `query`, superseding any search in flight.
    ///
    /// Returns the allocated generation id, or `None` for a blank query, which
    /// clears the visible result without touching any provider. Must be called
    /// inside a tokio runtime.
    pub async fn resolve(&self, query: &str) -> Option<u64> {
        let mut state = self.state.lock().await;
        state.cancel_active();

        if query.trim().is_empty() {
            state.current = None;
            state.visible = None;
            debug!("blank query, clearing visible result");
            self.emit(ResolveEvent::Cleared);
            return None;
        }

        state.last_generation += 1;
        let generation_id = state.last_generation;
        let token = CancellationToken::new();
        state.current = Some(generation_id);
        state.active = Some(token.clone());
        drop(state);

        debug!(generation_id, query, "resolving");
        let coordinator = self.clone();
        let query = query.to_string();
        tokio::spawn(async move {
            match coordinator.pipeline.run(&query, &token).await {
                Ok(hit) => {
                    coordinator.commit(generation_id, &token, hit).await;
                }
                Err(Cancelled) => debug!(generation_id, "generation cancelled"),
            }
        });

        Some(generation_id)
    }

    /// Cancel the search in flight, leaving the visible result as it is
    pub async fn cancel(&self) {
        let mut state = self.state.lock().await;
        if let Some(generation_id) = state.current.take() {
            debug!(generation_id, "cancelling generation");
        }
        state.cancel_active();
    }

    /// Apply a finished generation's outcome if it is still current.
    ///
    /// Returns whether the result was committed. The check and the mutation
    /// happen under one lock, and the event is sent before it is released so
    /// consumers see events in commit order.
    async fn commit(
        &self,
        generation_id: u64,
        token: &CancellationToken,
        hit: Option<PipelineHit>,
    ) -> bool {
        let mut state = self.state.lock().await;
        if token.is_cancelled() || state.current != Some(generation_id) {
            debug!(generation_id, current = ?state.current, "discarding stale result");
            return false;
        }

        let result = match hit {
            Some(hit) => SearchResult {
                generation_id,
                candidates: hit.candidates,
                strategy: Some(hit.strategy),
            },
            None => SearchResult {
                generation_id,
                candidates: Vec::new(),
                strategy: None,
            },
        };
        info!(
            generation_id,
            count = result.candidates.len(),
            strategy = ?result.strategy,
            "committing result"
        );

        state.current = None;
        state.active = None;
        state.visible = Some(result.clone());
        self.emit(ResolveEvent::Resolved(result));
        true
    }

    fn emit(&self, event: ResolveEvent) {
        if self.events.send(event).is_err() {
            debug!("event receiver dropped");
        }
    }

    /// The last committed result, if any
    pub async fn visible(&self) -> Option<SearchResult> {
        self.state.lock().await.visible.clone()
    }

    /// Generation currently being resolved, if any
    pub async fn current_generation(&self) -> Option<u64> {
        self.state.lock().await.current
    }

    /// Highest generation id allocated so far
    pub async fn last_generation(&self) -> u64 {
        self.state.lock().await.last_generation
    }

    pub async fn phase(&self) -> SearchPhase {
        let state = self.state.lock().await;
        match (state.current, &state.visible) {
            (Some(generation_id), _) => SearchPhase::Resolving(generation_id),
            (None, Some(result)) if result.is_empty() => SearchPhase::Empty(result.generation_id),
            (None, Some(result)) => SearchPhase::Resolved(result.clone()),
            (None, None) => SearchPhase::Idle,
        }
    }
}

impl std::fmt::Debug for SearchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCoordinator")
            .field("pipeline", &self.pipeline)
            .finish_non_exhaustive()
    }
}
