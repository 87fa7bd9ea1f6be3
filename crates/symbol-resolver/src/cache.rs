//! Session-scoped snapshot of popular instruments
//!
//! The cache is filled once from a fixed watchlist and is read-only afterwards.
//! Population runs on its own task, so every caller shares a single run and a
//! caller giving up on its wait never interrupts it.

use crate::lookup::{Lookup, lookup_symbol};
use crate::model::Candidate;
use crate::providers::Providers;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared, join_all};
use std::sync::{Arc, OnceLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

type Population = Shared<BoxFuture<'static, Arc<[Candidate]>>>;

/// Lazily populated, write-once candidate snapshot
pub struct CandidateCache {
    providers: Providers,
    watchlist: Arc<[String]>,
    entries: Arc<OnceLock<Arc<[Candidate]>>>,
    population: OnceLock<Population>,
}

impl CandidateCache {
    /// Create an empty cache that will populate from `watchlist`
    pub fn new(providers: Providers, watchlist: Vec<String>) -> Self {
        Self {
            providers,
            watchlist: watchlist.into(),
            entries: Arc::new(OnceLock::new()),
            population: OnceLock::new(),
        }
    }

    /// Populate on first use and return the snapshot.
    ///
    /// The first caller spawns the population task; everyone else, including
    /// callers arriving after an earlier waiter was dropped, awaits that same
    /// task. Must be called inside a tokio runtime.
    pub async fn ensure_populated(&self) -> Arc<[Candidate]> {
        if let Some(entries) = self.entries.get() {
            return entries.clone();
        }
        self.population
            .get_or_init(|| self.spawn_population())
            .clone()
            .await
    }

    /// Current contents; empty before the first population completes
    pub fn snapshot(&self) -> Arc<[Candidate]> {
        self.entries.get().cloned().unwrap_or_else(|| Arc::from([]))
    }

    pub fn is_populated(&self) -> bool {
        self.entries.get().is_some()
    }

    fn spawn_population(&self) -> Population {
        let task = tokio::spawn(populate(
            self.providers.clone(),
            self.watchlist.clone(),
            self.entries.clone(),
        ));

        async move {
            task.await.unwrap_or_else(|e| {
                warn!(error = %e, "candidate cache population aborted");
                Arc::from([])
            })
        }
        .boxed()
        .shared()
    }
}

async fn populate(
    providers: Providers,
    watchlist: Arc<[String]>,
    entries: Arc<OnceLock<Arc<[Candidate]>>>,
) -> Arc<[Candidate]> {
    debug!(symbols = watchlist.len(), "populating candidate cache");

    // Population is shared across generations, so no single search may cancel it.
    let token = CancellationToken::new();
    let lookups = watchlist
        .iter()
        .map(|symbol| symbol.trim().to_uppercase())
        .filter(|symbol| !symbol.is_empty())
        .map(|symbol| {
            let providers = &providers;
            let token = token.clone();
            async move { lookup_symbol(providers, &symbol, &token).await }
        });

    let found: Arc<[Candidate]> = join_all(lookups)
        .await
        .into_iter()
        .filter_map(|lookup| match lookup {
            Ok(Lookup::Found(candidate)) => Some(candidate),
            Ok(Lookup::NotFound | Lookup::ProviderError(_)) | Err(_) => None,
        })
        .collect();

    debug!(entries = found.len(), "candidate cache populated");
    entries.get_or_init(|| found).clone()
}

impl std::fmt::Debug for CandidateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateCache")
            .field("watchlist", &self.watchlist)
            .field("populated", &self.is_populated())
            .finish_non_exhaustive()
    }
}
