//! Time-bounded memoization of company profiles
//!
//! Profiles change rarely and the upstream free tiers are tightly rate
//! limited, so repeated enrichment of the same symbol is served from memory.

use super::ProfileProvider;
use crate::error::Result;
use crate::model::CompanyProfile;
use async_trait::async_trait;
use cached::{Cached, TimedCache};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Wraps a [`ProfileProvider`], remembering answers for a fixed lifespan.
///
/// Misses (`Ok(None)`) are remembered too; errors are not.
pub struct MemoizedProfiles<P> {
    inner: P,
    cache: Arc<RwLock<TimedCache<String, Option<CompanyProfile>>>>,
}

impl<P: ProfileProvider> MemoizedProfiles<P> {
    /// Create a new memo with the specified TTL
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get the number of remembered symbols
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Forget everything
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }
}

#[async_trait]
impl<P: ProfileProvider> ProfileProvider for MemoizedProfiles<P> {
    async fn get_profile(&self, symbol: &str) -> Result<Option<CompanyProfile>> {
        {
            let mut cache = self.cache.write().await;
            if let Some(profile) = cache.cache_get(symbol) {
                tracing::debug!("Profile cache hit for {}", symbol);
                return Ok(profile.clone());
            }
        }

        tracing::debug!("Profile cache miss for {}", symbol);
        let profile = self.inner.get_profile(symbol).await?;

        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(symbol.to_string(), profile.clone());
        Ok(profile)
    }
}

impl<P> std::fmt::Debug for MemoizedProfiles<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoizedProfiles").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use crate::providers::MockProfileProvider;

    fn profile(name: &str) -> CompanyProfile {
        CompanyProfile {
            display_name: Some(name.to_string()),
            sector_or_industry: Some("Technology".to_string()),
            market_capitalization: None,
        }
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_memory() {
        let mut inner = MockProfileProvider::new();
        inner
            .expect_get_profile()
            .times(1)
            .returning(|_| Ok(Some(profile("Apple Inc."))));

        let memo = MemoizedProfiles::new(inner, Duration::from_secs(60));
        let first = memo.get_profile("AAPL").await.unwrap();
        let second = memo.get_profile("AAPL").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(memo.len().await, 1);
    }

    #[tokio::test]
    async fn test_misses_are_remembered() {
        let mut inner = MockProfileProvider::new();
        inner.expect_get_profile().times(1).returning(|_| Ok(None));

        let memo = MemoizedProfiles::new(inner, Duration::from_secs(60));
        assert!(memo.get_profile("NOPE").await.unwrap().is_none());
        assert!(memo.get_profile("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_errors_are_not_remembered() {
        let mut inner = MockProfileProvider::new();
        inner
            .expect_get_profile()
            .times(2)
            .returning(|_| Err(ResolveError::ApiError("down".to_string())));

        let memo = MemoizedProfiles::new(inner, Duration::from_secs(60));
        assert!(memo.get_profile("AAPL").await.is_err());
        assert!(memo.get_profile("AAPL").await.is_err());
        assert!(memo.is_empty().await);
    }

    #[tokio::test]
    async fn test_symbols_are_kept_apart() {
        let mut inner = MockProfileProvider::new();
        inner.expect_get_profile().times(2).returning(|symbol| {
            Ok(Some(profile(if symbol == "AAPL" { "Apple Inc." } else { "Microsoft" })))
        });

        let memo = MemoizedProfiles::new(inner, Duration::from_secs(60));
        let apple = memo.get_profile("AAPL").await.unwrap().unwrap();
        let msft = memo.get_profile("MSFT").await.unwrap().unwrap();
        assert_eq!(apple.display_name.as_deref(), Some("Apple Inc."));
        assert_eq!(msft.display_name.as_deref(), Some("Microsoft"));

        memo.clear().await;
        assert!(memo.is_empty().await);
    }
}
