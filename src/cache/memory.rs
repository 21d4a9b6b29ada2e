use crate::cache::CacheStats;
use crate::db::FeatureIndex;
use crate::error::Result;
use crate::models::TagMatchSet;
use async_trait::async_trait;
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Caches tag match sets in memory (moka, TTL + bounded capacity) in front of
/// another feature index. Lookup errors are passed through and never cached.
pub struct CachedFeatureIndex {
    inner: Arc<dyn FeatureIndex>,
    match_sets: Cache<String, Arc<TagMatchSet>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedFeatureIndex {
    pub fn new(inner: Arc<dyn FeatureIndex>, ttl_seconds: u64, max_capacity: u64) -> Self {
        let match_sets = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_seconds))
            .max_capacity(max_capacity)
            .build();

        CachedFeatureIndex {
            inner,
            match_sets,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats::new(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

#[async_trait]
impl FeatureIndex for CachedFeatureIndex {
    async fn edges_with_tag(&self, tag: &str) -> Result<Arc<TagMatchSet>> {
        if let Some(match_set) = self.match_sets.get(tag).await {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(tag, "Tag cache hit");
            return Ok(match_set);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let match_set = self.inner.edges_with_tag(tag).await?;
        self.match_sets
            .insert(tag.to_string(), Arc::clone(&match_set))
            .await;
        tracing::debug!(tag, edges = match_set.len(), "Tag cache miss, stored");
        Ok(match_set)
    }
}
