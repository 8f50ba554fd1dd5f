//! TTL result cache using moka
//!
//! Values of any type are stored behind `Arc<dyn Any>` and downcast on read.
//! Each entry carries its own time-to-live; expired entries are never
//! returned and are evicted lazily by moka's housekeeping on access.

use crate::error::{CacheError, CacheResult};
use crate::key::CacheKey;
use moka::future::Cache;
use moka::Expiry;
use std::any::Any;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default time-to-live for cached results
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Default maximum number of entries
pub const DEFAULT_MAX_CAPACITY: u64 = 10_000;

/// One stored result
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Key the entry was stored under
    pub key: String,
    /// The cached value
    pub data: Arc<dyn Any + Send + Sync>,
    /// Insertion time, milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Lifetime of this entry
    pub ttl: Duration,
}

impl CacheEntry {
    fn new(key: String, data: Arc<dyn Any + Send + Sync>, ttl: Duration) -> Self {
        Self {
            key,
            data,
            timestamp: chrono::Utc::now().timestamp_millis(),
            ttl,
        }
    }
}

/// Expiry policy reading the TTL stored on each entry
struct EntryTtl;

impl Expiry<String, CacheEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries in cache, approximate until pending tasks run
    pub entry_count: u64,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Counters {
    fn record(&self, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Keyed result cache with per-entry TTL
///
/// Clones share the same storage and statistics.
#[derive(Debug, Clone)]
pub struct ResultCache {
    inner: Cache<String, CacheEntry>,
    default_ttl: Duration,
    counters: Arc<Counters>,
}

impl ResultCache {
    /// Create cache with max capacity and the default TTL
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self::with_ttl(max_capacity, DEFAULT_TTL)
    }

    /// Create cache with a custom default TTL
    #[must_use]
    pub fn with_ttl(max_capacity: u64, default_ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .expire_after(EntryTtl)
                .support_invalidation_closures()
                .build(),
            default_ttl,
            counters: Arc::new(Counters::default()),
        }
    }

    /// TTL applied when none is given
    #[inline]
    #[must_use]
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Get a value; a missing, expired or differently typed entry is a miss
    pub async fn get<T>(&self, key: &str) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let value = self
            .inner
            .get(key)
            .await
            .and_then(|entry| entry.data.downcast::<T>().ok());
        self.counters.record(value.is_some());
        value
    }

    /// Store a value, replacing any previous entry under `key`
    pub async fn set<T>(&self, key: impl Into<String>, value: T, ttl: Option<Duration>)
    where
        T: Send + Sync + 'static,
    {
        self.set_arc(key, Arc::new(value), ttl).await;
    }

    /// Store an already shared value
    pub async fn set_arc<T>(&self, key: impl Into<String>, value: Arc<T>, ttl: Option<Duration>)
    where
        T: Send + Sync + 'static,
    {
        let key = key.into();
        let entry = CacheEntry::new(key.clone(), value, ttl.unwrap_or(self.default_ttl));
        self.inner.insert(key, entry).await;
    }

    /// Get a value, computing and storing it on a miss
    ///
    /// Concurrent calls for the same key run `compute` once; the others wait
    /// for its result. Errors are returned to every waiter and not cached.
    pub async fn get_or_try_compute<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        compute: F,
    ) -> Result<Arc<T>, E>
    where
        T: Send + Sync + 'static,
        E: Clone + From<CacheError> + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(existing) = self.inner.get(key).await {
            if !existing.data.is::<T>() {
                self.inner.invalidate(key).await;
            }
        }

        let ttl = ttl.unwrap_or(self.default_ttl);
        let owned_key = key.to_string();
        let entry = self
            .inner
            .entry_by_ref(key)
            .or_try_insert_with(async move {
                let value = compute().await?;
                Ok::<_, E>(CacheEntry::new(owned_key, Arc::new(value), ttl))
            })
            .await
            .map_err(|err| (*err).clone())?;

        self.counters.record(!entry.is_fresh());
        entry
            .into_value()
            .data
            .downcast::<T>()
            .map_err(|_| E::from(CacheError::TypeMismatch(key.to_string())))
    }

    /// Remove one entry
    pub async fn remove(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    /// Remove every entry scoped to `client_id`
    pub fn clear_client(&self, client_id: &str) -> CacheResult<()> {
        self.clear_prefix(&CacheKey::client_prefix(client_id))
    }

    /// Remove every entry whose key starts with `prefix`
    pub fn clear_prefix(&self, prefix: &str) -> CacheResult<()> {
        let owned = prefix.to_string();
        self.inner
            .invalidate_entries_if(move |key, _| key.starts_with(&owned))
            .map_err(|err| CacheError::invalidation(prefix, err))?;
        tracing::debug!(prefix, "cache prefix invalidated");
        Ok(())
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.inner.invalidate_all();
        tracing::debug!("cache cleared");
    }

    /// Run moka's pending maintenance, applying evictions and invalidations
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.inner.entry_count(),
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, Clone, PartialEq)]
    enum TestError {
        Failed,
        Cache(CacheError),
    }

    impl From<CacheError> for TestError {
        fn from(err: CacheError) -> Self {
            Self::Cache(err)
        }
    }

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let cache = ResultCache::new(100);
        cache.set("matrix-demand-12", vec![1u32, 2, 3], None).await;
        let value = cache.get::<Vec<u32>>("matrix-demand-12").await.unwrap();
        assert_eq!(*value, vec![1, 2, 3]);
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn wrong_type_reads_as_miss() {
        let cache = ResultCache::new(100);
        cache.set("k", 5u64, None).await;
        assert!(cache.get::<String>("k").await.is_none());
        assert!(cache.get::<u64>("missing").await.is_none());
        assert_eq!(cache.stats().misses, 2);
    }

    #[tokio::test]
    async fn expired_entries_are_not_returned() {
        let cache = ResultCache::new(100);
        cache.set("short", 1u8, Some(Duration::from_millis(50))).await;
        cache.set("long", 2u8, None).await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        cache.run_pending_tasks().await;

        assert!(cache.get::<u8>("short").await.is_none());
        assert_eq!(*cache.get::<u8>("long").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn default_ttl_applies_without_override() {
        let cache = ResultCache::with_ttl(100, Duration::from_millis(50));
        cache.set("k", 1u8, None).await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(cache.get::<u8>("k").await.is_none());
    }

    #[tokio::test]
    async fn clear_client_only_touches_that_client() {
        let cache = ResultCache::new(100);
        cache.set(CacheKey::client("c1").with("demand"), 1u8, None).await;
        cache.set(CacheKey::client("c1").with("capacity"), 2u8, None).await;
        cache.set(CacheKey::client("c2").with("demand"), 3u8, None).await;
        cache.set(CacheKey::new("matrix", "demand"), 4u8, None).await;

        cache.clear_client("c1").unwrap();
        cache.run_pending_tasks().await;

        assert!(cache.get::<u8>("client-c1-demand").await.is_none());
        assert!(cache.get::<u8>("client-c1-capacity").await.is_none());
        assert_eq!(*cache.get::<u8>("client-c2-demand").await.unwrap(), 3);
        assert_eq!(*cache.get::<u8>("matrix-demand").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn remove_drops_single_key() {
        let cache = ResultCache::new(100);
        cache.set("client-c1-demand", 1u8, None).await;
        cache.set("client-c1-capacity", 2u8, None).await;

        cache.remove("client-c1-demand").await;
        cache.remove("never-set").await;

        assert!(cache.get::<u8>("client-c1-demand").await.is_none());
        assert_eq!(*cache.get::<u8>("client-c1-capacity").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let cache = ResultCache::new(100);
        cache.set("a", 1u8, None).await;
        cache.set("b", 2u8, None).await;
        cache.clear();
        cache.run_pending_tasks().await;
        assert!(cache.get::<u8>("a").await.is_none());
        assert_eq!(cache.stats().entry_count, 0);
    }

    #[tokio::test]
    async fn concurrent_computations_are_coalesced() {
        let cache = ResultCache::new(100);
        let runs = Arc::new(AtomicUsize::new(0));

        let calls = (0..8).map(|_| {
            let runs = Arc::clone(&runs);
            let cache = cache.clone();
            async move {
                cache
                    .get_or_try_compute::<u32, TestError, _, _>("matrix-demand", None, || async move {
                        runs.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(30)).await;
                        Ok(42)
                    })
                    .await
            }
        });
        let results = futures::future::join_all(calls).await;

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| r.as_deref() == Ok(&42)));
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 7);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = ResultCache::new(100);
        let failed = cache
            .get_or_try_compute::<u32, _, _, _>("k", None, || async { Err(TestError::Failed) })
            .await;
        assert_eq!(failed, Err(TestError::Failed));

        let ok = cache
            .get_or_try_compute::<u32, TestError, _, _>("k", None, || async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(*ok, 7);
    }

    #[tokio::test]
    async fn compute_replaces_value_of_other_type() {
        let cache = ResultCache::new(100);
        cache.set("k", "text".to_string(), None).await;
        let value = cache
            .get_or_try_compute::<u32, TestError, _, _>("k", None, || async { Ok(9) })
            .await
            .unwrap();
        assert_eq!(*value, 9);
    }
}
