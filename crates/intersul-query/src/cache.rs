//! Keyed query cache with staleness, garbage collection and LRU eviction.

use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use lru::LruCache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::config::{CacheConfig, DEFAULT_GC_TIME, QueryOptions};
use crate::error::{QueryError, Result};
use crate::key::QueryKey;

/// Entry stored in the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Cached value.
    pub value: Value,

    /// When the value was last written.
    pub updated_at: Instant,

    /// When the entry was last read or written.
    pub accessed_at: Instant,

    /// Set by invalidation; cleared by the next write.
    pub stale: bool,

    /// Freshness window measured from `updated_at`.
    pub stale_time: Duration,

    /// Garbage-collection window measured from `accessed_at`.
    pub gc_time: Duration,
}

impl CacheEntry {
    fn new(value: Value, stale_time: Duration, gc_time: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            updated_at: now,
            accessed_at: now,
            stale: false,
            stale_time,
            gc_time,
        }
    }

    /// Whether the value can be served without refetching.
    pub fn is_fresh(&self) -> bool {
        !self.stale && self.updated_at.elapsed() < self.stale_time
    }

    /// Whether the entry has gone unaccessed past its GC window.
    pub fn is_collectable(&self, now: Instant) -> bool {
        now.duration_since(self.accessed_at) > self.gc_time
    }

    fn touch(&mut self) {
        self.accessed_at = Instant::now();
    }
}

/// Change notification, used to re-render views bound to a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// A value was written.
    Updated(QueryKey),
    /// A value was marked stale.
    Invalidated(QueryKey),
    /// An entry was removed (explicitly, by GC, or by LRU eviction).
    Removed(QueryKey),
    /// Everything was removed.
    Cleared,
}

/// The prior state of every entry under a prefix.
///
/// Restoring a snapshot puts the prefix back exactly as it was: entries are
/// reinstated verbatim and entries created since are removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    prefix: QueryKey,
    entries: Vec<(QueryKey, CacheEntry)>,
}

impl Snapshot {
    pub fn prefix(&self) -> &QueryKey {
        &self.prefix
    }

    /// Keys and values captured, in no particular order.
    pub fn values(&self) -> impl Iterator<Item = (&QueryKey, &Value)> {
        self.entries.iter().map(|(k, e)| (k, &e.value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The same snapshot with every entry marked stale, so a restore puts
    /// the old values back but the next read refetches.
    pub fn into_stale(mut self) -> Self {
        for (_, entry) in &mut self.entries {
            entry.stale = true;
        }
        self
    }
}

/// A fetch currently awaiting its result.
struct InFlight {
    id: u64,
    token: CancellationToken,
}

/// Inner state protected by RwLock.
struct CacheInner {
    lru: LruCache<QueryKey, CacheEntry>,
    in_flight: HashMap<QueryKey, InFlight>,
}

impl CacheInner {
    fn put(&mut self, key: QueryKey, entry: CacheEntry, events: &broadcast::Sender<CacheEvent>) {
        if let Some((evicted, _)) = self.lru.push(key.clone(), entry)
            && evicted != key
        {
            debug!(key = %evicted, "Evicting LRU query to make room");
            let _ = events.send(CacheEvent::Removed(evicted));
        }
        let _ = events.send(CacheEvent::Updated(key));
    }

    fn restore(&mut self, snapshot: Snapshot, events: &broadcast::Sender<CacheEvent>) {
        for key in self.keys_under(&snapshot.prefix) {
            if !snapshot.entries.iter().any(|(k, _)| *k == key) {
                self.lru.pop(&key);
                let _ = events.send(CacheEvent::Removed(key));
            }
        }
        for (key, entry) in snapshot.entries {
            self.put(key, entry, events);
        }
        debug!(prefix = %snapshot.prefix, "Restored query snapshot");
    }

    fn keys_under(&self, prefix: &QueryKey) -> Vec<QueryKey> {
        self.lru
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect()
    }
}

/// Keyed store of remote query results.
///
/// Values are kept as JSON so that optimistic mutations can rewrite them
/// without knowing their concrete type; typed access goes through
/// [`get_typed`](Self::get_typed) and [`fetch`](Self::fetch).
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<RwLock<CacheInner>>,
    events: broadcast::Sender<CacheEvent>,
    next_fetch_id: Arc<AtomicU64>,
    config: CacheConfig,
}

impl QueryCache {
    /// Create a new cache.
    pub fn new(config: CacheConfig) -> Self {
        let cap = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        Self {
            inner: Arc::new(RwLock::new(CacheInner {
                lru: LruCache::new(cap),
                in_flight: HashMap::new(),
            })),
            events,
            next_fetch_id: Arc::new(AtomicU64::new(1)),
            config,
        }
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Get the current number of cached entries.
    pub async fn len(&self) -> usize {
        self.inner.read().await.lru.len()
    }

    /// Check if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.lru.is_empty()
    }

    /// Whether an entry exists for exactly `key`.
    pub async fn contains(&self, key: &QueryKey) -> bool {
        self.inner.read().await.lru.contains(key)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a value, marking the entry as recently used.
    pub async fn get(&self, key: &QueryKey) -> Option<Value> {
        let mut inner = self.inner.write().await;
        inner.lru.get_mut(key).map(|entry| {
            entry.touch();
            entry.value.clone()
        })
    }

    /// Get a value decoded into `T`.
    pub async fn get_typed<T: DeserializeOwned>(
        &self,
        key: &QueryKey,
    ) -> std::result::Result<Option<T>, serde_json::Error> {
        self.get(key)
            .await
            .map(serde_json::from_value)
            .transpose()
    }

    /// Peek at an entry without updating LRU order or access time.
    pub async fn peek_entry(&self, key: &QueryKey) -> Option<CacheEntry> {
        self.inner.read().await.lru.peek(key).cloned()
    }

    /// Whether `key` holds a value that is still fresh.
    pub async fn is_fresh(&self, key: &QueryKey) -> bool {
        self.inner
            .read()
            .await
            .lru
            .peek(key)
            .is_some_and(CacheEntry::is_fresh)
    }

    /// Every `(key, value)` under `prefix`.
    pub async fn entries_by_prefix(&self, prefix: &QueryKey) -> Vec<(QueryKey, Value)> {
        let inner = self.inner.read().await;
        inner
            .lru
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, e)| (k.clone(), e.value.clone()))
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Write a value with default windows, replacing any existing entry.
    pub async fn set_entry(&self, key: QueryKey, value: Value) {
        self.set_entry_with(key, value, QueryOptions::default()).await;
    }

    /// Write a value with explicit windows.
    ///
    /// An existing entry keeps its configured windows when `options` are the
    /// defaults, so detail writes after a mutation do not shorten them.
    pub async fn set_entry_with(&self, key: QueryKey, value: Value, options: QueryOptions) {
        let mut inner = self.inner.write().await;
        let (stale_time, gc_time) = match inner.lru.peek(&key) {
            Some(existing) if options == QueryOptions::default() => {
                (existing.stale_time, existing.gc_time)
            }
            _ => (options.stale_time, options.gc_time),
        };
        trace!(key = %key, "Writing query result");
        inner.put(key, CacheEntry::new(value, stale_time, gc_time), &self.events);
    }

    /// Serialize and write a typed value.
    pub async fn set_typed<T: Serialize>(
        &self,
        key: QueryKey,
        value: &T,
    ) -> std::result::Result<(), serde_json::Error> {
        let value = serde_json::to_value(value)?;
        self.set_entry(key, value).await;
        Ok(())
    }

    /// Apply `f` to the value of every entry under `prefix`.
    ///
    /// Returns the number of entries visited.
    pub async fn set_entries_by_prefix<F>(&self, prefix: &QueryKey, mut f: F) -> usize
    where
        F: FnMut(&QueryKey, &mut Value),
    {
        let mut inner = self.inner.write().await;
        let mut touched = Vec::new();
        for (key, entry) in inner.lru.iter_mut() {
            if key.starts_with(prefix) {
                f(key, &mut entry.value);
                entry.updated_at = Instant::now();
                entry.touch();
                touched.push(key.clone());
            }
        }
        for key in &touched {
            let _ = self.events.send(CacheEvent::Updated(key.clone()));
        }
        touched.len()
    }

    /// Mark every entry under `prefix` stale.
    ///
    /// Stale entries are refetched by the next [`fetch`](Self::fetch).
    /// Returns the number of entries marked.
    pub async fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut inner = self.inner.write().await;
        let mut count = 0;
        for (key, entry) in inner.lru.iter_mut() {
            if key.starts_with(prefix) {
                entry.stale = true;
                count += 1;
                let _ = self.events.send(CacheEvent::Invalidated(key.clone()));
            }
        }
        if count > 0 {
            debug!(prefix = %prefix, count = count, "Invalidated queries");
        }
        count
    }

    /// Remove one entry.
    pub async fn remove_entry(&self, key: &QueryKey) -> Option<Value> {
        let mut inner = self.inner.write().await;
        let removed = inner.lru.pop(key).map(|e| e.value);
        if removed.is_some() {
            let _ = self.events.send(CacheEvent::Removed(key.clone()));
        }
        removed
    }

    /// Remove every entry under `prefix`.
    pub async fn remove_prefix(&self, prefix: &QueryKey) -> usize {
        let mut inner = self.inner.write().await;
        let keys = inner.keys_under(prefix);
        for key in &keys {
            inner.lru.pop(key);
            let _ = self.events.send(CacheEvent::Removed(key.clone()));
        }
        keys.len()
    }

    /// Remove everything and cancel every in-flight fetch.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        for (_, flight) in inner.in_flight.drain() {
            flight.token.cancel();
        }
        inner.lru.clear();
        let _ = self.events.send(CacheEvent::Cleared);
        debug!("Query cache cleared");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Snapshots
    // ─────────────────────────────────────────────────────────────────────────

    /// Capture every entry under `prefix`.
    pub async fn snapshot_prefix(&self, prefix: &QueryKey) -> Snapshot {
        let inner = self.inner.read().await;
        snapshot_locked(&inner, prefix)
    }

    /// Capture `prefix`, then apply `f` to each captured value, under a
    /// single lock so no write can land between the two.
    pub async fn snapshot_and_update<F>(&self, prefix: &QueryKey, mut f: F) -> Snapshot
    where
        F: FnMut(&QueryKey, &mut Value),
    {
        let mut inner = self.inner.write().await;
        let snapshot = snapshot_locked(&inner, prefix);
        let now = Instant::now();
        for (key, entry) in inner.lru.iter_mut() {
            if key.starts_with(prefix) {
                f(key, &mut entry.value);
                entry.updated_at = now;
                entry.accessed_at = now;
            }
        }
        for (key, _) in &snapshot.entries {
            let _ = self.events.send(CacheEvent::Updated(key.clone()));
        }
        snapshot
    }

    /// Put a prefix back exactly as captured.
    pub async fn restore(&self, snapshot: Snapshot) {
        let mut inner = self.inner.write().await;
        inner.restore(snapshot, &self.events);
    }

    /// Like [`restore`](Self::restore) but without waiting for the lock.
    ///
    /// Usable from synchronous code such as `Drop`. Hands the snapshot back
    /// when the cache is busy.
    pub fn try_restore(&self, snapshot: Snapshot) -> std::result::Result<(), Snapshot> {
        match self.inner.try_write() {
            Ok(mut inner) => {
                inner.restore(snapshot, &self.events);
                Ok(())
            }
            Err(_) => Err(snapshot),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Fetching
    // ─────────────────────────────────────────────────────────────────────────

    /// Cancel every in-flight fetch under `prefix`.
    ///
    /// Cancelled fetches resolve to [`QueryError::Cancelled`] and never write
    /// their result. Returns the number cancelled.
    pub async fn cancel_in_flight(&self, prefix: &QueryKey) -> usize {
        let mut inner = self.inner.write().await;
        let keys: Vec<QueryKey> = inner
            .in_flight
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        for key in &keys {
            if let Some(flight) = inner.in_flight.remove(key) {
                trace!(key = %key, "Cancelling in-flight query");
                flight.token.cancel();
            }
        }
        keys.len()
    }

    /// Number of fetches currently awaiting a result.
    pub async fn in_flight_count(&self) -> usize {
        self.inner.read().await.in_flight.len()
    }

    /// Serve `key` from cache when fresh, otherwise run `fetcher` and cache
    /// its result.
    ///
    /// Honours `options.enabled`: a disabled query returns whatever is
    /// cached (fresh or not) and never fetches.
    pub async fn query<T, E, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> Result<Option<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        if !options.enabled {
            return Ok(self.get_typed(&key).await?);
        }
        self.fetch(key, options, fetcher).await.map(Some)
    }

    /// Serve `key` from cache when fresh, otherwise run `fetcher`.
    ///
    /// The fetch is registered in-flight; if it is cancelled before it
    /// settles, its result is discarded and `Cancelled` is returned.
    pub async fn fetch<T, E, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let (id, token) = {
            let mut inner = self.inner.write().await;
            if let Some(entry) = inner.lru.get_mut(&key)
                && entry.is_fresh()
            {
                trace!(key = %key, "Query served from cache");
                entry.touch();
                let value = entry.value.clone();
                drop(inner);
                return Ok(serde_json::from_value(value)?);
            }

            let id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);
            let token = CancellationToken::new();
            if let Some(previous) = inner.in_flight.insert(
                key.clone(),
                InFlight {
                    id,
                    token: token.clone(),
                },
            ) {
                trace!(key = %key, superseded = previous.id, "Query refetch supersedes earlier fetch");
            }
            (id, token)
        };

        debug!(key = %key, "Query cache miss, fetching");
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = fetcher() => Some(result),
        };

        let mut inner = self.inner.write().await;
        let current = inner.in_flight.get(&key).is_some_and(|f| f.id == id);
        if current {
            inner.in_flight.remove(&key);
        }

        let Some(result) = result else {
            debug!(key = %key, "Query cancelled before settling");
            return Err(QueryError::Cancelled);
        };
        if token.is_cancelled() {
            debug!(key = %key, "Query cancelled, discarding result");
            return Err(QueryError::Cancelled);
        }

        let value = result.map_err(QueryError::Fetch)?;
        if current {
            let json = serde_json::to_value(&value)?;
            inner.put(key, CacheEntry::new(json, options.stale_time, options.gc_time), &self.events);
        }
        Ok(value)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Garbage collection
    // ─────────────────────────────────────────────────────────────────────────

    /// Drop entries unaccessed past their GC window.
    ///
    /// Entries with a fetch in flight are kept. Returns the number dropped.
    pub async fn collect_garbage(&self) -> usize {
        let mut inner = self.inner.write().await;
        let now = Instant::now();
        let expired: Vec<QueryKey> = inner
            .lru
            .iter()
            .filter(|(k, e)| e.is_collectable(now) && !inner.in_flight.contains_key(*k))
            .map(|(k, _)| k.clone())
            .collect();

        for key in &expired {
            inner.lru.pop(key);
            let _ = self.events.send(CacheEvent::Removed(key.clone()));
        }

        if !expired.is_empty() {
            debug!(count = expired.len(), "Collected unused queries");
        }
        expired.len()
    }

    /// Run [`collect_garbage`](Self::collect_garbage) every
    /// `cleanup_interval` until `shutdown` is cancelled.
    ///
    /// Returns `None` when the cleanup task is disabled in the config.
    pub fn spawn_cleanup_task(&self, shutdown: CancellationToken) -> Option<JoinHandle<()>> {
        if !self.config.enable_cleanup_task {
            return None;
        }
        let cache = self.clone();
        let period = if self.config.cleanup_interval.is_zero() {
            DEFAULT_GC_TIME
        } else {
            self.config.cleanup_interval
        };

        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        cache.collect_garbage().await;
                    }
                }
            }
            trace!("Query cache cleanup task stopped");
        }))
    }

    /// Get cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.read().await;
        CacheStats {
            size: inner.lru.len(),
            capacity: self.config.max_entries,
            stale: inner.lru.iter().filter(|(_, e)| !e.is_fresh()).count(),
            in_flight: inner.in_flight.len(),
        }
    }
}

fn snapshot_locked(inner: &CacheInner, prefix: &QueryKey) -> Snapshot {
    Snapshot {
        prefix: prefix.clone(),
        entries: inner
            .lru
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, e)| (k.clone(), e.clone()))
            .collect(),
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Current number of cached entries.
    pub size: usize,

    /// Maximum capacity.
    pub capacity: usize,

    /// Entries that would be refetched on next access.
    pub stale: usize,

    /// Fetches awaiting a result.
    pub in_flight: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_key;
    use serde_json::json;
    use std::convert::Infallible;
    use std::sync::atomic::AtomicUsize;

    fn cache() -> QueryCache {
        QueryCache::new(CacheConfig::new().with_cleanup_task(false))
    }

    fn fresh_for(secs: u64) -> QueryOptions {
        QueryOptions::new().stale_time(Duration::from_secs(secs))
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = cache();
        cache.set_entry(query_key!["clients", 7i64], json!({"id": 7})).await;

        assert_eq!(cache.get(&query_key!["clients", 7i64]).await, Some(json!({"id": 7})));
        assert_eq!(cache.get(&query_key!["clients", 8i64]).await, None);
    }

    #[tokio::test]
    async fn test_try_restore_hands_back_snapshot_when_busy() {
        let cache = cache();
        let key = query_key!["clients", 7i64];
        cache.set_entry(key.clone(), json!({"id": 7})).await;
        let snapshot = cache
            .snapshot_and_update(&query_key!["clients"], |_, value| *value = json!(null))
            .await;

        let snapshot = {
            let _busy = cache.inner.write().await;
            cache.try_restore(snapshot.into_stale()).unwrap_err()
        };
        assert_eq!(cache.get(&key).await, Some(json!(null)));

        cache.try_restore(snapshot).unwrap();
        assert_eq!(cache.get(&key).await, Some(json!({"id": 7})));
        assert!(!cache.is_fresh(&key).await);
    }

    #[tokio::test]
    async fn test_fresh_hit_skips_fetcher() {
        let cache = cache();
        let calls = AtomicUsize::new(0);
        let key = query_key!["clients", "stats"];

        for _ in 0..2 {
            let value: u32 = cache
                .fetch(key.clone(), fresh_for(60), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, Infallible>(42)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidated_entry_refetches() {
        let cache = cache();
        let key = query_key!["clients"];
        let calls = AtomicUsize::new(0);
        let fetch = || async {
            let n = calls.fetch_add(1, Ordering::SeqCst) as u32;
            Ok::<_, Infallible>(n)
        };

        assert_eq!(cache.fetch(key.clone(), fresh_for(60), fetch).await.unwrap(), 0);
        assert_eq!(cache.invalidate(&query_key!["clients"]).await, 1);
        assert!(!cache.is_fresh(&key).await);
        assert_eq!(cache.fetch(key.clone(), fresh_for(60), fetch).await.unwrap(), 1);
        assert!(cache.is_fresh(&key).await);
    }

    #[tokio::test]
    async fn test_fetch_error_is_not_cached() {
        let cache = cache();
        let key = query_key!["services"];
        let result: Result<u32, &str> = cache
            .fetch(key.clone(), fresh_for(60), || async { Err("boom") })
            .await;

        assert!(matches!(result, Err(QueryError::Fetch("boom"))));
        assert!(!cache.contains(&key).await);
        assert_eq!(cache.in_flight_count().await, 0);
    }

    #[tokio::test]
    async fn test_disabled_query_never_fetches() {
        let cache = cache();
        let key = query_key!["clients", "search", "a"];
        let result: Option<Vec<u32>> = cache
            .query(key.clone(), QueryOptions::new().enabled(false), || async {
                Err::<Vec<u32>, _>("disabled query must not fetch")
            })
            .await
            .unwrap();
        assert!(result.is_none());

        cache.set_entry(key.clone(), json!([1, 2])).await;
        let result: Option<Vec<u32>> = cache
            .query(key, QueryOptions::new().enabled(false), || async {
                Err::<Vec<u32>, _>("disabled query must not fetch")
            })
            .await
            .unwrap();
        assert_eq!(result, Some(vec![1, 2]));
    }

    #[tokio::test]
    async fn test_cancelled_fetch_discards_result() {
        let cache = cache();
        let key = query_key!["copy-machines", None::<&str>, 1u32, 10u32];
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let fetching = {
            let cache = cache.clone();
            let key = key.clone();
            tokio::spawn(async move {
                cache
                    .fetch(key, fresh_for(60), || async move {
                        let _ = release_rx.await;
                        Ok::<_, Infallible>(json!({"data": [], "total": 0}))
                    })
                    .await
            })
        };

        // Wait until the fetch is registered.
        while cache.in_flight_count().await == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(cache.cancel_in_flight(&query_key!["copy-machines"]).await, 1);
        let _ = release_tx.send(());

        let result = fetching.await.unwrap();
        assert!(matches!(result, Err(QueryError::Cancelled)));
        assert!(!cache.contains(&key).await);
    }

    #[tokio::test]
    async fn test_entries_and_set_by_prefix() {
        let cache = cache();
        cache.set_entry(query_key!["copy-machines", 1u32], json!({"total": 1})).await;
        cache.set_entry(query_key!["copy-machines", 2u32], json!({"total": 2})).await;
        cache.set_entry(query_key!["copy-machine", 1u32], json!({"id": 1})).await;

        assert_eq!(cache.entries_by_prefix(&query_key!["copy-machines"]).await.len(), 2);

        let visited = cache
            .set_entries_by_prefix(&query_key!["copy-machines"], |_, value| {
                value["total"] = json!(0);
            })
            .await;
        assert_eq!(visited, 2);
        assert_eq!(
            cache.get(&query_key!["copy-machines", 2u32]).await,
            Some(json!({"total": 0}))
        );
        assert_eq!(cache.get(&query_key!["copy-machine", 1u32]).await, Some(json!({"id": 1})));
    }

    #[tokio::test]
    async fn test_snapshot_restore_is_verbatim() {
        let cache = cache();
        let prefix = query_key!["copy-machines"];
        cache.set_entry(prefix.child(1u32), json!({"data": [{"id": 1}], "total": 1})).await;

        let before = cache.snapshot_prefix(&prefix).await;
        let snapshot = cache
            .snapshot_and_update(&prefix, |_, value| value["total"] = json!(99))
            .await;
        cache.set_entry(prefix.child(2u32), json!({"data": [], "total": 0})).await;

        cache.restore(snapshot).await;
        let after = cache.snapshot_prefix(&prefix).await;
        assert_eq!(before.values().collect::<Vec<_>>(), after.values().collect::<Vec<_>>());
        assert!(!cache.contains(&prefix.child(2u32)).await);
    }

    #[tokio::test]
    async fn test_lru_eviction_emits_removed() {
        let cache = QueryCache::new(CacheConfig::new().with_max_entries(2).with_cleanup_task(false));
        let mut events = cache.subscribe();

        cache.set_entry(query_key!["a"], json!(1)).await;
        cache.set_entry(query_key!["b"], json!(2)).await;
        cache.get(&query_key!["a"]).await;
        cache.set_entry(query_key!["c"], json!(3)).await;

        assert!(cache.contains(&query_key!["a"]).await);
        assert!(!cache.contains(&query_key!["b"]).await);

        let mut removed = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let CacheEvent::Removed(key) = event {
                removed.push(key);
            }
        }
        assert_eq!(removed, vec![query_key!["b"]]);
    }

    #[tokio::test]
    async fn test_garbage_collection_uses_last_access() {
        let cache = cache();
        let short = QueryOptions::new().gc_time(Duration::from_millis(100));
        cache.set_entry_with(query_key!["old"], json!(1), short).await;
        cache.set_entry_with(query_key!["kept"], json!(2), short).await;

        tokio::time::sleep(Duration::from_millis(70)).await;
        cache.get(&query_key!["kept"]).await;
        tokio::time::sleep(Duration::from_millis(70)).await;

        assert_eq!(cache.collect_garbage().await, 1);
        assert!(!cache.contains(&query_key!["old"]).await);
        assert!(cache.contains(&query_key!["kept"]).await);
    }

    #[tokio::test]
    async fn test_clear_emits_event() {
        let cache = cache();
        let mut events = cache.subscribe();
        cache.set_entry(query_key!["a"], json!(1)).await;
        cache.clear().await;

        assert!(cache.is_empty().await);
        assert_eq!(events.recv().await.unwrap(), CacheEvent::Updated(query_key!["a"]));
        assert_eq!(events.recv().await.unwrap(), CacheEvent::Cleared);
    }

    #[tokio::test]
    async fn test_remove_entry_and_prefix() {
        let cache = cache();
        cache.set_entry(query_key!["clients", 1i64], json!(1)).await;
        cache.set_entry(query_key!["clients", 2i64], json!(2)).await;
        cache.set_entry(query_key!["services"], json!([])).await;

        assert_eq!(cache.remove_entry(&query_key!["clients", 1i64]).await, Some(json!(1)));
        assert_eq!(cache.remove_prefix(&query_key!["clients"]).await, 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_cleanup_task_stops_on_shutdown() {
        let cache = QueryCache::new(
            CacheConfig::new().with_cleanup_interval(Duration::from_millis(10)),
        );
        let shutdown = CancellationToken::new();
        let handle = cache.spawn_cleanup_task(shutdown.clone()).unwrap();
        shutdown.cancel();
        handle.await.unwrap();

        assert!(self::cache().spawn_cleanup_task(CancellationToken::new()).is_none());
    }
}
