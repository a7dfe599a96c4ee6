//! Configuration for the query cache and individual queries.

use std::time::Duration;

/// Default maximum number of cached query results.
pub const DEFAULT_MAX_ENTRIES: usize = 1_000;

/// Default staleness window: results are stale immediately.
pub const DEFAULT_STALE_TIME: Duration = Duration::ZERO;

/// Default garbage-collection window (five minutes without access).
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(5 * 60);

/// Configuration for the query cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries before LRU eviction.
    pub max_entries: usize,

    /// Whether to run periodic garbage collection.
    /// If false, unused entries are only dropped by LRU pressure or
    /// explicit [`collect_garbage`](crate::QueryCache::collect_garbage) calls.
    pub enable_cleanup_task: bool,

    /// Interval for the cleanup task (if enabled).
    pub cleanup_interval: Duration,

    /// Capacity of the event channel.
    pub event_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            enable_cleanup_task: true,
            cleanup_interval: Duration::from_secs(60),
            event_capacity: 256,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached results.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Enable or disable the background cleanup task.
    pub fn with_cleanup_task(mut self, enabled: bool) -> Self {
        self.enable_cleanup_task = enabled;
        self
    }

    /// Set the cleanup interval.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }
}

/// Per-query options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long a result counts as fresh after it was written.
    pub stale_time: Duration,
    /// How long an entry may go unaccessed before garbage collection.
    pub gc_time: Duration,
    /// Disabled queries never fetch.
    pub enabled: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
            gc_time: DEFAULT_GC_TIME,
            enabled: true,
        }
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }

    pub fn gc_time(mut self, gc_time: Duration) -> Self {
        self.gc_time = gc_time;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}
