//! Client-side query cache for the Intersul console.
//!
//! This crate provides:
//! - A keyed store of remote query results with per-entry staleness and
//!   garbage-collection windows, bounded by LRU eviction
//! - Prefix operations (invalidate, cancel in-flight fetches, bulk rewrite)
//! - The optimistic-mutation protocol used by list views
//!
//! # Example
//!
//! ```rust,ignore
//! use intersul_query::{CacheConfig, QueryCache, QueryOptions, query_key};
//!
//! let cache = QueryCache::new(CacheConfig::default());
//! let stats = cache
//!     .fetch(query_key!["clients", "stats"], QueryOptions::new(), || api.clients().stats())
//!     .await?;
//! ```

mod cache;
mod config;
mod error;
mod key;
pub mod optimistic;

pub use cache::{CacheEntry, CacheEvent, CacheStats, QueryCache, Snapshot};
pub use config::{CacheConfig, DEFAULT_GC_TIME, DEFAULT_MAX_ENTRIES, DEFAULT_STALE_TIME, QueryOptions};
pub use error::{QueryError, Result};
pub use key::{KeySegment, QueryKey};
pub use optimistic::{OptimisticMutation, Speculation};
