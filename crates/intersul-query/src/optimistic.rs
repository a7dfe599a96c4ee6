//! Optimistic mutations over cached list envelopes.
//!
//! A mutation against a list prefix (e.g. `["copy-machines"]`) runs as:
//!
//! 1. cancel in-flight reads under the prefix, so a late response cannot
//!    overwrite the speculative state;
//! 2. snapshot the prefix and apply the speculation, under one lock;
//! 3. await the remote call;
//! 4. on success, write the detail key, swap the provisional record for the
//!    server's and invalidate the prefix; on failure, restore the snapshot
//!    verbatim and return the error.
//!
//! Dropping the mutation future between steps 2 and 4 also rolls back, with
//! the restored entries marked stale.
//!
//! Two mutations on the same prefix that overlap in time each snapshot the
//! state they saw. If the first fails after the second has speculated, its
//! rollback also discards the second's speculation until the second settles
//! and invalidates. This matches the usual optimistic-update contract and is
//! left as is.

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicI64, Ordering};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use intersul_types::EntityId;

use crate::cache::{QueryCache, Snapshot};
use crate::key::QueryKey;

static NEXT_TEMP_ID: AtomicI64 = AtomicI64::new(-1);

/// A fresh provisional id. Always negative, so it never collides with a
/// server-assigned id.
pub fn next_temp_id() -> EntityId {
    NEXT_TEMP_ID.fetch_sub(1, Ordering::Relaxed)
}

/// The local effect a mutation is expected to have.
#[derive(Debug, Clone, PartialEq)]
pub enum Speculation {
    /// Prepend `record` with a temporary id and bump `total`.
    Create { record: Value },
    /// Shallow-merge `patch` into the record with `id`.
    Update { id: EntityId, patch: Value },
    /// Drop the record with `id` and decrement `total` (floored at 0).
    Delete { id: EntityId },
}

impl Speculation {
    pub fn create<T: Serialize>(record: &T) -> Result<Self, serde_json::Error> {
        Ok(Speculation::Create {
            record: serde_json::to_value(record)?,
        })
    }

    pub fn update<T: Serialize>(id: EntityId, patch: &T) -> Result<Self, serde_json::Error> {
        Ok(Speculation::Update {
            id,
            patch: serde_json::to_value(patch)?,
        })
    }

    pub fn delete(id: EntityId) -> Self {
        Speculation::Delete { id }
    }

    /// Rewrite one cached list envelope (`{ data: [...], total, .. }`).
    ///
    /// Entries that are not list envelopes are left untouched. `temp_id` is
    /// only used by `Create`; `now` stamps `created_at`/`updated_at`.
    pub fn apply(&self, entry: &mut Value, temp_id: EntityId, now: &str) {
        let Some(envelope) = entry.as_object_mut() else {
            return;
        };

        let delta = {
            let Some(Value::Array(data)) = envelope.get_mut("data") else {
                return;
            };
            match self {
                Speculation::Create { record } => {
                    let Value::Object(fields) = record else {
                        return;
                    };
                    let mut provisional = fields.clone();
                    provisional.insert("id".to_string(), Value::from(temp_id));
                    provisional.insert("created_at".to_string(), Value::from(now));
                    provisional.insert("updated_at".to_string(), Value::from(now));
                    data.insert(0, Value::Object(provisional));
                    1
                }
                Speculation::Update { id, patch } => {
                    for item in data.iter_mut().filter(|item| record_id(item) == Some(*id)) {
                        merge_shallow(item, patch, now);
                    }
                    0
                }
                Speculation::Delete { id } => {
                    data.retain(|item| record_id(item) != Some(*id));
                    -1
                }
            }
        };

        if delta != 0 {
            let total = envelope.get("total").and_then(Value::as_i64).unwrap_or(0);
            envelope.insert("total".to_string(), Value::from((total + delta).max(0)));
        }
    }
}

fn record_id(record: &Value) -> Option<EntityId> {
    record.get("id").and_then(Value::as_i64)
}

fn merge_shallow(target: &mut Value, patch: &Value, now: &str) {
    let (Value::Object(target), Value::Object(patch)) = (target, patch) else {
        return;
    };
    for (key, value) in patch {
        target.insert(key.clone(), value.clone());
    }
    target.insert("updated_at".to_string(), Value::from(now));
}

/// Replace the provisional record `temp_id` in a list envelope.
fn reconcile(entry: &mut Value, temp_id: EntityId, record: &Value) {
    if let Some(Value::Array(data)) = entry.get_mut("data") {
        for item in data.iter_mut().filter(|item| record_id(item) == Some(temp_id)) {
            *item = record.clone();
        }
    }
}

/// Per-call state, created before the remote call and dropped when it settles.
///
/// Holds the rollback snapshot until the call settles. If the mutation future
/// is dropped first (timeout, lost `select!`, aborted task) the snapshot is
/// restored on drop, marked stale since the server may or may not have
/// applied the write.
struct MutationContext<'a> {
    cache: &'a QueryCache,
    snapshot: Option<Snapshot>,
    temp_id: EntityId,
}

impl MutationContext<'_> {
    fn entries(&self) -> usize {
        self.snapshot.as_ref().map_or(0, Snapshot::len)
    }

    fn disarm(&mut self) {
        self.snapshot = None;
    }

    async fn rollback(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.cache.restore(snapshot).await;
        }
    }
}

impl Drop for MutationContext<'_> {
    fn drop(&mut self) {
        let Some(snapshot) = self.snapshot.take() else {
            return;
        };
        warn!(
            prefix = %snapshot.prefix(),
            "Mutation abandoned before settling, rolling back"
        );
        let snapshot = snapshot.into_stale();
        let Err(snapshot) = self.cache.try_restore(snapshot) else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let cache = self.cache.clone();
                handle.spawn(async move { cache.restore(snapshot).await });
            }
            Err(_) => {
                error!(prefix = %snapshot.prefix(), "Cache busy and no runtime, rollback lost");
            }
        }
    }
}

type DetailKey<'a> = Box<dyn Fn(EntityId) -> QueryKey + Send + Sync + 'a>;

/// Builder and runner for one optimistic mutation.
pub struct OptimisticMutation<'a> {
    cache: &'a QueryCache,
    prefix: QueryKey,
    detail: Option<DetailKey<'a>>,
}

impl<'a> OptimisticMutation<'a> {
    pub fn new(cache: &'a QueryCache, prefix: QueryKey) -> Self {
        Self {
            cache,
            prefix,
            detail: None,
        }
    }

    /// Key of the single-record query to keep in step (e.g. `["copy-machine", id]`).
    pub fn with_detail<F>(mut self, detail: F) -> Self
    where
        F: Fn(EntityId) -> QueryKey + Send + Sync + 'a,
    {
        self.detail = Some(Box::new(detail));
        self
    }

    /// Run the mutation.
    ///
    /// `remote` is the server call; its error is returned unchanged after
    /// the cache has been rolled back.
    pub async fn run<T, E, Fut>(self, speculation: Speculation, remote: Fut) -> Result<T, E>
    where
        T: Serialize,
        E: Display,
        Fut: Future<Output = Result<T, E>>,
    {
        let cancelled = self.cache.cancel_in_flight(&self.prefix).await;
        if cancelled > 0 {
            debug!(prefix = %self.prefix, cancelled = cancelled, "Cancelled reads before mutation");
        }

        let mut context = {
            let temp_id = match speculation {
                Speculation::Create { .. } => next_temp_id(),
                _ => 0,
            };
            let now = chrono::Utc::now().to_rfc3339();
            let snapshot = self
                .cache
                .snapshot_and_update(&self.prefix, |_, value| {
                    speculation.apply(value, temp_id, &now)
                })
                .await;
            MutationContext {
                cache: self.cache,
                snapshot: Some(snapshot),
                temp_id,
            }
        };

        match remote.await {
            Ok(record) => {
                self.settle_success(&speculation, &context, &record).await;
                context.disarm();
                Ok(record)
            }
            Err(e) => {
                error!(prefix = %self.prefix, error = %e, "Mutation failed");
                warn!(
                    prefix = %self.prefix,
                    entries = context.entries(),
                    "Rolling back optimistic update"
                );
                context.rollback().await;
                Err(e)
            }
        }
    }

    async fn settle_success<T: Serialize>(
        &self,
        speculation: &Speculation,
        context: &MutationContext<'_>,
        record: &T,
    ) {
        let record = match serde_json::to_value(record) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Mutation result not representable as JSON");
                Value::Null
            }
        };

        match speculation {
            Speculation::Create { .. } => {
                if record.is_object() {
                    let temp_id = context.temp_id;
                    self.cache
                        .set_entries_by_prefix(&self.prefix, |_, value| {
                            reconcile(value, temp_id, &record)
                        })
                        .await;
                }
                if let (Some(detail), Some(id)) = (&self.detail, record_id(&record)) {
                    self.cache.set_entry(detail(id), record.clone()).await;
                }
            }
            Speculation::Update { id, .. } => {
                if let Some(detail) = &self.detail
                    && record.is_object()
                {
                    self.cache.set_entry(detail(*id), record.clone()).await;
                }
            }
            Speculation::Delete { id } => {
                if let Some(detail) = &self.detail {
                    self.cache.remove_entry(&detail(*id)).await;
                }
            }
        }

        self.cache.invalidate(&self.prefix).await;
    }
}
