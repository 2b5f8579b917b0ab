//! In-memory stores for download jobs and rendered outputs
//!
//! Nothing here touches disk. A store lives exactly as long as the value
//! that owns it (normally the [`ExportService`](crate::service::ExportService)),
//! so a restarted process starts empty and every old id is `NotFound`.
//!
//! - [`jobs`] - raw download results keyed by [`JobId`](crate::types::JobId)
//! - [`outputs`] - rendered extracts keyed by [`OutputId`](crate::types::OutputId)

mod jobs;
mod outputs;

pub use jobs::{Job, JobStore};
pub use outputs::{ExtractedOutput, OutputStore};

use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

struct Entry<V> {
    value: Arc<V>,
    inserted_at: DateTime<Utc>,
}

/// Map whose entries become unreachable once older than a TTL
///
/// Writers hold the write lock for the whole mutation, so readers only ever
/// observe a fully inserted `Arc<V>` or nothing. Expired entries are removed
/// lazily on lookup and swept on every insert.
pub(crate) struct ExpiringMap<K, V> {
    entries: RwLock<HashMap<K, Entry<V>>>,
    ttl: Option<Duration>,
}

impl<K, V> ExpiringMap<K, V>
where
    K: Eq + Hash + Clone,
{
    pub(crate) fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub(crate) fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    fn is_expired(&self, inserted_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        let Some(ttl) = self.ttl else {
            return false;
        };
        match TimeDelta::from_std(ttl) {
            Ok(ttl) => now - inserted_at >= ttl,
            // TTL too large to represent: treat as unbounded
            Err(_) => false,
        }
    }

    /// Insert `value` under `key`, sweeping expired entries first
    pub(crate) async fn insert(&self, key: K, value: V, now: DateTime<Utc>) -> Arc<V> {
        let value = Arc::new(value);
        let mut entries = self.entries.write().await;

        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry.inserted_at, now));
        let swept = before - entries.len();
        if swept > 0 {
            tracing::debug!(swept, "evicted expired entries");
        }

        entries.insert(
            key,
            Entry {
                value: Arc::clone(&value),
                inserted_at: now,
            },
        );
        value
    }

    /// Look up a live entry; an expired one is removed and reported as absent
    pub(crate) async fn get(&self, key: &K, now: DateTime<Utc>) -> Option<Arc<V>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return None,
                Some(entry) if !self.is_expired(entry.inserted_at, now) => {
                    return Some(Arc::clone(&entry.value));
                }
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        if entries
            .get(key)
            .is_some_and(|entry| self.is_expired(entry.inserted_at, now))
        {
            entries.remove(key);
        }
        None
    }

    /// Number of entries that are still live at `now`
    pub(crate) async fn live_count(&self, now: DateTime<Utc>) -> usize {
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| !self.is_expired(entry.inserted_at, now))
            .count()
    }

    pub(crate) async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
