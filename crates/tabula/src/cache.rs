//! In-memory result cache with per-entry expiration.

use std::{
    any::Any,
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak},
    time::{Duration, Instant},
};
use tokio::task::JoinHandle;

type Entries = RwLock<HashMap<String, Entry>>;

/// A concurrent key to value map whose entries expire.
///
/// Reads share the lock and expire entries lazily: a read past an entry's
/// deadline removes it and reports a miss. [`Cache::spawn_sweeper`] reclaims
/// entries nobody reads again. Cloning yields another handle to the same
/// entries.
#[derive(Clone, Default)]
pub struct Cache {
    entries: Arc<Entries>,
}

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

impl Cache {
    pub fn new() -> Cache {
        Cache::default()
    }

    /// Stores `value` under `key` until `ttl` has elapsed.
    pub fn set<V: Any + Send + Sync>(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = Entry {
            value: Arc::new(value),
            expires_at: Instant::now() + ttl,
        };
        self.write().insert(key.into(), entry);
    }

    /// Returns the live value under `key`.
    ///
    /// A value stored with a different type is reported as a miss.
    pub fn get<V: Any + Send + Sync>(&self, key: &str) -> Option<Arc<V>> {
        let now = Instant::now();

        let value = {
            let entries = self.read();
            let entry = entries.get(key)?;
            if entry.is_expired(now) {
                None
            } else {
                Some(entry.value.clone())
            }
        };

        match value {
            Some(value) => value.downcast().ok(),
            None => {
                // Another writer may have replaced the entry in between
                let mut entries = self.write();
                if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
                    entries.remove(key);
                }
                None
            }
        }
    }

    pub fn delete(&self, key: &str) {
        self.write().remove(key);
    }

    /// Removes `key` itself and every key that extends it with `|`.
    pub fn delete_group(&self, key: &str) {
        let prefix = format!("{key}|");
        self.write()
            .retain(|entry_key, _| entry_key != key && !entry_key.starts_with(&prefix));
    }

    /// Drops every entry at once.
    ///
    /// The backing map is replaced under the write lock, so a concurrent
    /// reader sees either the old entries or none of them.
    pub fn clear(&self) {
        *self.write() = HashMap::new();
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes expired entries, returning how many were dropped.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(entries.len())
    }

    /// Sweeps expired entries every `interval` on the Tokio runtime.
    ///
    /// The task holds a weak handle and exits once every `Cache` handle has
    /// been dropped.
    pub fn spawn_sweeper(&self, interval: Duration) -> JoinHandle<()> {
        let entries = Arc::downgrade(&self.entries);
        tokio::spawn(sweep_loop(entries, interval))
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Entry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Entry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn sweep_loop(entries: Weak<Entries>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let Some(entries) = entries.upgrade() else {
            break;
        };
        let swept = Cache { entries }.sweep();
        if swept > 0 {
            tracing::trace!(swept, "cache sweep");
        }
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache").field("len", &self.len()).finish()
    }
}
