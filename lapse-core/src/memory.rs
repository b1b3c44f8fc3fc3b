use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::watch;

use crate::config::StoreConfig;
use crate::entry::Entry;
use crate::error::StoreError;
use crate::store::Store;

/// Cap TTLs to ~100 years to prevent overflow when adding to Instant.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Internal shared state for the store
struct MemoryStoreInner {
    data: DashMap<String, Entry>,
    /// Sender to signal shutdown to the sweep task
    shutdown_tx: watch::Sender<bool>,
    /// When set, a successful read removes the entry
    transient: AtomicBool,
    /// When set, reads verify expiration against the clock
    accurate: AtomicBool,
    /// Lifetime for entries the store creates on its own (counters)
    default_ttl: Duration,
}

/// Thread-safe in-memory expiring key-value store
///
/// Uses `DashMap` for lock-free concurrent access. Reads never block other
/// reads, and writes only block access to the specific key being written.
/// Conflicting mutations on one key (increments, transient reads) are
/// serialized through the map's per-key primitives, so no updates are lost
/// under concurrent callers.
///
/// Each store spawns its own background sweep task that periodically removes
/// expired entries. The sweep task is automatically stopped when the store is
/// dropped. The sweep only bounds physical retention; visibility of expired
/// entries is governed by the accuracy toggle
/// ([`ensure_accuracy`](Store::ensure_accuracy)), which defaults to on.
///
/// # Example
///
/// ```rust,no_run
/// use lapse_core::{MemoryStore, Store, StoreConfig, StoreExt};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let config = StoreConfig::default()
///         .with_sweep_interval(Duration::from_secs(30));
///     let store = MemoryStore::with_config(config);
///
///     store.put("user:123", &"John Doe", Duration::from_secs(300)).unwrap();
///     let name: String = store.get("user:123").unwrap();
///     assert_eq!(name, "John Doe");
///
///     let hits = store.increment("hits", 1).unwrap();
///     assert_eq!(hits, 1);
/// }
/// ```
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryStoreInner>,
}

impl MemoryStore {
    /// Creates a new store with default configuration
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context. The store
    /// requires a runtime to spawn its background sweep task.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates a new store with custom configuration
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context. The store
    /// requires a runtime to spawn its background sweep task.
    pub fn with_config(config: StoreConfig) -> Self {
        // Verify that a Tokio runtime is available before proceeding.
        // This provides a clear error message instead of a cryptic panic from tokio::spawn.
        if tokio::runtime::Handle::try_current().is_err() {
            panic!(
                "lapse_core::MemoryStore requires a Tokio runtime. \
                 Ensure you are calling MemoryStore::new() or MemoryStore::with_config() \
                 from within a #[tokio::main] or #[tokio::test] context, \
                 or from code running on a Tokio runtime."
            );
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let inner = Arc::new(MemoryStoreInner {
            data: DashMap::new(),
            shutdown_tx,
            transient: AtomicBool::new(config.transient),
            accurate: AtomicBool::new(config.accurate),
            default_ttl: config.default_ttl,
        });

        // Spawn the background sweep task
        let sweep_inner = Arc::clone(&inner);
        tokio::spawn(Self::sweep_task(sweep_inner, config.sweep_interval, shutdown_rx));

        Self { inner }
    }

    /// Background task that periodically removes expired entries
    async fn sweep_task(
        inner: Arc<MemoryStoreInner>,
        interval: Duration,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(interval);
        // Skip the first immediate tick - we want to wait for the interval first
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = Self::sweep_internal(&inner);
                    if removed > 0 {
                        tracing::debug!(removed, "swept expired entries");
                    }
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        // Shutdown signal received
                        break;
                    }
                }
            }
        }
    }

    /// Internal sweep logic (shared between manual and background sweep)
    fn sweep_internal(inner: &MemoryStoreInner) -> usize {
        let mut removed_count = 0;

        inner.data.retain(|_, entry| {
            if entry.is_expired() {
                removed_count += 1;
                false
            } else {
                true
            }
        });

        removed_count
    }

    /// Absolute expiration time for an entry created now with `ttl`
    fn deadline(ttl: Duration) -> Instant {
        Instant::now() + ttl.min(MAX_TTL)
    }

    fn is_accurate(&self) -> bool {
        self.inner.accurate.load(Ordering::Relaxed)
    }

    /// Removes the entry under `key` if it is still expired, keeping the
    /// map's size and a concurrent overwrite both intact
    fn purge_if_expired(&self, key: &str) {
        self.inner.data.remove_if(key, |_, entry| entry.is_expired());
    }

    /// Read-and-delete for transient mode. Removal and read are one atomic
    /// step, so two concurrent readers cannot both observe the value.
    fn take_value(&self, key: &str) -> Result<Value, StoreError> {
        let accurate = self.is_accurate();
        let removed = self
            .inner
            .data
            .remove_if(key, |_, entry| !(accurate && entry.is_expired()));

        match removed {
            Some((_, entry)) => Ok(entry.into_value()),
            None => {
                // Absent, or present but expired; drop the stale row either way
                self.purge_if_expired(key);
                Err(StoreError::NotFound)
            }
        }
    }

    /// Manually triggers a sweep of all expired entries
    ///
    /// Returns the number of entries removed.
    ///
    /// Note: This is also done automatically by the background task.
    pub fn sweep(&self) -> usize {
        Self::sweep_internal(&self.inner)
    }

    /// Returns the number of entries in the store (including expired ones)
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.data.len()
    }

    /// Returns `true` if the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.data.is_empty()
    }

    /// Gracefully shuts down the background sweep task
    ///
    /// This is called automatically when the store is dropped,
    /// but can be called manually if needed.
    pub fn shutdown(&self) {
        let _ = self.inner.shutdown_tx.send(true);
    }

    /// Stores an entry that expired in the past (for testing purposes)
    #[cfg(test)]
    fn put_expired(&self, key: impl Into<String>, value: Value) {
        let expires_at = Instant::now() - Duration::from_secs(1);
        self.inner
            .data
            .insert(key.into(), Entry::new(Arc::new(value), expires_at));
    }
}

/// Human-readable kind of a stored value, for type-mismatch reporting
fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Store for MemoryStore {
    fn put_value(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError> {
        let entry = Entry::new(Arc::new(value), Self::deadline(ttl));
        self.inner.data.insert(key.to_string(), entry);
        Ok(())
    }

    fn get_value(&self, key: &str) -> Result<Value, StoreError> {
        if self.inner.transient.load(Ordering::Relaxed) {
            return self.take_value(key);
        }

        let entry = self.inner.data.get(key).ok_or(StoreError::NotFound)?;

        if self.is_accurate() && entry.value().is_expired() {
            // Drop the read reference before removing
            drop(entry);
            self.purge_if_expired(key);
            return Err(StoreError::NotFound);
        }

        Ok(entry.value().value().clone())
    }

    fn increment(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        // The entry API holds the key's shard exclusively for the whole
        // read-modify-write, which makes the increment linearizable.
        match self.inner.data.entry(key.to_string()) {
            MapEntry::Occupied(mut slot) => {
                if self.is_accurate() && slot.get().is_expired() {
                    // Expired counters restart from zero
                    let entry =
                        Entry::new(Arc::new(Value::from(delta)), Self::deadline(self.inner.default_ttl));
                    slot.insert(entry);
                    return Ok(delta);
                }

                let current = slot.get().value().as_i64().ok_or_else(|| {
                    StoreError::TypeMismatch(format!(
                        "cannot increment {} value under key {:?}",
                        value_kind(slot.get().value()),
                        key
                    ))
                })?;

                let next = current.saturating_add(delta);
                // The delta must not reset the entry's lifetime
                let expires_at = slot.get().expires_at();
                slot.insert(Entry::new(Arc::new(Value::from(next)), expires_at));
                Ok(next)
            }
            MapEntry::Vacant(slot) => {
                let entry =
                    Entry::new(Arc::new(Value::from(delta)), Self::deadline(self.inner.default_ttl));
                slot.insert(entry);
                Ok(delta)
            }
        }
    }

    fn postpone(&self, key: &str, ttl: Duration) -> Result<(), StoreError> {
        let deadline = Self::deadline(ttl);

        let mut entry = self.inner.data.get_mut(key).ok_or(StoreError::NotFound)?;

        // Postponing an already-expired entry must fail regardless of the
        // accuracy toggle; it would otherwise resurrect dead data.
        if entry.is_expired() {
            drop(entry);
            self.purge_if_expired(key);
            return Err(StoreError::NotFound);
        }

        entry.set_expires_at(deadline);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.inner.data.remove(key);
        Ok(())
    }

    fn flush(&self) -> Result<(), StoreError> {
        let count = self.inner.data.len();
        self.inner.data.clear();
        tracing::debug!(count, "store flushed");
        Ok(())
    }

    fn set_transient(&self, transient: bool) {
        self.inner.transient.store(transient, Ordering::Relaxed);
    }

    fn ensure_accuracy(&self, accurate: bool) {
        self.inner.accurate.store(accurate, Ordering::Relaxed);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MemoryStoreInner {
    fn drop(&mut self) {
        // Signal the sweep task to stop when the store is dropped
        let _ = self.shutdown_tx.send(true);
    }
}
