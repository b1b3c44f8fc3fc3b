//! The store contract every expiring key-value backend implements.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::error::StoreError;

/// Contract for a key-value store whose entries carry a time-to-live.
///
/// Implementations must uphold three invariants:
///
/// - A key maps to at most one live entry; writing an existing key
///   overwrites the value and resets the expiry.
/// - While accuracy is enabled, an expired entry is never returned by a
///   read, even when the backend has not physically purged it yet.
/// - [`increment`](Store::increment) is linearizable with respect to
///   concurrent callers on the same key. Backends must use a native atomic
///   primitive (conditional update, per-key exclusive access) rather than
///   client-side read-modify-write, so correctness holds even across
///   processes sharing the backend.
///
/// Operations at this level exchange [`serde_json::Value`] payloads; the
/// typed convenience forms live in [`StoreExt`].
pub trait Store {
    /// Inserts or overwrites an entry, expiring `ttl` from now.
    ///
    /// Overwriting an existing key is defined behavior, not a fault.
    fn put_value(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError>;

    /// Returns the value stored under `key`.
    ///
    /// Fails with [`StoreError::NotFound`] when the key is absent or the
    /// entry has expired. In transient mode a successful read atomically
    /// removes the entry as a side effect.
    fn get_value(&self, key: &str) -> Result<Value, StoreError>;

    /// Atomically applies a numeric delta and returns the new value.
    ///
    /// A missing (or expired) key is zero-initialized before the delta is
    /// applied, using the store's default TTL. Fails with
    /// [`StoreError::TypeMismatch`] when the live stored value is not an
    /// integer.
    fn increment(&self, key: &str, delta: i64) -> Result<i64, StoreError>;

    /// Resets the expiry of a live entry to `ttl` from now, leaving its
    /// value untouched.
    ///
    /// Fails with [`StoreError::NotFound`] when the entry is absent or has
    /// already expired.
    fn postpone(&self, key: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Removes an entry if present. Absence is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Removes every entry in the store's namespace.
    fn flush(&self) -> Result<(), StoreError>;

    /// Toggles transient mode: when enabled, a successful read deletes the
    /// entry immediately after returning it.
    fn set_transient(&self, transient: bool);

    /// Toggles client-side expiry verification.
    ///
    /// Backend sweeps typically run on a coarse interval (seconds), while
    /// callers may use millisecond TTLs. With accuracy enabled, every read
    /// compares `expires_at` against the current time instead of trusting
    /// the sweep, so sub-interval TTLs stay correct.
    fn ensure_accuracy(&self, accurate: bool);
}

/// Typed convenience operations over any [`Store`].
///
/// Blanket-implemented; bring the trait into scope to use them.
pub trait StoreExt: Store {
    /// Serializes `value` and stores it under `key` with the given TTL.
    fn put<V: Serialize>(&self, key: &str, value: &V, ttl: Duration) -> Result<(), StoreError> {
        let value = serde_json::to_value(value).map_err(StoreError::Serialization)?;
        self.put_value(key, value, ttl)
    }

    /// Retrieves the value under `key`, decoded as `V`.
    ///
    /// A present, live value that cannot be decoded as `V` is a
    /// [`StoreError::TypeMismatch`]. In transient mode the entry is consumed
    /// by the read even when decoding fails afterwards.
    fn get<V: DeserializeOwned>(&self, key: &str) -> Result<V, StoreError> {
        let value = self.get_value(key)?;
        serde_json::from_value(value).map_err(|err| StoreError::TypeMismatch(err.to_string()))
    }
}

impl<S: Store + ?Sized> StoreExt for S {}
