use std::time::Duration;

/// Configuration for a store instance
///
/// # Example
///
/// ```rust
/// use lapse_core::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_default_ttl(Duration::from_secs(30))
///     .with_sweep_interval(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Lifetime applied to entries created without an explicit TTL, such as
    /// counters zero-initialized by `increment` (default: 60 seconds)
    pub default_ttl: Duration,
    /// Interval between background sweep runs (default: 60 seconds)
    pub sweep_interval: Duration,
    /// Whether a successful read deletes the entry (default: false)
    pub transient: bool,
    /// Whether reads verify expiration against the clock instead of trusting
    /// the sweep (default: true)
    pub accurate: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(60),
            transient: false,
            accurate: true,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the lifetime used for entries the store creates on its own
    ///
    /// `increment` on a missing (or expired) key zero-initializes the counter
    /// with this TTL; entries written through `put` always carry the TTL the
    /// caller passed.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Sets the sweep interval
    ///
    /// This determines how often the background task runs to remove expired
    /// entries. It bounds how long an expired entry can linger physically;
    /// whether such an entry is ever *visible* is governed by the accuracy
    /// toggle.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Sets the initial transient-mode state (read-once semantics)
    pub fn with_transient(mut self, transient: bool) -> Self {
        self.transient = transient;
        self
    }

    /// Sets the initial accuracy state
    ///
    /// Accurate stores compare `expires_at` against the clock on every read,
    /// so TTLs finer than the sweep interval still behave correctly. Turning
    /// accuracy off lets reads trust the sweep, which may briefly return
    /// entries that are logically expired but not yet purged.
    pub fn with_accuracy(mut self, accurate: bool) -> Self {
        self.accurate = accurate;
        self
    }
}
