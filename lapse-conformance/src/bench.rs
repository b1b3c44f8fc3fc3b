//! Benchmark bodies shared across store backends.
//!
//! These are single-iteration closures meant to be driven from a criterion
//! `b.iter` loop; see `benches/store_ops.rs`.

use lapse_core::{Store, StoreExt};
use std::time::Duration;

/// Lifetime long enough that entries never expire mid-benchmark.
const BENCH_TTL: Duration = Duration::from_secs(3600);

/// One add+get round under a fresh key.
///
/// In transient mode the get consumes the entry, so the store does not grow
/// across iterations; in plain mode keys cycle through a bounded set.
pub fn add_get<S: Store>(store: &S, round: u64) {
    let key = format!("bench:{}", round % 1024);
    store
        .put(&key, &round, BENCH_TTL)
        .expect("bench: put failed");
    let _: u64 = store.get(&key).expect("bench: get failed");
}

/// One atomic increment on a single contended key.
pub fn atomic_increment<S: Store>(store: &S) -> i64 {
    store
        .increment("bench:counter", 1)
        .expect("bench: increment failed")
}
