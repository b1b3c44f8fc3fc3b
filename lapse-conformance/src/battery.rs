//! The shared black-box battery.
//!
//! Every check drives a store strictly through the [`Store`] contract, so
//! any backend can be put under test. Checks panic with a descriptive
//! message on violation, which is the failure mode the surrounding test
//! harness expects. Callers should [`flush`](Store::flush) between checks
//! to guarantee isolation.

use lapse_core::{Store, StoreExt};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::thread;
use std::time::Duration;

/// Lifetime long enough to never expire within a battery run.
const LONG_TTL: Duration = Duration::from_secs(3600);

/// Lifetime short enough to observably elapse; generous against scheduler
/// jitter on loaded CI hosts.
const SHORT_TTL: Duration = Duration::from_millis(250);

/// Margin added on top of a lifetime before asserting expiration.
const EXPIRY_MARGIN: Duration = Duration::from_millis(250);

/// Verifies atomic increment/decrement semantics.
///
/// Covers the sequential contract (put 0, +5 → 5, -2 → 3, read → 3) and
/// linearizability: concurrent callers incrementing one key must lose no
/// updates, and every caller must observe a distinct intermediate value.
pub fn check_atomic<S: Store + Sync>(store: &S) {
    store
        .put("counter", &0i64, LONG_TTL)
        .expect("atomic: seeding the counter failed");

    let after_add = store
        .increment("counter", 5)
        .expect("atomic: increment by 5 failed");
    assert_eq!(after_add, 5, "atomic: expected 5 after incrementing 0 by 5");

    let after_sub = store
        .increment("counter", -2)
        .expect("atomic: decrement by 2 failed");
    assert_eq!(after_sub, 3, "atomic: expected 3 after decrementing 5 by 2");

    let read_back: i64 = store
        .get("counter")
        .expect("atomic: reading the counter back failed");
    assert_eq!(read_back, 3, "atomic: read-back disagrees with increments");

    // Concurrency: N callers, D increments each, no lost updates.
    const CALLERS: i64 = 8;
    const ROUNDS: i64 = 100;

    store
        .put("shared", &0i64, LONG_TTL)
        .expect("atomic: seeding the shared counter failed");

    let observed_max = AtomicI64::new(0);
    thread::scope(|s| {
        for _ in 0..CALLERS {
            s.spawn(|| {
                for _ in 0..ROUNDS {
                    let seen = store
                        .increment("shared", 1)
                        .expect("atomic: concurrent increment failed");
                    observed_max.fetch_max(seen, Ordering::SeqCst);
                }
            });
        }
    });

    let total: i64 = store
        .get("shared")
        .expect("atomic: reading the shared counter failed");
    assert_eq!(
        total,
        CALLERS * ROUNDS,
        "atomic: lost updates under {} concurrent callers",
        CALLERS
    );
    assert_eq!(
        observed_max.load(Ordering::SeqCst),
        CALLERS * ROUNDS,
        "atomic: no caller observed the final count"
    );
}

/// Verifies that entries become invisible once their lifetime elapses.
pub fn check_expiration<S: Store>(store: &S) {
    store
        .put("ephemeral", &"soon gone", SHORT_TTL)
        .expect("expiration: put failed");

    let alive: String = store
        .get("ephemeral")
        .expect("expiration: entry invisible before its lifetime elapsed");
    assert_eq!(alive, "soon gone");

    thread::sleep(SHORT_TTL + EXPIRY_MARGIN);

    let err = store
        .get::<String>("ephemeral")
        .expect_err("expiration: entry still visible after its lifetime elapsed");
    assert!(
        err.is_not_found(),
        "expiration: expected NotFound, got {err}"
    );
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Profile {
    name: String,
    attempts: u32,
    active: bool,
}

/// Verifies round-tripping of several payload types.
pub fn check_value_handling<S: Store>(store: &S) {
    store
        .put("text", &"plain text", LONG_TTL)
        .expect("values: storing a string failed");
    store
        .put("int", &1234i64, LONG_TTL)
        .expect("values: storing an integer failed");
    store
        .put("float", &0.25f64, LONG_TTL)
        .expect("values: storing a float failed");
    store
        .put("flag", &true, LONG_TTL)
        .expect("values: storing a boolean failed");

    let profile = Profile {
        name: "alice".to_string(),
        attempts: 3,
        active: true,
    };
    store
        .put("profile", &profile, LONG_TTL)
        .expect("values: storing a struct failed");

    assert_eq!(
        store.get::<String>("text").expect("values: string read failed"),
        "plain text"
    );
    assert_eq!(
        store.get::<i64>("int").expect("values: integer read failed"),
        1234
    );
    assert_eq!(
        store.get::<f64>("float").expect("values: float read failed"),
        0.25
    );
    assert!(store.get::<bool>("flag").expect("values: boolean read failed"));
    assert_eq!(
        store
            .get::<Profile>("profile")
            .expect("values: struct read failed"),
        profile
    );
}

/// Verifies that writing an existing key overwrites it cleanly.
pub fn check_key_collision<S: Store>(store: &S) {
    store
        .put("contested", &"first", LONG_TTL)
        .expect("collision: first put failed");
    store
        .put("contested", &"second", LONG_TTL)
        .expect("collision: overwriting put failed");

    let value: String = store
        .get("contested")
        .expect("collision: read after overwrite failed");
    assert_eq!(value, "second", "collision: first value survived overwrite");

    // Overwrites may also change the payload type
    store
        .put("contested", &99i64, LONG_TTL)
        .expect("collision: type-changing put failed");
    assert_eq!(
        store
            .get::<i64>("contested")
            .expect("collision: read after type change failed"),
        99
    );
}

/// Verifies that postponing extends a live entry's visible lifetime from
/// the postpone call, without touching the value.
pub fn check_postpone<S: Store>(store: &S) {
    store
        .put("lease", &"held", SHORT_TTL * 2)
        .expect("postpone: put failed");

    thread::sleep(SHORT_TTL);
    store
        .postpone("lease", SHORT_TTL * 4)
        .expect("postpone: postponing a live entry failed");

    // Past the original deadline but inside the postponed one
    thread::sleep(SHORT_TTL * 2);
    let value: String = store
        .get("lease")
        .expect("postpone: entry expired despite postponement");
    assert_eq!(value, "held", "postpone: value changed by postponement");

    // Past the postponed deadline as well
    thread::sleep(SHORT_TTL * 2 + EXPIRY_MARGIN);
    let err = store
        .get::<String>("lease")
        .expect_err("postpone: entry outlived its postponed lifetime");
    assert!(err.is_not_found());

    // Postponing something that no longer exists is NotFound
    let err = store
        .postpone("lease", LONG_TTL)
        .expect_err("postpone: postponing an expired entry succeeded");
    assert!(err.is_not_found());
    let err = store
        .postpone("never-existed", LONG_TTL)
        .expect_err("postpone: postponing a missing key succeeded");
    assert!(err.is_not_found());
}

/// Verifies read-once semantics in transient mode.
///
/// Leaves the store in non-transient mode on return.
pub fn check_transient<S: Store>(store: &S) {
    store.set_transient(true);

    store
        .put("once", &"read me", LONG_TTL)
        .expect("transient: put failed");

    let value: String = store
        .get("once")
        .expect("transient: first read failed");
    assert_eq!(value, "read me");

    let err = store
        .get::<String>("once")
        .expect_err("transient: entry survived its first read");
    assert!(err.is_not_found());

    store.set_transient(false);

    // Back in plain mode, reads no longer consume
    store
        .put("again", &"stay", LONG_TTL)
        .expect("transient: put after toggle failed");
    let _: String = store.get("again").expect("transient: read failed");
    let _: String = store
        .get("again")
        .expect("transient: plain-mode read consumed the entry");
}

/// Verifies that type conflicts are reported as such, distinct from
/// absence and from backend failure.
pub fn check_type_error<S: Store>(store: &S) {
    store
        .put("text", &"definitely not a number", LONG_TTL)
        .expect("types: put failed");

    let err = store
        .get::<i64>("text")
        .expect_err("types: read a string as an integer");
    assert!(
        err.is_type_mismatch(),
        "types: expected TypeMismatch reading a string as integer, got {err}"
    );

    let err = store
        .increment("text", 1)
        .expect_err("types: incremented a string");
    assert!(
        err.is_type_mismatch(),
        "types: expected TypeMismatch incrementing a string, got {err}"
    );

    store
        .put("number", &7i64, LONG_TTL)
        .expect("types: put failed");
    let err = store
        .get::<Profile>("number")
        .expect_err("types: read an integer as a struct");
    assert!(err.is_type_mismatch());

    // A well-typed read still works after the failures
    assert_eq!(
        store.get::<i64>("number").expect("types: typed read failed"),
        7
    );
}
