//! Drives the full conformance battery against the in-memory backend.
//!
//! Mirrors how an external backend would be tested: prepare a disposable
//! environment (skipping when it cannot run here), register teardown, then
//! run the battery phases with a flush between each for isolation.

use lapse_conformance::{CleanupStack, InProcess, Readiness, battery, prepare};
use lapse_core::{MemoryStore, Store, StoreConfig};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lapse_core=debug,lapse_conformance=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

#[tokio::test(flavor = "multi_thread")]
async fn memory_store_conformance() {
    init_tracing();

    let mut cleanup = CleanupStack::new();
    let readiness = prepare(InProcess::new(), &mut cleanup)
        .expect("could not prepare the test environment");
    if let Readiness::Skipped(reason) = readiness {
        eprintln!("skipping conformance run: {reason}");
        return;
    }

    // Millisecond-level TTLs with accuracy on, against a deliberately
    // coarse sweep: correctness must come from the read-side check.
    let config = StoreConfig::default()
        .with_default_ttl(Duration::from_secs(1))
        .with_sweep_interval(Duration::from_secs(3600))
        .with_accuracy(true);
    let store = MemoryStore::with_config(config);

    battery::check_atomic(&store);

    store.flush().unwrap();
    battery::check_expiration(&store);

    store.flush().unwrap();
    battery::check_value_handling(&store);

    store.flush().unwrap();
    battery::check_key_collision(&store);

    store.flush().unwrap();
    battery::check_postpone(&store);

    store.flush().unwrap();
    battery::check_transient(&store);

    store.flush().unwrap();
    battery::check_type_error(&store);

    cleanup.run();
}
