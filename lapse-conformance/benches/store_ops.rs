//! Store operation benchmarks against the in-memory backend.
//!
//! Benchmarks:
//! - add+get throughput
//! - add+get throughput in transient (read-once) mode
//! - atomic increment throughput on one contended key
//!
//! Run with:
//! ```bash
//! cargo bench -p lapse-conformance --bench store_ops
//! ```

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use lapse_conformance::bench;
use lapse_core::{MemoryStore, StoreConfig};
use std::hint::black_box;
use std::time::Duration;

fn store_benchmarks(c: &mut Criterion) {
    // The store's sweep task needs a runtime to live on
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime");
    let _guard = rt.enter();

    let mut group = c.benchmark_group("store");
    group.measurement_time(Duration::from_secs(5));
    group.throughput(Throughput::Elements(1));

    group.bench_function("add_get", |b| {
        let store = MemoryStore::new();
        let mut round = 0u64;
        b.iter(|| {
            round = round.wrapping_add(1);
            bench::add_get(black_box(&store), round);
        });
    });

    group.bench_function("add_get_transient", |b| {
        let store = MemoryStore::with_config(StoreConfig::default().with_transient(true));
        let mut round = 0u64;
        b.iter(|| {
            round = round.wrapping_add(1);
            bench::add_get(black_box(&store), round);
        });
    });

    group.bench_function("atomic_increment", |b| {
        let store = MemoryStore::new();
        b.iter(|| black_box(bench::atomic_increment(&store)));
    });

    group.finish();
}

criterion_group!(benches, store_benchmarks);
criterion_main!(benches);
