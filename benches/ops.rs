//! Hot-path operation benchmarks: inserts, hits, misses, and expiry churn.
//!
//! A manual clock keeps the workloads deterministic; the churn benchmark is
//! the interesting one, exercising slot reuse and budgeted advancement
//! together.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use wheelcache::builder::WheelCacheBuilder;
use wheelcache::cache::WheelCacheCore;
use wheelcache::time::ManualClock;

const TICK_MS: u64 = 50;

fn fresh_cache(max_entries: usize, clock: &ManualClock) -> WheelCacheCore<u64, u64> {
    WheelCacheBuilder::new(max_entries)
        .tick_ms(TICK_MS)
        .clock(Arc::new(clock.clone()))
        .try_build_core()
        .unwrap()
}

fn bench_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("set");

    group.bench_function("insert_new", |b| {
        let clock = ManualClock::new();
        b.iter_batched_ref(
            || fresh_cache(10_000, &clock),
            |cache| {
                for n in 0..1_000u64 {
                    cache.set(black_box(n), n, 60_000);
                }
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("overwrite_existing", |b| {
        let clock = ManualClock::new();
        let mut cache = fresh_cache(1_024, &clock);
        for n in 0..1_000u64 {
            cache.set(n, n, 60_000);
        }
        let mut rng = StdRng::seed_from_u64(7);
        b.iter(|| {
            let key = rng.gen_range(0..1_000u64);
            cache.set(black_box(key), key, 60_000);
        });
    });

    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");

    let clock = ManualClock::new();
    let mut cache = fresh_cache(10_000, &clock);
    for n in 0..10_000u64 {
        cache.set(n, n, 600_000);
    }

    let mut rng = StdRng::seed_from_u64(42);
    group.bench_function("hit", |b| {
        b.iter(|| {
            let key = rng.gen_range(0..10_000u64);
            black_box(cache.get(&key));
        });
    });

    group.bench_function("miss", |b| {
        b.iter(|| {
            black_box(cache.get(&black_box(u64::MAX)));
        });
    });

    group.finish();
}

fn bench_expiry_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");
    group.sample_size(20);

    // Insert short-lived entries and keep advancing past their expiry so
    // every round frees and reuses slots through the wheel.
    group.bench_function("set_expire_advance", |b| {
        b.iter_batched_ref(
            || {
                let clock = ManualClock::new();
                (fresh_cache(4_096, &clock), clock)
            },
            |(cache, clock)| {
                for round in 0..10u64 {
                    for n in 0..500u64 {
                        cache.set(round * 500 + n, n, 2 * TICK_MS);
                    }
                    clock.advance(4 * TICK_MS);
                    while !cache.advance_to_now() {}
                }
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(benches, bench_set, bench_get, bench_expiry_churn);
criterion_main!(benches);
