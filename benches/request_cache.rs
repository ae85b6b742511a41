//! Request cache benchmarks
//!
//! Measures the hot paths of the in-memory request cache: hit lookups,
//! writes with the opportunistic sweep, substring invalidation, and TTL
//! classification.
//!
//! Run with: cargo bench --bench request_cache

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use serde_json::json;
use std::time::Duration;

use lorecache::cache::{RequestCache, TtlPolicy};

fn populated_cache(entries: usize) -> RequestCache {
    let cache = RequestCache::new();
    for n in 0..entries {
        cache.set(
            format!("GET:/api/cartas/{}:", n),
            json!({"_id": n, "nombre": format!("carta {}", n)}),
            Duration::from_secs(3600),
        );
    }
    cache
}

fn bench_get_hit(c: &mut Criterion) {
    let cache = populated_cache(1000);
    c.bench_function("get_hit_1k_entries", |b| {
        b.iter(|| black_box(cache.get("GET:/api/cartas/500:")))
    });
}

fn bench_get_miss(c: &mut Criterion) {
    let cache = populated_cache(1000);
    c.bench_function("get_miss_1k_entries", |b| {
        b.iter(|| black_box(cache.get("GET:/api/cartas/99999:")))
    });
}

fn bench_set_with_sweep(c: &mut Criterion) {
    let cache = populated_cache(1000);
    let value = json!({"nombre": "nueva carta"});
    c.bench_function("set_with_sweep_1k_entries", |b| {
        b.iter(|| {
            cache.set(
                "GET:/api/cartas/new:",
                black_box(value.clone()),
                Duration::from_secs(3600),
            )
        })
    });
}

fn bench_invalidate(c: &mut Criterion) {
    c.bench_function("invalidate_substring_1k_entries", |b| {
        b.iter_batched(
            || populated_cache(1000),
            |cache| black_box(cache.invalidate("/cartas/5")),
            BatchSize::SmallInput,
        )
    });
}

fn bench_ttl_classification(c: &mut Criterion) {
    let policy = TtlPolicy::default();
    c.bench_function("ttl_classify", |b| {
        b.iter(|| {
            black_box(policy.ttl_for(black_box("/api/colecciones/5/cartas")));
            black_box(policy.ttl_for(black_box("/api/cartas/12")));
            black_box(policy.ttl_for(black_box("/static/css/style.css")));
        })
    });
}

criterion_group!(
    benches,
    bench_get_hit,
    bench_get_miss,
    bench_set_with_sweep,
    bench_invalidate,
    bench_ttl_classification
);
criterion_main!(benches);
