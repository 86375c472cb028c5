// Rebuild cost in isolation. Needs `--features bench_internal`.
use chained_hashmap::bucket_table::BucketTable;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn filled(n: usize) -> BucketTable<u64, u64> {
    // A threshold high enough that insert_new never asks to grow.
    let mut t = BucketTable::with_bins(1024, f64::MAX);
    for (i, x) in lcg(17).take(n).enumerate() {
        t.insert_new(x as i64, x, i as u64);
    }
    t
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("bucket_table::rebuild_double");
    for n in [10_000usize, 100_000] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter_batched(
                || filled(n),
                |mut t| {
                    let bins = t.bins() * 2;
                    t.rebuild(bins);
                    black_box(t)
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_grow_from_one_bin(c: &mut Criterion) {
    c.bench_function("bucket_table::grow_from_1_bin_100k", |b| {
        b.iter_batched(
            || {
                let mut t = BucketTable::with_bins(1, 1.0);
                for (i, x) in lcg(19).take(100_000).enumerate() {
                    t.insert_new(x as i64, x, i as u64);
                }
                t
            },
            |mut t| {
                t.grow();
                black_box(t)
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_rebuild, bench_grow_from_one_bin
}
criterion_main!(benches);
