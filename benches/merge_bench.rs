use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use lumen::DocId;
use lumen::MergeStrategy;
use lumen::lexical::index::merge::hash_union;

/// Every `stride`-th id in `0..count * stride`, shuffled deterministically.
fn posting_ids(count: u64, stride: u64, seed: u64) -> Vec<DocId> {
    let mut ids: Vec<DocId> = (0..count).map(|i| DocId::new(i * stride)).collect();
    let mut state = seed;
    for i in (1..ids.len()).rev() {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ids.swap(i, (state >> 33) as usize % (i + 1));
    }
    ids
}

fn bench_intersection(c: &mut Criterion) {
    let mut group = c.benchmark_group("Posting Intersection");
    let strategies = [
        MergeStrategy::Naive,
        MergeStrategy::BinarySearch,
        MergeStrategy::SortedMerge,
        MergeStrategy::Hash,
    ];

    for size in [16u64, 256, 4096] {
        let left = posting_ids(size, 2, 7);
        let right = posting_ids(size, 3, 11);
        group.throughput(Throughput::Elements(size * 2));

        for strategy in strategies {
            if strategy == MergeStrategy::Naive && size > 256 {
                continue;
            }
            group.bench_with_input(
                BenchmarkId::new(format!("{strategy:?}"), size),
                &size,
                |b, _| b.iter(|| strategy.intersect(black_box(left.clone()), black_box(&right))),
            );
        }
    }
    group.finish();
}

fn bench_union(c: &mut Criterion) {
    let mut group = c.benchmark_group("Posting Union");
    for size in [256u64, 4096] {
        let left = posting_ids(size, 2, 3);
        let right = posting_ids(size, 3, 5);
        group.throughput(Throughput::Elements(size * 2));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| hash_union(black_box(&left), black_box(&right)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_intersection, bench_union);
criterion_main!(benches);
