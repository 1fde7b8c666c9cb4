//! Benchmarks for bounded priority queue admission and pop

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::BinaryHeap;
use std::cmp::Reverse;
use veda_sync::prelude::*;

fn pseudo_random(n: u64) -> impl Iterator<Item = u64> {
    (0..n).map(|i| i.wrapping_mul(6364136223846793005).rotate_left(17))
}

fn bounded_top_k(n: u64, k: usize) -> Vec<u64> {
    let queue = BoundedPriorityQueue::largest(k);
    for x in pseudo_random(n) {
        queue.push(x);
    }
    queue.into_sorted_vec()
}

fn heap_top_k(n: u64, k: usize) -> Vec<u64> {
    let mut heap = BinaryHeap::with_capacity(k + 1);
    for x in pseudo_random(n) {
        heap.push(Reverse(x));
        if heap.len() > k {
            heap.pop();
        }
    }
    let mut out: Vec<u64> = heap.into_iter().map(|Reverse(x)| x).collect();
    out.sort_by(|a, b| b.cmp(a));
    out
}

fn bench_top_k(c: &mut Criterion) {
    let mut group = c.benchmark_group("top_k");

    for k in [16usize, 256, 4096].iter() {
        group.bench_with_input(BenchmarkId::new("bounded_queue", k), k, |b, &k| {
            b.iter(|| bounded_top_k(black_box(100_000), k))
        });

        group.bench_with_input(BenchmarkId::new("binary_heap", k), k, |b, &k| {
            b.iter(|| heap_top_k(black_box(100_000), k))
        });
    }

    group.finish();
}

fn bench_push_pop(c: &mut Criterion) {
    let queue = BoundedPriorityQueue::unbounded(Retain::Smallest);

    c.bench_function("push_pop_unbounded", |b| {
        b.iter(|| {
            for x in pseudo_random(1_000) {
                queue.push(x);
            }
            while let Some(x) = queue.try_pop() {
                black_box(x);
            }
        })
    });
}

criterion_group!(benches, bench_top_k, bench_push_pop);
criterion_main!(benches);
