//! Benchmarks for worker pool submission and drain

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use veda_sync::prelude::*;

fn run_batch(workers: usize, queue_capacity: usize, tasks: u64) -> u64 {
    let config = PoolConfig::builder()
        .num_workers(workers)
        .queue_capacity(queue_capacity)
        .build()
        .expect("valid config");
    let pool = WorkerPool::with_config(config).expect("pool");
    let sum = Arc::new(AtomicU64::new(0));

    for i in 0..tasks {
        let sum = sum.clone();
        pool.execute(move || {
            sum.fetch_add(black_box(i), Ordering::Relaxed);
        })
        .expect("submit");
    }

    pool.stop().expect("stop");
    sum.load(Ordering::Relaxed)
}

fn bench_pool_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_batch");

    for workers in [1usize, 4, 8].iter() {
        group.bench_with_input(
            BenchmarkId::new("queue_eq_workers", workers),
            workers,
            |b, &workers| b.iter(|| run_batch(workers, workers, 10_000)),
        );

        group.bench_with_input(
            BenchmarkId::new("queue_1024", workers),
            workers,
            |b, &workers| b.iter(|| run_batch(workers, 1024, 10_000)),
        );
    }

    group.finish();
}

fn bench_result_slots(c: &mut Criterion) {
    c.bench_function("result_slots_1000", |b| {
        b.iter(|| {
            let pool = WorkerPool::new(4).expect("pool");
            let slots: Vec<_> = (0..1_000u64)
                .map(|i| pool.submit_with_result(move || i * i).expect("submit"))
                .collect();
            pool.stop().expect("stop");
            slots.iter().filter_map(|s| s.take()).sum::<u64>()
        })
    });
}

criterion_group!(benches, bench_pool_batch, bench_result_slots);
criterion_main!(benches);
