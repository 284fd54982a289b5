//! Criterion benchmarks for enqueue/drain throughput.

use std::hint::black_box;
use std::sync::atomic::{AtomicU64, Ordering};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hearth_jobs::{JobProducer, OverflowPolicy, PoolConfig, QueueConfig, WorkerPool};
use hearth_test_utils::JobCounter;

fn bench_enqueue_drain_no_workers(c: &mut Criterion) {
    let producer = JobProducer::new(&QueueConfig::default()).unwrap();
    let counter = JobCounter::new();
    c.bench_function("queue_enqueue_drain_1k_inline", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                producer.enqueue(counter.job()).unwrap();
            }
            black_box(producer.drain().unwrap());
        });
    });
}

fn bench_enqueue_drain_workers(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_enqueue_drain_1k");
    for workers in [1usize, 2, 4] {
        let producer = JobProducer::new(&QueueConfig::default()).unwrap();
        let _pool = WorkerPool::spawn(producer.queue(), &PoolConfig::with_workers(workers)).unwrap();
        let counter = JobCounter::new();
        group.bench_with_input(BenchmarkId::from_parameter(workers), &workers, |b, _| {
            b.iter(|| {
                for _ in 0..1000 {
                    producer.enqueue(counter.job()).unwrap();
                }
                black_box(producer.drain().unwrap());
            });
        });
    }
    group.finish();
}

fn bench_block_overflow(c: &mut Criterion) {
    let producer = JobProducer::new(&QueueConfig {
        capacity: 64,
        overflow: OverflowPolicy::Block,
        ..QueueConfig::default()
    })
    .unwrap();
    let _pool = WorkerPool::spawn(producer.queue(), &PoolConfig::with_workers(2)).unwrap();
    let counter = JobCounter::new();
    c.bench_function("queue_block_overflow_1k_cap64", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                producer.enqueue(counter.job()).unwrap();
            }
            producer.drain().unwrap();
        });
    });
}

fn bench_scoped_fan_out(c: &mut Criterion) {
    let producer = JobProducer::new(&QueueConfig::default()).unwrap();
    let _pool = WorkerPool::spawn(producer.queue(), &PoolConfig::with_workers(4)).unwrap();
    let mut data = vec![0u64; 64 * 1024];
    c.bench_function("queue_scope_fan_out_64x1k", |b| {
        b.iter(|| {
            let total = AtomicU64::new(0);
            producer
                .scope(|s| {
                    for chunk in data.chunks_mut(1024) {
                        let total = &total;
                        s.enqueue(move || {
                            for v in chunk.iter_mut() {
                                *v += 1;
                            }
                            total.fetch_add(chunk[0], Ordering::Relaxed);
                        })
                        .unwrap();
                    }
                })
                .unwrap();
            black_box(total.load(Ordering::Relaxed));
        });
    });
}

criterion_group!(
    benches,
    bench_enqueue_drain_no_workers,
    bench_enqueue_drain_workers,
    bench_block_overflow,
    bench_scoped_fan_out
);
criterion_main!(benches);
