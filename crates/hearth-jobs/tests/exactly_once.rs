//! Property: every enqueued job runs exactly once by the time drain
//! returns, whatever the worker count, capacity and batch shape.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use hearth_jobs::{JobProducer, OverflowPolicy, PoolConfig, QueueConfig, WorkerPool};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn each_job_runs_exactly_once(
        workers in 1usize..=4,
        capacity_log2 in 1u32..=6,
        batches in prop::collection::vec(1usize..=80, 1..5),
    ) {
        let producer = JobProducer::new(&QueueConfig {
            capacity: 1 << capacity_log2,
            overflow: OverflowPolicy::Block,
            ..QueueConfig::default()
        })
        .unwrap();
        let _pool = WorkerPool::spawn(producer.queue(), &PoolConfig::with_workers(workers)).unwrap();

        let total: usize = batches.iter().sum();
        let hits: Arc<Vec<AtomicU8>> =
            Arc::new((0..total).map(|_| AtomicU8::new(0)).collect::<Vec<_>>());

        let mut next = 0;
        for batch in &batches {
            for _ in 0..*batch {
                let hits = Arc::clone(&hits);
                let index = next;
                producer
                    .enqueue(move || {
                        hits[index].fetch_add(1, Ordering::SeqCst);
                    })
                    .unwrap();
                next += 1;
            }
            producer.drain().unwrap();
        }

        for (i, h) in hits.iter().enumerate() {
            prop_assert_eq!(h.load(Ordering::SeqCst), 1, "job {} ran wrong number of times", i);
        }
        prop_assert_eq!(producer.stats().retired, total as u64);
    }
}
