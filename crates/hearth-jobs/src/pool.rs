//! Worker threads that consume a [`WorkQueue`].

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::PoolConfig;
use crate::error::QueueError;
use crate::queue::WorkQueue;

/// Report from [`WorkerPool::shutdown`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Total time spent in the shutdown sequence.
    pub total_ms: u64,
    /// Number of worker threads joined.
    pub workers_joined: usize,
    /// Number of worker threads that terminated by panicking. Job panics
    /// are caught inside the worker, so this is normally zero.
    pub workers_panicked: usize,
    /// Jobs run by each worker over the pool's lifetime.
    pub jobs_per_worker: Vec<u64>,
}

/// A fixed set of named OS threads pulling jobs from one queue.
///
/// Each worker loops: run the next job if there is one, otherwise sleep
/// on the queue's doorbell for at most
/// [`idle_timeout`](PoolConfig::idle_timeout). After shutdown is requested,
/// workers finish whatever is still queued before exiting.
///
/// Dropping the pool shuts it down.
pub struct WorkerPool {
    queue: Arc<WorkQueue>,
    shutdown: Arc<AtomicBool>,
    runs: Arc<[AtomicU64]>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `config.resolved_worker_count()` workers on `queue`.
    ///
    /// If any thread fails to start, the ones already running are shut
    /// down and [`QueueError::SpawnFailed`] is returned.
    pub fn spawn(queue: Arc<WorkQueue>, config: &PoolConfig) -> Result<Self, QueueError> {
        let count = config.resolved_worker_count();
        let runs: Arc<[AtomicU64]> = (0..count).map(|_| AtomicU64::new(0)).collect();
        let mut pool = Self {
            queue,
            shutdown: Arc::new(AtomicBool::new(false)),
            runs,
            workers: Vec::with_capacity(count),
        };

        for index in 0..count {
            let queue = Arc::clone(&pool.queue);
            let shutdown = Arc::clone(&pool.shutdown);
            let runs = Arc::clone(&pool.runs);
            let idle = config.idle_timeout;
            let spawned = thread::Builder::new()
                .name(format!("{}-{index}", config.thread_name_prefix))
                .spawn(move || worker_loop(&queue, &shutdown, &runs[index], idle));
            match spawned {
                Ok(handle) => pool.workers.push(handle),
                Err(err) => {
                    pool.shutdown();
                    return Err(QueueError::SpawnFailed {
                        worker: index,
                        reason: err.to_string(),
                    });
                }
            }
        }

        tracing::debug!(
            workers = count,
            capacity = pool.queue.capacity(),
            "worker pool started"
        );
        Ok(pool)
    }

    /// Number of live worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Jobs run by each worker so far.
    pub fn jobs_per_worker(&self) -> Vec<u64> {
        self.runs
            .iter()
            .map(|r| r.load(Ordering::Relaxed))
            .collect()
    }

    /// The queue this pool consumes.
    pub fn queue(&self) -> &Arc<WorkQueue> {
        &self.queue
    }

    /// Stop all workers and join them.
    ///
    /// Jobs still queued are run before the workers exit. Idempotent: a
    /// second call joins nothing and reports zero workers.
    pub fn shutdown(&mut self) -> ShutdownReport {
        let start = Instant::now();
        self.shutdown.store(true, Ordering::Release);
        self.queue.wake_workers(self.workers.len());

        let mut workers_joined = 0;
        let mut workers_panicked = 0;
        for handle in self.workers.drain(..) {
            match handle.join() {
                Ok(()) => workers_joined += 1,
                Err(_) => workers_panicked += 1,
            }
        }

        let report = ShutdownReport {
            total_ms: start.elapsed().as_millis() as u64,
            workers_joined,
            workers_panicked,
            jobs_per_worker: self.jobs_per_worker(),
        };
        if workers_joined + workers_panicked > 0 {
            tracing::debug!(
                joined = workers_joined,
                panicked = workers_panicked,
                total_ms = report.total_ms,
                "worker pool stopped"
            );
        }
        report
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers.len())
            .field("jobs_per_worker", &self.jobs_per_worker())
            .finish()
    }
}

fn worker_loop(queue: &WorkQueue, shutdown: &AtomicBool, runs: &AtomicU64, idle: Duration) {
    loop {
        if queue.run_next() {
            runs.fetch_add(1, Ordering::Relaxed);
            continue;
        }
        if shutdown.load(Ordering::Acquire) {
            break;
        }
        queue.wait_for_work(idle);
    }
}
