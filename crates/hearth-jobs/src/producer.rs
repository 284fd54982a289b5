//! The single producer handle.

use std::cell::Cell;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::QueueConfig;
use crate::error::QueueError;
use crate::queue::{Enqueued, WorkQueue};
use crate::scope::JobScope;
use crate::stats::QueueStats;

/// Summary of one [`JobProducer::drain`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Jobs that retired between the previous drain and this one.
    pub retired: u64,
    /// Jobs the draining thread ran itself.
    pub ran_on_caller: u64,
    /// Wall-clock time spent inside the barrier.
    pub elapsed: Duration,
}

/// The write end of a work queue.
///
/// Exactly one `JobProducer` exists per queue. It is `Send`, so the
/// producer role can move to another thread, but neither `Sync` nor
/// `Clone`, so two threads can never enqueue concurrently.
///
/// Workers reach the queue through [`queue`](Self::queue).
pub struct JobProducer {
    queue: Arc<WorkQueue>,
    /// `queue.panicked` at the last drain; also makes the type `!Sync`.
    panics_seen: Cell<u64>,
    /// `queue.retired` at the last drain.
    retired_seen: Cell<u64>,
}

// Compile-time assertion: JobProducer can move between threads.
const _: fn() = || {
    fn assert<T: Send>() {}
    assert::<JobProducer>();
};

impl JobProducer {
    /// Create a queue and its producer.
    pub fn new(config: &QueueConfig) -> Result<Self, QueueError> {
        Ok(Self {
            queue: Arc::new(WorkQueue::new(config)?),
            panics_seen: Cell::new(0),
            retired_seen: Cell::new(0),
        })
    }

    /// The consumer side, for handing to worker threads.
    pub fn queue(&self) -> Arc<WorkQueue> {
        Arc::clone(&self.queue)
    }

    /// Enqueue a `'static` job.
    ///
    /// When the ring is full the configured
    /// [`OverflowPolicy`](crate::OverflowPolicy) decides: block while
    /// assisting, fail with [`QueueError::QueueFull`], or evict the
    /// oldest unclaimed job.
    pub fn enqueue<F>(&self, job: F) -> Result<Enqueued, QueueError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.push(Box::new(job))
    }

    /// Enqueue a plain function pointer with its payload.
    pub fn enqueue_call<P>(&self, callback: fn(P), payload: P) -> Result<Enqueued, QueueError>
    where
        P: Send + 'static,
    {
        self.enqueue(move || callback(payload))
    }

    /// Block until every job enqueued so far has retired.
    ///
    /// The calling thread runs queued jobs while it waits, so a drain
    /// completes even with no worker pool attached. Returns
    /// [`QueueError::JobPanicked`] if any job panicked since the previous
    /// drain; all jobs have still retired in that case.
    ///
    /// There is no timeout: a job that never returns stalls the drain.
    pub fn drain(&self) -> Result<DrainReport, QueueError> {
        let start = Instant::now();
        let target = self.queue.enqueued_total();
        let ran_on_caller = self.queue.wait_retired(target);

        let retired = target - self.retired_seen.replace(target);
        let report = DrainReport {
            retired,
            ran_on_caller,
            elapsed: start.elapsed(),
        };

        let panicked = self.queue.panicked_total();
        let new_panics = panicked - self.panics_seen.replace(panicked);
        if new_panics > 0 {
            return Err(QueueError::JobPanicked { count: new_panics });
        }
        Ok(report)
    }

    /// Run `f` with a [`JobScope`] whose jobs may borrow from the
    /// enclosing stack frame, then drain.
    ///
    /// The drain also runs if `f` panics, so borrowed data always
    /// outlives the jobs that use it.
    ///
    /// ```
    /// use hearth_jobs::{JobProducer, QueueConfig};
    /// use std::sync::atomic::{AtomicU32, Ordering};
    ///
    /// let producer = JobProducer::new(&QueueConfig::default()).unwrap();
    /// let hits = AtomicU32::new(0);
    /// producer
    ///     .scope(|s| {
    ///         for _ in 0..4 {
    ///             s.enqueue(|| {
    ///                 hits.fetch_add(1, Ordering::Relaxed);
    ///             })
    ///             .unwrap();
    ///         }
    ///     })
    ///     .unwrap();
    /// assert_eq!(hits.load(Ordering::Relaxed), 4);
    /// ```
    pub fn scope<'env, F, R>(&self, f: F) -> Result<R, QueueError>
    where
        F: for<'scope> FnOnce(&'scope JobScope<'scope, 'env>) -> R,
    {
        let scope = JobScope::new(self);
        let guard = DrainOnUnwind { producer: self };
        let result = f(&scope);
        std::mem::forget(guard);
        self.drain()?;
        Ok(result)
    }

    /// Ring capacity.
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Snapshot of the queue counters.
    pub fn stats(&self) -> QueueStats {
        self.queue.stats()
    }

    pub(crate) fn work_queue(&self) -> &WorkQueue {
        &self.queue
    }
}

impl std::fmt::Debug for JobProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobProducer")
            .field("queue", &self.queue)
            .finish()
    }
}

/// Drains the queue if a scope body unwinds.
struct DrainOnUnwind<'a> {
    producer: &'a JobProducer,
}

impl Drop for DrainOnUnwind<'_> {
    fn drop(&mut self) {
        let seen = self.producer.panics_seen.get();
        if let Err(err) = self.producer.drain() {
            tracing::error!(error = %err, "jobs failed while a job scope was unwinding");
            // Left for the next drain to report.
            self.producer.panics_seen.set(seen);
        }
    }
}
