//! The shared ring of job slots.
//!
//! [`WorkQueue`] is the consumer-side half of the queue: any number of
//! threads may call [`run_next`](WorkQueue::run_next) and
//! [`wait_for_work`](WorkQueue::wait_for_work) through an
//! `Arc<WorkQueue>`. Writing is reserved to the crate-private `push`,
//! reached only through the single [`JobProducer`](crate::JobProducer).
//!
//! Positions are monotonic `u64`s; slot index is `pos & (capacity - 1)`.
//! Three counters describe the ring:
//!
//! - `next_free_slot`: next position the producer writes. Producer-owned,
//!   published with `Release`.
//! - `next_to_run`: next position to claim. Advanced by `compare_exchange`,
//!   so each position is claimed by exactly one runner (or evicted).
//! - `retired`: positions whose job has finished or was evicted. The
//!   drain barrier waits for `retired` to reach `next_free_slot`.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::bell::Doorbell;
use crate::config::{OverflowPolicy, QueueConfig};
use crate::error::QueueError;
use crate::stats::QueueStats;

/// A type-erased job. Scoped jobs are lifetime-erased into this type by
/// `erase.rs` and drained before their borrows end.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// One ring slot.
///
/// `written` is `true` from the moment the producer stores a job until a
/// runner (or an eviction) has taken it out. The mutex is only ever
/// touched by the one thread that owns the slot at that moment, so it is
/// uncontended; it exists to move the boxed job between threads without
/// `unsafe`.
struct Slot {
    written: AtomicBool,
    job: Mutex<Option<Job>>,
}

impl Slot {
    fn empty() -> Self {
        Self {
            written: AtomicBool::new(false),
            job: Mutex::new(None),
        }
    }

    /// Lock the payload. A poisoned lock still holds a valid `Option`:
    /// jobs run outside the lock, so nothing can panic while it is held.
    fn payload(&self) -> MutexGuard<'_, Option<Job>> {
        self.job.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Outcome of a successful enqueue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Enqueued {
    /// Monotonic position assigned to the job.
    pub position: u64,
    /// Position of the unclaimed job discarded to make room, under
    /// [`OverflowPolicy::Overwrite`].
    pub evicted: Option<u64>,
    /// Jobs the producer ran itself while waiting for room, under
    /// [`OverflowPolicy::Block`].
    pub assisted: u64,
}

/// Fixed-capacity, single-producer, multi-consumer ring of jobs.
pub struct WorkQueue {
    slots: Box<[Slot]>,
    mask: u64,
    policy: OverflowPolicy,
    poll_interval: Duration,
    next_free_slot: AtomicU64,
    next_to_run: AtomicU64,
    retired: AtomicU64,
    evicted: AtomicU64,
    panicked: AtomicU64,
    /// Rung once per enqueued job; workers sleep on it.
    work_bell: Doorbell,
    /// Rung once per retired job; a waiting producer sleeps on it.
    done_bell: Doorbell,
}

// Compile-time assertion: WorkQueue is shared across worker threads.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<WorkQueue>();
};

impl WorkQueue {
    pub(crate) fn new(config: &QueueConfig) -> Result<Self, QueueError> {
        config.validate()?;
        let slots = (0..config.capacity).map(|_| Slot::empty()).collect();
        Ok(Self {
            slots,
            mask: config.capacity as u64 - 1,
            policy: config.overflow,
            poll_interval: config.poll_interval,
            next_free_slot: AtomicU64::new(0),
            next_to_run: AtomicU64::new(0),
            retired: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
            panicked: AtomicU64::new(0),
            work_bell: Doorbell::new(config.capacity),
            done_bell: Doorbell::new(config.capacity),
        })
    }

    /// Number of slots in the ring.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The configured overflow policy.
    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.policy
    }

    fn slot(&self, pos: u64) -> &Slot {
        &self.slots[(pos & self.mask) as usize]
    }

    /// Claim and run the oldest unclaimed job on the calling thread.
    ///
    /// Returns `false` without blocking if nothing is waiting to be
    /// claimed. A job that panics is caught, logged and counted; the
    /// next [`drain`](crate::JobProducer::drain) reports it.
    pub fn run_next(&self) -> bool {
        let mut pos = self.next_to_run.load(Ordering::Acquire);
        loop {
            // Acquire pairs with the producer's Release publish, making
            // the slot's payload visible once `pos` is below it.
            if pos >= self.next_free_slot.load(Ordering::Acquire) {
                return false;
            }
            match self.next_to_run.compare_exchange_weak(
                pos,
                pos + 1,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => break,
                Err(actual) => pos = actual,
            }
        }

        let slot = self.slot(pos);
        let job = slot.payload().take();
        // The job has left the slot; the producer may reuse it now.
        slot.written.store(false, Ordering::Release);

        if let Some(job) = job {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                self.panicked.fetch_add(1, Ordering::AcqRel);
                tracing::error!(
                    position = pos,
                    panic = panic_message(payload.as_ref()),
                    "job panicked"
                );
            }
        }

        self.retired.fetch_add(1, Ordering::AcqRel);
        self.done_bell.ring();
        true
    }

    /// Sleep until a job is enqueued or `timeout` elapses.
    ///
    /// Wake-ups may be spurious; callers loop on
    /// [`run_next`](Self::run_next).
    pub fn wait_for_work(&self, timeout: Duration) -> bool {
        self.work_bell.wait(timeout)
    }

    /// Snapshot of the position counters.
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            capacity: self.capacity(),
            enqueued: self.next_free_slot.load(Ordering::Acquire),
            claimed: self.next_to_run.load(Ordering::Acquire),
            retired: self.retired.load(Ordering::Acquire),
            evicted: self.evicted.load(Ordering::Acquire),
            panicked: self.panicked.load(Ordering::Acquire),
        }
    }

    /// Whether every enqueued job has retired.
    pub fn is_idle(&self) -> bool {
        self.retired.load(Ordering::Acquire) >= self.next_free_slot.load(Ordering::Acquire)
    }

    // ── producer side ──────────────────────────────────────────────

    /// Store `job` at the next free position. Single producer only.
    pub(crate) fn push(&self, job: Job) -> Result<Enqueued, QueueError> {
        // Only the producer writes next_free_slot, so Relaxed reads its own value.
        let pos = self.next_free_slot.load(Ordering::Relaxed);
        let slot = self.slot(pos);
        let mut evicted = None;
        let mut assisted = 0;

        while slot.written.load(Ordering::Acquire) {
            match self.policy {
                OverflowPolicy::Reject => {
                    return Err(QueueError::QueueFull {
                        capacity: self.capacity(),
                    });
                }
                OverflowPolicy::Block => {
                    if self.run_next() {
                        assisted += 1;
                    } else {
                        self.done_bell.wait(self.poll_interval);
                    }
                }
                OverflowPolicy::Overwrite => {
                    // The slot still holds position `pos - capacity`.
                    let victim = pos - self.capacity() as u64;
                    if self
                        .next_to_run
                        .compare_exchange(victim, victim + 1, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        let dropped = slot.payload().take();
                        drop(dropped);
                        slot.written.store(false, Ordering::Release);
                        self.evicted.fetch_add(1, Ordering::AcqRel);
                        self.retired.fetch_add(1, Ordering::AcqRel);
                        tracing::warn!(
                            position = victim,
                            capacity = self.capacity(),
                            "work queue full, evicted unclaimed job"
                        );
                        evicted = Some(victim);
                    } else {
                        // A runner claimed the victim first and is about
                        // to clear the slot.
                        std::thread::yield_now();
                    }
                }
            }
        }

        *slot.payload() = Some(job);
        slot.written.store(true, Ordering::Release);
        self.next_free_slot.store(pos + 1, Ordering::Release);
        self.work_bell.ring();

        Ok(Enqueued {
            position: pos,
            evicted,
            assisted,
        })
    }

    /// Run or wait until every position below `target` has retired.
    /// Returns the number of jobs run on the calling thread.
    pub(crate) fn wait_retired(&self, target: u64) -> u64 {
        let mut ran_here = 0;
        while self.retired.load(Ordering::Acquire) < target {
            if self.run_next() {
                ran_here += 1;
            } else {
                // Everything left is claimed by other threads.
                self.done_bell.wait(self.poll_interval);
            }
        }
        ran_here
    }

    pub(crate) fn panicked_total(&self) -> u64 {
        self.panicked.load(Ordering::Acquire)
    }

    pub(crate) fn enqueued_total(&self) -> u64 {
        self.next_free_slot.load(Ordering::Acquire)
    }

    pub(crate) fn wake_workers(&self, count: usize) {
        self.work_bell.ring_n(count);
    }
}

impl std::fmt::Debug for WorkQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkQueue")
            .field("capacity", &self.capacity())
            .field("policy", &self.policy)
            .field("stats", &self.stats())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
