//! Queue and worker-pool configuration.

use std::time::Duration;

use crate::error::QueueError;

/// Default ring capacity. Must be a power of two.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Default bound on any single wait for a doorbell token.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Default thread-name prefix for pool workers.
pub const DEFAULT_THREAD_PREFIX: &str = "hearth-worker";

/// What [`JobProducer::enqueue`](crate::JobProducer::enqueue) does when
/// the slot it is about to write still holds an unclaimed job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Wait for the slot to free up, running queued jobs on the producer
    /// thread in the meantime. Never loses work.
    #[default]
    Block,
    /// Fail with [`QueueError::QueueFull`]. The job is not enqueued.
    Reject,
    /// Discard the oldest unclaimed job and take its slot. The eviction is
    /// counted in [`QueueStats::evicted`](crate::QueueStats::evicted) and
    /// reported in [`Enqueued::evicted`](crate::Enqueued::evicted).
    Overwrite,
}

/// Configuration for a [`WorkQueue`](crate::WorkQueue).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueConfig {
    /// Number of slots in the ring. Must be a non-zero power of two.
    /// Default: 1024.
    pub capacity: usize,
    /// Behaviour when the ring is full. Default: [`OverflowPolicy::Block`].
    pub overflow: OverflowPolicy,
    /// Upper bound on a single sleep while the producer waits in `drain`
    /// or in a blocked `enqueue`. Default: 1 ms.
    pub poll_interval: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            overflow: OverflowPolicy::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl QueueConfig {
    /// Config with the given capacity and default everything else.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Check that the capacity is a non-zero power of two.
    pub fn validate(&self) -> Result<(), QueueError> {
        if !self.capacity.is_power_of_two() {
            return Err(QueueError::InvalidCapacity {
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

/// Configuration for a [`WorkerPool`](crate::WorkerPool).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of worker threads. `None` = auto-detect
    /// (`available_parallelism - 1`, clamped to `[1, 16]`, leaving one
    /// core for the producer).
    pub worker_count: Option<usize>,
    /// How long an idle worker sleeps on the doorbell before re-checking
    /// the queue and the shutdown flag. Default: 2 ms.
    pub idle_timeout: Duration,
    /// Thread names are `{prefix}-{index}`. Default: `hearth-worker`.
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: None,
            idle_timeout: Duration::from_millis(2),
            thread_name_prefix: DEFAULT_THREAD_PREFIX.to_string(),
        }
    }
}

impl PoolConfig {
    /// Config with an explicit worker count.
    pub fn with_workers(count: usize) -> Self {
        Self {
            worker_count: Some(count),
            ..Self::default()
        }
    }

    /// Resolve the actual worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, 64),
            None => {
                let cpus = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(4);
                cpus.saturating_sub(1).clamp(1, 16)
            }
        }
    }
}
