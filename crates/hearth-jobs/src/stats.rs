//! Point-in-time queue counters.

/// A snapshot of the queue's monotonic position counters.
///
/// Positions are 64-bit and never wrap in practice. Counters are read
/// independently, so a snapshot taken while jobs are running may be
/// slightly inconsistent; after [`drain`](crate::JobProducer::drain) it
/// is exact.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Ring capacity.
    pub capacity: usize,
    /// Jobs ever enqueued (the producer's next write position).
    pub enqueued: u64,
    /// Positions ever claimed by a runner or evicted.
    pub claimed: u64,
    /// Positions whose job has finished running or was evicted.
    pub retired: u64,
    /// Jobs discarded by [`OverflowPolicy::Overwrite`](crate::OverflowPolicy::Overwrite).
    pub evicted: u64,
    /// Jobs that panicked while running.
    pub panicked: u64,
}

impl QueueStats {
    /// Jobs enqueued but not yet retired.
    pub fn outstanding(&self) -> u64 {
        self.enqueued.saturating_sub(self.retired)
    }

    /// Jobs enqueued but not yet claimed by any runner.
    pub fn unclaimed(&self) -> u64 {
        self.enqueued.saturating_sub(self.claimed)
    }

    /// Jobs claimed and currently running.
    pub fn in_flight(&self) -> u64 {
        self.claimed.saturating_sub(self.retired)
    }

    /// Jobs that actually ran (evicted ones never do).
    pub fn completed(&self) -> u64 {
        self.retired.saturating_sub(self.evicted)
    }
}
