//! Per-frame metrics.

/// Timing and memory data collected during one frame.
///
/// Durations are in microseconds. [`Engine::run_frame`](crate::Engine::run_frame)
/// returns these on success; the most recent set is also kept on the
/// engine, failed frames included.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameMetrics {
    /// Zero-based index of the frame.
    pub frame_index: u64,
    /// Wall-clock time for the whole frame, in microseconds.
    pub total_us: u64,
    /// Time spent in the handler, in microseconds.
    pub handler_us: u64,
    /// Time spent in the end-of-frame drain, in microseconds.
    pub drain_us: u64,
    /// Bytes the handler used from the frame region.
    pub scratch_used: usize,
    /// Bytes reserved by the frame region.
    pub scratch_capacity: usize,
    /// Jobs enqueued during the frame.
    pub jobs_enqueued: u64,
    /// Jobs the frame thread ran itself during the final drain.
    pub jobs_ran_on_frame_thread: u64,
    /// Permanent arena usage after the frame, in bytes.
    pub permanent_used: usize,
    /// Transient arena high-water mark, in bytes.
    pub transient_high_water: usize,
}

impl FrameMetrics {
    /// Fraction of the frame region the handler used, in `[0, 1]`.
    pub fn scratch_utilisation(&self) -> f64 {
        if self.scratch_capacity == 0 {
            return 0.0;
        }
        self.scratch_used as f64 / self.scratch_capacity as f64
    }
}
