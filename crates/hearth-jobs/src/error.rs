//! Work-queue error types.

use std::error::Error;
use std::fmt;

use hearth_core::ErrorKind;

/// Errors from enqueueing, draining, or running the worker pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueueError {
    /// Queue capacity is zero or not a power of two.
    InvalidCapacity {
        /// The rejected capacity.
        capacity: usize,
    },
    /// The ring is full and the overflow policy is
    /// [`Reject`](crate::OverflowPolicy::Reject).
    QueueFull {
        /// Ring capacity.
        capacity: usize,
    },
    /// Jobs panicked since the previous drain. Every job still retired;
    /// the panics were caught on the threads that ran them.
    JobPanicked {
        /// Number of jobs that panicked.
        count: u64,
    },
    /// A worker thread could not be started.
    SpawnFailed {
        /// Index of the worker that failed to start.
        worker: usize,
        /// OS error description.
        reason: String,
    },
}

impl QueueError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCapacity { .. } => ErrorKind::Discipline,
            Self::QueueFull { .. } => ErrorKind::Capacity,
            Self::JobPanicked { .. } => ErrorKind::Job,
            Self::SpawnFailed { .. } => ErrorKind::Platform,
        }
    }
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCapacity { capacity } => {
                write!(f, "queue capacity {capacity} is not a non-zero power of two")
            }
            Self::QueueFull { capacity } => {
                write!(f, "work queue full ({capacity} slots)")
            }
            Self::JobPanicked { count } => write!(f, "{count} job(s) panicked"),
            Self::SpawnFailed { worker, reason } => {
                write!(f, "failed to spawn worker {worker}: {reason}")
            }
        }
    }
}

impl Error for QueueError {}
