//! Error classification shared by every Hearth subsystem.
//!
//! Each subsystem defines its own error enum (`ArenaError`, `QueueError`,
//! ...). All of them map onto an [`ErrorKind`] so that a host can tell
//! resource pressure apart from a caller bug without matching on every
//! variant.

use std::fmt;

/// Coarse classification of a subsystem error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A fixed-capacity resource ran out of space (arena, region, queue).
    ///
    /// The caller may recover by growing the backing store, failing the
    /// current frame, or aborting.
    Capacity,
    /// The caller broke a usage rule: zero-size request, allocation while
    /// a region is open, out-of-order or repeated region close, or a
    /// handle used with the wrong arena.
    Discipline,
    /// A dispatched job failed (panicked) on the thread that ran it.
    Job,
    /// An operating-system resource could not be acquired (thread spawn).
    Platform,
}

impl ErrorKind {
    /// Whether this kind indicates a bug in the calling code rather than
    /// resource pressure.
    pub fn is_usage_error(self) -> bool {
        matches!(self, Self::Discipline)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capacity => write!(f, "capacity exhausted"),
            Self::Discipline => write!(f, "usage error"),
            Self::Job => write!(f, "job failure"),
            Self::Platform => write!(f, "platform failure"),
        }
    }
}
