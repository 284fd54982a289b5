//! Frame errors.

use std::error::Error;
use std::fmt;

use hearth_arena::ArenaError;
use hearth_jobs::QueueError;

/// Errors from [`Engine::run_frame`](crate::Engine::run_frame) and from
/// frame handlers.
///
/// Handlers can use `?` on arena and queue operations; both convert.
#[derive(Debug, PartialEq, Eq)]
pub enum FrameError {
    /// An arena or region operation failed, or the frame region could
    /// not be opened or closed.
    Arena(ArenaError),
    /// Enqueueing or draining failed.
    Queue(QueueError),
    /// The handler reported a failure of its own.
    Handler {
        /// Description of the failure.
        reason: String,
    },
}

impl FrameError {
    /// Convenience constructor for handler-defined failures.
    pub fn handler(reason: impl Into<String>) -> Self {
        Self::Handler {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arena(e) => write!(f, "arena: {e}"),
            Self::Queue(e) => write!(f, "queue: {e}"),
            Self::Handler { reason } => write!(f, "frame handler failed: {reason}"),
        }
    }
}

impl Error for FrameError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Arena(e) => Some(e),
            Self::Queue(e) => Some(e),
            Self::Handler { .. } => None,
        }
    }
}

impl From<ArenaError> for FrameError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

impl From<QueueError> for FrameError {
    fn from(e: QueueError) -> Self {
        Self::Queue(e)
    }
}
