//! Engine configuration, validation, and error types.

use std::error::Error;
use std::fmt;

use hearth_arena::ArenaConfig;
use hearth_jobs::{PoolConfig, QueueConfig, QueueError};

const MIB: usize = 1024 * 1024;

/// Configuration for an [`Engine`](crate::Engine).
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Size of the permanent block [`HostMemory`](crate::HostMemory)
    /// allocates. Default: 4 MiB.
    pub permanent_size: usize,
    /// Size of the transient block. Default: 16 MiB.
    pub transient_size: usize,
    /// Bytes reserved by each frame's top-level region in the transient
    /// arena. Must not exceed the transient block. Default: 8 MiB.
    pub frame_scratch_size: usize,
    /// Zero the frame region when it opens. Default: true.
    pub zero_frame_scratch: bool,
    /// Configuration shared by both arenas.
    pub arena: ArenaConfig,
    /// Work-queue configuration.
    pub queue: QueueConfig,
    /// Worker pool configuration. `None` runs without worker threads:
    /// every job then runs on the frame thread during drain.
    pub pool: Option<PoolConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            permanent_size: 4 * MIB,
            transient_size: 16 * MIB,
            frame_scratch_size: 8 * MIB,
            zero_frame_scratch: true,
            arena: ArenaConfig::default(),
            queue: QueueConfig::default(),
            pool: Some(PoolConfig::default()),
        }
    }
}

impl EngineConfig {
    /// Default config with explicit block and scratch sizes.
    pub fn with_sizes(permanent: usize, transient: usize, frame_scratch: usize) -> Self {
        Self {
            permanent_size: permanent,
            transient_size: transient,
            frame_scratch_size: frame_scratch,
            ..Self::default()
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.permanent_size == 0 {
            return Err(ConfigError::ZeroSize {
                field: "permanent_size",
            });
        }
        if self.transient_size == 0 {
            return Err(ConfigError::ZeroSize {
                field: "transient_size",
            });
        }
        if self.frame_scratch_size == 0 {
            return Err(ConfigError::ZeroSize {
                field: "frame_scratch_size",
            });
        }
        if self.frame_scratch_size > self.transient_size {
            return Err(ConfigError::ScratchExceedsTransient {
                scratch: self.frame_scratch_size,
                transient: self.transient_size,
            });
        }
        if self.arena.max_open_regions == 0 {
            return Err(ConfigError::NoRegionDepth);
        }
        self.queue.validate()?;
        Ok(())
    }
}

/// Errors detected by [`EngineConfig::validate`] and
/// [`Engine::new`](crate::Engine::new).
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A size field is zero.
    ZeroSize {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The frame region does not fit in the transient block.
    ScratchExceedsTransient {
        /// Configured frame scratch size.
        scratch: usize,
        /// Transient block size.
        transient: usize,
    },
    /// `arena.max_open_regions` is zero, so no frame region can open.
    NoRegionDepth,
    /// Queue configuration is invalid or the worker pool failed to start.
    Queue(QueueError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSize { field } => write!(f, "{field} must be non-zero"),
            Self::ScratchExceedsTransient { scratch, transient } => {
                write!(
                    f,
                    "frame_scratch_size {scratch} exceeds transient block of {transient} bytes"
                )
            }
            Self::NoRegionDepth => write!(f, "arena.max_open_regions must be at least 1"),
            Self::Queue(e) => write!(f, "queue: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Queue(e) => Some(e),
            _ => None,
        }
    }
}

impl From<QueueError> for ConfigError {
    fn from(e: QueueError) -> Self {
        Self::Queue(e)
    }
}
