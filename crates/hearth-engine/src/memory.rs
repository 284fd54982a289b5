//! Host-supplied memory blocks and the arenas built over them.

use hearth_arena::{Arena, ArenaConfig};

use crate::config::EngineConfig;

/// The two raw blocks the host lends to the engine.
///
/// The engine never allocates or frees these. "Permanent" holds state
/// that lives for the whole process; "transient" is reset by one
/// top-level region per frame.
#[derive(Debug)]
pub struct PlatformMemory<'buf> {
    /// Process-lifetime block.
    pub permanent: &'buf mut [u8],
    /// Per-frame scratch block.
    pub transient: &'buf mut [u8],
}

impl<'buf> PlatformMemory<'buf> {
    /// Bundle two caller-owned blocks.
    pub fn new(permanent: &'buf mut [u8], transient: &'buf mut [u8]) -> Self {
        Self {
            permanent,
            transient,
        }
    }
}

/// Owns a permanent and a transient block on the heap and lends them
/// out as [`PlatformMemory`].
///
/// Hosts with their own memory (a static buffer, a large page mapping)
/// build [`PlatformMemory`] directly instead.
#[derive(Debug)]
pub struct HostMemory {
    permanent: Vec<u8>,
    transient: Vec<u8>,
}

impl HostMemory {
    /// Allocate zeroed blocks of the given sizes.
    pub fn new(permanent_size: usize, transient_size: usize) -> Self {
        Self {
            permanent: vec![0; permanent_size],
            transient: vec![0; transient_size],
        }
    }

    /// Allocate blocks sized by `config`.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.permanent_size, config.transient_size)
    }

    /// Lend both blocks.
    pub fn platform(&mut self) -> PlatformMemory<'_> {
        PlatformMemory::new(&mut self.permanent, &mut self.transient)
    }

    /// Permanent block size in bytes.
    pub fn permanent_size(&self) -> usize {
        self.permanent.len()
    }

    /// Transient block size in bytes.
    pub fn transient_size(&self) -> usize {
        self.transient.len()
    }
}

/// The permanent and transient arenas.
#[derive(Debug)]
pub struct EngineMemory<'buf> {
    /// Arena over the permanent block. Never has a frame region open.
    pub permanent: Arena<'buf>,
    /// Arena over the transient block. Holds the frame region while a
    /// frame runs.
    pub transient: Arena<'buf>,
}

impl<'buf> EngineMemory<'buf> {
    /// Build both arenas over `platform`.
    pub fn new(platform: PlatformMemory<'buf>, config: &ArenaConfig) -> Self {
        Self {
            permanent: Arena::with_config(platform.permanent, config),
            transient: Arena::with_config(platform.transient, config),
        }
    }
}
