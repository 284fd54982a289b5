//! The per-frame entry point.

use hearth_arena::{Arena, ArenaError, ByteSpan, Pod, ScopedRegion, TypedSpan};
use hearth_core::ProfileContext;
use hearth_jobs::JobProducer;

use crate::error::FrameError;

/// Everything a handler may touch during one frame.
///
/// Fields are public so a handler can borrow them independently, e.g.
/// resolve a slice from `transient` and enqueue scoped jobs through
/// `jobs` that write into it:
///
/// ```ignore
/// let values = ctx.transient.slice_mut(&span)?;
/// ctx.jobs.scope(|s| {
///     for chunk in values.chunks_mut(64) {
///         s.enqueue(move || chunk.fill(1.0)).unwrap();
///     }
/// })?;
/// ```
pub struct FrameContext<'a, 'buf> {
    /// Process-lifetime arena. Allocate long-lived state here, typically
    /// on the first frame.
    pub permanent: &'a mut Arena<'buf>,
    /// Transient arena. The frame region is open on it; allocate through
    /// `frame` or open nested regions inside it.
    pub transient: &'a mut Arena<'buf>,
    /// This frame's top-level region. The engine closes it after the
    /// handler returns and the queue has drained.
    pub frame: &'a mut ScopedRegion,
    /// Producer side of the work queue.
    pub jobs: &'a JobProducer,
    /// Profiling counters, persistent across frames.
    pub profile: &'a mut ProfileContext,
    index: u64,
}

impl<'a, 'buf> FrameContext<'a, 'buf> {
    pub(crate) fn new(
        permanent: &'a mut Arena<'buf>,
        transient: &'a mut Arena<'buf>,
        frame: &'a mut ScopedRegion,
        jobs: &'a JobProducer,
        profile: &'a mut ProfileContext,
        index: u64,
    ) -> Self {
        Self {
            permanent,
            transient,
            frame,
            jobs,
            profile,
            index,
        }
    }

    /// Zero-based index of the current frame.
    pub fn frame_index(&self) -> u64 {
        self.index
    }

    /// Whether this is the first frame; handlers set up permanent state
    /// here.
    pub fn is_first_frame(&self) -> bool {
        self.index == 0
    }

    /// Allocate `size` bytes of frame scratch.
    pub fn scratch_alloc(&mut self, size: usize) -> Result<ByteSpan, ArenaError> {
        self.transient.region_alloc(self.frame, size)
    }

    /// Allocate `count` values of `T` from frame scratch.
    pub fn scratch_array<T: Pod>(&mut self, count: usize) -> Result<TypedSpan<T>, ArenaError> {
        self.transient.region_push_array(self.frame, count)
    }

    /// Allocate one `T` from frame scratch.
    pub fn scratch_struct<T: Pod>(&mut self) -> Result<TypedSpan<T>, ArenaError> {
        self.transient.region_push_struct(self.frame)
    }

    /// Bytes left in the frame region.
    pub fn scratch_remaining(&self) -> usize {
        self.frame.remaining()
    }
}

impl std::fmt::Debug for FrameContext<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameContext")
            .field("index", &self.index)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

/// Per-frame game or application code.
///
/// Input and output types belong to the host: typically an input-state
/// snapshot and a render command buffer that the handler fills.
pub trait FrameHandler {
    /// Read-only per-frame input.
    type Input;
    /// Output the handler fills, e.g. render commands.
    type Output;

    /// Run one frame.
    ///
    /// Scratch allocations come from `ctx.frame`; any regions opened
    /// inside it must be closed before returning. Jobs still in the
    /// queue when this returns are drained by the engine, even when it
    /// returns an error.
    fn update_and_render(
        &mut self,
        ctx: &mut FrameContext<'_, '_>,
        input: &Self::Input,
        output: &mut Self::Output,
    ) -> Result<(), FrameError>;
}
