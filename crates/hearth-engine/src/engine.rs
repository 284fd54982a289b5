//! The engine: arenas, job queue, worker pool and the frame loop.

use std::time::Instant;

use hearth_arena::{Arena, ArenaError, ScopedRegion};
use hearth_core::ProfileContext;
use hearth_jobs::{JobProducer, ShutdownReport, WorkerPool};

use crate::config::{ConfigError, EngineConfig};
use crate::error::FrameError;
use crate::frame::{FrameContext, FrameHandler};
use crate::memory::{EngineMemory, PlatformMemory};
use crate::metrics::FrameMetrics;

/// Profile counter for time spent in the handler.
pub const HANDLER_COUNTER: &str = "frame.handler";
/// Profile counter for the end-of-frame drain.
pub const DRAIN_COUNTER: &str = "frame.drain";

/// Owns the arenas over the host's memory, the job producer and the
/// worker pool, and drives frames.
///
/// # Example
///
/// ```
/// use hearth_engine::{Engine, EngineConfig, FrameContext, FrameError, FrameHandler, HostMemory};
///
/// struct Count;
///
/// impl FrameHandler for Count {
///     type Input = ();
///     type Output = u32;
///
///     fn update_and_render(
///         &mut self,
///         ctx: &mut FrameContext<'_, '_>,
///         _input: &(),
///         output: &mut u32,
///     ) -> Result<(), FrameError> {
///         let scratch = ctx.scratch_array::<u32>(16)?;
///         ctx.transient.slice_mut(&scratch)?.fill(1);
///         *output = ctx.transient.slice(&scratch)?.iter().sum();
///         Ok(())
///     }
/// }
///
/// let mut config = EngineConfig::with_sizes(4096, 4096, 1024);
/// config.pool = None;
/// let mut host = HostMemory::from_config(&config);
/// let mut engine = Engine::new(host.platform(), config).unwrap();
///
/// let mut out = 0;
/// engine.run_frame(&mut Count, &(), &mut out).unwrap();
/// assert_eq!(out, 16);
/// assert_eq!(engine.transient().used(), 0);
/// ```
pub struct Engine<'buf> {
    config: EngineConfig,
    memory: EngineMemory<'buf>,
    jobs: JobProducer,
    pool: Option<WorkerPool>,
    profile: ProfileContext,
    frame_index: u64,
    last_metrics: Option<FrameMetrics>,
}

impl<'buf> Engine<'buf> {
    /// Build an engine over `memory`.
    ///
    /// Validates `config` against itself and against the actual block
    /// sizes, then creates the queue and (if configured) spawns the
    /// worker pool.
    pub fn new(memory: PlatformMemory<'buf>, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.frame_scratch_size > memory.transient.len() {
            return Err(ConfigError::ScratchExceedsTransient {
                scratch: config.frame_scratch_size,
                transient: memory.transient.len(),
            });
        }
        if memory.permanent.is_empty() {
            return Err(ConfigError::ZeroSize {
                field: "permanent_size",
            });
        }

        let memory = EngineMemory::new(memory, &config.arena);
        let jobs = JobProducer::new(&config.queue)?;
        let pool = match &config.pool {
            Some(pool_config) => Some(WorkerPool::spawn(jobs.queue(), pool_config)?),
            None => None,
        };

        tracing::debug!(
            permanent = memory.permanent.total_size(),
            transient = memory.transient.total_size(),
            frame_scratch = config.frame_scratch_size,
            workers = pool.as_ref().map_or(0, WorkerPool::worker_count),
            "engine started"
        );

        Ok(Self {
            config,
            memory,
            jobs,
            pool,
            profile: ProfileContext::new(),
            frame_index: 0,
            last_metrics: None,
        })
    }

    /// Run one frame.
    ///
    /// 1. Open the frame region in the transient arena.
    /// 2. Call `handler.update_and_render`.
    /// 3. Drain the work queue, whether or not the handler succeeded.
    /// 4. Close the frame region.
    ///
    /// The first failure wins: a handler error is returned ahead of a
    /// drain error, which is returned ahead of a close error. If the
    /// handler left the transient arena's region stack unbalanced (nested
    /// regions still open, or the frame region closed early and another
    /// opened in its place), every region opened during the frame is
    /// unwound and [`FrameError::Arena`] is returned, leaving the engine
    /// ready for the next frame.
    pub fn run_frame<H: FrameHandler>(
        &mut self,
        handler: &mut H,
        input: &H::Input,
        output: &mut H::Output,
    ) -> Result<FrameMetrics, FrameError> {
        let start = Instant::now();
        let index = self.frame_index;
        let enqueued_before = self.jobs.stats().enqueued;

        let depth = self.memory.transient.open_region_count();
        let mut region = self
            .memory
            .transient
            .open_region(self.config.frame_scratch_size, self.config.zero_frame_scratch)?;

        let timer = self.profile.begin(HANDLER_COUNTER);
        let handled = {
            let mut ctx = FrameContext::new(
                &mut self.memory.permanent,
                &mut self.memory.transient,
                &mut region,
                &self.jobs,
                &mut self.profile,
                index,
            );
            handler.update_and_render(&mut ctx, input, output)
        };
        let handler_time = self.profile.end(timer);

        let timer = self.profile.begin(DRAIN_COUNTER);
        let drained = self.jobs.drain();
        let drain_time = self.profile.end(timer);

        let scratch_used = region.used();
        let closed = self.close_frame_region(&mut region, depth);
        self.frame_index += 1;

        let metrics = FrameMetrics {
            frame_index: index,
            total_us: start.elapsed().as_micros() as u64,
            handler_us: handler_time.as_micros() as u64,
            drain_us: drain_time.as_micros() as u64,
            scratch_used,
            scratch_capacity: region.capacity(),
            jobs_enqueued: self.jobs.stats().enqueued - enqueued_before,
            jobs_ran_on_frame_thread: drained.as_ref().map_or(0, |r| r.ran_on_caller),
            permanent_used: self.memory.permanent.used(),
            transient_high_water: self.memory.transient.high_water(),
        };
        self.last_metrics = Some(metrics.clone());

        handled?;
        drained?;
        closed?;
        Ok(metrics)
    }

    fn close_frame_region(&mut self, region: &mut ScopedRegion, depth: usize) -> Result<(), ArenaError> {
        let closed = self.memory.transient.close_region(region);
        if closed.is_err() {
            let abandoned = self.memory.transient.unwind_regions_to(depth);
            if abandoned > 0 {
                tracing::warn!(
                    frame = self.frame_index,
                    abandoned,
                    "frame handler left scoped regions open"
                );
            }
        }
        closed
    }

    /// Number of frames run so far, failed frames included.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Metrics from the most recent frame.
    pub fn last_metrics(&self) -> Option<&FrameMetrics> {
        self.last_metrics.as_ref()
    }

    /// The permanent arena.
    pub fn permanent(&self) -> &Arena<'buf> {
        &self.memory.permanent
    }

    /// The permanent arena, for setup outside a frame.
    pub fn permanent_mut(&mut self) -> &mut Arena<'buf> {
        &mut self.memory.permanent
    }

    /// The transient arena.
    pub fn transient(&self) -> &Arena<'buf> {
        &self.memory.transient
    }

    /// The job producer.
    pub fn jobs(&self) -> &JobProducer {
        &self.jobs
    }

    /// Accumulated profile counters.
    pub fn profile(&self) -> &ProfileContext {
        &self.profile
    }

    /// Mutable profile counters, e.g. to reset them.
    pub fn profile_mut(&mut self) -> &mut ProfileContext {
        &mut self.profile
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Number of live worker threads.
    pub fn worker_count(&self) -> usize {
        self.pool.as_ref().map_or(0, WorkerPool::worker_count)
    }

    /// Drain outstanding jobs and stop the worker pool.
    ///
    /// Idempotent. Dropping the engine does the same.
    pub fn shutdown(&mut self) -> ShutdownReport {
        if let Err(err) = self.jobs.drain() {
            tracing::warn!(error = %err, "jobs failed during shutdown drain");
        }
        match self.pool.take() {
            Some(mut pool) => pool.shutdown(),
            None => ShutdownReport::default(),
        }
    }
}

impl Drop for Engine<'_> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Engine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("frame_index", &self.frame_index)
            .field("memory", &self.memory)
            .field("workers", &self.worker_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::HostMemory;

    struct Noop;

    impl FrameHandler for Noop {
        type Input = ();
        type Output = ();

        fn update_and_render(
            &mut self,
            _ctx: &mut FrameContext<'_, '_>,
            _input: &(),
            _output: &mut (),
        ) -> Result<(), FrameError> {
            Ok(())
        }
    }

    fn small_config() -> EngineConfig {
        let mut config = EngineConfig::with_sizes(1024, 4096, 2048);
        config.pool = None;
        config
    }

    #[test]
    fn new_rejects_scratch_larger_than_actual_block() {
        let mut host = HostMemory::new(1024, 1024);
        let err = Engine::new(host.platform(), small_config()).unwrap_err();
        assert_eq!(
            err,
            ConfigError::ScratchExceedsTransient {
                scratch: 2048,
                transient: 1024
            }
        );
    }

    #[test]
    fn frame_counters_are_recorded() {
        let config = small_config();
        let mut host = HostMemory::from_config(&config);
        let mut engine = Engine::new(host.platform(), config).unwrap();
        for _ in 0..3 {
            engine.run_frame(&mut Noop, &(), &mut ()).unwrap();
        }
        let snap = engine.profile().snapshot();
        assert_eq!(snap.get(HANDLER_COUNTER).unwrap().hits, 3);
        assert_eq!(snap.get(DRAIN_COUNTER).unwrap().hits, 3);
        assert_eq!(engine.frame_index(), 3);
    }

    #[test]
    fn frame_region_reserved_then_released() {
        let config = small_config();
        let mut host = HostMemory::from_config(&config);
        let mut engine = Engine::new(host.platform(), config).unwrap();
        let metrics = engine.run_frame(&mut Noop, &(), &mut ()).unwrap();
        assert_eq!(metrics.scratch_capacity, 2048);
        assert_eq!(metrics.scratch_used, 0);
        assert_eq!(metrics.transient_high_water, 2048);
        assert_eq!(engine.transient().used(), 0);
        assert_eq!(engine.transient().open_region_count(), 0);
    }

    #[test]
    fn shutdown_is_idempotent() {
        let mut config = small_config();
        config.pool = Some(hearth_jobs::PoolConfig::with_workers(2));
        let mut host = HostMemory::from_config(&config);
        let mut engine = Engine::new(host.platform(), config).unwrap();
        assert_eq!(engine.worker_count(), 2);
        assert_eq!(engine.shutdown().workers_joined, 2);
        assert_eq!(engine.shutdown().workers_joined, 0);
        assert_eq!(engine.worker_count(), 0);
    }
}
