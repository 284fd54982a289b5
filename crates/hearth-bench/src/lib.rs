//! Benchmark profiles and workloads for the Hearth engine.
//!
//! - [`reference_config`]: engine sizes used by the frame benchmarks
//! - [`ParticleStep`]: a frame handler that integrates particles in
//!   parallel over frame scratch

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use hearth_arena::TypedSpan;
use hearth_engine::{EngineConfig, FrameContext, FrameError, FrameHandler};
use hearth_jobs::{PoolConfig, QueueError};

/// Engine config for benchmarks: 1 MiB permanent, 8 MiB transient, 4 MiB
/// frame scratch. `workers = None` runs every job on the frame thread.
pub fn reference_config(workers: Option<usize>) -> EngineConfig {
    let mut config = EngineConfig::with_sizes(1 << 20, 8 << 20, 4 << 20);
    config.pool = workers.map(PoolConfig::with_workers);
    config
}

/// Particle integration: positions live in the permanent arena,
/// per-frame forces in scratch, one job per chunk.
pub struct ParticleStep {
    count: usize,
    chunk: usize,
    positions: Option<TypedSpan<[f32; 2]>>,
}

impl ParticleStep {
    /// `count` particles split into jobs of `chunk` particles.
    pub fn new(count: usize, chunk: usize) -> Self {
        Self {
            count,
            chunk: chunk.max(1),
            positions: None,
        }
    }
}

impl FrameHandler for ParticleStep {
    /// Timestep.
    type Input = f32;
    /// Sum of x coordinates after the step.
    type Output = f32;

    fn update_and_render(
        &mut self,
        ctx: &mut FrameContext<'_, '_>,
        dt: &f32,
        output: &mut f32,
    ) -> Result<(), FrameError> {
        let positions = match self.positions {
            Some(span) => span,
            None => {
                let span = ctx.permanent.push_array::<[f32; 2]>(self.count)?;
                for (i, p) in ctx.permanent.slice_mut(&span)?.iter_mut().enumerate() {
                    *p = [i as f32, 0.0];
                }
                self.positions = Some(span);
                span
            }
        };

        let forces_span = ctx.scratch_array::<[f32; 2]>(self.count)?;
        let forces = ctx.transient.slice_mut(&forces_span)?;
        for (i, f) in forces.iter_mut().enumerate() {
            *f = [((i % 7) as f32 - 3.0) * 0.1, -9.8];
        }
        let forces: &[[f32; 2]] = forces;

        let points = ctx.permanent.slice_mut(&positions)?;
        let dt = *dt;
        let chunk = self.chunk;
        ctx.jobs.scope(|s| {
            for (points, forces) in points.chunks_mut(chunk).zip(forces.chunks(chunk)) {
                s.enqueue(move || {
                    for (p, f) in points.iter_mut().zip(forces) {
                        p[0] += f[0] * dt;
                        p[1] += f[1] * dt;
                    }
                })?;
            }
            Ok::<(), QueueError>(())
        })??;

        *output = ctx.permanent.slice(&positions)?.iter().map(|p| p[0]).sum();
        Ok(())
    }
}
