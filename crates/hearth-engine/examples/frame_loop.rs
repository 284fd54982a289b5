//! Hearth frame loop: a heightfield whose vertex normals are rebuilt in
//! parallel every frame.
//!
//! Demonstrates:
//!   1. Lending host memory to the engine
//!   2. Allocating long-lived state from the permanent arena on frame 0
//!   3. Per-frame scratch from the frame region
//!   4. Scoped jobs writing into scratch, drained before the region closes
//!   5. Profile counters and frame metrics
//!
//! Run with:
//!   cargo run --example frame_loop

use hearth_arena::TypedSpan;
use hearth_engine::{Engine, EngineConfig, FrameContext, FrameError, FrameHandler, HostMemory};
use hearth_jobs::{PoolConfig, QueueError};

// ─── Grid parameters ────────────────────────────────────────────

const SIDE: usize = 64;
const VERTS: usize = SIDE * SIDE;
const ROWS_PER_JOB: usize = 8;
const FRAMES: u64 = 5;

// ─── Host-side input and output ─────────────────────────────────

struct Input {
    time: f32,
}

/// Stand-in for a render push buffer.
#[derive(Default)]
struct RenderCommands {
    clear_color: [f32; 3],
    mesh_checksum: f32,
}

// ─── Handler ────────────────────────────────────────────────────

#[derive(Default)]
struct Terrain {
    heights: Option<TypedSpan<f32>>,
}

fn height_at(x: usize, z: usize, time: f32) -> f32 {
    ((x as f32 * 0.2 + time).sin() + (z as f32 * 0.15).cos()) * 0.5
}

fn normals_for_rows(heights: &[f32], first_row: usize, out: &mut [[f32; 3]]) {
    for (offset, normal) in out.iter_mut().enumerate() {
        let index = first_row * SIDE + offset;
        let (x, z) = (index % SIDE, index / SIDE);
        let h = |x: usize, z: usize| heights[z.min(SIDE - 1) * SIDE + x.min(SIDE - 1)];
        let dx = h(x + 1, z) - h(x.saturating_sub(1), z);
        let dz = h(x, z + 1) - h(x, z.saturating_sub(1));
        let n = [-dx, 2.0, -dz];
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        *normal = [n[0] / len, n[1] / len, n[2] / len];
    }
}

impl FrameHandler for Terrain {
    type Input = Input;
    type Output = RenderCommands;

    fn update_and_render(
        &mut self,
        ctx: &mut FrameContext<'_, '_>,
        input: &Input,
        output: &mut RenderCommands,
    ) -> Result<(), FrameError> {
        if ctx.is_first_frame() {
            self.heights = Some(ctx.permanent.push_array::<f32>(VERTS)?);
        }
        let heights_span = self
            .heights
            .ok_or_else(|| FrameError::handler("terrain not initialised"))?;

        for (i, h) in ctx.permanent.slice_mut(&heights_span)?.iter_mut().enumerate() {
            *h = height_at(i % SIDE, i / SIDE, input.time);
        }

        let normals_span = ctx.scratch_array::<[f32; 3]>(VERTS)?;
        let heights = ctx.permanent.slice(&heights_span)?;
        let normals = ctx.transient.slice_mut(&normals_span)?;

        let timer = ctx.profile.begin("generate_vertex_normals");
        ctx.jobs.scope(|s| {
            for (job, rows) in normals.chunks_mut(ROWS_PER_JOB * SIDE).enumerate() {
                s.enqueue(move || normals_for_rows(heights, job * ROWS_PER_JOB, rows))?;
            }
            Ok::<(), QueueError>(())
        })??;
        ctx.profile.end(timer);

        output.mesh_checksum = ctx
            .transient
            .slice(&normals_span)?
            .iter()
            .map(|n| n[1])
            .sum();
        output.clear_color = [0.1, 0.1, 0.12 + input.time.sin().abs() * 0.1];
        Ok(())
    }
}

// ─── Main ───────────────────────────────────────────────────────

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = EngineConfig::with_sizes(1 << 20, 1 << 20, 512 * 1024);
    config.pool = Some(PoolConfig::with_workers(4));

    let mut host = HostMemory::from_config(&config);
    let mut engine = Engine::new(host.platform(), config)?;
    let mut terrain = Terrain::default();
    let mut commands = RenderCommands::default();

    for frame in 0..FRAMES {
        let input = Input {
            time: frame as f32 * 0.1,
        };
        let metrics = engine.run_frame(&mut terrain, &input, &mut commands)?;
        println!(
            "frame {:>2}: {:>5} us total, {:>5} us drain, {} jobs, scratch {:.1}%, checksum {:.3}, clear {:?}",
            metrics.frame_index,
            metrics.total_us,
            metrics.drain_us,
            metrics.jobs_enqueued,
            metrics.scratch_utilisation() * 100.0,
            commands.mesh_checksum,
            commands.clear_color,
        );
    }

    println!("\nprofile:");
    for sample in engine.profile().snapshot().iter() {
        println!(
            "  {:<24} {:>4} hits, {:>8.1?} avg",
            sample.name,
            sample.hits,
            sample.average()
        );
    }

    let report = engine.shutdown();
    println!(
        "\nworkers joined: {}, jobs per worker: {:?}",
        report.workers_joined, report.jobs_per_worker
    );
    Ok(())
}
