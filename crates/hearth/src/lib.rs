//! Hearth: arena memory, scoped regions and a cross-thread work queue for
//! frame-based engines.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Hearth sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use hearth::prelude::*;
//!
//! struct Sum;
//!
//! impl FrameHandler for Sum {
//!     type Input = u32;
//!     type Output = u64;
//!
//!     fn update_and_render(
//!         &mut self,
//!         ctx: &mut FrameContext<'_, '_>,
//!         n: &u32,
//!         out: &mut u64,
//!     ) -> Result<(), FrameError> {
//!         let span = ctx.scratch_array::<u64>(*n as usize)?;
//!         let values = ctx.transient.slice_mut(&span)?;
//!         ctx.jobs.scope(|s| {
//!             for (i, v) in values.iter_mut().enumerate() {
//!                 s.enqueue(move || *v = i as u64).unwrap();
//!             }
//!         })?;
//!         *out = ctx.transient.slice(&span)?.iter().sum();
//!         Ok(())
//!     }
//! }
//!
//! let mut config = EngineConfig::with_sizes(4096, 16 * 1024, 8 * 1024);
//! config.pool = Some(PoolConfig::with_workers(2));
//! let mut host = HostMemory::from_config(&config);
//! let mut engine = Engine::new(host.platform(), config).unwrap();
//!
//! let mut out = 0;
//! engine.run_frame(&mut Sum, &10, &mut out).unwrap();
//! assert_eq!(out, 45);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `hearth-core` | IDs, error kinds, profiling counters |
//! | [`arena`] | `hearth-arena` | `Arena`, `ScopedRegion`, spans, `Pod` |
//! | [`jobs`] | `hearth-jobs` | `JobProducer`, `WorkQueue`, `WorkerPool` |
//! | [`engine`] | `hearth-engine` | `Engine`, frame handler and host memory |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core identifiers, error classification and profiling (`hearth-core`).
pub use hearth_core as types;

/// Linear arena and scoped regions (`hearth-arena`).
///
/// [`arena::Arena`] and [`arena::ScopedRegion`] are also in the
/// [`prelude`].
pub use hearth_arena as arena;

/// Work queue, scoped jobs and worker pool (`hearth-jobs`).
pub use hearth_jobs as jobs;

/// Frame boundary and host memory (`hearth-engine`).
pub use hearth_engine as engine;

/// Common imports for typical Hearth usage.
///
/// ```rust
/// use hearth::prelude::*;
/// ```
pub mod prelude {
    // Core
    pub use hearth_core::{ErrorKind, ProfileContext};

    // Arena
    pub use hearth_arena::{Arena, ArenaConfig, ArenaError, ByteSpan, Pod, ScopedRegion, TypedSpan};

    // Jobs
    pub use hearth_jobs::{
        JobProducer, JobScope, OverflowPolicy, PoolConfig, QueueConfig, QueueError, WorkerPool,
    };

    // Engine
    pub use hearth_engine::{
        Engine, EngineConfig, FrameContext, FrameError, FrameHandler, FrameMetrics, HostMemory,
        PlatformMemory,
    };
}
