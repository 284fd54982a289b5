//! Frame boundary for the Hearth engine.
//!
//! The host hands the engine two memory blocks ([`PlatformMemory`]) and a
//! [`FrameHandler`]. Each call to [`Engine::run_frame`] opens one
//! top-level scoped region in the transient arena, runs the handler with
//! a [`FrameContext`], drains the work queue and closes the region, so
//! per-frame scratch memory never leaks across frames.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod frame;
pub mod memory;
pub mod metrics;

pub use config::{ConfigError, EngineConfig};
pub use engine::Engine;
pub use error::FrameError;
pub use frame::{FrameContext, FrameHandler};
pub use memory::{EngineMemory, HostMemory, PlatformMemory};
pub use metrics::FrameMetrics;
