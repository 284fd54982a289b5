//! Test fixtures for Hearth development.
//!
//! Memory blocks for arenas, job counters and order recorders for the
//! work queue.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod fixtures;

pub use fixtures::{
    dirty_block, sleep_job, with_arena, zeroed_block, JobCounter, Recorder, DIRTY_BYTE,
};
