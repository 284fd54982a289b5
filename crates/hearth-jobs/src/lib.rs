//! Cross-thread work queue for fanning out parallel jobs.
//!
//! One producer thread enqueues jobs; a pool of worker threads claims and
//! runs them; the producer waits for all of them with a single drain
//! barrier.
//!
//! # Architecture
//!
//! ```text
//! JobProducer (one per queue; Send, !Sync)
//! ├── enqueue / enqueue_call / scope ──► WorkQueue (Arc-shared)
//! │                                      ├── slots[capacity]  (written flag + job)
//! │                                      ├── next_free_slot   (producer advances)
//! │                                      ├── next_to_run      (claimed by CAS)
//! │                                      └── retired          (drain barrier target)
//! └── drain ◄──────────────────────────── WorkerPool threads: run_next() / wait_for_work()
//! ```
//!
//! Claim order is FIFO; completion order across jobs is unspecified.
//! Only [`JobProducer::drain`] establishes that every previously enqueued
//! job has finished.
//!
//! # Overflow
//!
//! What happens when the ring is full is an explicit [`OverflowPolicy`]:
//! block (default, the producer helps run jobs while it waits), reject,
//! or overwrite the oldest unread item.
//!
//! # Safety
//!
//! The crate denies `unsafe` except in `erase.rs`, which extends the
//! lifetime of jobs enqueued through [`JobProducer::scope`]; the scope
//! drains the queue before returning, so those jobs never outlive the
//! data they borrow.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

mod bell;
pub mod config;
mod erase;
pub mod error;
pub mod pool;
pub mod producer;
pub mod queue;
pub mod scope;
pub mod stats;

pub use config::{OverflowPolicy, PoolConfig, QueueConfig};
pub use error::QueueError;
pub use pool::{ShutdownReport, WorkerPool};
pub use producer::{DrainReport, JobProducer};
pub use queue::{Enqueued, WorkQueue};
pub use scope::JobScope;
pub use stats::QueueStats;
