//! Core types for the Hearth engine foundation.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the identifiers shared by the arena and job crates, the error
//! classification used across subsystems, and the explicit profiling
//! context that replaces process-wide cycle-counter tables.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod profile;

pub use error::ErrorKind;
pub use id::{ArenaId, RegionId};
pub use profile::{CounterSample, ProfileContext, ProfileSnapshot, ProfileTimer};
