//! Linear arena allocation with stack-disciplined scoped regions.
//!
//! An [`Arena`] is a bump allocator over a memory block the caller owns.
//! Nothing is freed individually; memory comes back only when a
//! [`ScopedRegion`] closes or when the caller drops the block.
//!
//! # Architecture
//!
//! ```text
//! caller block: &'buf mut [u8]
//! ├── Arena (used cursor, open-region stack)
//! │   ├── direct allocations ─ ByteSpan / TypedSpan<T>   (only while no region is open)
//! │   └── ScopedRegion stack (LIFO)
//! │       ├── region #0 reservation ─ region spans
//! │       └── region #1 reservation ─ region spans        (innermost: the only one allocating)
//! ```
//!
//! Allocations are returned as spans (offset + length tagged with the
//! arena and region that produced them) and resolved to slices through
//! the arena. A span from a closed region or from another arena fails to
//! resolve instead of aliasing live memory.
//!
//! # Errors
//!
//! Every operation returns [`ArenaError`]. Its [`kind`](ArenaError::kind)
//! separates capacity exhaustion from usage errors (allocating while a
//! region is open, closing out of order, closing twice, zero-size
//! requests).
//!
//! # Safety
//!
//! The crate denies `unsafe` except in `raw.rs`, which reinterprets
//! aligned byte ranges as slices of [`Pod`] element types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod config;
pub mod error;
mod raw;
pub mod region;
pub mod span;

// Public re-exports for the primary API surface.
pub use arena::Arena;
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use raw::Pod;
pub use region::ScopedRegion;
pub use span::{ByteSpan, TypedSpan};
