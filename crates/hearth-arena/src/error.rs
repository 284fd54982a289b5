//! Arena-specific error types.

use std::error::Error;
use std::fmt;

use hearth_core::{ArenaId, ErrorKind, RegionId};

/// Errors that can occur during arena and scoped-region operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// A zero-byte (or zero-element) allocation or region was requested.
    ZeroSizeRequest,
    /// The arena's block cannot satisfy the request.
    ArenaExhausted {
        /// Number of bytes requested, including alignment padding.
        requested: usize,
        /// Bytes still free in the arena.
        remaining: usize,
    },
    /// The region's reservation cannot satisfy the request.
    RegionExhausted {
        /// The region that ran out of space.
        region: RegionId,
        /// Number of bytes requested, including alignment padding.
        requested: usize,
        /// Bytes still free in the region.
        remaining: usize,
    },
    /// `count * size_of::<T>()` overflowed `usize`.
    SizeOverflow {
        /// Requested element count.
        count: usize,
        /// Size of one element in bytes.
        element_size: usize,
    },
    /// Direct arena allocation attempted while a scoped region is open.
    RegionOpen {
        /// Number of regions currently open.
        open_regions: usize,
    },
    /// Opening another region would exceed the configured stack depth.
    RegionDepthExceeded {
        /// Configured maximum.
        max: usize,
    },
    /// A region was closed while a more recently opened region is still open.
    OutOfOrderClose {
        /// The region the caller tried to close.
        region: RegionId,
        /// The most recently opened region, which must close first.
        innermost: RegionId,
    },
    /// Allocation from a region that is open but not the innermost one.
    NotInnermost {
        /// The region the caller tried to allocate from.
        region: RegionId,
        /// The region that currently owns allocation.
        innermost: RegionId,
    },
    /// The region handle has already been closed.
    RegionClosed {
        /// The closed region.
        region: RegionId,
    },
    /// A region handle was passed to an arena that did not open it.
    ForeignRegion {
        /// The region in question.
        region: RegionId,
        /// The arena the operation was invoked on.
        expected: ArenaId,
        /// The arena that opened the region.
        found: ArenaId,
    },
    /// A span was resolved against an arena that did not allocate it.
    ForeignSpan {
        /// The arena the span was resolved against.
        expected: ArenaId,
        /// The arena that allocated the span.
        found: ArenaId,
    },
    /// A span refers to memory that has since been released.
    StaleSpan {
        /// The region the span was allocated from, if any.
        region: Option<RegionId>,
    },
}

impl ArenaError {
    /// Classify this error as capacity pressure or a usage error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ArenaExhausted { .. }
            | Self::RegionExhausted { .. }
            | Self::SizeOverflow { .. }
            | Self::RegionDepthExceeded { .. } => ErrorKind::Capacity,
            Self::ZeroSizeRequest
            | Self::RegionOpen { .. }
            | Self::OutOfOrderClose { .. }
            | Self::NotInnermost { .. }
            | Self::RegionClosed { .. }
            | Self::ForeignRegion { .. }
            | Self::ForeignSpan { .. }
            | Self::StaleSpan { .. } => ErrorKind::Discipline,
        }
    }
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroSizeRequest => write!(f, "zero-size allocation requested"),
            Self::ArenaExhausted {
                requested,
                remaining,
            } => {
                write!(
                    f,
                    "arena exhausted: requested {requested} bytes, {remaining} bytes remaining"
                )
            }
            Self::RegionExhausted {
                region,
                requested,
                remaining,
            } => {
                write!(
                    f,
                    "{region} exhausted: requested {requested} bytes, {remaining} bytes remaining"
                )
            }
            Self::SizeOverflow {
                count,
                element_size,
            } => {
                write!(
                    f,
                    "allocation size overflow: {count} elements of {element_size} bytes"
                )
            }
            Self::RegionOpen { open_regions } => {
                write!(
                    f,
                    "direct arena allocation while {open_regions} scoped region(s) are open"
                )
            }
            Self::RegionDepthExceeded { max } => {
                write!(f, "cannot open more than {max} nested regions")
            }
            Self::OutOfOrderClose { region, innermost } => {
                write!(f, "cannot close {region} before innermost {innermost}")
            }
            Self::NotInnermost { region, innermost } => {
                write!(
                    f,
                    "cannot allocate from {region} while {innermost} is open inside it"
                )
            }
            Self::RegionClosed { region } => write!(f, "{region} is already closed"),
            Self::ForeignRegion {
                region,
                expected,
                found,
            } => {
                write!(f, "{region} belongs to {found}, not {expected}")
            }
            Self::ForeignSpan { expected, found } => {
                write!(f, "span belongs to {found}, not {expected}")
            }
            Self::StaleSpan { region: Some(r) } => {
                write!(f, "span refers to memory of closed {r}")
            }
            Self::StaleSpan { region: None } => {
                write!(f, "span refers to memory outside the arena's live range")
            }
        }
    }
}

impl Error for ArenaError {}
