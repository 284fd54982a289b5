//! Allocation spans returned by the arena.
//!
//! A [`ByteSpan`] records where an allocation lives: the arena that made
//! it, the region it came from (if any), its byte offset within the block
//! and its length. A [`TypedSpan`] adds an element type and count on top.
//! Spans are plain `Copy` values; they are resolved to slices through
//! [`Arena::bytes`](crate::Arena::bytes) and
//! [`Arena::slice`](crate::Arena::slice), which verify that the memory is
//! still live.

use std::fmt;
use std::marker::PhantomData;

use hearth_core::{ArenaId, RegionId};

use crate::raw::Pod;

/// Location of a byte allocation within an arena's block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ByteSpan {
    pub(crate) arena: ArenaId,
    pub(crate) region: Option<RegionId>,
    pub(crate) offset: usize,
    pub(crate) len: usize,
}

impl ByteSpan {
    pub(crate) fn new(arena: ArenaId, region: Option<RegionId>, offset: usize, len: usize) -> Self {
        Self {
            arena,
            region,
            offset,
            len,
        }
    }

    /// The arena that produced this span.
    pub fn arena(&self) -> ArenaId {
        self.arena
    }

    /// The region this span was allocated from, or `None` for a direct
    /// arena allocation.
    pub fn region(&self) -> Option<RegionId> {
        self.region
    }

    /// Byte offset from the start of the arena's block.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: the arena rejects zero-size requests.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last byte, as an offset into the block.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Whether the two spans share at least one byte.
    pub fn overlaps(&self, other: &ByteSpan) -> bool {
        self.arena == other.arena && self.offset < other.end() && other.offset < self.end()
    }
}

impl fmt::Display for ByteSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.region {
            Some(r) => write!(f, "{}/{}[{}..{}]", self.arena, r, self.offset, self.end()),
            None => write!(f, "{}[{}..{}]", self.arena, self.offset, self.end()),
        }
    }
}

/// A span holding `count` contiguous, aligned values of `T`.
pub struct TypedSpan<T: Pod> {
    pub(crate) bytes: ByteSpan,
    pub(crate) count: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Pod> TypedSpan<T> {
    pub(crate) fn new(bytes: ByteSpan, count: usize) -> Self {
        Self {
            bytes,
            count,
            _marker: PhantomData,
        }
    }

    /// The underlying byte span.
    pub fn as_bytes(&self) -> ByteSpan {
        self.bytes
    }

    /// Number of `T` elements.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Always `false`: the arena rejects zero-element requests.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl<T: Pod> Clone for TypedSpan<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Pod> Copy for TypedSpan<T> {}

impl<T: Pod> PartialEq for TypedSpan<T> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes && self.count == other.count
    }
}

impl<T: Pod> Eq for TypedSpan<T> {}

impl<T: Pod> fmt::Debug for TypedSpan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedSpan")
            .field("type", &std::any::type_name::<T>())
            .field("count", &self.count)
            .field("bytes", &self.bytes)
            .finish()
    }
}
