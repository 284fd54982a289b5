//! The linear arena over a caller-owned block.
//!
//! [`Arena`] hands out non-overlapping spans by advancing a single `used`
//! cursor. There is no per-allocation free: the cursor only moves back
//! when a [`ScopedRegion`](crate::ScopedRegion) closes, and then by
//! exactly that region's reservation.

use std::mem::{align_of, size_of};

use smallvec::SmallVec;

use hearth_core::{ArenaId, RegionId};

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::raw::{self, Pod};
use crate::span::{ByteSpan, TypedSpan};

/// Bookkeeping for one open region, kept on the arena's region stack.
#[derive(Clone, Copy, Debug)]
pub(crate) struct OpenRegion {
    pub(crate) id: RegionId,
    pub(crate) base: usize,
    pub(crate) capacity: usize,
}

/// A bump allocator over a memory block borrowed from the caller.
///
/// The arena never allocates or frees the block itself; it lives for as
/// long as the borrow `'buf`. The arena is a single-writer structure:
/// every mutating operation takes `&mut self`.
///
/// # Example
///
/// ```
/// use hearth_arena::Arena;
///
/// let mut block = vec![0u8; 1024];
/// let mut arena = Arena::new(&mut block);
///
/// let header = arena.alloc(64).unwrap();
/// let normals = arena.push_array::<f32>(3 * 16).unwrap();
/// arena.slice_mut(&normals).unwrap().fill(1.0);
///
/// assert_eq!(header.len(), 64);
/// assert!(arena.used() >= 64 + 3 * 16 * 4);
/// ```
pub struct Arena<'buf> {
    pub(crate) id: ArenaId,
    pub(crate) block: &'buf mut [u8],
    pub(crate) used: usize,
    pub(crate) high_water: usize,
    pub(crate) regions: SmallVec<[OpenRegion; 4]>,
    pub(crate) next_region: u64,
    pub(crate) max_open_regions: usize,
}

impl<'buf> Arena<'buf> {
    /// Create an arena over `block` with the default configuration
    /// (block zero-filled once).
    pub fn new(block: &'buf mut [u8]) -> Self {
        Self::with_config(block, &ArenaConfig::default())
    }

    /// Create an arena over `block`.
    ///
    /// When `config.zero_on_create` is set the whole block is zero-filled
    /// here, once; allocations themselves never zero.
    pub fn with_config(block: &'buf mut [u8], config: &ArenaConfig) -> Self {
        if config.zero_on_create {
            block.fill(0);
        }
        Self {
            id: ArenaId::next(),
            block,
            used: 0,
            high_water: 0,
            regions: SmallVec::new(),
            next_region: 0,
            max_open_regions: config.max_open_regions,
        }
    }

    /// Unique identity of this arena.
    pub fn id(&self) -> ArenaId {
        self.id
    }

    /// Size of the backing block in bytes.
    pub fn total_size(&self) -> usize {
        self.block.len()
    }

    /// Bytes currently handed out, including open region reservations.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        self.block.len() - self.used
    }

    /// Largest value `used` has ever reached.
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Number of scoped regions currently open.
    pub fn open_region_count(&self) -> usize {
        self.regions.len()
    }

    /// The most recently opened region that is still open.
    pub fn innermost_region(&self) -> Option<RegionId> {
        self.regions.last().map(|r| r.id)
    }

    /// Allocate `size` bytes directly from the arena.
    ///
    /// Fails with [`ArenaError::RegionOpen`] while any scoped region is
    /// open: during that window all allocation must go through the
    /// innermost region, so nothing permanent lands inside memory that
    /// will later be unwound.
    pub fn alloc(&mut self, size: usize) -> Result<ByteSpan, ArenaError> {
        self.alloc_aligned(size, 1)
    }

    /// Allocate room for `count` values of `T`, aligned for `T`.
    ///
    /// Alignment padding (if any) is charged to `used`.
    pub fn push_array<T: Pod>(&mut self, count: usize) -> Result<TypedSpan<T>, ArenaError> {
        let size = array_bytes::<T>(count)?;
        let bytes = self.alloc_aligned(size, align_of::<T>())?;
        Ok(TypedSpan::new(bytes, count))
    }

    /// Allocate room for a single `T`.
    pub fn push_struct<T: Pod>(&mut self) -> Result<TypedSpan<T>, ArenaError> {
        self.push_array::<T>(1)
    }

    fn alloc_aligned(&mut self, size: usize, align: usize) -> Result<ByteSpan, ArenaError> {
        if size == 0 {
            return Err(ArenaError::ZeroSizeRequest);
        }
        if !self.regions.is_empty() {
            return Err(ArenaError::RegionOpen {
                open_regions: self.regions.len(),
            });
        }
        let offset = self.bump(size, align)?;
        Ok(ByteSpan::new(self.id, None, offset, size))
    }

    /// Advance the cursor by `size` bytes (plus padding for `align`),
    /// without the open-region guard. Returns the aligned start offset.
    pub(crate) fn bump(&mut self, size: usize, align: usize) -> Result<usize, ArenaError> {
        let addr = (self.block.as_ptr() as usize).wrapping_add(self.used);
        let padding = raw::padding_for(addr, align);
        let remaining = self.remaining();
        let requested = size
            .checked_add(padding)
            .ok_or(ArenaError::ArenaExhausted {
                requested: usize::MAX,
                remaining,
            })?;
        if requested > remaining {
            return Err(ArenaError::ArenaExhausted {
                requested,
                remaining,
            });
        }
        let offset = self.used + padding;
        self.used += requested;
        self.high_water = self.high_water.max(self.used);
        Ok(offset)
    }

    /// Resolve a span to its bytes.
    pub fn bytes(&self, span: &ByteSpan) -> Result<&[u8], ArenaError> {
        self.check_live(span)?;
        Ok(&self.block[span.offset..span.end()])
    }

    /// Resolve a span to its bytes, mutably.
    pub fn bytes_mut(&mut self, span: &ByteSpan) -> Result<&mut [u8], ArenaError> {
        self.check_live(span)?;
        Ok(&mut self.block[span.offset..span.end()])
    }

    /// Resolve a typed span to a slice of `T`.
    pub fn slice<T: Pod>(&self, span: &TypedSpan<T>) -> Result<&[T], ArenaError> {
        self.bytes(&span.bytes).map(raw::cast_slice::<T>)
    }

    /// Resolve a typed span to a mutable slice of `T`.
    pub fn slice_mut<T: Pod>(&mut self, span: &TypedSpan<T>) -> Result<&mut [T], ArenaError> {
        self.bytes_mut(&span.bytes).map(raw::cast_slice_mut::<T>)
    }

    /// Check that `span` was allocated here and its memory is still live.
    fn check_live(&self, span: &ByteSpan) -> Result<(), ArenaError> {
        if span.arena != self.id {
            return Err(ArenaError::ForeignSpan {
                expected: self.id,
                found: span.arena,
            });
        }
        if let Some(region) = span.region {
            if !self.regions.iter().any(|r| r.id == region) {
                return Err(ArenaError::StaleSpan {
                    region: Some(region),
                });
            }
        }
        if span.end() > self.used {
            return Err(ArenaError::StaleSpan {
                region: span.region,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for Arena<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("id", &self.id)
            .field("total_size", &self.block.len())
            .field("used", &self.used)
            .field("open_regions", &self.regions.len())
            .finish()
    }
}

/// Byte size of `count` elements of `T`, rejecting zero and overflow.
pub(crate) fn array_bytes<T: Pod>(count: usize) -> Result<usize, ArenaError> {
    if count == 0 {
        return Err(ArenaError::ZeroSizeRequest);
    }
    count
        .checked_mul(size_of::<T>())
        .ok_or(ArenaError::SizeOverflow {
            count,
            element_size: size_of::<T>(),
        })
}
