//! Stack-disciplined scoped regions ("temp memory").
//!
//! A [`ScopedRegion`] reserves a fixed span at the top of an arena and
//! bump-allocates inside it. Regions nest: opening a region while another
//! is open reserves the new span after the outer one. They must close in
//! exact reverse order, and closing one gives back its whole reservation
//! regardless of how much of it was used.
//!
//! The region handle is a plain token; all operations go through the
//! owning [`Arena`], which keeps the authoritative stack of open regions.

use std::mem::align_of;

use hearth_core::{ArenaId, RegionId};

use crate::arena::{array_bytes, Arena, OpenRegion};
use crate::error::ArenaError;
use crate::raw::{self, Pod};
use crate::span::{ByteSpan, TypedSpan};

/// Handle to a span of arena memory reserved for a bounded lifetime.
///
/// Obtained from [`Arena::open_region`] and released with
/// [`Arena::close_region`]. After close the handle is marked closed and
/// every further use of it is rejected with [`ArenaError::RegionClosed`].
#[derive(Debug)]
#[must_use = "an open region must be closed with Arena::close_region"]
pub struct ScopedRegion {
    arena: ArenaId,
    id: RegionId,
    base: usize,
    capacity: usize,
    used: usize,
    closed: bool,
}

impl ScopedRegion {
    /// The region's identity within its arena.
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// The arena that opened this region.
    pub fn arena(&self) -> ArenaId {
        self.arena
    }

    /// Offset of the reservation within the arena's block.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Bytes reserved for this region.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes handed out inside the region so far.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Bytes still available inside the region.
    pub fn remaining(&self) -> usize {
        self.capacity - self.used
    }

    /// Whether the region has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<'buf> Arena<'buf> {
    /// Reserve `capacity` bytes at the top of the arena as a new region.
    ///
    /// The reservation bypasses the open-region guard that blocks direct
    /// allocation, so regions can nest. When `zero` is set the reserved
    /// span is zero-filled.
    pub fn open_region(&mut self, capacity: usize, zero: bool) -> Result<ScopedRegion, ArenaError> {
        if capacity == 0 {
            return Err(ArenaError::ZeroSizeRequest);
        }
        if self.regions.len() >= self.max_open_regions {
            return Err(ArenaError::RegionDepthExceeded {
                max: self.max_open_regions,
            });
        }
        let base = self.bump(capacity, 1)?;
        if zero {
            self.block[base..base + capacity].fill(0);
        }

        let id = RegionId(self.next_region);
        self.next_region += 1;
        self.regions.push(OpenRegion { id, base, capacity });

        tracing::trace!(arena = %self.id, region = %id, capacity, depth = self.regions.len(), "opened scoped region");

        Ok(ScopedRegion {
            arena: self.id,
            id,
            base,
            capacity,
            used: 0,
            closed: false,
        })
    }

    /// Bump-allocate `size` bytes inside `region`.
    ///
    /// `region` must be open, belong to this arena, and be the innermost
    /// open region.
    pub fn region_alloc(&mut self, region: &mut ScopedRegion, size: usize) -> Result<ByteSpan, ArenaError> {
        self.region_alloc_aligned(region, size, 1)
    }

    /// Allocate room for `count` values of `T` inside `region`, aligned for `T`.
    pub fn region_push_array<T: Pod>(
        &mut self,
        region: &mut ScopedRegion,
        count: usize,
    ) -> Result<TypedSpan<T>, ArenaError> {
        let size = array_bytes::<T>(count)?;
        let bytes = self.region_alloc_aligned(region, size, align_of::<T>())?;
        Ok(TypedSpan::new(bytes, count))
    }

    /// Allocate room for a single `T` inside `region`.
    pub fn region_push_struct<T: Pod>(&mut self, region: &mut ScopedRegion) -> Result<TypedSpan<T>, ArenaError> {
        self.region_push_array::<T>(region, 1)
    }

    fn region_alloc_aligned(
        &mut self,
        region: &mut ScopedRegion,
        size: usize,
        align: usize,
    ) -> Result<ByteSpan, ArenaError> {
        self.check_owned_and_open(region)?;
        if size == 0 {
            return Err(ArenaError::ZeroSizeRequest);
        }
        match self.innermost_region() {
            Some(innermost) if innermost == region.id => {}
            Some(innermost) if self.regions.iter().any(|open| open.id == region.id) => {
                return Err(ArenaError::NotInnermost {
                    region: region.id,
                    innermost,
                });
            }
            // Not on the stack: abandoned by `unwind_to`.
            _ => return Err(ArenaError::RegionClosed { region: region.id }),
        }

        let start = region.base + region.used;
        let addr = (self.block.as_ptr() as usize).wrapping_add(start);
        let padding = raw::padding_for(addr, align);
        let remaining = region.remaining();
        let requested = size.saturating_add(padding);
        if requested > remaining {
            return Err(ArenaError::RegionExhausted {
                region: region.id,
                requested,
                remaining,
            });
        }
        region.used += requested;
        Ok(ByteSpan::new(self.id, Some(region.id), start + padding, size))
    }

    /// Close `region`, returning its whole reservation to the arena.
    ///
    /// `region` must be the most recently opened region that is still
    /// open. Closing twice, or out of order, is rejected and leaves the
    /// arena unchanged.
    pub fn close_region(&mut self, region: &mut ScopedRegion) -> Result<(), ArenaError> {
        self.check_owned_and_open(region)?;
        let innermost = match self.regions.last() {
            Some(top) => *top,
            None => return Err(ArenaError::RegionClosed { region: region.id }),
        };
        if innermost.id != region.id {
            if !self.regions.iter().any(|open| open.id == region.id) {
                return Err(ArenaError::RegionClosed { region: region.id });
            }
            return Err(ArenaError::OutOfOrderClose {
                region: region.id,
                innermost: innermost.id,
            });
        }

        self.regions.pop();
        self.used -= innermost.capacity;
        debug_assert_eq!(self.used, innermost.base);
        region.closed = true;

        tracing::trace!(arena = %self.id, region = %region.id, used = region.used, capacity = region.capacity, "closed scoped region");
        Ok(())
    }

    /// Open a region, run `f` with it, then close it.
    ///
    /// `f` must leave the region open and must close any regions it opens
    /// inside; otherwise the final close fails and its error is returned.
    /// Regions left open inside are unwound with it, so the arena is
    /// usable again either way.
    pub fn with_region<R>(
        &mut self,
        capacity: usize,
        zero: bool,
        f: impl FnOnce(&mut Self, &mut ScopedRegion) -> R,
    ) -> Result<R, ArenaError> {
        let mut region = self.open_region(capacity, zero)?;
        let result = f(self, &mut region);
        match self.close_region(&mut region) {
            Ok(()) => Ok(result),
            Err(err @ ArenaError::OutOfOrderClose { .. }) => {
                self.unwind_to(&mut region)?;
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Close `region` together with every region still open inside it.
    ///
    /// Recovery path for a caller that lost track of nested regions: the
    /// arena's `used` returns to `region`'s base and the nested handles
    /// become unusable. Returns how many nested regions were abandoned.
    pub fn unwind_to(&mut self, region: &mut ScopedRegion) -> Result<usize, ArenaError> {
        self.check_owned_and_open(region)?;
        let depth = self
            .regions
            .iter()
            .position(|open| open.id == region.id)
            .ok_or(ArenaError::RegionClosed { region: region.id })?;

        let abandoned = self.regions.len() - depth - 1;
        self.used = self.regions[depth].base;
        self.regions.truncate(depth);
        region.closed = true;

        tracing::trace!(arena = %self.id, region = %region.id, abandoned, "unwound scoped region");
        Ok(abandoned)
    }

    /// Drop every open region above `depth`, returning the arena to the
    /// state it had when [`open_region_count`](Self::open_region_count)
    /// was `depth`.
    ///
    /// Works without the region handles, so it also recovers regions
    /// whose handles were lost or forgotten. Handles of dropped regions
    /// are rejected with [`ArenaError::RegionClosed`] afterwards.
    /// Returns how many regions were dropped; a `depth` at or above the
    /// current count is a no-op.
    pub fn unwind_regions_to(&mut self, depth: usize) -> usize {
        if depth >= self.regions.len() {
            return 0;
        }
        let dropped = self.regions.len() - depth;
        self.used = self.regions[depth].base;
        self.regions.truncate(depth);

        tracing::trace!(arena = %self.id, depth, dropped, "unwound scoped regions to depth");
        dropped
    }

    fn check_owned_and_open(&self, region: &ScopedRegion) -> Result<(), ArenaError> {
        if region.arena != self.id {
            return Err(ArenaError::ForeignRegion {
                region: region.id,
                expected: self.id,
                found: region.arena,
            });
        }
        if region.closed {
            return Err(ArenaError::RegionClosed { region: region.id });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::ErrorKind;

    #[test]
    fn open_reserves_and_close_restores() {
        let mut block = vec![0u8; 1024];
        let mut arena = Arena::new(&mut block);
        arena.alloc(24).unwrap();

        let mut region = arena.open_region(256, true).unwrap();
        assert_eq!(arena.used(), 24 + 256);
        assert_eq!(arena.open_region_count(), 1);
        assert_eq!(region.base(), 24);

        arena.region_alloc(&mut region, 10).unwrap();
        assert_eq!(region.used(), 10);
        // Region allocations do not move the arena cursor.
        assert_eq!(arena.used(), 24 + 256);

        arena.close_region(&mut region).unwrap();
        assert_eq!(arena.used(), 24);
        assert_eq!(arena.open_region_count(), 0);
        assert!(region.is_closed());
    }

    #[test]
    fn direct_alloc_rejected_while_region_open() {
        let mut block = vec![0u8; 128];
        let mut arena = Arena::new(&mut block);
        let mut region = arena.open_region(32, false).unwrap();

        let err = arena.alloc(4).unwrap_err();
        assert_eq!(err, ArenaError::RegionOpen { open_regions: 1 });
        assert_eq!(err.kind(), ErrorKind::Discipline);

        arena.close_region(&mut region).unwrap();
        assert!(arena.alloc(4).is_ok());
    }

    #[test]
    fn region_exhaustion_is_capacity_error() {
        let mut block = vec![0u8; 128];
        let mut arena = Arena::new(&mut block);
        let mut region = arena.open_region(16, false).unwrap();
        arena.region_alloc(&mut region, 16).unwrap();

        let err = arena.region_alloc(&mut region, 1).unwrap_err();
        assert_eq!(
            err,
            ArenaError::RegionExhausted {
                region: region.id(),
                requested: 1,
                remaining: 0
            }
        );
        assert_eq!(err.kind(), ErrorKind::Capacity);
        arena.close_region(&mut region).unwrap();
    }

    #[test]
    fn opening_larger_than_arena_fails() {
        let mut block = vec![0u8; 64];
        let mut arena = Arena::new(&mut block);
        let err = arena.open_region(65, true).unwrap_err();
        assert!(matches!(err, ArenaError::ArenaExhausted { .. }));
        assert_eq!(arena.open_region_count(), 0);
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn zero_capacity_region_is_rejected() {
        let mut block = vec![0u8; 64];
        let mut arena = Arena::new(&mut block);
        assert_eq!(
            arena.open_region(0, true).unwrap_err(),
            ArenaError::ZeroSizeRequest
        );
    }

    #[test]
    fn zero_size_region_alloc_is_rejected() {
        let mut block = vec![0u8; 64];
        let mut arena = Arena::new(&mut block);
        let mut region = arena.open_region(8, true).unwrap();
        assert_eq!(
            arena.region_alloc(&mut region, 0).unwrap_err(),
            ArenaError::ZeroSizeRequest
        );
        arena.close_region(&mut region).unwrap();
    }

    #[test]
    fn out_of_order_close_is_rejected() {
        let mut block = vec![0u8; 256];
        let mut arena = Arena::new(&mut block);
        let mut r1 = arena.open_region(64, false).unwrap();
        let mut r2 = arena.open_region(32, false).unwrap();

        let err = arena.close_region(&mut r1).unwrap_err();
        assert_eq!(
            err,
            ArenaError::OutOfOrderClose {
                region: r1.id(),
                innermost: r2.id()
            }
        );
        // Rejected close leaves everything as it was.
        assert_eq!(arena.used(), 96);
        assert!(!r1.is_closed());

        arena.close_region(&mut r2).unwrap();
        assert_eq!(arena.used(), 64);
        arena.close_region(&mut r1).unwrap();
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn double_close_is_rejected() {
        let mut block = vec![0u8; 64];
        let mut arena = Arena::new(&mut block);
        let mut region = arena.open_region(16, false).unwrap();
        arena.close_region(&mut region).unwrap();

        let err = arena.close_region(&mut region).unwrap_err();
        assert_eq!(err, ArenaError::RegionClosed { region: region.id() });
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn alloc_after_close_is_rejected() {
        let mut block = vec![0u8; 64];
        let mut arena = Arena::new(&mut block);
        let mut region = arena.open_region(16, false).unwrap();
        arena.close_region(&mut region).unwrap();
        assert_eq!(
            arena.region_alloc(&mut region, 1).unwrap_err(),
            ArenaError::RegionClosed { region: region.id() }
        );
    }

    #[test]
    fn outer_region_cannot_allocate_while_inner_open() {
        let mut block = vec![0u8; 256];
        let mut arena = Arena::new(&mut block);
        let mut outer = arena.open_region(64, false).unwrap();
        let mut inner = arena.open_region(64, false).unwrap();

        let err = arena.region_alloc(&mut outer, 8).unwrap_err();
        assert_eq!(
            err,
            ArenaError::NotInnermost {
                region: outer.id(),
                innermost: inner.id()
            }
        );
        assert!(arena.region_alloc(&mut inner, 8).is_ok());

        arena.close_region(&mut inner).unwrap();
        assert!(arena.region_alloc(&mut outer, 8).is_ok());
        arena.close_region(&mut outer).unwrap();
    }

    #[test]
    fn foreign_region_is_rejected() {
        let mut block_a = vec![0u8; 64];
        let mut block_b = vec![0u8; 64];
        let mut a = Arena::new(&mut block_a);
        let mut b = Arena::new(&mut block_b);
        let mut region = a.open_region(16, false).unwrap();

        let err = b.close_region(&mut region).unwrap_err();
        assert!(matches!(err, ArenaError::ForeignRegion { .. }));
        a.close_region(&mut region).unwrap();
    }

    #[test]
    fn span_from_closed_region_is_stale() {
        let mut block = vec![0u8; 64];
        let mut arena = Arena::new(&mut block);
        let mut region = arena.open_region(16, false).unwrap();
        let span = arena.region_alloc(&mut region, 8).unwrap();
        assert!(arena.bytes(&span).is_ok());

        arena.close_region(&mut region).unwrap();
        assert_eq!(
            arena.bytes(&span).unwrap_err(),
            ArenaError::StaleSpan {
                region: Some(region.id())
            }
        );
    }

    #[test]
    fn open_with_zero_clears_previous_contents() {
        let mut block = vec![0u8; 64];
        let mut arena = Arena::new(&mut block);

        let mut first = arena.open_region(32, false).unwrap();
        let span = arena.region_alloc(&mut first, 32).unwrap();
        arena.bytes_mut(&span).unwrap().fill(0xFF);
        arena.close_region(&mut first).unwrap();

        let mut second = arena.open_region(32, true).unwrap();
        let span = arena.region_alloc(&mut second, 32).unwrap();
        assert!(arena.bytes(&span).unwrap().iter().all(|&b| b == 0));
        arena.close_region(&mut second).unwrap();
    }

    #[test]
    fn typed_region_alloc_is_aligned_and_counted() {
        let mut block = vec![0u8; 256];
        let mut arena = Arena::new(&mut block);
        let mut region = arena.open_region(128, true).unwrap();
        arena.region_alloc(&mut region, 1).unwrap();

        let verts = arena.region_push_array::<[f32; 4]>(&mut region, 2).unwrap();
        let slice = arena.slice_mut(&verts).unwrap();
        assert_eq!(slice.len(), 2);
        assert_eq!(slice.as_ptr() as usize % align_of::<f32>(), 0);
        slice[1] = [1.0, 0.0, 0.0, 1.0];
        assert!(region.used() >= 1 + 32);

        let one = arena.region_push_struct::<u16>(&mut region).unwrap();
        assert_eq!(one.len(), 1);
        arena.close_region(&mut region).unwrap();
    }

    #[test]
    fn region_ids_are_never_reused() {
        let mut block = vec![0u8; 64];
        let mut arena = Arena::new(&mut block);
        let mut a = arena.open_region(8, false).unwrap();
        arena.close_region(&mut a).unwrap();
        let mut b = arena.open_region(8, false).unwrap();
        assert_ne!(a.id(), b.id());
        arena.close_region(&mut b).unwrap();
    }

    #[test]
    fn depth_limit_is_enforced() {
        let mut block = vec![0u8; 64];
        let config = crate::ArenaConfig {
            max_open_regions: 2,
            ..Default::default()
        };
        let mut arena = Arena::with_config(&mut block, &config);
        let mut r1 = arena.open_region(8, false).unwrap();
        let mut r2 = arena.open_region(8, false).unwrap();
        assert_eq!(
            arena.open_region(8, false).unwrap_err(),
            ArenaError::RegionDepthExceeded { max: 2 }
        );
        arena.close_region(&mut r2).unwrap();
        arena.close_region(&mut r1).unwrap();
    }

    #[test]
    fn with_region_closes_on_return() {
        let mut block = vec![0u8; 128];
        let mut arena = Arena::new(&mut block);
        let sum = arena
            .with_region(64, true, |arena, region| {
                let nums = arena.region_push_array::<u32>(region, 4).unwrap();
                arena.slice_mut(&nums).unwrap().copy_from_slice(&[1, 2, 3, 4]);
                arena.slice(&nums).unwrap().iter().sum::<u32>()
            })
            .unwrap();
        assert_eq!(sum, 10);
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.open_region_count(), 0);
    }

    #[test]
    fn with_region_reports_leaked_inner_region() {
        let mut block = vec![0u8; 128];
        let mut arena = Arena::new(&mut block);
        let err = arena
            .with_region(32, false, |arena, _region| {
                // Inner region is never closed.
                std::mem::forget(arena.open_region(8, false).unwrap());
            })
            .unwrap_err();
        assert!(matches!(err, ArenaError::OutOfOrderClose { .. }));
        assert_eq!(arena.open_region_count(), 0);
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn unwind_to_abandons_nested_regions() {
        let mut block = vec![0u8; 256];
        let mut arena = Arena::new(&mut block);
        arena.alloc(16).unwrap();

        let mut outer = arena.open_region(64, false).unwrap();
        let mut middle = arena.open_region(32, false).unwrap();
        let mut inner = arena.open_region(16, false).unwrap();
        let inner_span = arena.region_alloc(&mut inner, 4).unwrap();

        assert_eq!(arena.unwind_to(&mut outer).unwrap(), 2);
        assert!(outer.is_closed());
        assert_eq!(arena.used(), 16);
        assert_eq!(arena.open_region_count(), 0);

        // Abandoned handles and their spans are dead.
        assert!(matches!(
            arena.bytes(&inner_span),
            Err(ArenaError::StaleSpan { .. })
        ));
        assert!(arena.close_region(&mut middle).is_err());
        assert!(arena.region_alloc(&mut inner, 1).is_err());

        // Direct allocation works again.
        assert!(arena.alloc(8).is_ok());
    }

    #[test]
    fn unwind_to_innermost_is_a_plain_close() {
        let mut block = vec![0u8; 128];
        let mut arena = Arena::new(&mut block);
        let mut outer = arena.open_region(32, false).unwrap();
        let mut inner = arena.open_region(32, false).unwrap();
        assert_eq!(arena.unwind_to(&mut inner).unwrap(), 0);
        assert_eq!(arena.used(), 32);
        arena.close_region(&mut outer).unwrap();
        assert_eq!(arena.used(), 0);
        assert_eq!(
            arena.unwind_to(&mut outer),
            Err(ArenaError::RegionClosed { region: outer.id() })
        );
    }

    #[test]
    fn region_ids_increase_and_stale_spans_stay_dead() {
        let mut block = vec![0u8; 64];
        let mut arena = Arena::new(&mut block);
        let mut last = None;
        for _ in 0..100 {
            let mut region = arena.open_region(8, false).unwrap();
            let stale = arena.region_alloc(&mut region, 4).unwrap();
            assert!(last.map_or(true, |prev| region.id() > prev));
            last = Some(region.id());
            arena.close_region(&mut region).unwrap();
            assert!(arena.bytes(&stale).is_err());
        }
    }

    #[test]
    fn unwind_regions_to_recovers_without_handles() {
        let mut block = vec![0u8; 256];
        let mut arena = Arena::new(&mut block);
        arena.alloc(16).unwrap();
        let mut frame = arena.open_region(64, false).unwrap();
        arena.close_region(&mut frame).unwrap();
        let mut stray = arena.open_region(64, false).unwrap();
        let _nested = arena.open_region(32, false).unwrap();
        assert_eq!(arena.used(), 112);

        assert_eq!(arena.unwind_regions_to(0), 2);
        assert_eq!(arena.open_region_count(), 0);
        assert_eq!(arena.used(), 16);
        assert_eq!(
            arena.region_alloc(&mut stray, 8),
            Err(ArenaError::RegionClosed { region: stray.id() })
        );
        assert_eq!(arena.unwind_regions_to(0), 0);
        arena.alloc(8).unwrap();
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn close_restores_used_exactly(
                prefix in 0usize..64,
                capacity in 1usize..256,
                allocs in proptest::collection::vec(1usize..64, 0..10),
            ) {
                let mut block = vec![0u8; 512];
                let mut arena = Arena::new(&mut block);
                if prefix > 0 {
                    arena.alloc(prefix).unwrap();
                }
                let before = arena.used();

                let mut region = arena.open_region(capacity, false).unwrap();
                let mut inside = 0usize;
                for &size in &allocs {
                    if arena.region_alloc(&mut region, size).is_ok() {
                        inside += size;
                    }
                }
                prop_assert_eq!(region.used(), inside);
                prop_assert!(region.used() <= region.capacity());

                arena.close_region(&mut region).unwrap();
                prop_assert_eq!(arena.used(), before);
            }

            #[test]
            fn nested_regions_unwind_step_by_step(
                capacities in proptest::collection::vec(1usize..64, 1..8),
            ) {
                let mut block = vec![0u8; 1024];
                let mut arena = Arena::new(&mut block);
                let mut stack = Vec::new();
                let mut used_before = Vec::new();
                for &cap in &capacities {
                    used_before.push(arena.used());
                    stack.push(arena.open_region(cap, false).unwrap());
                }
                while let Some(mut region) = stack.pop() {
                    arena.close_region(&mut region).unwrap();
                    prop_assert_eq!(Some(arena.used()), used_before.pop());
                }
                prop_assert_eq!(arena.used(), 0);
            }
        }
    }
}
