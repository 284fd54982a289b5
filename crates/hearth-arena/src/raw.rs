//! Low-level reinterpretation of arena bytes as typed slices.
//!
//! This is the only module in the crate allowed to contain `unsafe`.
//! Every function checks size and alignment before casting and carries a
//! `// SAFETY:` comment.

#![allow(unsafe_code)]

use std::mem::{align_of, size_of};

/// Marker for plain-old-data element types that may live in arena memory.
///
/// # Safety
///
/// Implementors must be `Copy`, contain no padding bytes, no pointers or
/// references, and every bit pattern of `size_of::<Self>()` bytes must be
/// a valid value. Zero-sized types must not implement this trait.
pub unsafe trait Pod: Copy + 'static {}

macro_rules! impl_pod {
    ($($t:ty),* $(,)?) => {
        $(
            // SAFETY: primitive integers and floats have no padding and
            // accept every bit pattern.
            unsafe impl Pod for $t {}
        )*
    };
}

impl_pod!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

// SAFETY: an array of padding-free, any-bit-pattern elements is itself
// padding-free and accepts any bit pattern.
unsafe impl<T: Pod, const N: usize> Pod for [T; N] {}

fn check_layout<T: Pod>(ptr: *const u8, len: usize) {
    assert!(size_of::<T>() != 0, "Pod types must not be zero-sized");
    assert!(
        len % size_of::<T>() == 0,
        "byte length {len} is not a multiple of element size {}",
        size_of::<T>()
    );
    assert!(
        ptr.align_offset(align_of::<T>()) == 0,
        "arena span is not aligned for {}",
        std::any::type_name::<T>()
    );
}

/// View an aligned byte slice as a slice of `T`.
///
/// # Panics
///
/// Panics if `bytes` is misaligned for `T` or its length is not a multiple
/// of `size_of::<T>()`. Typed spans are allocated with the correct
/// alignment, so this only fires on an internal bookkeeping bug.
pub(crate) fn cast_slice<T: Pod>(bytes: &[u8]) -> &[T] {
    check_layout::<T>(bytes.as_ptr(), bytes.len());
    // SAFETY: alignment and length were checked above; `T: Pod` accepts
    // any bit pattern; the returned slice borrows `bytes` so it cannot
    // outlive the memory.
    unsafe { std::slice::from_raw_parts(bytes.as_ptr().cast::<T>(), bytes.len() / size_of::<T>()) }
}

/// Mutable counterpart of [`cast_slice`].
pub(crate) fn cast_slice_mut<T: Pod>(bytes: &mut [u8]) -> &mut [T] {
    check_layout::<T>(bytes.as_ptr(), bytes.len());
    let len = bytes.len() / size_of::<T>();
    // SAFETY: as in `cast_slice`; the exclusive borrow of `bytes` is
    // transferred to the returned slice, so no aliasing is introduced.
    unsafe { std::slice::from_raw_parts_mut(bytes.as_mut_ptr().cast::<T>(), len) }
}

/// Bytes of padding needed to move `addr` up to a multiple of `align`.
pub(crate) fn padding_for(addr: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    addr.wrapping_neg() & (align - 1)
}
