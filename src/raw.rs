//! Unchecked pointer arithmetic.
//!
//! Nothing here knows how large the memory behind a pointer is. Every
//! operation wraps at the pointer width the way the host's own address
//! arithmetic does, and none of them make the result safe to dereference.
//! Code that only needs to read text out of a buffer should go through
//! `BufferView` and the decoders, which check bounds before touching memory.
//!
//! The canonical entry points take `usize`; the `_i32`, `_u32` and `_isize`
//! variants are widening wrappers for call sites that carry other widths.
//! A negative signed offset moves the pointer the other way.

use crate::types::RawPointer;

/// `base + offset`, wrapping.
#[inline]
pub fn add(base: RawPointer, offset: usize) -> RawPointer {
    RawPointer::from_ptr(base.as_ptr().wrapping_add(offset))
}

/// `base - offset`, wrapping.
#[inline]
pub fn sub(base: RawPointer, offset: usize) -> RawPointer {
    RawPointer::from_ptr(base.as_ptr().wrapping_sub(offset))
}

/// `base + offset` for a signed platform-width offset.
#[inline]
pub fn add_isize(base: RawPointer, offset: isize) -> RawPointer {
    RawPointer::from_ptr(base.as_ptr().wrapping_offset(offset))
}

/// `base - offset` for a signed platform-width offset.
#[inline]
pub fn sub_isize(base: RawPointer, offset: isize) -> RawPointer {
    RawPointer::from_ptr(base.as_ptr().wrapping_offset(offset.wrapping_neg()))
}

/// `base + offset`; the offset is sign-extended.
#[inline]
pub fn add_i32(base: RawPointer, offset: i32) -> RawPointer {
    add_isize(base, offset as isize)
}

/// `base - offset`; the offset is sign-extended.
#[inline]
pub fn sub_i32(base: RawPointer, offset: i32) -> RawPointer {
    sub_isize(base, offset as isize)
}

/// `base + offset`; the offset is zero-extended.
#[inline]
pub fn add_u32(base: RawPointer, offset: u32) -> RawPointer {
    add(base, offset as usize)
}

/// `base - offset`; the offset is zero-extended.
#[inline]
pub fn sub_u32(base: RawPointer, offset: u32) -> RawPointer {
    sub(base, offset as usize)
}
