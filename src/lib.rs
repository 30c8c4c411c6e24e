//! # heapcall
//!
//! A thin layer over the host process heap and the raw memory it hands out.
//!
//! This library provides:
//! - Zero-initialized fixed and movable allocations from the host heap
//! - Unchecked pointer arithmetic, fenced off in the [`raw`] module
//! - Bounds-checked decoding of null-terminated wide and narrow strings
//! - Checking of raw host call results against their failure conventions
//!
//! Allocation mirrors the host: failure is a null sentinel, not an error.
//! Callers who want a typed error pass the result through [`verify`].
//!
//! ```rust
//! use heapcall::{allocate_fixed, free, verify};
//!
//! let block = verify::check_non_null(allocate_fixed(64))?;
//! // ... use the 64 zeroed bytes at `block` ...
//! verify::check_null(unsafe { free(block) })?;
//! # Ok::<(), heapcall::HeapcallError>(())
//! ```
//!
//! ## Threading
//!
//! Nothing in this crate holds shared state. Allocation and free calls from
//! several threads are as safe as the host heap is; both supported hosts
//! serialize their process heap, but that is the host's guarantee, not one
//! this crate adds. Each pointer or handle belongs to its caller until it is
//! passed to exactly one `free`.

mod buffer;
mod encoding;
mod error;
mod string;
mod types;

pub mod raw;
pub mod verify;

#[cfg(unix)]
pub(crate) mod unix;
#[cfg(unix)]
use unix as platform;

#[cfg(windows)]
pub(crate) mod windows;
#[cfg(windows)]
use windows as platform;

use log::trace;

// Error type
pub use error::{HeapcallError, Result};
// Types
pub use types::{
    size_of, size_of_u32, AllocationHandle, FixedLayout, MovableHandle, RawHandle, RawPointer,
    INVALID_HANDLE_VALUE,
};
// Decoding
pub use buffer::BufferView;
pub use encoding::{Ascii, Latin1, TextEncoding, Utf8};
pub use string::{
    alloc_narrow_string, alloc_wide_string, decode_narrow, decode_wide, ptr_to_string_narrow,
    ptr_to_string_wide, DecodedString, NARROW_UNIT, WIDE_UNIT,
};
pub use verify::ErrorCode;

/// Normalizes a signed 32-bit size by reinterpreting its bit pattern as
/// unsigned, the way the host call receives it. `-1` becomes `0xFFFF_FFFF`.
#[inline]
pub const fn size_from_i32(size: i32) -> usize {
    size as u32 as usize
}

/// Widens an unsigned 32-bit size.
#[inline]
pub const fn size_from_u32(size: u32) -> usize {
    size as usize
}

/// Allocates a zeroed block of `size` bytes whose address never changes.
///
/// Returns the null sentinel if the host cannot satisfy the request. A
/// zero-byte request succeeds with a valid, freeable block.
pub fn allocate_fixed(size: usize) -> RawPointer {
    let ptr = platform::alloc_fixed(size);
    trace!("<heapcall> fixed alloc of {} bytes -> {:p}", size, ptr);
    ptr
}

/// `allocate_fixed` for a signed 32-bit size; see [`size_from_i32`].
pub fn allocate_fixed_i32(size: i32) -> RawPointer {
    allocate_fixed(size_from_i32(size))
}

/// `allocate_fixed` for an unsigned 32-bit size.
pub fn allocate_fixed_u32(size: u32) -> RawPointer {
    allocate_fixed(size_from_u32(size))
}

/// Allocates a zeroed movable block of `size` bytes.
///
/// Returns a null handle if the host cannot satisfy the request. A zero-byte
/// request yields a handle to a discarded block: it can be freed, but
/// `lock_movable` returns null for it.
pub fn allocate_movable(size: usize) -> MovableHandle {
    let handle = platform::alloc_movable(size);
    trace!("<heapcall> movable alloc of {} bytes -> {:?}", size, handle);
    handle
}

/// `allocate_movable` for a signed 32-bit size; see [`size_from_i32`].
pub fn allocate_movable_i32(size: i32) -> MovableHandle {
    allocate_movable(size_from_i32(size))
}

/// `allocate_movable` for an unsigned 32-bit size.
pub fn allocate_movable_u32(size: u32) -> MovableHandle {
    allocate_movable(size_from_u32(size))
}

/// Releases a block obtained from `allocate_fixed` or `allocate_movable`.
///
/// Returns the host's marker: null on success. On Windows a failed release
/// returns the allocation back; check with [`verify::check_null`]. Freeing a
/// null pointer or handle is a no-op that reports success.
///
/// # Safety
///
/// - The allocation must come from this crate and must not have been freed.
///   Double frees and foreign pointers are undefined behavior; the host gives
///   no way to detect them.
/// - No pointer into the block (including one returned by `lock_movable`)
///   may be used afterwards.
pub unsafe fn free(allocation: impl Into<AllocationHandle>) -> RawPointer {
    let allocation = allocation.into();
    let result = match allocation {
        AllocationHandle::Fixed(ptr) => platform::free_fixed(ptr),
        AllocationHandle::Movable(handle) => platform::free_movable(handle),
    };
    trace!("<heapcall> free {:?} -> {:p}", allocation, result);
    result
}

/// Pins a movable block and returns its address, or null if the block is
/// discarded (zero-sized) or the host refuses.
///
/// # Safety
///
/// `handle` must be a live handle from `allocate_movable`. The returned
/// pointer is valid until the matching `unlock_movable`.
pub unsafe fn lock_movable(handle: MovableHandle) -> RawPointer {
    platform::lock_movable(handle)
}

/// Undoes one `lock_movable`. Returns `true` while other locks remain, and
/// `false` once the block is fully unlocked or was not locked at all.
///
/// # Safety
///
/// `handle` must be a live handle from `allocate_movable`.
pub unsafe fn unlock_movable(handle: MovableHandle) -> bool {
    platform::unlock_movable(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_normalization() {
        assert_eq!(size_from_i32(16), 16);
        assert_eq!(size_from_i32(-1), 0xFFFF_FFFF);
        assert_eq!(size_from_i32(i32::MIN), 0x8000_0000);
        assert_eq!(size_from_u32(u32::MAX), 0xFFFF_FFFF);
    }

    #[test]
    fn test_narrow_entry_points_allocate() {
        for ptr in [allocate_fixed_i32(24), allocate_fixed_u32(24)] {
            assert!(!ptr.is_null());
            let bytes = unsafe { std::slice::from_raw_parts(ptr.as_ptr(), 24) };
            assert!(bytes.iter().all(|&b| b == 0));
            assert!(unsafe { free(ptr) }.is_null());
        }

        for handle in [allocate_movable_i32(8), allocate_movable_u32(8)] {
            assert!(!handle.is_null());
            assert!(unsafe { free(handle) }.is_null());
        }
    }
}
