use crate::types::{MovableHandle, RawPointer};
use log::debug;
use std::ptr;

// The unix heap has no movable blocks, so a movable handle is the address of
// one of these records. The block itself never moves.
struct MovableRecord {
    block: *mut u8,
    locks: u32,
}

#[inline]
unsafe fn record<'h>(handle: MovableHandle) -> &'h mut MovableRecord {
    &mut *(handle.into_raw() as *mut MovableRecord)
}

/// Allocates a zeroed fixed block with `calloc`.
///
/// A zero-byte request is rounded up to one byte so the result is a real,
/// freeable block rather than whatever the libc does for `calloc(0, 1)`.
pub fn alloc_fixed(size: usize) -> RawPointer {
    let block = unsafe { libc::calloc(size.max(1), 1) };
    RawPointer::from_void(block.cast())
}

/// Allocates a zeroed movable block. A zero-byte request gives a handle to a
/// discarded block: valid to free, but locking it yields null.
pub fn alloc_movable(size: usize) -> MovableHandle {
    let block = if size == 0 {
        ptr::null_mut()
    } else {
        let block = unsafe { libc::calloc(size, 1) };
        if block.is_null() {
            return MovableHandle::null();
        }
        block.cast::<u8>()
    };

    let record = Box::into_raw(Box::new(MovableRecord { block, locks: 0 }));
    debug!("<heapcall> movable record {:p} holds block {:p}", record, block);
    unsafe { MovableHandle::from_raw(record as usize) }
}

/// Releases a fixed block. `free` has no failure report, so the result is
/// always the null success marker.
pub unsafe fn free_fixed(ptr: RawPointer) -> RawPointer {
    libc::free(ptr.as_void().cast());
    RawPointer::null()
}

pub unsafe fn free_movable(handle: MovableHandle) -> RawPointer {
    if handle.is_null() {
        return RawPointer::null();
    }
    let record = Box::from_raw(handle.into_raw() as *mut MovableRecord);
    debug!("<heapcall> releasing movable record {:p}", &*record);
    libc::free(record.block.cast());
    RawPointer::null()
}

pub unsafe fn lock_movable(handle: MovableHandle) -> RawPointer {
    if handle.is_null() {
        return RawPointer::null();
    }
    let record = record(handle);
    if record.block.is_null() {
        return RawPointer::null();
    }
    record.locks = record.locks.saturating_add(1);
    RawPointer::from_ptr(record.block)
}

pub unsafe fn unlock_movable(handle: MovableHandle) -> bool {
    if handle.is_null() {
        return false;
    }
    let record = record(handle);
    if record.locks == 0 {
        return false;
    }
    record.locks -= 1;
    record.locks > 0
}
