use crate::types::{MovableHandle, RawPointer};
use winapi::shared::minwindef::HLOCAL;
use winapi::um::minwinbase::{LMEM_FIXED, LMEM_MOVEABLE, LMEM_ZEROINIT};
use winapi::um::winbase::{LocalAlloc, LocalFree, LocalLock, LocalUnlock};

#[inline]
fn as_hlocal(handle: MovableHandle) -> HLOCAL {
    handle.into_raw() as HLOCAL
}

pub fn alloc_fixed(size: usize) -> RawPointer {
    let block = unsafe { LocalAlloc(LMEM_FIXED | LMEM_ZEROINIT, size) };
    RawPointer::from_ptr(block.cast())
}

pub fn alloc_movable(size: usize) -> MovableHandle {
    let handle = unsafe { LocalAlloc(LMEM_MOVEABLE | LMEM_ZEROINIT, size) };
    unsafe { MovableHandle::from_raw(handle as usize) }
}

/// `LocalFree` returns null on success and the handle back on failure.
pub unsafe fn free_fixed(ptr: RawPointer) -> RawPointer {
    let result = LocalFree(ptr.as_ptr().cast());
    RawPointer::from_ptr(result.cast())
}

pub unsafe fn free_movable(handle: MovableHandle) -> RawPointer {
    let result = LocalFree(as_hlocal(handle));
    RawPointer::from_ptr(result.cast())
}

pub unsafe fn lock_movable(handle: MovableHandle) -> RawPointer {
    RawPointer::from_ptr(LocalLock(as_hlocal(handle)).cast())
}

pub unsafe fn unlock_movable(handle: MovableHandle) -> bool {
    LocalUnlock(as_hlocal(handle)) != 0
}
