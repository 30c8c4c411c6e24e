use std::ffi::c_void;
use std::fmt;
use std::ptr;

/// An address into the process heap or into a caller-supplied buffer.
///
/// A `RawPointer` neither owns the memory it points at nor knows how long that
/// memory is. Nothing about the type vouches that the address is readable;
/// that is always the caller's responsibility.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct RawPointer(*mut u8);

/// Opaque handle to a movable heap block.
///
/// The host may relocate the block behind a movable handle, so the handle is
/// never an address. The only way to reach the bytes is `lock_movable`, which
/// yields a `RawPointer` valid until the matching `unlock_movable`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct MovableHandle(usize);

/// A live allocation, tagged by the kind of block the host handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocationHandle {
    /// A block whose address never changes.
    Fixed(RawPointer),
    /// A block the host may relocate; only reachable through a lock.
    Movable(MovableHandle),
}

/// A raw OS handle value as returned by host calls that signal failure with
/// the "invalid handle" constant rather than null.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct RawHandle(pub isize);

/// The host's "invalid handle" sentinel (all bits set).
pub const INVALID_HANDLE_VALUE: RawHandle = RawHandle(-1);

impl RawPointer {
    /// The null sentinel returned by a failed allocation.
    pub const fn null() -> Self {
        RawPointer(ptr::null_mut())
    }

    /// Wraps a pointer obtained elsewhere.
    pub const fn from_ptr(ptr: *mut u8) -> Self {
        RawPointer(ptr)
    }

    /// Wraps a host `void*`.
    pub fn from_void(ptr: *mut c_void) -> Self {
        RawPointer(ptr.cast())
    }

    /// Builds a pointer from a bare address.
    ///
    /// # Safety
    ///
    /// `addr` must be a real address, not a value such as
    /// `MovableHandle::into_raw`. A movable handle turned into a pointer this
    /// way points at whatever the host keeps behind the handle, not at the
    /// block.
    ///
    /// ```compile_fail
    /// let handle = heapcall::allocate_movable(16);
    /// let ptr = heapcall::RawPointer::from_addr(handle.into_raw());
    /// ```
    pub unsafe fn from_addr(addr: usize) -> Self {
        RawPointer(addr as *mut u8)
    }

    pub fn is_null(self) -> bool {
        self.0.is_null()
    }

    pub const fn as_ptr(self) -> *mut u8 {
        self.0
    }

    pub fn as_void(self) -> *mut c_void {
        self.0.cast()
    }

    /// The numeric address, for display and comparison.
    pub fn addr(self) -> usize {
        self.0 as usize
    }
}

// A `RawPointer` is only an address; every dereference is already `unsafe`.
unsafe impl Send for RawPointer {}
unsafe impl Sync for RawPointer {}

impl Default for RawPointer {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for RawPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawPointer({:p})", self.0)
    }
}

impl fmt::Pointer for RawPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.0, f)
    }
}

impl From<*mut u8> for RawPointer {
    fn from(ptr: *mut u8) -> Self {
        RawPointer(ptr)
    }
}

impl From<*const u8> for RawPointer {
    fn from(ptr: *const u8) -> Self {
        RawPointer(ptr.cast_mut())
    }
}

impl MovableHandle {
    /// The null sentinel returned by a failed movable allocation.
    pub const fn null() -> Self {
        MovableHandle(0)
    }

    /// Reconstructs a handle from the raw value the host returned.
    ///
    /// # Safety
    ///
    /// `raw` must be a value previously produced by `MovableHandle::into_raw`
    /// (or zero). A forged handle passed to `lock_movable` or `free` is
    /// undefined behavior at the host level.
    pub const unsafe fn from_raw(raw: usize) -> Self {
        MovableHandle(raw)
    }

    pub const fn into_raw(self) -> usize {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for MovableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MovableHandle({:#x})", self.0)
    }
}

impl AllocationHandle {
    /// True when the host signalled failure with its null sentinel.
    pub fn is_null(self) -> bool {
        match self {
            AllocationHandle::Fixed(ptr) => ptr.is_null(),
            AllocationHandle::Movable(handle) => handle.is_null(),
        }
    }

    /// The address of a fixed block; `None` for movable handles.
    pub fn fixed(self) -> Option<RawPointer> {
        match self {
            AllocationHandle::Fixed(ptr) => Some(ptr),
            AllocationHandle::Movable(_) => None,
        }
    }

    /// The numeric value the host sees for this allocation.
    pub fn raw_value(self) -> usize {
        match self {
            AllocationHandle::Fixed(ptr) => ptr.addr(),
            AllocationHandle::Movable(handle) => handle.into_raw(),
        }
    }
}

impl From<RawPointer> for AllocationHandle {
    fn from(ptr: RawPointer) -> Self {
        AllocationHandle::Fixed(ptr)
    }
}

impl From<MovableHandle> for AllocationHandle {
    fn from(handle: MovableHandle) -> Self {
        AllocationHandle::Movable(handle)
    }
}

/// Types with a fixed in-memory layout: no indirection and no variable-length
/// tail, so `size_of` is the exact number of bytes a heap block must hold.
///
/// # Safety
///
/// Implementors must be plain data. A type holding references, `Box`, `Vec`,
/// `String` or other owning pointers must not implement this trait, because a
/// block sized with `size_of` would then hold dangling indirections.
pub unsafe trait FixedLayout: Copy + Sized {}

macro_rules! fixed_layout {
    ($($t:ty),* $(,)?) => {
        $(unsafe impl FixedLayout for $t {})*
    };
}

fixed_layout!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool, char);

unsafe impl<T: FixedLayout, const N: usize> FixedLayout for [T; N] {}

/// Byte size of a fixed-layout type, computed at compile time.
pub const fn size_of<T: FixedLayout>() -> usize {
    std::mem::size_of::<T>()
}

/// `size_of` narrowed to the 32-bit width some host calls take. `None` if
/// the type does not fit.
pub fn size_of_u32<T: FixedLayout>() -> Option<u32> {
    u32::try_from(size_of::<T>()).ok()
}
