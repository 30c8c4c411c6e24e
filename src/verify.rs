//! Turning raw host call results into typed errors.
//!
//! Host calls report failure in one of a handful of ways: a `FALSE` return, a
//! null pointer, a non-null pointer, the invalid-handle constant, or a status
//! code that is itself the error. Each convention has one checking function
//! here. The conventions that need a code from the side channel read the
//! host's last-error slot immediately, so call them directly after the host
//! call with nothing in between that could overwrite it.

use crate::error::{HeapcallError, Result};
use crate::types::{MovableHandle, RawHandle, RawPointer, INVALID_HANDLE_VALUE};
use std::fmt;
use std::io;

/// A native result or status code from the host.
///
/// Stored as the signed 32-bit pattern; unsigned host codes (Windows `DWORD`,
/// `HRESULT` read as unsigned) are reinterpreted bit for bit, never clamped.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ErrorCode(i32);

impl ErrorCode {
    pub const fn from_i32(code: i32) -> Self {
        ErrorCode(code)
    }

    pub const fn from_u32(code: u32) -> Self {
        ErrorCode(code as i32)
    }

    pub const fn as_i32(self) -> i32 {
        self.0
    }

    pub const fn as_u32(self) -> u32 {
        self.0 as u32
    }

    /// Reads the host's last-error slot (`errno` or `GetLastError`).
    pub fn last() -> Self {
        ErrorCode(io::Error::last_os_error().raw_os_error().unwrap_or(0))
    }

    /// The host's own description of this code.
    pub fn message(self) -> String {
        io::Error::from_raw_os_error(self.0).to_string()
    }
}

impl fmt::Debug for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ErrorCode({})", self.0)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.0)
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        ErrorCode::from_i32(code)
    }
}

impl From<u32> for ErrorCode {
    fn from(code: u32) -> Self {
        ErrorCode::from_u32(code)
    }
}

/// The ways a host call can report failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convention {
    /// Fails when the value is false.
    BooleanTrueRequired,
    /// Fails when the value is zero.
    PointerNonZeroRequired,
    /// Fails when the value is not zero.
    PointerZeroRequired,
    /// Fails when the value is the invalid-handle constant.
    HandleValidRequired,
    /// Fails when the value is not zero; the value is the error code.
    CodeIsError,
}

/// Values that can be checked as a pointer-shaped host result.
pub trait HostValue: Copy {
    fn raw_value(self) -> usize;
}

impl HostValue for RawPointer {
    fn raw_value(self) -> usize {
        self.addr()
    }
}

impl HostValue for MovableHandle {
    fn raw_value(self) -> usize {
        self.into_raw()
    }
}

impl HostValue for usize {
    fn raw_value(self) -> usize {
        self
    }
}

impl HostValue for isize {
    fn raw_value(self) -> usize {
        self as usize
    }
}

impl Convention {
    /// Whether `value` signals failure under this convention.
    pub fn is_failure(self, value: isize) -> bool {
        match self {
            Convention::BooleanTrueRequired | Convention::PointerNonZeroRequired => value == 0,
            Convention::PointerZeroRequired | Convention::CodeIsError => value != 0,
            Convention::HandleValidRequired => value == INVALID_HANDLE_VALUE.0,
        }
    }

    /// Checks a raw result, reading the last-error slot where the convention
    /// needs it.
    pub fn check(self, value: isize) -> Result<()> {
        if !self.is_failure(value) {
            return Ok(());
        }
        let code = match self {
            // Host status codes are 32-bit; the truncation keeps the pattern.
            Convention::CodeIsError => ErrorCode::from_i32(value as i32),
            _ => ErrorCode::last(),
        };
        Err(HeapcallError::PlatformFailure(code))
    }
}

/// boolean-true-required: the call must return true.
pub fn check_bool(value: bool) -> Result<()> {
    Convention::BooleanTrueRequired.check(isize::from(value))
}

/// pointer-nonzero-required: the call must return a non-null value, which is
/// passed through on success.
pub fn check_non_null<T: HostValue>(value: T) -> Result<T> {
    Convention::PointerNonZeroRequired.check(value.raw_value() as isize)?;
    Ok(value)
}

/// pointer-zero-required: the call must return null, as a successful `free`
/// does.
pub fn check_null<T: HostValue>(value: T) -> Result<()> {
    Convention::PointerZeroRequired.check(value.raw_value() as isize)
}

/// handle-valid-required: the call must not return the invalid-handle
/// constant.
pub fn check_handle(handle: RawHandle) -> Result<RawHandle> {
    Convention::HandleValidRequired.check(handle.0)?;
    Ok(handle)
}

/// code-is-error-itself: a non-zero status is the error code.
pub fn check_code(code: impl Into<ErrorCode>) -> Result<()> {
    let code: ErrorCode = code.into();
    if code.0 == 0 {
        return Ok(());
    }
    Err(HeapcallError::PlatformFailure(code))
}
