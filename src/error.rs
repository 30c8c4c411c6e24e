use crate::verify::ErrorCode;
use thiserror::Error;

/// Errors that can occur while decoding raw buffers or verifying host results.
///
/// Allocation itself never produces one of these: a failed allocation comes
/// back as a null sentinel, and turning that into `PlatformFailure` is an
/// explicit step through the `verify` module.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeapcallError {
    /// A supplied length or offset violates the buffer bounds.
    ///
    /// Raised before any byte is read, so a degenerate view (shorter than one
    /// code unit, or an offset past the last unit start) is never scanned.
    #[error("<heapcall> {what} out of range: {value} (allowed at most {limit})")]
    OutOfRange {
        /// Which argument was rejected (`max_length` or `start_offset`).
        what: &'static str,
        value: usize,
        limit: usize,
    },

    /// The scan reached `max_length` without finding a zero code unit.
    #[error("<heapcall> no terminator found in the supplied buffer ({scanned} bytes scanned)")]
    MissingTerminator { scanned: usize },

    /// The bytes before the terminator are not valid in the caller's
    /// encoding, or a string cannot be represented in it.
    #[error("<heapcall> invalid {encoding} data at byte {position}")]
    InvalidEncoding {
        encoding: &'static str,
        position: usize,
    },

    /// A host call failed under its checked convention. The host code is
    /// kept unchanged.
    #[error("<heapcall> platform call failed [Err: {0}]")]
    PlatformFailure(ErrorCode),
}

impl HeapcallError {
    /// The host error code, if this is a platform failure.
    pub fn platform_code(&self) -> Option<ErrorCode> {
        match self {
            HeapcallError::PlatformFailure(code) => Some(*code),
            _ => None,
        }
    }
}

impl From<ErrorCode> for HeapcallError {
    fn from(code: ErrorCode) -> Self {
        HeapcallError::PlatformFailure(code)
    }
}

/// Result type for heapcall operations.
pub type Result<T> = std::result::Result<T, HeapcallError>;
