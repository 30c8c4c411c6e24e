//! Reading null-terminated text out of raw buffers, and the inverse.
//!
//! Decoding validates the view's bounds for the code unit size before reading
//! anything, then scans forward for the first zero unit. Three outcomes are
//! kept apart: a terminator at unit zero is an empty string, a terminator
//! further in yields the text before it, and no terminator at all is
//! `MissingTerminator`.

use crate::buffer::BufferView;
use crate::encoding::TextEncoding;
use crate::error::{HeapcallError, Result};
use crate::types::RawPointer;
use crate::verify;
use log::trace;
use std::fmt;
use std::ops::Deref;
use std::ptr;

/// Bytes per wide code unit.
pub const WIDE_UNIT: usize = 2;

/// Bytes per narrow code unit.
pub const NARROW_UNIT: usize = 1;

/// Text copied out of a raw buffer. Holds no reference to the buffer.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct DecodedString(String);

impl DecodedString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for DecodedString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for DecodedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<DecodedString> for String {
    fn from(decoded: DecodedString) -> Self {
        decoded.0
    }
}

impl PartialEq<str> for DecodedString {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for DecodedString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Debug for DecodedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for DecodedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decodes a null-terminated string of native-endian 2-byte code units.
///
/// Fails with `OutOfRange` when the view is shorter than one unit or its
/// start offset is past the last unit start, and with `MissingTerminator`
/// when no zero unit occurs before `max_length`. A trailing odd byte is not
/// a whole unit and is never read. Unpaired surrogates decode as U+FFFD.
pub fn decode_wide(view: &BufferView<'_>) -> Result<DecodedString> {
    let region = view.region(WIDE_UNIT)?;
    let units = region
        .chunks_exact(WIDE_UNIT)
        .map(|unit| u16::from_ne_bytes([unit[0], unit[1]]));

    let end = units
        .clone()
        .position(|unit| unit == 0)
        .ok_or(HeapcallError::MissingTerminator {
            scanned: region.len() / WIDE_UNIT * WIDE_UNIT,
        })?;

    // Two passes over the units so the output string is allocated once, at
    // its final size.
    let chars = || {
        char::decode_utf16(units.clone().take(end))
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
    };
    let mut text = String::with_capacity(chars().map(char::len_utf8).sum());
    text.extend(chars());
    Ok(DecodedString(text))
}

/// Decodes a null-terminated string of single bytes with `encoding`.
///
/// Bounds and terminator failures are as for `decode_wide` with a one-byte
/// unit. Bytes the encoding rejects fail with `InvalidEncoding`.
pub fn decode_narrow<E>(view: &BufferView<'_>, encoding: &E) -> Result<DecodedString>
where
    E: TextEncoding + ?Sized,
{
    let region = view.region(NARROW_UNIT)?;
    let end = region
        .iter()
        .position(|&b| b == 0)
        .ok_or(HeapcallError::MissingTerminator {
            scanned: region.len(),
        })?;

    encoding.decode(&region[..end]).map(DecodedString)
}

/// `decode_wide` over `max_length` bytes at `base`.
///
/// # Safety
///
/// `[base, base + max_length)` must be readable for the duration of the call.
pub unsafe fn ptr_to_string_wide(
    base: RawPointer,
    max_length: usize,
    start_offset: usize,
) -> Result<DecodedString> {
    decode_wide(&BufferView::from_raw(base, max_length).with_start_offset(start_offset))
}

/// `decode_narrow` over `max_length` bytes at `base`.
///
/// # Safety
///
/// `[base, base + max_length)` must be readable for the duration of the call.
pub unsafe fn ptr_to_string_narrow<E>(
    base: RawPointer,
    max_length: usize,
    start_offset: usize,
    encoding: &E,
) -> Result<DecodedString>
where
    E: TextEncoding + ?Sized,
{
    decode_narrow(
        &BufferView::from_raw(base, max_length).with_start_offset(start_offset),
        encoding,
    )
}

/// Copies `bytes` into a fresh zeroed fixed block one `unit` longer, so the
/// block ends in a terminator.
fn alloc_terminated(bytes: &[u8], unit: usize) -> Result<RawPointer> {
    let size = bytes.len() + unit;
    let block = verify::check_non_null(crate::allocate_fixed(size))?;

    // The block is zero-initialized and `size` bytes long, so only the text
    // needs copying.
    unsafe { ptr::copy_nonoverlapping(bytes.as_ptr(), block.as_ptr(), bytes.len()) };
    trace!("<heapcall> marshalled {} bytes to {:p}", size, block);
    Ok(block)
}

/// Allocates a fixed block holding `text` as native-endian UTF-16 followed by
/// a zero unit. Release it with `free`.
///
/// An embedded NUL in `text` is copied as-is and ends the string for any
/// later decode.
pub fn alloc_wide_string(text: &str) -> Result<RawPointer> {
    let bytes: Vec<u8> = text.encode_utf16().flat_map(u16::to_ne_bytes).collect();
    alloc_terminated(&bytes, WIDE_UNIT)
}

/// Allocates a fixed block holding `text` in `encoding` followed by a zero
/// byte. Release it with `free`.
pub fn alloc_narrow_string<E>(text: &str, encoding: &E) -> Result<RawPointer>
where
    E: TextEncoding + ?Sized,
{
    let bytes = encoding.encode(text)?;
    alloc_terminated(&bytes, NARROW_UNIT)
}
