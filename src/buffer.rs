use crate::error::{HeapcallError, Result};
use crate::types::RawPointer;

/// A read-only window onto raw memory whose length is known.
///
/// The view covers `max_length` bytes from its base. Decoding starts
/// `start_offset` bytes in and never reads past `max_length`.
#[derive(Debug, Clone, Copy)]
pub struct BufferView<'a> {
    bytes: &'a [u8],
    start_offset: usize,
}

impl<'a> BufferView<'a> {
    /// A view over a borrowed slice; `max_length` is the slice length.
    pub fn new(bytes: &'a [u8]) -> Self {
        BufferView {
            bytes,
            start_offset: 0,
        }
    }

    /// A view over `max_length` bytes starting at `base`.
    ///
    /// A null `base` yields an empty view, which every decoder rejects with
    /// `OutOfRange`.
    ///
    /// # Safety
    ///
    /// When `base` is non-null, `[base, base + max_length)` must be readable
    /// and must not be written to or freed for as long as the view (with the
    /// caller-chosen lifetime `'a`) is alive.
    pub unsafe fn from_raw(base: RawPointer, max_length: usize) -> Self {
        let bytes: &'a [u8] = if base.is_null() || max_length == 0 {
            &[]
        } else {
            std::slice::from_raw_parts(base.as_ptr().cast_const(), max_length)
        };
        BufferView::new(bytes)
    }

    /// Sets the byte offset at which decoding begins. Bounds are checked when
    /// the view is decoded, not here.
    pub fn with_start_offset(self, start_offset: usize) -> Self {
        BufferView {
            start_offset,
            ..self
        }
    }

    pub fn max_length(&self) -> usize {
        self.bytes.len()
    }

    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    /// Checks the bounds invariant for a code unit of `unit_size` bytes and
    /// returns the region from `start_offset` to the end of the view.
    ///
    /// Requires `max_length >= unit_size` and
    /// `start_offset <= max_length - unit_size`.
    pub(crate) fn region(&self, unit_size: usize) -> Result<&'a [u8]> {
        let bytes = self.bytes;
        let max_length = bytes.len();
        if max_length < unit_size {
            return Err(HeapcallError::OutOfRange {
                what: "max_length",
                value: max_length,
                limit: unit_size,
            });
        }

        let last_unit_start = max_length - unit_size;
        if self.start_offset > last_unit_start {
            return Err(HeapcallError::OutOfRange {
                what: "start_offset",
                value: self.start_offset,
                limit: last_unit_start,
            });
        }

        Ok(&bytes[self.start_offset..])
    }
}

impl<'a> From<&'a [u8]> for BufferView<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        BufferView::new(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_respects_unit_size() {
        let bytes = [1_u8, 2, 3, 4];
        let view = BufferView::new(&bytes);

        assert_eq!(view.region(1).ok(), Some(&bytes[..]));
        assert_eq!(view.with_start_offset(2).region(2).ok(), Some(&bytes[2..]));
        assert_eq!(view.with_start_offset(3).region(1).ok(), Some(&bytes[3..]));
    }

    #[test]
    fn test_region_rejects_short_buffers() {
        let byte = [0_u8; 1];
        assert_eq!(
            BufferView::new(&byte).region(2),
            Err(HeapcallError::OutOfRange {
                what: "max_length",
                value: 1,
                limit: 2,
            })
        );
        assert!(BufferView::new(&[]).region(1).is_err());
    }

    #[test]
    fn test_region_rejects_offset_past_last_unit() {
        let bytes = [0_u8; 6];
        let view = BufferView::new(&bytes).with_start_offset(5);

        assert_eq!(
            view.region(2),
            Err(HeapcallError::OutOfRange {
                what: "start_offset",
                value: 5,
                limit: 4,
            })
        );
        assert!(view.region(1).is_ok());
    }

    #[test]
    fn test_null_raw_view_is_empty() {
        let view = unsafe { BufferView::from_raw(RawPointer::null(), 64) };
        assert_eq!(view.max_length(), 0);
        assert!(view.region(1).is_err());
    }
}
