//! Caller-supplied text encodings for narrow (one byte per code unit) strings.

use crate::error::{HeapcallError, Result};

/// A narrow text encoding the decoder can apply to the bytes before a
/// terminator, and the marshaller can apply in reverse.
///
/// Implement this for a code page the built-ins do not cover. Neither
/// direction may produce or accept an embedded zero byte as text: zero is the
/// terminator.
pub trait TextEncoding {
    /// Short name used in error messages.
    fn name(&self) -> &'static str;

    /// Decodes `bytes`, which contain no zero byte.
    fn decode(&self, bytes: &[u8]) -> Result<String>;

    /// Encodes `text` without a terminator.
    fn encode(&self, text: &str) -> Result<Vec<u8>>;
}

/// UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8;

/// 7-bit US-ASCII. Bytes above 0x7F are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ascii;

/// ISO-8859-1: every byte maps to the code point of the same value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latin1;

fn invalid(encoding: &'static str, position: usize) -> HeapcallError {
    HeapcallError::InvalidEncoding { encoding, position }
}

impl TextEncoding for Utf8 {
    fn name(&self) -> &'static str {
        "UTF-8"
    }

    fn decode(&self, bytes: &[u8]) -> Result<String> {
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| invalid(self.name(), e.valid_up_to()))
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>> {
        Ok(text.as_bytes().to_vec())
    }
}

impl TextEncoding for Ascii {
    fn name(&self) -> &'static str {
        "ASCII"
    }

    fn decode(&self, bytes: &[u8]) -> Result<String> {
        match bytes.iter().position(|b| !b.is_ascii()) {
            Some(position) => Err(invalid(self.name(), position)),
            None => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>> {
        match text.char_indices().find(|(_, c)| !c.is_ascii()) {
            Some((position, _)) => Err(invalid(self.name(), position)),
            None => Ok(text.as_bytes().to_vec()),
        }
    }
}

impl TextEncoding for Latin1 {
    fn name(&self) -> &'static str {
        "ISO-8859-1"
    }

    fn decode(&self, bytes: &[u8]) -> Result<String> {
        Ok(bytes.iter().map(|&b| char::from(b)).collect())
    }

    fn encode(&self, text: &str) -> Result<Vec<u8>> {
        text.char_indices()
            .map(|(position, c)| u8::try_from(c).map_err(|_| invalid(self.name(), position)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_reports_first_bad_byte() {
        assert_eq!(Utf8.decode("héllo".as_bytes()).ok().as_deref(), Some("héllo"));
        assert_eq!(
            Utf8.decode(&[b'o', b'k', 0xC3]),
            Err(HeapcallError::InvalidEncoding {
                encoding: "UTF-8",
                position: 2,
            })
        );
    }

    #[test]
    fn test_ascii_rejects_high_bytes() {
        assert_eq!(Ascii.decode(b"plain").ok().as_deref(), Some("plain"));
        assert!(Ascii.decode(&[b'a', 0xE9]).is_err());
        assert!(Ascii.encode("café").is_err());
    }

    #[test]
    fn test_latin1_maps_every_byte() {
        assert_eq!(Latin1.decode(&[b'c', b'a', b'f', 0xE9]).ok().as_deref(), Some("café"));
        assert_eq!(Latin1.encode("café").ok(), Some(vec![b'c', b'a', b'f', 0xE9]));
        assert_eq!(
            Latin1.encode("a€"),
            Err(HeapcallError::InvalidEncoding {
                encoding: "ISO-8859-1",
                position: 1,
            })
        );
    }
}
