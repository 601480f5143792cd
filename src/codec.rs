//! Fixed-width big numbers and their hexadecimal text form.
//!
//! Every number of a curve (parameters, coordinates, scalars) occupies
//! exactly `ceil(nn / 8)` bytes, most-significant byte first.

use core::fmt;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("expected {expected} hex digits, found {found}")]
    Length { expected: usize, found: usize },
    #[error("'{digit}' at offset {offset} is not a hex digit")]
    Digit { digit: char, offset: usize },
}

/// Byte width of numbers on a curve of `nn` bits.
#[inline]
pub const fn byte_width(nn: u32) -> usize {
    (nn as usize + 7) / 8
}

#[derive(Clone, Default, PartialEq, Eq)]
/// Big-endian number of a declared byte length.
pub struct LargeNumber {
    bytes: Vec<u8>,
    valid: bool,
}

impl LargeNumber {
    /// Wraps bytes returned by the accelerator, whatever their length.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes, valid: true }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// declared length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

impl fmt::Debug for LargeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            write!(f, "0x{}", encode(self))
        } else {
            f.write_str("<unset>")
        }
    }
}

impl fmt::Display for LargeNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", encode(self))
    }
}

/// Decodes exactly `width` bytes from `2 * width` hex digits.
pub fn decode(text: &str, width: usize) -> Result<LargeNumber, Error> {
    // report the first bad digit before complaining about the length
    if let Some((offset, digit)) = text.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
        return Err(Error::Digit { digit, offset });
    }
    if text.len() != 2 * width {
        return Err(Error::Length {
            expected: 2 * width,
            found: text.len(),
        });
    }

    let mut bytes = vec![0u8; width];
    hex::decode_to_slice(text, &mut bytes).map_err(|_| Error::Length {
        expected: 2 * width,
        found: text.len(),
    })?;
    Ok(LargeNumber::from_bytes(bytes))
}

/// Lowercase hex digits of all declared bytes, without prefix.
pub fn encode(number: &LargeNumber) -> String {
    hex::encode(&number.bytes)
}
