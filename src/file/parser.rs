//! Cursor-based big-endian parser for class-file structures.
//!
//! This module provides the [`crate::file::parser::Parser`] type, a bounds-checked cursor over
//! a byte slice. It is the only way the class-file reader consumes input: every read validates
//! data availability first, so truncated or hostile class files surface as
//! [`crate::Error::OutOfBounds`] or [`crate::Error::Malformed`] instead of panics.
//!
//! # Key Components
//!
//! ## Navigation Methods
//! - [`crate::file::parser::Parser::advance_by`] - Move forward by specified bytes
//! - [`crate::file::parser::Parser::pos`] - Get current position
//! - [`crate::file::parser::Parser::align`] - Align to byte boundaries (switch padding)
//!
//! ## Data Access Methods
//! - [`crate::file::parser::Parser::read_be`] - Read primitive types (big-endian)
//! - [`crate::file::parser::Parser::read_bytes`] - Borrow a run of raw bytes
//! - [`crate::file::parser::Parser::read_modified_utf8`] - Decode a JVM modified UTF-8 string
//!
//! # Usage Examples
//!
//! ```rust
//! use jremap::Parser;
//!
//! let data = [0x00, 0x03, b'F', b'o', b'o', 0xFF];
//! let mut parser = Parser::new(&data);
//!
//! let len = parser.read_be::<u16>()?;
//! let name = parser.read_modified_utf8(len as usize)?;
//! assert_eq!(name, "Foo");
//! assert_eq!(parser.read_be::<u8>()?, 0xFF);
//! assert!(!parser.has_more_data());
//! # Ok::<(), jremap::Error>(())
//! ```

use crate::{
    file::io::{read_be_at, ClassIO},
    Error::OutOfBounds,
    Result,
};

/// A generic binary data parser for reading class-file structures.
///
/// `Parser` maintains an internal position cursor and provides bounds checking
/// to prevent buffer overruns when reading malformed or truncated data.
pub struct Parser<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new `Parser` over the provided data, positioned at offset 0.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the total length of the underlying data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the underlying data is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there are unread bytes left.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Advances the cursor by `step` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if this would move past the end.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        match self.position.checked_add(step) {
            Some(end) if end <= self.data.len() => {
                self.position = end;
                Ok(())
            }
            _ => Err(OutOfBounds),
        }
    }

    /// Advances the cursor to the next multiple of `alignment`, relative to `base`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the padding runs past the end.
    pub fn align(&mut self, base: usize, alignment: usize) -> Result<()> {
        let relative = self.position.saturating_sub(base);
        let padding = (alignment - relative % alignment) % alignment;
        self.advance_by(padding)
    }

    /// Returns the current cursor position.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Returns the full underlying data.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Reads a big-endian value and advances the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
    pub fn read_be<T: ClassIO>(&mut self) -> Result<T> {
        read_be_at::<T>(self.data, &mut self.position)
    }

    /// Borrows the next `len` bytes and advances past them.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let start = self.position;
        self.advance_by(len)?;
        Ok(&self.data[start..self.position])
    }

    /// Decodes `len` bytes of JVM modified UTF-8 and advances past them.
    ///
    /// Modified UTF-8 differs from standard UTF-8 in two ways: the NUL character is encoded
    /// as the two-byte sequence `C0 80`, and supplementary characters are encoded as two
    /// separately encoded UTF-16 surrogates of three bytes each. Decoding therefore goes
    /// through UTF-16 code units. Unpaired surrogates are replaced with U+FFFD.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes, or
    /// [`crate::Error::Malformed`] on an invalid or truncated byte sequence.
    pub fn read_modified_utf8(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_bytes(len)?;

        if bytes.is_ascii() {
            return Ok(bytes.iter().map(|&b| b as char).collect());
        }

        let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
        let mut index = 0;
        while index < bytes.len() {
            let first = bytes[index];
            if first & 0x80 == 0 {
                units.push(u16::from(first));
                index += 1;
            } else if first & 0xE0 == 0xC0 {
                let Some(&second) = bytes.get(index + 1) else {
                    return Err(malformed_error!("Truncated 2-byte sequence at {}", index));
                };
                if second & 0xC0 != 0x80 {
                    return Err(malformed_error!("Invalid continuation byte at {}", index + 1));
                }
                units.push((u16::from(first & 0x1F) << 6) | u16::from(second & 0x3F));
                index += 2;
            } else if first & 0xF0 == 0xE0 {
                let (Some(&second), Some(&third)) = (bytes.get(index + 1), bytes.get(index + 2))
                else {
                    return Err(malformed_error!("Truncated 3-byte sequence at {}", index));
                };
                if second & 0xC0 != 0x80 || third & 0xC0 != 0x80 {
                    return Err(malformed_error!("Invalid continuation byte at {}", index + 1));
                }
                units.push(
                    (u16::from(first & 0x0F) << 12)
                        | (u16::from(second & 0x3F) << 6)
                        | u16::from(third & 0x3F),
                );
                index += 3;
            } else {
                return Err(malformed_error!(
                    "Invalid modified UTF-8 lead byte 0x{:02X} at {}",
                    first,
                    index
                ));
            }
        }

        Ok(String::from_utf16_lossy(&units))
    }
}
