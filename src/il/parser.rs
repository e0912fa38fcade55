//! Low-level byte stream parser for IL decoding.
//!
//! This module provides the [`Parser`] type, a cursor-based binary reader over a
//! method body's IL blob. All operations are bounds checked so that truncated or
//! corrupted bytecode surfaces as [`Error::OutOfBounds`](crate::Error::OutOfBounds)
//! instead of a panic.

use crate::{Error, Result};

mod sealed {
    pub trait Sealed {}
}

/// Primitive types readable from an IL blob in little-endian byte order.
///
/// This trait is sealed; it is implemented for exactly the integer and floating
/// point widths that appear as CIL operands.
pub trait IlRead: sealed::Sealed + Sized {
    /// Number of bytes consumed when reading this type.
    const SIZE: usize;

    /// Decodes a value from the first `SIZE` bytes of `data`.
    ///
    /// Callers guarantee `data.len() >= SIZE`.
    fn from_le(data: &[u8]) -> Self;
}

macro_rules! impl_il_read {
    ($($t:ty),*) => {
        $(
            impl sealed::Sealed for $t {}
            impl IlRead for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                fn from_le(data: &[u8]) -> Self {
                    let mut bytes = [0u8; std::mem::size_of::<$t>()];
                    bytes.copy_from_slice(&data[..std::mem::size_of::<$t>()]);
                    <$t>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_il_read!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

/// A bounds-checked cursor over an IL byte stream.
///
/// `Parser` maintains a position within a borrowed byte slice and provides
/// little-endian primitive reads for sequential instruction decoding.
///
/// # Examples
///
/// ```rust
/// use cilflow::il::Parser;
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut parser = Parser::new(&data);
///
/// let value = parser.read_le::<u16>()?;
/// assert_eq!(value, 0x0201);
/// assert_eq!(parser.pos(), 2);
/// # Ok::<(), cilflow::Error>(())
/// ```
#[derive(Debug)]
pub struct Parser<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser over the given byte slice, positioned at the start.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Total length of the underlying data in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the underlying data is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current cursor position.
    #[must_use]
    pub const fn pos(&self) -> usize {
        self.position
    }

    /// Returns `true` if at least one more byte can be read.
    #[must_use]
    pub const fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Moves the cursor to an absolute position.
    ///
    /// Seeking to the end of the data is allowed; seeking past it is not.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if `position` exceeds the data length.
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.data.len() {
            return Err(Error::OutOfBounds);
        }

        self.position = position;
        Ok(())
    }

    /// Reads a little-endian primitive and advances the cursor past it.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if fewer than `T::SIZE` bytes remain.
    pub fn read_le<T: IlRead>(&mut self) -> Result<T> {
        let end = self
            .position
            .checked_add(T::SIZE)
            .ok_or(Error::OutOfBounds)?;
        if end > self.data.len() {
            return Err(Error::OutOfBounds);
        }

        let value = T::from_le(&self.data[self.position..end]);
        self.position = end;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_le_sequence() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_le::<u32>().unwrap(), 0x0403_0201);
        assert_eq!(parser.read_le::<u16>().unwrap(), 0x0605);
        assert_eq!(parser.pos(), 6);
        assert!(parser.has_more_data());
    }

    #[test]
    fn read_le_signed() {
        let data = [0xFF];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_le::<i8>().unwrap(), -1);
        assert!(!parser.has_more_data());
    }

    #[test]
    fn read_past_end() {
        let data = [0x01, 0x02];
        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_le::<u32>(), Err(Error::OutOfBounds));
        // Position is untouched on failure.
        assert_eq!(parser.pos(), 0);
    }

    #[test]
    fn seek_bounds() {
        let data = [0x01, 0x02];
        let mut parser = Parser::new(&data);
        assert!(parser.seek(2).is_ok());
        assert!(!parser.has_more_data());
        assert_eq!(parser.seek(3), Err(Error::OutOfBounds));
    }
}
