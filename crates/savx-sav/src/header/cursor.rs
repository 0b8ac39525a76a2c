//! Endian-aware byte cursor over an in-memory file.

use crate::error::{Result, SavError};

/// Byte order of a SAV file, detected from the header layout code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

/// Sequential reader over a byte slice.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor positioned at `pos`.
    pub fn new(data: &'a [u8], pos: usize, endian: Endian) -> Self {
        Self { data, pos, endian }
    }

    /// Current offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Byte order in use.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Bytes left after the current offset.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Whether the cursor reached the end.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Borrow the next `len` bytes and advance.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos.checked_add(len).ok_or(SavError::Truncated {
            offset: self.pos,
            needed: len,
        })?;
        let slice = self.data.get(self.pos..end).ok_or(SavError::Truncated {
            offset: self.pos,
            needed: end - self.data.len().min(end),
        })?;
        self.pos = end;
        Ok(slice)
    }

    /// Advance without reading.
    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    /// Read a fixed-size array.
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    /// Read one byte.
    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.array::<1>()?[0])
    }

    /// Read a 32-bit signed integer.
    pub fn i32(&mut self) -> Result<i32> {
        Ok(decode_i32(self.array()?, self.endian))
    }

    /// Read a 64-bit float.
    pub fn f64(&mut self) -> Result<f64> {
        Ok(decode_f64(self.array()?, self.endian))
    }

    /// Read a non-negative 32-bit length field.
    pub fn len_field(&mut self, what: &str) -> Result<usize> {
        let value = self.i32()?;
        usize::try_from(value)
            .map_err(|_| SavError::invalid_format(format!("negative {what}: {value}")))
    }
}

/// Decode a 32-bit integer in the given byte order.
pub fn decode_i32(bytes: [u8; 4], endian: Endian) -> i32 {
    match endian {
        Endian::Little => i32::from_le_bytes(bytes),
        Endian::Big => i32::from_be_bytes(bytes),
    }
}

/// Decode a 64-bit float in the given byte order.
pub fn decode_f64(bytes: [u8; 8], endian: Endian) -> f64 {
    match endian {
        Endian::Little => f64::from_le_bytes(bytes),
        Endian::Big => f64::from_be_bytes(bytes),
    }
}
