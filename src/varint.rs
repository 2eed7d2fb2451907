//! Bounded byte cursor and variable-length integer codec.
//!
//! Song streams store unsigned integers as big-endian groups of seven bits
//! with an inverted continuation convention: accumulation continues while a
//! byte's high bit is clear, and the byte whose high bit is *set* is the
//! final byte of the group.

use std::fmt;

/// Error type for song stream decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The stream ended in the middle of a varint or event payload
    Truncated,
    /// The song header declared a resolution of zero ticks per beat
    ZeroTicksPerBeat,
    /// The song header or a tempo-change event carried a zero tempo
    ZeroTempo,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Truncated => write!(f, "song stream ended mid-field"),
            DecodeError::ZeroTicksPerBeat => write!(f, "song declares zero ticks per beat"),
            DecodeError::ZeroTempo => write!(f, "song declares a zero tempo"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// A read-only position into an immutable song buffer.
///
/// The cursor never reads past the end of its slice; a stream that runs out
/// mid-field yields [`DecodeError::Truncated`] instead of undefined reads.
///
/// # Examples
///
/// ```
/// use coiltone::varint::Cursor;
///
/// let mut cursor = Cursor::new(&[0x07, 0xE8]);
/// assert_eq!(cursor.read_varint(), Ok(1000));
/// assert_eq!(cursor.position(), 2);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the byte offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns true if no bytes remain.
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Reads one byte and advances the cursor.
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let byte = *self.data.get(self.pos).ok_or(DecodeError::Truncated)?;
        self.pos += 1;
        Ok(byte)
    }

    /// Decodes a varint and advances the cursor past it.
    ///
    /// # Examples
    ///
    /// ```
    /// use coiltone::varint::{Cursor, DecodeError};
    ///
    /// // One-byte value: high bit set marks the final byte.
    /// let mut cursor = Cursor::new(&[0x80 | 42]);
    /// assert_eq!(cursor.read_varint(), Ok(42));
    ///
    /// // A group with no terminating byte is rejected.
    /// let mut cursor = Cursor::new(&[0x02, 0x2C]);
    /// assert_eq!(cursor.read_varint(), Err(DecodeError::Truncated));
    /// ```
    pub fn read_varint(&mut self) -> Result<u64, DecodeError> {
        let mut byte = self.read_u8()?;
        let mut value = u64::from(byte & 0x7f);
        while byte & 0x80 == 0 {
            byte = self.read_u8()?;
            value = (value << 7) + u64::from(byte & 0x7f);
        }
        Ok(value)
    }

    /// Decodes the varint at the cursor without advancing it.
    ///
    /// Two consecutive peeks at the same position return the same value.
    pub fn peek_varint(&self) -> Result<u64, DecodeError> {
        let mut probe = *self;
        probe.read_varint()
    }
}

/// Appends the varint encoding of `value` to `out`.
///
/// # Examples
///
/// ```
/// use coiltone::varint::{self, Cursor};
///
/// let mut bytes = Vec::new();
/// varint::encode(300, &mut bytes);
/// assert_eq!(bytes, [0x02, 0xAC]);
/// assert_eq!(Cursor::new(&bytes).peek_varint(), Ok(300));
/// ```
pub fn encode(value: u64, out: &mut Vec<u8>) {
    let mut shift = 63;
    while shift > 0 && (value >> shift) & 0x7f == 0 {
        shift -= 7;
    }
    while shift > 0 {
        out.push(((value >> shift) & 0x7f) as u8);
        shift -= 7;
    }
    out.push((value & 0x7f) as u8 | 0x80);
}
