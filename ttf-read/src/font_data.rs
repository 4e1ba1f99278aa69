//! raw font bytes

use std::ops::RangeBounds;

use types::Scalar;

use crate::read::ReadError;

/// A reference to raw binary font data.
///
/// This is a wrapper around a byte slice, that provides convenience methods
/// for reading big-endian values at a given offset.
#[derive(Debug, Default, Clone, Copy)]
pub struct FontData<'a> {
    bytes: &'a [u8],
}

/// A sequential reader over [`FontData`].
///
/// Each read consumes the width of the value read. Reads past the end of the
/// data fail with [`ReadError::OutOfBounds`] but still advance the cursor, so
/// the first error in a sequence of reads is the one to report.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    pos: usize,
    data: FontData<'a>,
}

impl<'a> FontData<'a> {
    /// Create a new `FontData` with these bytes.
    pub const fn new(bytes: &'a [u8]) -> Self {
        FontData { bytes }
    }

    /// The length of the data, in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` if the data has a length of zero bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the data starting at `pos`.
    pub fn split_off(&self, pos: usize) -> Option<FontData<'a>> {
        self.bytes.get(pos..).map(FontData::new)
    }

    /// Returns a sub-range of the data.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Option<FontData<'a>> {
        let bounds = (range.start_bound().cloned(), range.end_bound().cloned());
        self.bytes.get(bounds).map(FontData::new)
    }

    /// Read a scalar at the provided location in the data.
    pub fn read_at<T: Scalar>(&self, offset: usize) -> Result<T, ReadError> {
        offset
            .checked_add(T::RAW_BYTE_LEN)
            .and_then(|end| self.bytes.get(offset..end))
            .and_then(T::read)
            .ok_or(ReadError::OutOfBounds)
    }

    /// Returns a cursor positioned at the start of the data.
    pub fn cursor(&self) -> Cursor<'a> {
        Cursor {
            pos: 0,
            data: *self,
        }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl<'a> Cursor<'a> {
    /// Skips over a value of type `T`.
    pub fn advance<T: Scalar>(&mut self) {
        self.pos = self.pos.saturating_add(T::RAW_BYTE_LEN);
    }

    /// Skips `n_bytes`, such as an instruction block or reserved fields.
    pub fn advance_by(&mut self, n_bytes: usize) {
        self.pos = self.pos.saturating_add(n_bytes);
    }

    /// Reads the next big-endian value.
    pub fn read<T: Scalar>(&mut self) -> Result<T, ReadError> {
        let temp = self.data.read_at(self.pos);
        self.advance::<T>();
        temp
    }

    /// Reads the next `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ReadError> {
        let temp = self
            .pos
            .checked_add(len)
            .and_then(|end| self.data.as_bytes().get(self.pos..end))
            .ok_or(ReadError::OutOfBounds);
        self.advance_by(len);
        temp
    }

    /// return the current position, or an error if we are out of bounds
    pub fn position(&self) -> Result<usize, ReadError> {
        if self.pos <= self.data.len() {
            Ok(self.pos)
        } else {
            Err(ReadError::OutOfBounds)
        }
    }

    // used when handling fields with an implicit length, which must be at the
    // end of a table.
    pub fn remaining_bytes(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }
}

impl AsRef<[u8]> for FontData<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

impl<'a> From<&'a [u8]> for FontData<'a> {
    fn from(src: &'a [u8]) -> FontData<'a> {
        FontData::new(src)
    }
}
