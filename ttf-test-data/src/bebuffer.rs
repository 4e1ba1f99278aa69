//! small utilities used in tests

use std::collections::HashMap;

use ttf_types::Scalar;

/// A convenience type for generating a buffer of big-endian bytes.
#[derive(Debug, Clone, Default)]
pub struct BeBuffer {
    data: Vec<u8>,
    tagged_locations: HashMap<String, usize>,
}

impl BeBuffer {
    pub fn new() -> Self {
        Default::default()
    }

    /// The current length of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the buffer contains zero bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Return a reference to the contents of the buffer
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Write any scalar to this buffer.
    pub fn push(mut self, item: impl Scalar) -> Self {
        self.data.extend(item.to_raw().as_ref());
        self
    }

    /// Write a scalar and remember its location, for a later [`write_at`](Self::write_at).
    pub fn push_with_tag(mut self, item: impl Scalar, tag: &str) -> Self {
        self.tagged_locations
            .insert(tag.to_string(), self.data.len());
        self.data.extend(item.to_raw().as_ref());
        self
    }

    /// Write multiple scalars into the buffer
    pub fn extend<T: Scalar>(mut self, iter: impl IntoIterator<Item = T>) -> Self {
        for item in iter {
            self.data.extend(item.to_raw().as_ref());
        }
        self
    }

    /// Append raw bytes, such as an already encoded table.
    pub fn extend_bytes(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Pad with zeros until the length is a multiple of `alignment`.
    pub fn align_to(mut self, alignment: usize) -> Self {
        while self.data.len() % alignment != 0 {
            self.data.push(0);
        }
        self
    }

    pub fn offset_for(&self, tag: &str) -> usize {
        // panic on unrecognized tags
        self.tagged_locations.get(tag).copied().unwrap()
    }

    /// Overwrite the value previously pushed with `tag`.
    pub fn write_at(&mut self, tag: &str, item: impl Scalar) {
        let offset = self.offset_for(tag);
        let raw = item.to_raw();
        let new_data: &[u8] = raw.as_ref();
        let data = &mut self.data[offset..];

        if data.len() < new_data.len() {
            panic!("not enough room left in buffer for the requested write.");
        }

        for (left, right) in data.iter_mut().zip(new_data) {
            *left = *right
        }
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl std::ops::Deref for BeBuffer {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

/// Build a [`BeBuffer`] from a list of values.
///
/// Items may be literals, parenthesized expressions (needed for negative
/// values), `[a, b, ...]` arrays of a single type, or `{value: "tag"}` for
/// a value whose location is recorded with [`BeBuffer::push_with_tag`].
///
/// ```
/// # use ttf_test_data::be_buffer;
/// let buf = be_buffer! {
///     4u16,
///     {0u16: "length"},
///     (-1i16),
///     [1u8, 2, 3]
/// };
/// assert_eq!(buf.as_slice(), &[0, 4, 0, 0, 0xFF, 0xFF, 1, 2, 3]);
/// ```
#[macro_export]
macro_rules! be_buffer {
    ( $( $item:tt ),* $(,)? ) => {{
        let builder = $crate::bebuffer::BeBuffer::new();
        $(
            let builder = $crate::be_buffer_add!(builder, $item);
        )*
        builder
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! be_buffer_add {
    ($b:ident, $v:literal) => {
        $b.push($v)
    };
    ($b:ident, ($v:expr)) => {
        $b.push($v)
    };
    ($b:ident, [$($v:expr),+ $(,)?]) => {
        $b.extend([$($v),*])
    };
    ($b:ident, {$v:tt : $tag:literal}) => {
        $b.push_with_tag($v, $tag)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_writes() {
        let mut buf = be_buffer! {
            1u16,
            {0u32: "length"},
            (-2i16)
        };
        assert_eq!(buf.offset_for("length"), 2);
        buf.write_at("length", 0xAABBCCDDu32);
        assert_eq!(
            buf.as_slice(),
            &[0, 1, 0xAA, 0xBB, 0xCC, 0xDD, 0xFF, 0xFE]
        );
    }

    #[test]
    fn alignment_padding() {
        let buf = BeBuffer::new().push(1u8).align_to(4);
        assert_eq!(buf.len(), 4);
        let buf = buf.align_to(4);
        assert_eq!(buf.len(), 4);
    }
}
