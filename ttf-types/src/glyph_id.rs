//! Glyph Identifiers
//!
//! Although these are stored as u16s in the font, we choose to represent them
//! as a distinct type.

/// A 16-bit glyph identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlyphId(u16);

impl GlyphId {
    /// The identifier reserved for unknown glyphs
    pub const NOTDEF: GlyphId = GlyphId(0);

    /// Construct a new `GlyphId`.
    pub const fn new(raw: u16) -> Self {
        GlyphId(raw)
    }

    /// The identifier as a u16.
    pub const fn to_u16(self) -> u16 {
        self.0
    }

    /// The identifier as a usize, for indexing per-glyph arrays.
    pub const fn to_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<u16> for GlyphId {
    fn from(value: u16) -> Self {
        GlyphId(value)
    }
}

impl std::fmt::Display for GlyphId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "GID_{}", self.0)
    }
}

crate::newtype_scalar!(GlyphId, [u8; 2]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notdef_is_default() {
        assert_eq!(GlyphId::default(), GlyphId::NOTDEF);
        assert_eq!(GlyphId::NOTDEF.to_u16(), 0);
    }

    #[test]
    fn display() {
        assert_eq!(GlyphId::new(42).to_string(), "GID_42");
    }
}
