//! The [loca (Index to Location)][loca] table
//!
//! [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca

use std::ops::Range;

use types::{GlyphId, Tag};

use crate::{
    arena::{Arena, ArenaSlice, ArenaView},
    ArenaDecode, FontData, ReadArgs, ReadError, TopLevelTable,
};

/// The [loca] table, with every offset widened to 32 bits.
///
/// [loca]: https://docs.microsoft.com/en-us/typography/opentype/spec/loca
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Loca {
    /// `num_glyphs + 1` byte offsets into the glyf table.
    pub offsets: ArenaSlice<u32>,
}

impl TopLevelTable for Loca {
    const TAG: Tag = Tag::new(b"loca");
}

impl ReadArgs for Loca {
    /// `(is_long, num_glyphs)`
    type Args = (bool, u16);
}

impl ArenaDecode for Loca {
    fn decode(
        data: FontData,
        arena: &mut Arena,
        &(is_long, num_glyphs): &(bool, u16),
    ) -> Result<Self, ReadError> {
        let count = num_glyphs as usize + 1;
        let entry_size = if is_long { 4 } else { 2 };
        if data.len() < count * entry_size {
            return Err(ReadError::OutOfBounds);
        }
        let mut cursor = data.cursor();
        let offsets = arena.push_slice::<u32>(count)?;
        let mut last = 0;
        for offset in arena.slice_mut(offsets) {
            *offset = if is_long {
                cursor.read::<u32>()?
            } else {
                cursor.read::<u16>()? as u32 * 2
            };
            if *offset < last {
                return Err(ReadError::MalformedData("loca offsets are not sorted"));
            }
            last = *offset;
        }
        Ok(Loca { offsets })
    }
}

impl Loca {
    /// The number of glyphs.
    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attempt to return the offset for a given glyph id.
    pub fn get_raw(&self, view: ArenaView, idx: usize) -> Option<u32> {
        view.get(self.offsets, idx)
    }

    /// Returns the byte range of the glyph in the glyf table.
    ///
    /// The range is empty for glyphs without an outline.
    pub fn glyph_range(&self, view: ArenaView, gid: GlyphId) -> Result<Range<usize>, ReadError> {
        let idx = gid.to_usize();
        let start = self.get_raw(view, idx).ok_or(ReadError::OutOfBounds)?;
        let end = self.get_raw(view, idx + 1).ok_or(ReadError::OutOfBounds)?;
        Ok(start as usize..end as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttf_test_data::BeBuffer;

    #[test]
    fn short_offsets_are_doubled() {
        let buf = BeBuffer::new().extend([0u16, 10, 10, 25]);
        let mut storage = [0u8; 64];
        let mut arena = Arena::new(&mut storage);
        let loca = Loca::decode(FontData::new(&buf), &mut arena, &(false, 3)).unwrap();
        let view = arena.view();
        assert_eq!(loca.len(), 3);
        assert_eq!(view.slice(loca.offsets), &[0, 20, 20, 50]);
        assert_eq!(loca.glyph_range(view, GlyphId::new(0)).unwrap(), 0..20);
        assert!(loca.glyph_range(view, GlyphId::new(1)).unwrap().is_empty());
        assert_eq!(loca.glyph_range(view, GlyphId::new(2)).unwrap(), 20..50);
        assert!(loca.glyph_range(view, GlyphId::new(3)).is_err());
    }

    #[test]
    fn long_offsets() {
        let buf = BeBuffer::new().extend([0u32, 70000, 70002]);
        let mut storage = [0u8; 64];
        let mut arena = Arena::new(&mut storage);
        let loca = Loca::decode(FontData::new(&buf), &mut arena, &(true, 2)).unwrap();
        assert_eq!(arena.view().slice(loca.offsets), &[0, 70000, 70002]);
    }

    #[test]
    fn synthetic_font_loca() {
        let font = ttf_test_data::simple_font();
        let (loca_data, glyf) = font.loca_and_glyf();
        let mut storage = [0u8; 256];
        let mut arena = Arena::new(&mut storage);
        let loca = Loca::decode(
            FontData::new(&loca_data),
            &mut arena,
            &(false, font.num_glyphs()),
        )
        .unwrap();
        let offsets = arena.view().slice(loca.offsets);
        assert_eq!(offsets.len(), font.num_glyphs() as usize + 1);
        assert!(offsets.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(*offsets.last().unwrap() as usize, glyf.len());
    }

    #[test]
    fn decreasing_offsets() {
        let buf = BeBuffer::new().extend([0u16, 10, 5]);
        let mut storage = [0u8; 64];
        let mut arena = Arena::new(&mut storage);
        assert_eq!(
            Loca::decode(FontData::new(&buf), &mut arena, &(false, 2)),
            Err(ReadError::MalformedData("loca offsets are not sorted"))
        );
    }
}
