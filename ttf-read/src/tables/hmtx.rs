//! The [hmtx (Horizontal Metrics)](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx) table

use bytemuck::{Pod, Zeroable};
use types::{GlyphId, Tag};

use crate::{
    arena::{Arena, ArenaSlice, ArenaView},
    ArenaDecode, FontData, ReadArgs, ReadError, TopLevelTable,
};

/// An advance width and left side bearing pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct LongMetric {
    /// Advance width, in font units.
    pub advance: u16,
    /// Glyph left side bearing, in font units.
    pub side_bearing: i16,
}

/// The [horizontal metrics](https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx) table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hmtx {
    /// `numberOfHMetrics` advance and bearing pairs.
    pub h_metrics: ArenaSlice<LongMetric>,
    /// Bearings for the remaining glyphs, which share the advance of the
    /// last long metric.
    pub left_side_bearings: ArenaSlice<i16>,
}

impl TopLevelTable for Hmtx {
    const TAG: Tag = Tag::new(b"hmtx");
}

impl ReadArgs for Hmtx {
    /// `(number_of_h_metrics, num_glyphs)`
    type Args = (u16, u16);
}

impl ArenaDecode for Hmtx {
    fn decode(
        data: FontData,
        arena: &mut Arena,
        &(number_of_h_metrics, num_glyphs): &(u16, u16),
    ) -> Result<Self, ReadError> {
        let num_long = number_of_h_metrics as usize;
        let num_bearings = (num_glyphs as usize).saturating_sub(num_long);
        if data.len() < num_long * 4 + num_bearings * 2 {
            return Err(ReadError::OutOfBounds);
        }
        let mut cursor = data.cursor();
        let h_metrics = arena.push_slice::<LongMetric>(num_long)?;
        for metric in arena.slice_mut(h_metrics) {
            metric.advance = cursor.read()?;
            metric.side_bearing = cursor.read()?;
        }
        let left_side_bearings = arena.push_slice::<i16>(num_bearings)?;
        for bearing in arena.slice_mut(left_side_bearings) {
            *bearing = cursor.read()?;
        }
        Ok(Hmtx {
            h_metrics,
            left_side_bearings,
        })
    }
}

impl Hmtx {
    /// Returns the advance width for the given glyph.
    ///
    /// Glyphs past the long metrics use the advance of the last one.
    pub fn advance(&self, view: ArenaView, glyph_id: GlyphId) -> Option<u16> {
        let metrics = view.slice(self.h_metrics);
        let idx = glyph_id.to_usize();
        metrics
            .get(idx)
            .or_else(|| metrics.last())
            .map(|metric| metric.advance)
    }

    /// Returns the left side bearing for the given glyph.
    pub fn side_bearing(&self, view: ArenaView, glyph_id: GlyphId) -> Option<i16> {
        let metrics = view.slice(self.h_metrics);
        let idx = glyph_id.to_usize();
        match metrics.get(idx) {
            Some(metric) => Some(metric.side_bearing),
            None => view
                .slice(self.left_side_bearings)
                .get(idx - metrics.len())
                .copied(),
        }
    }
}
