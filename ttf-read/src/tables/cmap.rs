//! The [cmap](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap) table
//!
//! Only format 4 (segment mapping to delta values) subtables are decoded.

use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use types::{GlyphId, Tag};

use crate::{
    arena::{Arena, ArenaSlice, ArenaView},
    ArenaDecode, FontData, ReadArgs, ReadError, TopLevelTable,
};

/// <https://learn.microsoft.com/en-us/typography/opentype/spec/name#platform-ids>
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlatformId {
    Unicode,
    Macintosh,
    /// Deprecated.
    Iso,
    Windows,
    Custom,
    Unknown(u16),
}

impl PlatformId {
    pub fn new(raw: u16) -> Self {
        match raw {
            0 => Self::Unicode,
            1 => Self::Macintosh,
            2 => Self::Iso,
            3 => Self::Windows,
            4 => Self::Custom,
            other => Self::Unknown(other),
        }
    }
}

/// An entry in the cmap's list of subtables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct EncodingRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    /// Byte offset from beginning of the cmap table to the subtable.
    pub subtable_offset: u32,
}

impl EncodingRecord {
    pub fn platform(&self) -> PlatformId {
        PlatformId::new(self.platform_id)
    }

    /// Returns the data of the subtable, given the data of the cmap table.
    pub fn subtable_data<'a>(&self, cmap_data: FontData<'a>) -> Result<FontData<'a>, ReadError> {
        cmap_data
            .split_off(self.subtable_offset as usize)
            .ok_or(ReadError::OutOfBounds)
    }

    /// Returns the format of the subtable.
    pub fn format(&self, cmap_data: FontData) -> Result<u16, ReadError> {
        self.subtable_data(cmap_data)?.read_at(0)
    }
}

/// The [character to glyph index mapping](https://docs.microsoft.com/en-us/typography/opentype/spec/cmap) table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cmap {
    pub version: u16,
    pub encoding_records: ArenaSlice<EncodingRecord>,
    /// The index of the record whose subtable was decoded.
    pub selected_record: Option<usize>,
    /// The first format 4 subtable, if any.
    pub subtable: Option<Cmap4>,
}

impl TopLevelTable for Cmap {
    const TAG: Tag = Tag::new(b"cmap");
}

impl ReadArgs for Cmap {
    type Args = ();
}

impl ArenaDecode for Cmap {
    fn decode(data: FontData, arena: &mut Arena, _: &()) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version = cursor.read()?;
        let num_tables: u16 = cursor.read()?;
        let encoding_records = arena.push_slice::<EncodingRecord>(num_tables as usize)?;
        for record in arena.slice_mut(encoding_records) {
            record.platform_id = cursor.read()?;
            record.encoding_id = cursor.read()?;
            record.subtable_offset = cursor.read()?;
        }

        let mut selected = None;
        for (i, record) in arena.slice(encoding_records).iter().enumerate() {
            match record.format(data) {
                Ok(4) => {
                    selected = Some((i, *record));
                    break;
                }
                Ok(format) => log::debug!(
                    "skipping cmap subtable {i} ({:?}, {}) with format {format}",
                    record.platform(),
                    record.encoding_id
                ),
                Err(_) => log::warn!("cmap subtable {i} is out of bounds"),
            }
        }
        let Some((index, record)) = selected else {
            log::warn!("no format 4 cmap subtable, all codepoints will map to glyph 0");
            return Ok(Cmap {
                version,
                encoding_records,
                selected_record: None,
                subtable: None,
            });
        };
        let subtable = Cmap4::decode(record.subtable_data(data)?, arena, &())?;
        Ok(Cmap {
            version,
            encoding_records,
            selected_record: Some(index),
            subtable: Some(subtable),
        })
    }
}

impl Cmap {
    /// Maps a codepoint to a nominal glyph identifier.
    ///
    /// Returns [`GlyphId::NOTDEF`] for unmapped codepoints, and for every
    /// codepoint if there is no format 4 subtable.
    pub fn map_codepoint(&self, view: ArenaView, codepoint: impl Into<u32>) -> GlyphId {
        self.subtable
            .map(|subtable| subtable.map_codepoint(view, codepoint))
            .unwrap_or(GlyphId::NOTDEF)
    }
}

/// A [format 4](https://learn.microsoft.com/en-us/typography/opentype/spec/cmap#format-4-segment-mapping-to-delta-values)
/// subtable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cmap4 {
    pub format: u16,
    /// This is the length in bytes of the subtable.
    pub length: u16,
    pub language: u16,
    /// 2 × segCount.
    pub seg_count_x2: u16,
    pub search_range: u16,
    pub entry_selector: u16,
    pub range_shift: u16,
    /// End characterCode for each segment, last=0xFFFF.
    pub end_code: ArenaSlice<u16>,
    /// Start character code for each segment.
    pub start_code: ArenaSlice<u16>,
    /// Delta for all character codes in segment.
    pub id_delta: ArenaSlice<i16>,
    /// Offsets into glyphIdArray or 0
    pub id_range_offsets: ArenaSlice<u16>,
    /// Glyph index array (arbitrary length)
    pub glyph_id_array: ArenaSlice<u16>,
}

/// One segment of a [`Cmap4`] subtable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cmap4Segment {
    pub start_code: u16,
    pub end_code: u16,
    pub id_delta: i16,
    pub id_range_offset: u16,
}

impl ReadArgs for Cmap4 {
    type Args = ();
}

impl ArenaDecode for Cmap4 {
    fn decode(data: FontData, arena: &mut Arena, _: &()) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let format: u16 = cursor.read()?;
        if format != 4 {
            return Err(ReadError::InvalidFormat(format as i64));
        }
        let length: u16 = cursor.read()?;
        let language = cursor.read()?;
        let seg_count_x2: u16 = cursor.read()?;
        let search_range = cursor.read()?;
        let entry_selector = cursor.read()?;
        let range_shift = cursor.read()?;
        let seg_count = seg_count_x2 as usize / 2;

        let end_code = read_array(&mut cursor, arena, seg_count)?;
        // reservedPad
        cursor.advance::<u16>();
        let start_code = read_array(&mut cursor, arena, seg_count)?;
        let id_delta = read_array(&mut cursor, arena, seg_count)?;
        let id_range_offsets = read_array(&mut cursor, arena, seg_count)?;

        // the glyph id array takes up whatever is left of the subtable
        let header_len = cursor.position()?;
        let mut array_len = (length as usize).saturating_sub(header_len) / 2;
        if header_len + array_len * 2 > data.len() {
            log::warn!("cmap format 4 length {length} exceeds the available data");
            array_len = cursor.remaining_bytes() / 2;
        }
        let glyph_id_array = read_array(&mut cursor, arena, array_len)?;

        Ok(Cmap4 {
            format,
            length,
            language,
            seg_count_x2,
            search_range,
            entry_selector,
            range_shift,
            end_code,
            start_code,
            id_delta,
            id_range_offsets,
            glyph_id_array,
        })
    }
}

fn read_array<T: Pod + types::Scalar>(
    cursor: &mut crate::font_data::Cursor,
    arena: &mut Arena,
    len: usize,
) -> Result<ArenaSlice<T>, ReadError> {
    let array = arena.push_slice::<T>(len)?;
    for item in arena.slice_mut(array) {
        *item = cursor.read()?;
    }
    Ok(array)
}

impl Cmap4 {
    /// The number of segments.
    pub fn seg_count(&self) -> usize {
        self.end_code.len()
    }

    /// Maps a codepoint to a nominal glyph identifier.
    ///
    /// Segments are scanned in order and the first one whose end code is not
    /// less than the codepoint is used. Codepoints outside the basic
    /// multilingual plane are never mapped.
    pub fn map_codepoint(&self, view: ArenaView, codepoint: impl Into<u32>) -> GlyphId {
        let Ok(codepoint) = u16::try_from(codepoint.into()) else {
            return GlyphId::NOTDEF;
        };
        view.slice(self.end_code)
            .iter()
            .position(|end| *end >= codepoint)
            .and_then(|index| {
                let start_code = view.get(self.start_code, index)?;
                (start_code <= codepoint)
                    .then(|| self.lookup_glyph_id(view, codepoint, index, start_code))
            })
            .unwrap_or(GlyphId::NOTDEF)
    }

    /// Does the final phase of glyph id lookup.
    ///
    /// Shared between Self::map_codepoint and Cmap4Iter.
    fn lookup_glyph_id(
        &self,
        view: ArenaView,
        codepoint: u16,
        index: usize,
        start_code: u16,
    ) -> GlyphId {
        let (Some(delta), Some(range_offset)) = (
            view.get(self.id_delta, index),
            view.get(self.id_range_offsets, index),
        ) else {
            return GlyphId::NOTDEF;
        };
        if range_offset == 0 {
            return GlyphId::new(codepoint.wrapping_add(delta as u16));
        }
        let gid = (range_offset as usize / 2 + (codepoint - start_code) as usize)
            .checked_sub(self.seg_count() - index)
            .and_then(|offset| view.get(self.glyph_id_array, offset));
        match gid {
            Some(0) => GlyphId::NOTDEF,
            Some(gid) => GlyphId::new(gid.wrapping_add(delta as u16)),
            None => {
                log::warn!("idRangeOffset for U+{codepoint:04X} points outside the glyph id array");
                GlyphId::NOTDEF
            }
        }
    }

    /// Returns the [start_code, end_code] range at the given index.
    fn code_range(&self, view: ArenaView, index: usize) -> Option<Range<u32>> {
        // Extend to u32 to ensure we don't overflow on the end + 1 bound
        let start = view.get(self.start_code, index)? as u32;
        let end = view.get(self.end_code, index)? as u32;
        Some(start..end + 1)
    }

    /// Returns the segment at the given index.
    pub fn segment(&self, view: ArenaView, index: usize) -> Option<Cmap4Segment> {
        Some(Cmap4Segment {
            start_code: view.get(self.start_code, index)?,
            end_code: view.get(self.end_code, index)?,
            id_delta: view.get(self.id_delta, index)?,
            id_range_offset: view.get(self.id_range_offsets, index)?,
        })
    }

    /// Returns an iterator over the segments, in table order.
    pub fn segments<'v>(&self, view: ArenaView<'v>) -> impl Iterator<Item = Cmap4Segment> + 'v {
        let subtable = *self;
        (0..self.seg_count()).map_while(move |index| subtable.segment(view, index))
    }

    /// Returns an iterator over all (codepoint, glyph identifier) pairs
    /// in the subtable.
    pub fn iter<'v>(&self, view: ArenaView<'v>) -> Cmap4Iter<'v> {
        let cur_range = self.code_range(view, 0).unwrap_or_default();
        Cmap4Iter {
            subtable: *self,
            view,
            cur_start_code: cur_range.start as u16,
            cur_range,
            cur_range_ix: 0,
        }
    }
}

/// Iterator over all (codepoint, glyph identifier) pairs in
/// the subtable.
#[derive(Clone)]
pub struct Cmap4Iter<'v> {
    subtable: Cmap4,
    view: ArenaView<'v>,
    cur_range: Range<u32>,
    cur_start_code: u16,
    cur_range_ix: usize,
}

impl Iterator for Cmap4Iter<'_> {
    type Item = (u32, GlyphId);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(codepoint) = self.cur_range.next() {
                let glyph_id = self.subtable.lookup_glyph_id(
                    self.view,
                    codepoint as u16,
                    self.cur_range_ix,
                    self.cur_start_code,
                );
                // The table might explicitly map some codepoints to 0. Avoid
                // returning those here.
                if glyph_id == GlyphId::NOTDEF {
                    continue;
                }
                return Some((codepoint, glyph_id));
            } else {
                self.cur_range_ix += 1;
                self.cur_range = self.subtable.code_range(self.view, self.cur_range_ix)?;
                self.cur_start_code = self.cur_range.start as u16;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ttf_test_data::{cmap, synthetic};

    fn decode_cmap4(data: &[u8], storage: &mut [u8]) -> (Cmap4, usize) {
        let mut arena = Arena::new(storage);
        let subtable = Cmap4::decode(FontData::new(data), &mut arena, &()).unwrap();
        (subtable, arena.used())
    }

    #[test]
    fn delta_and_array_segments() {
        let mut buf = cmap::cmap4_with_glyph_array();
        let len = buf.len() as u16;
        buf.write_at("length", len);
        let mut storage = [0u8; 256];
        let (subtable, used) = decode_cmap4(&buf, &mut storage);
        let view = ArenaView::new(&storage[..used]);
        assert_eq!(subtable.seg_count(), 3);
        assert_eq!(subtable.glyph_id_array.len(), 3);
        let map = |c: char| subtable.map_codepoint(view, c).to_u16();
        assert_eq!(map('a'), 10);
        // explicitly mapped to 0, so idDelta does not apply
        assert_eq!(map('b'), 0);
        assert_eq!(map('c'), 12);
        assert_eq!(map('x'), 20);
        assert_eq!(map('z'), 22);
        // between segments
        assert_eq!(map('d'), 0);
        assert_eq!(map('w'), 0);
        // before the first segment
        assert_eq!(map(' '), 0);
        // the terminating segment maps 0xFFFF to 0
        assert_eq!(subtable.map_codepoint(view, 0xFFFFu32), GlyphId::NOTDEF);
        assert_eq!(subtable.map_codepoint(view, 0x1F600u32), GlyphId::NOTDEF);
    }

    #[test]
    fn range_offset_past_glyph_array() {
        let buf = cmap::cmap4_range_offset_past_end();
        let mut storage = [0u8; 256];
        let (subtable, used) = decode_cmap4(&buf, &mut storage);
        let view = ArenaView::new(&storage[..used]);
        assert_eq!(subtable.glyph_id_array.len(), 1);
        assert_eq!(subtable.map_codepoint(view, 0x30u32), GlyphId::NOTDEF);
        assert_eq!(subtable.map_codepoint(view, 0x31u32), GlyphId::NOTDEF);
    }

    #[test]
    fn lookups_are_deterministic() {
        let data = synthetic::simple_cmap4();
        let mut storage = [0u8; 256];
        let (subtable, used) = decode_cmap4(&data, &mut storage);
        let view = ArenaView::new(&storage[..used]);
        for segment in subtable.segments(view) {
            for codepoint in segment.start_code..=segment.end_code {
                let first = subtable.map_codepoint(view, codepoint);
                assert_eq!(first, subtable.map_codepoint(view, codepoint));
            }
        }
    }

    #[test]
    fn iter_skips_unmapped() {
        let data = synthetic::simple_cmap4();
        let mut storage = [0u8; 256];
        let (subtable, used) = decode_cmap4(&data, &mut storage);
        let view = ArenaView::new(&storage[..used]);
        let pairs: Vec<_> = subtable
            .iter(view)
            .map(|(cp, gid)| (char::from_u32(cp).unwrap(), gid.to_u16()))
            .collect();
        assert_eq!(
            pairs,
            [
                (' ', 1),
                ('A', 3),
                ('B', 4),
                ('a', 2),
                ('b', 3),
                ('c', 4),
                ('d', 5),
                ('e', 6),
                ('f', 7)
            ]
        );
        // every pair agrees with a direct lookup
        for (cp, gid) in subtable.iter(view) {
            assert_eq!(subtable.map_codepoint(view, cp), gid);
        }
    }

    #[test]
    fn segments() {
        let data = synthetic::cmap_format4(&[synthetic::map_range(0x30, 0x39, 10)]);
        let mut storage = [0u8; 128];
        let (subtable, used) = decode_cmap4(&data, &mut storage);
        let view = ArenaView::new(&storage[..used]);
        let segments: Vec<_> = subtable.segments(view).collect();
        assert_eq!(
            segments,
            [
                Cmap4Segment {
                    start_code: 0x30,
                    end_code: 0x39,
                    id_delta: 10 - 0x30,
                    id_range_offset: 0
                },
                Cmap4Segment {
                    start_code: 0xFFFF,
                    end_code: 0xFFFF,
                    id_delta: 1,
                    id_range_offset: 0
                }
            ]
        );
        assert_eq!(subtable.search_range, 4);
        assert_eq!(subtable.entry_selector, 1);
        assert_eq!(subtable.range_shift, 0);
    }

    #[test]
    fn selects_first_format4_subtable() {
        let data = synthetic::cmap_table(&[
            synthetic::CmapSubtable {
                platform_id: 1,
                encoding_id: 0,
                data: cmap::cmap0_subtable().into_vec(),
            },
            synthetic::CmapSubtable {
                platform_id: 0,
                encoding_id: 3,
                data: synthetic::cmap_format4(&[synthetic::map_range(0x41, 0x41, 9)]),
            },
            synthetic::CmapSubtable {
                platform_id: 3,
                encoding_id: 1,
                data: synthetic::cmap_format4(&[synthetic::map_range(0x41, 0x41, 5)]),
            },
        ]);
        let mut storage = [0u8; 256];
        let mut arena = Arena::new(&mut storage);
        let cmap = Cmap::decode(FontData::new(&data), &mut arena, &()).unwrap();
        let view = arena.view();
        assert_eq!(cmap.encoding_records.len(), 3);
        assert_eq!(cmap.selected_record, Some(1));
        assert_eq!(cmap.map_codepoint(view, 'A'), GlyphId::new(9));
        let records = view.slice(cmap.encoding_records);
        assert_eq!(records[0].platform(), PlatformId::Macintosh);
        assert_eq!(records[0].format(FontData::new(&data)), Ok(0));
    }

    #[test]
    fn no_format4_subtable() {
        let _ = env_logger::builder().is_test(true).try_init();
        let data = synthetic::cmap_table(&[synthetic::CmapSubtable {
            platform_id: 1,
            encoding_id: 0,
            data: synthetic::cmap_format6(0x41, &[3, 4]),
        }]);
        let mut storage = [0u8; 64];
        let mut arena = Arena::new(&mut storage);
        let cmap = Cmap::decode(FontData::new(&data), &mut arena, &()).unwrap();
        assert!(cmap.subtable.is_none());
        for c in ['A', 'B', 'Z'] {
            assert_eq!(cmap.map_codepoint(arena.view(), c), GlyphId::NOTDEF);
        }
    }
}
