//! The table directory and two pass table loading.

use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use types::{Tag, TRUE_SFNT_VERSION, TT_SFNT_VERSION};

use crate::{
    arena::{Arena, ArenaSlice, ArenaView, Span},
    tables::{
        cmap::Cmap,
        glyf::Glyf,
        head::Head,
        hhea::Hhea,
        hmtx::Hmtx,
        loca::Loca,
        maxp::Maxp,
    },
    ArenaDecode, FontData, FontRead, ReadError, TopLevelTable,
};

/// Record for a table in a font.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct TableRecord {
    /// Table identifier.
    pub tag: Tag,
    /// Checksum for the table.
    pub checksum: u32,
    /// Offset from the beginning of the font data.
    pub offset: u32,
    /// Length of the table.
    pub length: u32,
}

impl TableRecord {
    /// The byte range of the table in the font data.
    pub fn range(&self) -> Range<usize> {
        let start = self.offset as usize;
        start..start.saturating_add(self.length as usize)
    }

    /// Returns the table's data.
    pub fn data<'a>(&self, font: FontData<'a>) -> Result<FontData<'a>, ReadError> {
        font.slice(self.range())
            .ok_or(ReadError::TableOutOfBounds(self.tag))
    }
}

/// A decoded font: the table directory and every table needed to map
/// characters and load outlines.
///
/// All arrays live in the [`Arena`] the directory was loaded into; pass a
/// view of that arena to the accessors of the individual tables.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontDirectory {
    pub sfnt_version: u32,
    pub num_tables: u16,
    pub search_range: u16,
    pub entry_selector: u16,
    pub range_shift: u16,
    pub table_records: ArenaSlice<TableRecord>,
    pub head: Head,
    pub maxp: Maxp,
    pub hhea: Hhea,
    pub hmtx: Hmtx,
    pub loca: Loca,
    /// `None` if the font has no cmap table.
    pub cmap: Option<Cmap>,
    /// The glyf table is not decoded up front; glyphs are read on demand.
    pub glyf: TableRecord,
}

impl FontDirectory {
    /// Decodes the directory and tables of the font in `data`.
    ///
    /// On error, nothing remains allocated in the arena.
    pub fn read(data: FontData, arena: &mut Arena) -> Result<Self, ReadError> {
        let mark = arena.mark();
        let result = Self::read_impl(data, arena);
        if result.is_err() {
            arena.release(mark)?;
        }
        result
    }

    /// Decodes a font that has already been copied into the arena.
    ///
    /// Tables are allocated after the font data, so `font` must be the
    /// most recent allocation it is part of.
    pub fn load(arena: &mut Arena, font: Span) -> Result<Self, ReadError> {
        let remaining = arena.remaining();
        let (view, mut tables) = arena.subarena(remaining)?;
        let result = Self::read(FontData::new(view.bytes(font)), &mut tables);
        let kept = tables.used();
        arena.pop(remaining - kept)?;
        result
    }

    fn read_impl(data: FontData, arena: &mut Arena) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let sfnt_version: u32 = cursor.read()?;
        if ![TT_SFNT_VERSION, TRUE_SFNT_VERSION].contains(&sfnt_version) {
            return Err(ReadError::InvalidSfnt(sfnt_version));
        }
        let num_tables: u16 = cursor.read()?;
        let search_range = cursor.read()?;
        let entry_selector = cursor.read()?;
        let range_shift = cursor.read()?;
        if cursor.remaining_bytes() < num_tables as usize * std::mem::size_of::<TableRecord>() {
            return Err(ReadError::OutOfBounds);
        }

        let table_records = arena.push_slice::<TableRecord>(num_tables as usize)?;
        for record in arena.slice_mut(table_records) {
            *record = TableRecord {
                tag: cursor.read()?,
                checksum: cursor.read()?,
                offset: cursor.read()?,
                length: cursor.read()?,
            };
            // validates the range
            record.data(data)?;
        }

        // first pass: tables that only depend on their own data
        let (mut head, mut maxp, mut hhea, mut cmap, mut glyf) = (None, None, None, None, None);
        for i in 0..table_records.len() {
            let Some(record) = arena.view().get(table_records, i) else {
                break;
            };
            let table_data = record.data(data)?;
            log::debug!("table {} at {:?}", record.tag, record.range());
            if record.tag == Head::TAG {
                head = Some(Head::read(table_data)?);
            } else if record.tag == Maxp::TAG {
                maxp = Some(Maxp::read(table_data)?);
            } else if record.tag == Hhea::TAG {
                hhea = Some(Hhea::read(table_data)?);
            } else if record.tag == Cmap::TAG {
                cmap = Some(Cmap::decode(table_data, arena, &())?);
            } else if record.tag == Glyf::TAG {
                glyf = Some(record);
            }
        }
        let head = head.ok_or(ReadError::TableIsMissing(Head::TAG))?;
        let maxp = maxp.ok_or(ReadError::TableIsMissing(Maxp::TAG))?;
        let hhea = hhea.ok_or(ReadError::TableIsMissing(Hhea::TAG))?;
        let glyf = glyf.ok_or(ReadError::TableIsMissing(Glyf::TAG))?;
        if cmap.is_none() {
            log::warn!("font has no cmap table, all codepoints will map to glyph 0");
        }

        // second pass: tables whose layout is described by the first
        let (mut hmtx, mut loca) = (None, None);
        for i in 0..table_records.len() {
            let Some(record) = arena.view().get(table_records, i) else {
                break;
            };
            if record.tag == Hmtx::TAG {
                let args = (hhea.number_of_h_metrics, maxp.num_glyphs);
                hmtx = Some(Hmtx::decode(record.data(data)?, arena, &args)?);
            } else if record.tag == Loca::TAG {
                let args = (head.has_long_loca(), maxp.num_glyphs);
                loca = Some(Loca::decode(record.data(data)?, arena, &args)?);
            }
        }
        let hmtx = hmtx.ok_or(ReadError::TableIsMissing(Hmtx::TAG))?;
        let loca = loca.ok_or(ReadError::TableIsMissing(Loca::TAG))?;

        Ok(FontDirectory {
            sfnt_version,
            num_tables,
            search_range,
            entry_selector,
            range_shift,
            table_records,
            head,
            maxp,
            hhea,
            hmtx,
            loca,
            cmap,
            glyf,
        })
    }

    /// Returns the table records, in directory order.
    pub fn table_records<'v>(&self, view: ArenaView<'v>) -> &'v [TableRecord] {
        view.slice(self.table_records)
    }

    /// Returns the data for the table with the specified tag, if present.
    pub fn table_data<'a>(&self, view: ArenaView, font: FontData<'a>, tag: Tag) -> Option<FontData<'a>> {
        self.table_records(view)
            .iter()
            .find(|record| record.tag == tag)
            .and_then(|record| record.data(font).ok())
    }
}
