//! The font face: character mapping, outlines and metrics.

use std::path::Path;

use ttf_read::{
    tables::glyf::Glyf,
    types::GlyphId,
    Arena, ArenaView, FontData, FontDirectory, Span,
};

use crate::{
    outline::{GlyphOutline, OutlineLoader},
    DrawError, FaceError,
};

/// A TrueType font loaded into an [`Arena`].
///
/// The face owns the arena. The font data and the decoded tables occupy the
/// start of it. The remaining space is used as scratch memory while loading
/// outlines and is released before each load returns.
pub struct FontFace<'a> {
    arena: Arena<'a>,
    font: Span,
    directory: FontDirectory,
}

impl<'a> FontFace<'a> {
    /// Copies `data` into the arena and decodes the font.
    pub fn new(mut arena: Arena<'a>, data: &[u8]) -> Result<Self, FaceError> {
        let font = arena.push_bytes(data)?;
        arena.push_zero(1)?;
        Self::load(arena, font)
    }

    /// Reads the file at `path` into the arena and decodes the font.
    pub fn from_file(mut arena: Arena<'a>, path: impl AsRef<Path>) -> Result<Self, FaceError> {
        let font = ttf_read::read_entire_file(&mut arena, path)?;
        Self::load(arena, font)
    }

    fn load(mut arena: Arena<'a>, font: Span) -> Result<Self, FaceError> {
        let directory = FontDirectory::load(&mut arena, font)?;
        log::debug!(
            "loaded {} tables, {} glyphs, {} of {} arena bytes used",
            directory.num_tables,
            directory.maxp.num_glyphs,
            arena.used(),
            arena.capacity()
        );
        Ok(Self {
            arena,
            font,
            directory,
        })
    }

    /// Returns the decoded tables.
    pub fn directory(&self) -> &FontDirectory {
        &self.directory
    }

    /// Returns a view of the arena, for resolving the handles in
    /// [`directory`](Self::directory).
    pub fn view(&self) -> ArenaView<'_> {
        self.arena.view()
    }

    /// Returns the raw font data.
    pub fn data(&self) -> FontData<'_> {
        FontData::new(self.arena.bytes(self.font))
    }

    /// Returns the arena holding the font.
    pub fn arena(&self) -> &Arena<'a> {
        &self.arena
    }

    /// Maps a codepoint to a glyph index.
    ///
    /// Returns [`GlyphId::NOTDEF`] if the codepoint is not mapped.
    pub fn glyph_index(&self, codepoint: impl Into<u32>) -> GlyphId {
        self.directory
            .cmap
            .as_ref()
            .map(|cmap| cmap.map_codepoint(self.view(), codepoint))
            .unwrap_or(GlyphId::NOTDEF)
    }

    /// Loads the outline of a glyph.
    pub fn load_outline(&mut self, glyph_id: GlyphId) -> Result<GlyphOutline, DrawError> {
        if glyph_id.to_u16() >= self.glyph_count() {
            return Err(DrawError::GlyphNotFound(glyph_id));
        }
        let directory = self.directory;
        let font = self.font;
        let scratch_size = self.arena.remaining();
        self.arena
            .scoped(scratch_size, |view, scratch| -> Result<GlyphOutline, DrawError> {
                let glyf_data = directory.glyf.data(FontData::new(view.bytes(font)))?;
                OutlineLoader::new(view, directory.loca, Glyf::new(glyf_data))
                    .load(scratch, glyph_id)
            })?
    }

    /// Loads the outline of the glyph mapped to `codepoint`.
    ///
    /// A codepoint that is not mapped has no visible glyph: the result is an
    /// empty outline with the id [`GlyphId::NOTDEF`]. Use
    /// [`load_outline`](Self::load_outline) to draw the `.notdef` glyph itself.
    pub fn load_char(&mut self, codepoint: impl Into<u32>) -> Result<GlyphOutline, DrawError> {
        let glyph_id = self.glyph_index(codepoint);
        if glyph_id == GlyphId::NOTDEF {
            return Ok(GlyphOutline {
                glyph_id,
                ..Default::default()
            });
        }
        self.load_outline(glyph_id)
    }

    /// The number of glyphs in the font.
    pub fn glyph_count(&self) -> u16 {
        self.directory.maxp.num_glyphs
    }

    pub fn units_per_em(&self) -> u16 {
        self.directory.head.units_per_em
    }

    /// Distance from the baseline to the top of the line, from hhea.
    pub fn ascent(&self) -> i16 {
        self.directory.hhea.ascender
    }

    /// Distance from the baseline to the bottom of the line, typically
    /// negative.
    pub fn descent(&self) -> i16 {
        self.directory.hhea.descender
    }

    pub fn line_gap(&self) -> i16 {
        self.directory.hhea.line_gap
    }

    /// Returns the advance width of a glyph, or `None` if the glyph id is
    /// out of range.
    pub fn advance_width(&self, glyph_id: GlyphId) -> Option<u16> {
        if glyph_id.to_u16() >= self.glyph_count() {
            return None;
        }
        self.directory.hmtx.advance(self.view(), glyph_id)
    }

    /// Returns the left side bearing of a glyph, or `None` if the glyph id
    /// is out of range.
    pub fn left_side_bearing(&self, glyph_id: GlyphId) -> Option<i16> {
        self.directory.hmtx.side_bearing(self.view(), glyph_id)
    }
}
