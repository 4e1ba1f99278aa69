//! A builder for small but complete TrueType fonts.
//!
//! [`SyntheticFont`] assembles head, maxp, hhea, hmtx, loca, cmap and glyf
//! into an SFNT buffer with a valid table directory. Glyph records and cmap
//! subtables are encoded with the free functions in this module, so tests can
//! also feed them to the individual table readers.

use ttf_types::{BoundingBox, F2Dot14, Tag, TT_SFNT_VERSION};

use crate::bebuffer::BeBuffer;

const ON_CURVE_POINT: u8 = 0x01;
const X_SHORT_VECTOR: u8 = 0x02;
const Y_SHORT_VECTOR: u8 = 0x04;
const REPEAT_FLAG: u8 = 0x08;
const X_IS_SAME_OR_POSITIVE: u8 = 0x10;
const Y_IS_SAME_OR_POSITIVE: u8 = 0x20;

const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const ARGS_ARE_XY_VALUES: u16 = 0x0002;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;
const WE_HAVE_INSTRUCTIONS: u16 = 0x0100;

/// A point in a simple glyph contour: `(x, y, on_curve)`.
pub type ContourPoint = (i16, i16, bool);

/// Glyph ids of the glyphs in [`simple_font`].
pub mod glyphs {
    /// A rectangle.
    pub const NOTDEF: u16 = 0;
    /// No outline.
    pub const SPACE: u16 = 1;
    /// Two contours and an instruction block.
    pub const SQUARE_WITH_HOLE: u16 = 2;
    /// Mixed on and off curve points using every coordinate encoding.
    pub const LETTER_A: u16 = 3;
    /// [`LETTER_A`] translated by (100, -50).
    pub const SHIFTED_A: u16 = 4;
    /// A scaled [`SQUARE_WITH_HOLE`] and a [`SHIFTED_A`], so two levels deep.
    pub const NESTED: u16 = 5;
    /// Positions its second component by point matching.
    pub const POINT_MATCHING: u16 = 6;
    /// A component that references itself.
    pub const SELF_REFERENCE: u16 = 7;
    pub const COUNT: u16 = 8;
}

/// The points of [`glyphs::LETTER_A`], one slice per contour.
pub const LETTER_A_CONTOURS: [&[ContourPoint]; 2] = [
    &[
        (0, 0, true),
        (300, 700, true),
        (600, 0, true),
        (450, 0, false),
        (300, 0, false),
    ],
    &[(200, 200, true), (400, 200, true), (300, 400, true)],
];

/// The points of [`glyphs::SQUARE_WITH_HOLE`].
pub const SQUARE_WITH_HOLE_CONTOURS: [&[ContourPoint]; 2] = [
    &[(0, 0, true), (0, 600, true), (600, 600, true), (600, 0, true)],
    &[
        (150, 150, true),
        (450, 150, true),
        (450, 450, true),
        (150, 450, true),
    ],
];

/// The transform applied to a component.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transform {
    None,
    Scale(f32),
    XYScale(f32, f32),
    /// `(xx, yx, xy, yy)`, in file order.
    TwoByTwo(f32, f32, f32, f32),
}

/// One component of a composite glyph.
#[derive(Clone, Debug, PartialEq)]
pub struct Component {
    pub glyph: u16,
    pub args: (i16, i16),
    pub transform: Transform,
    /// The args are point numbers rather than an offset.
    pub point_matching: bool,
    /// Encode the args as words even if they fit in a byte.
    pub word_args: bool,
}

impl Component {
    /// A component positioned by an `(dx, dy)` offset.
    pub fn offset(glyph: u16, dx: i16, dy: i16) -> Self {
        Self {
            glyph,
            args: (dx, dy),
            transform: Transform::None,
            point_matching: false,
            word_args: false,
        }
    }

    /// A component positioned by aligning `child_point` with `parent_point`.
    pub fn matching_points(glyph: u16, parent_point: u16, child_point: u16) -> Self {
        Self {
            glyph,
            args: (parent_point as i16, child_point as i16),
            transform: Transform::None,
            point_matching: true,
            word_args: false,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn words(mut self) -> Self {
        self.word_args = true;
        self
    }
}

/// Encodes a simple glyph record.
///
/// Flags are run-length compressed and each coordinate delta uses the
/// smallest encoding that holds it.
pub fn simple_glyph(contours: &[&[ContourPoint]], instructions: &[u8]) -> Vec<u8> {
    let points = contours.iter().flat_map(|c| c.iter().copied());
    let bbox = points
        .clone()
        .fold(None, |acc: Option<BoundingBox<i16>>, (x, y, _)| {
            Some(match acc {
                None => BoundingBox {
                    x_min: x,
                    y_min: y,
                    x_max: x,
                    y_max: y,
                },
                Some(b) => BoundingBox {
                    x_min: b.x_min.min(x),
                    y_min: b.y_min.min(y),
                    x_max: b.x_max.max(x),
                    y_max: b.y_max.max(y),
                },
            })
        })
        .unwrap_or_default();

    let mut flags = Vec::new();
    let mut x_data = Vec::new();
    let mut y_data = Vec::new();
    let (mut last_x, mut last_y) = (0i32, 0i32);
    for (x, y, on_curve) in points {
        let mut flag = if on_curve { ON_CURVE_POINT } else { 0 };
        encode_delta(
            x as i32 - last_x,
            X_SHORT_VECTOR,
            X_IS_SAME_OR_POSITIVE,
            &mut flag,
            &mut x_data,
        );
        encode_delta(
            y as i32 - last_y,
            Y_SHORT_VECTOR,
            Y_IS_SAME_OR_POSITIVE,
            &mut flag,
            &mut y_data,
        );
        flags.push(flag);
        (last_x, last_y) = (x as i32, y as i32);
    }

    let mut end = 0u16;
    let end_points = contours.iter().map(|contour| {
        end += contour.len() as u16;
        end.wrapping_sub(1)
    });
    BeBuffer::new()
        .push(contours.len() as i16)
        .extend([bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max])
        .extend(end_points)
        .push(instructions.len() as u16)
        .extend_bytes(instructions)
        .extend_bytes(&compress_flags(&flags))
        .extend_bytes(&x_data)
        .extend_bytes(&y_data)
        .into_vec()
}

fn encode_delta(delta: i32, short_bit: u8, same_bit: u8, flag: &mut u8, out: &mut Vec<u8>) {
    if delta == 0 {
        *flag |= same_bit;
    } else if delta.unsigned_abs() <= 255 {
        *flag |= short_bit;
        if delta > 0 {
            *flag |= same_bit;
        }
        out.push(delta.unsigned_abs() as u8);
    } else {
        out.extend((delta as i16).to_be_bytes());
    }
}

fn compress_flags(flags: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(flags.len());
    let mut rest = flags;
    while let Some(&flag) = rest.first() {
        let run = rest.iter().take(256).take_while(|f| **f == flag).count();
        if run > 1 {
            out.push(flag | REPEAT_FLAG);
            out.push((run - 1) as u8);
        } else {
            out.push(flag);
        }
        rest = &rest[run..];
    }
    out
}

/// Encodes a composite glyph record.
///
/// The bounding box is not computed from the components and must be
/// supplied.
pub fn composite_glyph(
    bbox: BoundingBox<i16>,
    components: &[Component],
    instructions: &[u8],
) -> Vec<u8> {
    let mut buf = BeBuffer::new()
        .push(-1i16)
        .extend([bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max]);
    for (i, component) in components.iter().enumerate() {
        let (arg1, arg2) = component.args;
        let fits_in_byte = if component.point_matching {
            u8::try_from(arg1).is_ok() && u8::try_from(arg2).is_ok()
        } else {
            i8::try_from(arg1).is_ok() && i8::try_from(arg2).is_ok()
        };
        let words = component.word_args || !fits_in_byte;

        let mut flags = 0u16;
        if words {
            flags |= ARG_1_AND_2_ARE_WORDS;
        }
        if !component.point_matching {
            flags |= ARGS_ARE_XY_VALUES;
        }
        flags |= match component.transform {
            Transform::None => 0,
            Transform::Scale(_) => WE_HAVE_A_SCALE,
            Transform::XYScale(..) => WE_HAVE_AN_X_AND_Y_SCALE,
            Transform::TwoByTwo(..) => WE_HAVE_A_TWO_BY_TWO,
        };
        if i + 1 < components.len() {
            flags |= MORE_COMPONENTS;
        } else if !instructions.is_empty() {
            flags |= WE_HAVE_INSTRUCTIONS;
        }

        buf = buf.push(flags).push(component.glyph);
        buf = match (words, component.point_matching) {
            (true, _) => buf.push(arg1).push(arg2),
            (false, true) => buf.push(arg1 as u8).push(arg2 as u8),
            (false, false) => buf.push(arg1 as i8).push(arg2 as i8),
        };
        buf = match component.transform {
            Transform::None => buf,
            Transform::Scale(scale) => buf.push(F2Dot14::from_f32(scale)),
            Transform::XYScale(x, y) => buf.extend([x, y].map(F2Dot14::from_f32)),
            Transform::TwoByTwo(xx, yx, xy, yy) => {
                buf.extend([xx, yx, xy, yy].map(F2Dot14::from_f32))
            }
        };
    }
    if !instructions.is_empty() {
        buf = buf
            .push(instructions.len() as u16)
            .extend_bytes(instructions);
    }
    buf.into_vec()
}

/// How the codepoints of a format 4 segment map to glyphs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SegmentGlyphs {
    /// Consecutive glyphs starting at the given id, encoded with `idDelta`.
    Delta(u16),
    /// One entry per codepoint, encoded through `idRangeOffset`.
    Array(Vec<u16>),
}

/// A segment of a format 4 subtable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CmapSegment {
    pub start: u16,
    pub end: u16,
    pub glyphs: SegmentGlyphs,
}

/// Maps `start..=end` to consecutive glyphs beginning at `first_glyph`.
pub fn map_range(start: u16, end: u16, first_glyph: u16) -> CmapSegment {
    CmapSegment {
        start,
        end,
        glyphs: SegmentGlyphs::Delta(first_glyph),
    }
}

/// Maps codepoints starting at `start` to the given glyphs, through the
/// glyph id array.
pub fn map_array(start: u16, glyphs: &[u16]) -> CmapSegment {
    CmapSegment {
        start,
        end: start + glyphs.len().saturating_sub(1) as u16,
        glyphs: SegmentGlyphs::Array(glyphs.to_vec()),
    }
}

/// Encodes a format 4 subtable.
///
/// Segments must be sorted. The final 0xFFFF segment is added if missing.
pub fn cmap_format4(segments: &[CmapSegment]) -> Vec<u8> {
    let mut segments = segments.to_vec();
    if segments.last().map(|seg| seg.end) != Some(0xFFFF) {
        segments.push(map_range(0xFFFF, 0xFFFF, 0));
    }
    let seg_count = segments.len() as u16;
    let entry_selector = seg_count.checked_ilog2().unwrap_or(0) as u16;
    let search_range = 2 << entry_selector;

    let mut deltas = Vec::new();
    let mut range_offsets = Vec::new();
    let mut glyph_ids: Vec<u16> = Vec::new();
    for (i, segment) in segments.iter().enumerate() {
        match &segment.glyphs {
            SegmentGlyphs::Delta(first) => {
                deltas.push(first.wrapping_sub(segment.start));
                range_offsets.push(0u16);
            }
            SegmentGlyphs::Array(ids) => {
                deltas.push(0);
                // distance from this idRangeOffset entry to its first glyph id
                let words = seg_count as usize - i + glyph_ids.len();
                range_offsets.push((words * 2) as u16);
                glyph_ids.extend(ids);
            }
        }
    }

    let length = 16 + 8 * seg_count + 2 * glyph_ids.len() as u16;
    BeBuffer::new()
        .push(4u16)
        .push(length)
        .push(0u16) // language
        .push(seg_count * 2)
        .push(search_range)
        .push(entry_selector)
        .push(seg_count * 2 - search_range)
        .extend(segments.iter().map(|seg| seg.end))
        .push(0u16) // reservedPad
        .extend(segments.iter().map(|seg| seg.start))
        .extend(deltas)
        .extend(range_offsets)
        .extend(glyph_ids)
        .into_vec()
}

/// Encodes a format 6 (trimmed table) subtable.
pub fn cmap_format6(first_code: u16, glyphs: &[u16]) -> Vec<u8> {
    BeBuffer::new()
        .push(6u16)
        .push(10 + 2 * glyphs.len() as u16)
        .push(0u16) // language
        .push(first_code)
        .push(glyphs.len() as u16)
        .extend(glyphs.iter().copied())
        .into_vec()
}

/// A cmap subtable and the encoding record that points at it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CmapSubtable {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub data: Vec<u8>,
}

/// Encodes a cmap table from its subtables, in record order.
pub fn cmap_table(subtables: &[CmapSubtable]) -> Vec<u8> {
    let mut buf = BeBuffer::new()
        .push(0u16)
        .push(subtables.len() as u16);
    let mut offset = 4 + 8 * subtables.len();
    for subtable in subtables {
        buf = buf
            .push(subtable.platform_id)
            .push(subtable.encoding_id)
            .push(offset as u32);
        offset += subtable.data.len();
    }
    for subtable in subtables {
        buf = buf.extend_bytes(&subtable.data);
    }
    buf.into_vec()
}

/// The sum of the table as big-endian u32 words, zero padded.
pub fn table_checksum(data: &[u8]) -> u32 {
    data.chunks(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            u32::from_be_bytes(word)
        })
        .fold(0u32, u32::wrapping_add)
}

#[derive(Clone, Debug)]
struct GlyphEntry {
    data: Vec<u8>,
    advance: u16,
}

impl GlyphEntry {
    fn num_contours(&self) -> i16 {
        read_i16(&self.data, 0)
    }

    fn bbox(&self) -> Option<BoundingBox<i16>> {
        (self.data.len() >= 10).then(|| BoundingBox {
            x_min: read_i16(&self.data, 2),
            y_min: read_i16(&self.data, 4),
            x_max: read_i16(&self.data, 6),
            y_max: read_i16(&self.data, 8),
        })
    }

    fn num_points(&self) -> u16 {
        match self.num_contours() {
            n if n > 0 => (read_i16(&self.data, 10 + 2 * (n as usize - 1)) as u16).wrapping_add(1),
            _ => 0,
        }
    }
}

fn read_i16(data: &[u8], pos: usize) -> i16 {
    data.get(pos..pos + 2)
        .map(|b| i16::from_be_bytes([b[0], b[1]]))
        .unwrap_or_default()
}

/// Assembles a TrueType font from glyph records and cmap subtables.
#[derive(Clone, Debug)]
pub struct SyntheticFont {
    pub sfnt_version: u32,
    pub units_per_em: u16,
    pub ascent: i16,
    pub descent: i16,
    pub line_gap: i16,
    /// Use 32-bit loca offsets.
    pub long_loca: bool,
    /// Write a version 0.5 maxp, without the per-glyph maxima.
    pub short_maxp: bool,
    /// Number of long metrics in hmtx; all glyphs if `None`. Advances of
    /// glyphs past this count are not written.
    pub num_long_metrics: Option<u16>,
    pub cmap_subtables: Vec<CmapSubtable>,
    /// Tables to leave out of the font.
    pub omitted: Vec<Tag>,
    glyphs: Vec<GlyphEntry>,
}

impl Default for SyntheticFont {
    fn default() -> Self {
        Self {
            sfnt_version: TT_SFNT_VERSION,
            units_per_em: 1000,
            ascent: 800,
            descent: -200,
            line_gap: 90,
            long_loca: false,
            short_maxp: false,
            num_long_metrics: None,
            cmap_subtables: Vec::new(),
            omitted: Vec::new(),
            glyphs: Vec::new(),
        }
    }
}

impl SyntheticFont {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a glyph record, which may be empty.
    pub fn glyph(mut self, data: Vec<u8>, advance: u16) -> Self {
        self.glyphs.push(GlyphEntry { data, advance });
        self
    }

    pub fn cmap_subtable(mut self, platform_id: u16, encoding_id: u16, data: Vec<u8>) -> Self {
        self.cmap_subtables.push(CmapSubtable {
            platform_id,
            encoding_id,
            data,
        });
        self
    }

    pub fn without_table(mut self, tag: Tag) -> Self {
        self.omitted.push(tag);
        self
    }

    pub fn num_glyphs(&self) -> u16 {
        self.glyphs.len() as u16
    }

    fn index_to_loc_format(&self) -> i16 {
        self.long_loca as i16
    }

    fn font_bbox(&self) -> BoundingBox<i16> {
        self.glyphs
            .iter()
            .filter_map(GlyphEntry::bbox)
            .reduce(|a, b| BoundingBox {
                x_min: a.x_min.min(b.x_min),
                y_min: a.y_min.min(b.y_min),
                x_max: a.x_max.max(b.x_max),
                y_max: a.y_max.max(b.y_max),
            })
            .unwrap_or_default()
    }

    /// The encoded head table. The checksum adjustment is left at zero.
    pub fn head(&self) -> Vec<u8> {
        let bbox = self.font_bbox();
        BeBuffer::new()
            .push(0x00010000u32) // version
            .push(0x00018000u32) // fontRevision 1.5
            .push(0u32) // checkSumAdjustment
            .push(0x5F0F3CF5u32) // magicNumber
            .push(0x000Bu16) // flags
            .push(self.units_per_em)
            .push(3_600_000_000i64) // created
            .push(3_700_000_000i64) // modified
            .extend([bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max])
            .push(0u16) // macStyle
            .push(8u16) // lowestRecPPEM
            .push(2i16) // fontDirectionHint
            .push(self.index_to_loc_format())
            .push(0i16) // glyphDataFormat
            .into_vec()
    }

    pub fn maxp(&self) -> Vec<u8> {
        if self.short_maxp {
            return BeBuffer::new()
                .push(0x00005000u32)
                .push(self.num_glyphs())
                .into_vec();
        }
        let max_points = self.glyphs.iter().map(GlyphEntry::num_points).max();
        let max_contours = self.glyphs.iter().map(GlyphEntry::num_contours).max();
        let has_composites = self.glyphs.iter().any(|g| g.num_contours() < 0);
        BeBuffer::new()
            .push(0x00010000u32)
            .push(self.num_glyphs())
            .push(max_points.unwrap_or_default())
            .push(max_contours.unwrap_or_default().max(0) as u16)
            .push(0u16) // maxCompositePoints
            .push(0u16) // maxCompositeContours
            .push(2u16) // maxZones
            .push(0u16) // maxTwilightPoints
            .push(0u16) // maxStorage
            .push(0u16) // maxFunctionDefs
            .push(0u16) // maxInstructionDefs
            .push(64u16) // maxStackElements
            .push(16u16) // maxSizeOfInstructions
            .push(if has_composites { 2u16 } else { 0 }) // maxComponentElements
            .push(if has_composites { 2u16 } else { 0 }) // maxComponentDepth
            .into_vec()
    }

    fn long_metric_count(&self) -> u16 {
        self.num_long_metrics
            .unwrap_or(self.num_glyphs())
            .min(self.num_glyphs())
    }

    pub fn hhea(&self) -> Vec<u8> {
        let bbox = self.font_bbox();
        let advance_max = self.glyphs.iter().map(|g| g.advance).max();
        BeBuffer::new()
            .push(0x00010000u32)
            .push(self.ascent)
            .push(self.descent)
            .push(self.line_gap)
            .push(advance_max.unwrap_or_default())
            .push(bbox.x_min) // minLeftSideBearing
            .push(0i16) // minRightSideBearing
            .push(bbox.x_max) // xMaxExtent
            .push(1i16) // caretSlopeRise
            .push(0i16) // caretSlopeRun
            .push(0i16) // caretOffset
            .extend([0i16; 4])
            .push(0i16) // metricDataFormat
            .push(self.long_metric_count())
            .into_vec()
    }

    pub fn hmtx(&self) -> Vec<u8> {
        let num_long = self.long_metric_count() as usize;
        let lsb = |g: &GlyphEntry| g.bbox().map(|b| b.x_min).unwrap_or_default();
        let mut buf = BeBuffer::new();
        for glyph in &self.glyphs[..num_long] {
            buf = buf.push(glyph.advance).push(lsb(glyph));
        }
        buf.extend(self.glyphs[num_long..].iter().map(lsb))
            .into_vec()
    }

    /// The encoded loca and glyf tables.
    pub fn loca_and_glyf(&self) -> (Vec<u8>, Vec<u8>) {
        let mut glyf = Vec::new();
        let mut offsets = vec![0u32];
        for glyph in &self.glyphs {
            glyf.extend_from_slice(&glyph.data);
            // short offsets are stored divided by two
            if glyf.len() % 2 != 0 {
                glyf.push(0);
            }
            offsets.push(glyf.len() as u32);
        }
        let loca = if self.long_loca {
            BeBuffer::new().extend(offsets)
        } else {
            BeBuffer::new().extend(offsets.into_iter().map(|off| (off / 2) as u16))
        };
        (loca.into_vec(), glyf)
    }

    pub fn cmap(&self) -> Vec<u8> {
        cmap_table(&self.cmap_subtables)
    }

    /// All tables, sorted by tag.
    pub fn tables(&self) -> Vec<(Tag, Vec<u8>)> {
        let (loca, glyf) = self.loca_and_glyf();
        [
            (Tag::new(b"cmap"), self.cmap()),
            (Tag::new(b"glyf"), glyf),
            (Tag::new(b"head"), self.head()),
            (Tag::new(b"hhea"), self.hhea()),
            (Tag::new(b"hmtx"), self.hmtx()),
            (Tag::new(b"loca"), loca),
            (Tag::new(b"maxp"), self.maxp()),
        ]
        .into_iter()
        .filter(|(tag, _)| !self.omitted.contains(tag))
        .collect()
    }

    /// Builds the font file.
    pub fn build(&self) -> Vec<u8> {
        let tables = self.tables();
        let num_tables = tables.len() as u16;
        let entry_selector = num_tables.checked_ilog2().unwrap_or(0) as u16;
        let search_range = 16 << entry_selector;

        let mut directory = BeBuffer::new()
            .push(self.sfnt_version)
            .push(num_tables)
            .push(search_range)
            .push(entry_selector)
            .push((num_tables * 16).saturating_sub(search_range));
        let mut offset = 12 + 16 * tables.len();
        let mut head_offset = None;
        for (tag, data) in &tables {
            if *tag == Tag::new(b"head") {
                head_offset = Some(offset);
            }
            directory = directory
                .push(*tag)
                .push(table_checksum(data))
                .push(offset as u32)
                .push(data.len() as u32);
            offset += data.len().next_multiple_of(4);
        }

        let mut font = directory.into_vec();
        for (_, data) in &tables {
            font.extend_from_slice(data);
            font.resize(font.len().next_multiple_of(4), 0);
        }
        if let Some(head) = head_offset {
            let adjustment = 0xB1B0AFBAu32.wrapping_sub(table_checksum(&font));
            font[head + 8..head + 12].copy_from_slice(&adjustment.to_be_bytes());
        }
        font
    }
}

/// The cmap used by [`simple_font`].
///
/// ' ' maps to [`glyphs::SPACE`], 'A'..='C' map through the glyph id array to
/// 3, 4 and 0, and 'a'..='f' map to glyphs 2 through 7.
pub fn simple_cmap4() -> Vec<u8> {
    cmap_format4(&[
        map_range(0x20, 0x20, glyphs::SPACE),
        map_array(0x41, &[glyphs::LETTER_A, glyphs::SHIFTED_A, 0]),
        map_range(0x61, 0x66, glyphs::SQUARE_WITH_HOLE),
    ])
}

/// A small font exercising every supported glyph encoding.
///
/// The cmap has a Macintosh format 6 subtable ahead of the Windows format 4
/// one. hmtx holds five long metrics, so glyphs 5 and up share the advance
/// of [`glyphs::SHIFTED_A`].
pub fn simple_font() -> SyntheticFont {
    let notdef = simple_glyph(
        &[&[(50, 0, true), (50, 700, true), (450, 700, true), (450, 0, true)]],
        &[],
    );
    let square = simple_glyph(&SQUARE_WITH_HOLE_CONTOURS, &[0xB0, 0x00]);
    let letter_a = simple_glyph(&LETTER_A_CONTOURS, &[]);
    let shifted_a = composite_glyph(
        BoundingBox {
            x_min: 100,
            y_min: -50,
            x_max: 700,
            y_max: 650,
        },
        &[Component::offset(glyphs::LETTER_A, 100, -50)],
        &[],
    );
    let nested = composite_glyph(
        BoundingBox {
            x_min: 10,
            y_min: 20,
            x_max: 700,
            y_max: 950,
        },
        &[
            Component::offset(glyphs::SQUARE_WITH_HOLE, 10, 20).with_transform(Transform::Scale(0.5)),
            Component::offset(glyphs::SHIFTED_A, 0, 300).words(),
        ],
        &[0xB0, 0x01],
    );
    let point_matching = composite_glyph(
        BoundingBox {
            x_min: 50,
            y_min: 0,
            x_max: 450,
            y_max: 700,
        },
        &[
            Component::offset(glyphs::NOTDEF, 0, 0),
            Component::matching_points(glyphs::LETTER_A, 2, 0),
        ],
        &[],
    );
    let self_reference = composite_glyph(
        BoundingBox::default(),
        &[Component::offset(glyphs::SELF_REFERENCE, 0, 0)],
        &[],
    );

    let mut font = SyntheticFont::new()
        .glyph(notdef, 500)
        .glyph(Vec::new(), 250)
        .glyph(square, 600)
        .glyph(letter_a, 600)
        .glyph(shifted_a, 700)
        .glyph(nested, 700)
        .glyph(point_matching, 500)
        .glyph(self_reference, 500)
        .cmap_subtable(1, 0, cmap_format6(0x41, &[glyphs::LETTER_A]))
        .cmap_subtable(3, 1, simple_cmap4());
    font.num_long_metrics = Some(5);
    font
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_runs_are_compressed() {
        let flags = [1, 1, 1, 0x21, 1];
        assert_eq!(compress_flags(&flags), [1 | REPEAT_FLAG, 2, 0x21, 1]);
        let long_run = [0x33; 300];
        assert_eq!(
            compress_flags(&long_run),
            [0x3B, 255, 0x3B, 43],
            "runs longer than 256 are split"
        );
    }

    #[test]
    fn simple_glyph_header() {
        let data = simple_glyph(&LETTER_A_CONTOURS, &[]);
        assert_eq!(read_i16(&data, 0), 2);
        assert_eq!(read_i16(&data, 6), 600);
        assert_eq!(read_i16(&data, 8), 700);
        // end points
        assert_eq!(read_i16(&data, 10), 4);
        assert_eq!(read_i16(&data, 12), 7);
        // no instructions
        assert_eq!(read_i16(&data, 14), 0);
    }

    #[test]
    fn format4_array_segment_offsets() {
        let data = cmap_format4(&[map_array(0x41, &[3, 4])]);
        // two segments including the terminator
        assert_eq!(read_i16(&data, 6), 4);
        // idRangeOffset[0] points just past the idRangeOffset array
        let range_offsets = 16 + 3 * 4;
        assert_eq!(read_i16(&data, range_offsets), 4);
        assert_eq!(read_i16(&data, range_offsets + 4), 3);
        assert_eq!(read_i16(&data, 2) as usize, data.len());
    }

    #[test]
    fn directory_checksums() {
        let font = simple_font().build();
        assert_eq!(&font[..4], &[0, 1, 0, 0]);
        assert_eq!(read_i16(&font, 4), 7);
        // searchRange, entrySelector, rangeShift
        assert_eq!(read_i16(&font, 6), 64);
        assert_eq!(read_i16(&font, 8), 2);
        assert_eq!(read_i16(&font, 10), 48);
        // the whole font sums to the magic value once adjusted
        assert_eq!(table_checksum(&font), 0xB1B0AFBA);
    }
}
