//! pretty printing implementation

use std::{fmt::Display, io::Write};

use ansi_term::{Color, Style};
use ttf_face::GlyphOutline;
use ttf_read::{
    tables::{
        cmap::{Cmap, Cmap4},
        head::Head,
        hhea::Hhea,
        maxp::Maxp,
    },
    ArenaView,
};

static MANY_SPACES: [u8; 200] = [0x20; 200];
// column at which field values start
const VALUE_COLUMN: usize = 28;
const BOX_WIDTH: usize = 76;

pub struct PrettyPrinter<'a> {
    depth: usize,
    line_pos: usize,
    is_tty: bool,
    indent_size: usize,
    writer: &'a mut (dyn std::io::Write + 'a),
}

impl std::io::Write for PrettyPrinter<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let len = self.writer.write(buf)?;
        let wrote_buf = &buf[..len];
        self.line_pos = match wrote_buf.iter().rev().position(|b| *b == b'\n') {
            Some(pos) => String::from_utf8_lossy(&wrote_buf[len - pos..])
                .chars()
                .count(),
            None => self.line_pos + String::from_utf8_lossy(wrote_buf).chars().count(),
        };
        Ok(len)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl<'a> PrettyPrinter<'a> {
    pub fn new(writer: &'a mut (dyn std::io::Write + 'a)) -> Self {
        PrettyPrinter {
            depth: 0,
            line_pos: 0,
            is_tty: atty::is(atty::Stream::Stdout),
            indent_size: 2,
            writer,
        }
    }

    fn print_rule(&mut self, left: char, right: char) -> std::io::Result<()> {
        write!(self, "{left}")?;
        for _ in 0..BOX_WIDTH {
            write!(self, "─")?;
        }
        writeln!(self, "{right}")
    }

    fn print_indent(&mut self) -> std::io::Result<()> {
        let indent_len = (self.depth * self.indent_size)
            .min(MANY_SPACES.len())
            .saturating_sub(1);
        write!(self, "│")?;
        self.write_all(&MANY_SPACES[..indent_len])
    }

    fn pad_to(&mut self, column: usize) -> std::io::Result<()> {
        let padding = column.saturating_sub(self.line_pos).min(MANY_SPACES.len());
        self.write_all(&MANY_SPACES[..padding.max(1)])
    }

    fn indented(
        &mut self,
        f: impl FnOnce(&mut PrettyPrinter) -> std::io::Result<()>,
    ) -> std::io::Result<()> {
        self.depth += 1;
        let r = f(self);
        self.depth -= 1;
        r
    }

    pub fn print_newline(&mut self) -> std::io::Result<()> {
        writeln!(self)
    }

    fn print_with_style(
        &mut self,
        style: Style,
        f: impl FnOnce(&mut PrettyPrinter) -> std::io::Result<()>,
    ) -> std::io::Result<()> {
        if !self.is_tty {
            f(self)?;
        } else {
            // ansi styles aren't counted for the purpose of width calculations
            let pos = self.line_pos;
            write!(self, "{}", style.prefix())?;
            self.line_pos = pos;
            f(self)?;
            let pos = self.line_pos;
            write!(self, "{}", style.suffix())?;
            self.line_pos = pos;
        }
        Ok(())
    }

    /// Prints a boxed section with a title.
    pub fn print_section(
        &mut self,
        title: impl Display,
        f: impl FnOnce(&mut PrettyPrinter) -> std::io::Result<()>,
    ) -> std::io::Result<()> {
        self.print_rule('┌', '┐')?;
        self.print_indent()?;
        self.print_with_style(Style::new().bold(), |this| write!(this, "{title}"))?;
        self.print_newline()?;
        self.indented(f)?;
        self.print_rule('└', '┘')
    }

    pub fn print_field(&mut self, name: &str, value: impl Display) -> std::io::Result<()> {
        self.print_indent()?;
        self.print_with_style(Color::Cyan.into(), |this| write!(this, "{name}"))?;
        write!(self, ":")?;
        self.pad_to(VALUE_COLUMN)?;
        writeln!(self, "{value}")
    }

    fn print_line(&mut self, line: impl Display) -> std::io::Result<()> {
        self.print_indent()?;
        writeln!(self, "{line}")
    }

    pub fn print_head(&mut self, head: &Head) -> std::io::Result<()> {
        self.print_section("head", |this| {
            this.print_field(
                "version",
                format_args!("{}.{}", head.major_version, head.minor_version),
            )?;
            this.print_field("fontRevision", head.font_revision)?;
            this.print_field(
                "checksumAdjustment",
                format_args!("0x{:08X}", head.checksum_adjustment),
            )?;
            this.print_field("flags", format_args!("0x{:04X}", head.flags))?;
            this.print_field("unitsPerEm", head.units_per_em)?;
            this.print_field("created", head.created.as_secs())?;
            this.print_field("modified", head.modified.as_secs())?;
            let bbox = head.bbox();
            this.print_field(
                "bounds",
                format_args!(
                    "({}, {}) ({}, {})",
                    bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max
                ),
            )?;
            this.print_field("macStyle", format_args!("0x{:04X}", head.mac_style))?;
            this.print_field("lowestRecPPEM", head.lowest_rec_ppem)?;
            this.print_field("indexToLocFormat", head.index_to_loc_format)
        })
    }

    pub fn print_maxp(&mut self, maxp: &Maxp) -> std::io::Result<()> {
        self.print_section("maxp", |this| {
            this.print_field("version", format_args!("0x{:08X}", maxp.version))?;
            this.print_field("numGlyphs", maxp.num_glyphs)?;
            if let Some(v1) = &maxp.v1 {
                this.print_field("maxPoints", v1.max_points)?;
                this.print_field("maxContours", v1.max_contours)?;
                this.print_field("maxCompositePoints", v1.max_composite_points)?;
                this.print_field("maxCompositeContours", v1.max_composite_contours)?;
                this.print_field("maxComponentElements", v1.max_component_elements)?;
                this.print_field("maxComponentDepth", v1.max_component_depth)?;
            }
            Ok(())
        })
    }

    pub fn print_hhea(&mut self, hhea: &Hhea) -> std::io::Result<()> {
        self.print_section("hhea", |this| {
            this.print_field("ascender", hhea.ascender)?;
            this.print_field("descender", hhea.descender)?;
            this.print_field("lineGap", hhea.line_gap)?;
            this.print_field("advanceWidthMax", hhea.advance_width_max)?;
            this.print_field("minLeftSideBearing", hhea.min_left_side_bearing)?;
            this.print_field("minRightSideBearing", hhea.min_right_side_bearing)?;
            this.print_field("xMaxExtent", hhea.x_max_extent)?;
            this.print_field("numberOfHMetrics", hhea.number_of_h_metrics)
        })
    }

    pub fn print_cmap(&mut self, cmap: Option<&Cmap>, view: ArenaView) -> std::io::Result<()> {
        let Some(cmap) = cmap else {
            return self.print_section("cmap", |this| this.print_line("no cmap table"));
        };
        self.print_section("cmap", |this| {
            this.print_field("version", cmap.version)?;
            for (i, record) in view.slice(cmap.encoding_records).iter().enumerate() {
                let selected = if cmap.selected_record == Some(i) {
                    " (selected)"
                } else {
                    ""
                };
                this.print_field(
                    &format!("encodingRecord[{i}]"),
                    format_args!(
                        "{:?} encoding {} at 0x{:X}{selected}",
                        record.platform(),
                        record.encoding_id,
                        record.subtable_offset
                    ),
                )?;
            }
            Ok(())
        })?;
        match &cmap.subtable {
            Some(subtable) => self.print_cmap4(subtable, view),
            None => Ok(()),
        }
    }

    fn print_cmap4(&mut self, subtable: &Cmap4, view: ArenaView) -> std::io::Result<()> {
        self.print_section("format 4", |this| {
            this.print_field("length", subtable.length)?;
            this.print_field("language", subtable.language)?;
            this.print_field("segCount", subtable.seg_count())?;
            this.print_field("searchRange", subtable.search_range)?;
            this.print_field("entrySelector", subtable.entry_selector)?;
            this.print_field("rangeShift", subtable.range_shift)?;
            this.print_field("glyphIdArray", view.slice(subtable.glyph_id_array).len())?;
            this.print_field("mappings", subtable.iter(view).count())?;
            this.print_line("segment  start   end     idDelta  idRangeOffset")?;
            for (i, segment) in subtable.segments(view).enumerate() {
                this.print_line(format_args!(
                    "{i:<8} U+{:04X} U+{:04X} {:<8} {}",
                    segment.start_code,
                    segment.end_code,
                    segment.id_delta,
                    segment.id_range_offset
                ))?;
            }
            Ok(())
        })
    }

    pub fn print_outline(
        &mut self,
        outline: &GlyphOutline,
        codepoint: Option<char>,
        advance: Option<u16>,
        lsb: Option<i16>,
    ) -> std::io::Result<()> {
        let title = match codepoint {
            Some(ch) => format!("{} ('{}')", outline.glyph_id, ch.escape_default()),
            None => outline.glyph_id.to_string(),
        };
        self.print_section(title, |this| {
            let bounds = outline.bounds;
            this.print_field(
                "#contours",
                format_args!(
                    "{} ({}, {}) ({}, {})",
                    outline.contours.len(),
                    bounds.x_min,
                    bounds.y_min,
                    bounds.x_max,
                    bounds.y_max
                ),
            )?;
            this.print_field("#points", outline.points.len())?;
            if let Some(advance) = advance {
                this.print_field("advance", advance)?;
            }
            if let Some(lsb) = lsb {
                this.print_field("lsb", lsb)?;
            }
            let mut index = 0;
            for (i, contour) in outline.contour_points().enumerate() {
                this.print_line(format_args!("contour {i}"))?;
                for point in contour {
                    let kind = if outline.is_on_curve(index) {
                        "on"
                    } else {
                        "off"
                    };
                    this.indented(|this| {
                        this.print_line(format_args!(
                            "{index:>4}: ({}, {}) {kind}",
                            point.x, point.y
                        ))
                    })?;
                    index += 1;
                }
            }
            Ok(())
        })
    }
}
