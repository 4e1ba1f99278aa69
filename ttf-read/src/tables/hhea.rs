//! The [hhea](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea) table

use types::Tag;

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// The [horizontal header](https://docs.microsoft.com/en-us/typography/opentype/spec/hhea) table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hhea {
    pub major_version: u16,
    pub minor_version: u16,
    /// Typographic ascent.
    pub ascender: i16,
    /// Typographic descent.
    pub descender: i16,
    /// Typographic line gap. Negative values are treated as zero.
    pub line_gap: i16,
    /// Maximum advance width value in 'hmtx' table.
    pub advance_width_max: u16,
    /// Minimum left sidebearing value in 'hmtx' table for glyphs with
    /// contours (empty glyphs should be ignored).
    pub min_left_side_bearing: i16,
    pub min_right_side_bearing: i16,
    /// Max(lsb + (xMax - xMin)).
    pub x_max_extent: i16,
    pub caret_slope_rise: i16,
    pub caret_slope_run: i16,
    pub caret_offset: i16,
    /// 0 for current format.
    pub metric_data_format: i16,
    /// Number of hMetric entries in 'hmtx' table
    pub number_of_h_metrics: u16,
}

impl TopLevelTable for Hhea {
    const TAG: Tag = Tag::new(b"hhea");
}

impl FontRead<'_> for Hhea {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let major_version = cursor.read()?;
        let minor_version = cursor.read()?;
        let ascender = cursor.read()?;
        let descender = cursor.read()?;
        let line_gap = cursor.read()?;
        let advance_width_max = cursor.read()?;
        let min_left_side_bearing = cursor.read()?;
        let min_right_side_bearing = cursor.read()?;
        let x_max_extent = cursor.read()?;
        let caret_slope_rise = cursor.read()?;
        let caret_slope_run = cursor.read()?;
        let caret_offset = cursor.read()?;
        // four reserved int16
        cursor.advance_by(8);
        Ok(Hhea {
            major_version,
            minor_version,
            ascender,
            descender,
            line_gap,
            advance_width_max,
            min_left_side_bearing,
            min_right_side_bearing,
            x_max_extent,
            caret_slope_rise,
            caret_slope_run,
            caret_offset,
            metric_data_format: cursor.read()?,
            number_of_h_metrics: cursor.read()?,
        })
    }
}
