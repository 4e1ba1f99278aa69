//! The [maxp](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp) table

use types::Tag;

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// Version 0.5, used by fonts with CFF outlines.
pub const VERSION_0_5: u32 = 0x00005000;
/// Version 1.0, used by fonts with TrueType outlines.
pub const VERSION_1_0: u32 = 0x00010000;

/// The [maximum profile](https://docs.microsoft.com/en-us/typography/opentype/spec/maxp) table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Maxp {
    pub version: u32,
    /// The number of glyphs in the font.
    pub num_glyphs: u16,
    /// Only present in version 1.0.
    pub v1: Option<MaxpV1>,
}

/// The fields of a version 1.0 maxp table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaxpV1 {
    /// Maximum points in a non-composite glyph.
    pub max_points: u16,
    /// Maximum contours in a non-composite glyph.
    pub max_contours: u16,
    /// Maximum points in a composite glyph.
    pub max_composite_points: u16,
    /// Maximum contours in a composite glyph.
    pub max_composite_contours: u16,
    /// 1 if instructions do not use the twilight zone (Z0), or 2 if
    /// instructions do use Z0; should be set to 2 in most cases.
    pub max_zones: u16,
    pub max_twilight_points: u16,
    pub max_storage: u16,
    pub max_function_defs: u16,
    pub max_instruction_defs: u16,
    pub max_stack_elements: u16,
    pub max_size_of_instructions: u16,
    /// Maximum number of components referenced at "top level" for any
    /// composite glyph.
    pub max_component_elements: u16,
    /// Maximum levels of recursion; 1 for simple components.
    pub max_component_depth: u16,
}

impl TopLevelTable for Maxp {
    const TAG: Tag = Tag::new(b"maxp");
}

impl FontRead<'_> for Maxp {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let version: u32 = cursor.read()?;
        let num_glyphs = cursor.read()?;
        let v1 = match version {
            VERSION_0_5 => None,
            VERSION_1_0 => Some(MaxpV1 {
                max_points: cursor.read()?,
                max_contours: cursor.read()?,
                max_composite_points: cursor.read()?,
                max_composite_contours: cursor.read()?,
                max_zones: cursor.read()?,
                max_twilight_points: cursor.read()?,
                max_storage: cursor.read()?,
                max_function_defs: cursor.read()?,
                max_instruction_defs: cursor.read()?,
                max_stack_elements: cursor.read()?,
                max_size_of_instructions: cursor.read()?,
                max_component_elements: cursor.read()?,
                max_component_depth: cursor.read()?,
            }),
            other => return Err(ReadError::InvalidFormat(other as i64)),
        };
        Ok(Maxp {
            version,
            num_glyphs,
            v1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttf_test_data::{BeBuffer, SyntheticFont};

    #[test]
    fn version_1() {
        let data = ttf_test_data::simple_font().maxp();
        let maxp = Maxp::read(FontData::new(&data)).unwrap();
        assert_eq!(maxp.version, VERSION_1_0);
        assert_eq!(maxp.num_glyphs, 8);
        let v1 = maxp.v1.unwrap();
        // the 'A' glyph has the most points
        assert_eq!(v1.max_points, 8);
        assert_eq!(v1.max_contours, 2);
        assert_eq!(v1.max_zones, 2);
    }

    #[test]
    fn version_0_5() {
        let mut font = SyntheticFont::new().glyph(Vec::new(), 0);
        font.short_maxp = true;
        let data = font.maxp();
        assert_eq!(data.len(), 6);
        let maxp = Maxp::read(FontData::new(&data)).unwrap();
        assert_eq!(maxp.num_glyphs, 1);
        assert!(maxp.v1.is_none());
    }

    #[test]
    fn unknown_version() {
        let buf = BeBuffer::new().push(0x00020000u32).push(5u16);
        assert_eq!(
            Maxp::read(FontData::new(&buf)),
            Err(ReadError::InvalidFormat(0x00020000))
        );
    }
}
