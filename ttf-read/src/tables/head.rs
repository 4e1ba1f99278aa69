//! The [head](https://docs.microsoft.com/en-us/typography/opentype/spec/head) table

use types::{BoundingBox, Fixed, LongDateTime, Tag};

use crate::{FontData, FontRead, ReadError, TopLevelTable};

/// The value of [`Head::magic_number`] in a well formed font.
pub const MAGIC_NUMBER: u32 = 0x5F0F3CF5;

/// The [font header](https://docs.microsoft.com/en-us/typography/opentype/spec/head) table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Head {
    pub major_version: u16,
    pub minor_version: u16,
    pub font_revision: Fixed,
    pub checksum_adjustment: u32,
    pub magic_number: u32,
    pub flags: u16,
    /// Valid range is from 16 to 16384.
    pub units_per_em: u16,
    pub created: LongDateTime,
    pub modified: LongDateTime,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub mac_style: u16,
    /// Smallest readable size in pixels.
    pub lowest_rec_ppem: u16,
    /// Deprecated (set to 2).
    pub font_direction_hint: i16,
    /// 0 for short offsets (Offset16), 1 for long (Offset32).
    pub index_to_loc_format: i16,
    pub glyph_data_format: i16,
}

impl Head {
    /// The bounding box of all glyphs in the font.
    pub fn bbox(&self) -> BoundingBox<i16> {
        BoundingBox {
            x_min: self.x_min,
            y_min: self.y_min,
            x_max: self.x_max,
            y_max: self.y_max,
        }
    }

    /// `true` if the loca table uses 32-bit offsets.
    pub fn has_long_loca(&self) -> bool {
        self.index_to_loc_format == 1
    }
}

impl TopLevelTable for Head {
    const TAG: Tag = Tag::new(b"head");
}

impl FontRead<'_> for Head {
    fn read(data: FontData) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let head = Head {
            major_version: cursor.read()?,
            minor_version: cursor.read()?,
            font_revision: cursor.read()?,
            checksum_adjustment: cursor.read()?,
            magic_number: cursor.read()?,
            flags: cursor.read()?,
            units_per_em: cursor.read()?,
            created: cursor.read()?,
            modified: cursor.read()?,
            x_min: cursor.read()?,
            y_min: cursor.read()?,
            x_max: cursor.read()?,
            y_max: cursor.read()?,
            mac_style: cursor.read()?,
            lowest_rec_ppem: cursor.read()?,
            font_direction_hint: cursor.read()?,
            index_to_loc_format: cursor.read()?,
            glyph_data_format: cursor.read()?,
        };
        if !matches!(head.index_to_loc_format, 0 | 1) {
            return Err(ReadError::InvalidFormat(head.index_to_loc_format as i64));
        }
        if head.magic_number != MAGIC_NUMBER {
            log::warn!("unexpected head magic number 0x{:08X}", head.magic_number);
        }
        Ok(head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttf_test_data::BeBuffer;

    #[test]
    fn smoke_test() {
        let buf = BeBuffer::new()
            .extend([1u16, 0u16])
            .push(Fixed::from_f64(2.5))
            .extend([42u32, MAGIC_NUMBER])
            .extend([16u16, 2048]) // flags, upm
            .extend([LongDateTime::new(-500), LongDateTime::new(101)])
            .extend([-100i16, -50, 400, 711])
            .extend([0u16, 12]) // mac_style / ppem
            .extend([2i16, 1, 0]);

        let head = Head::read(FontData::new(&buf)).unwrap();
        assert_eq!((head.major_version, head.minor_version), (1, 0));
        assert_eq!(head.font_revision, Fixed::from_f64(2.5));
        assert_eq!(head.units_per_em, 2048);
        assert_eq!(head.created.as_secs(), -500);
        assert_eq!(head.modified.as_secs(), 101);
        assert_eq!(
            head.bbox(),
            BoundingBox {
                x_min: -100,
                y_min: -50,
                x_max: 400,
                y_max: 711
            }
        );
        assert_eq!(head.lowest_rec_ppem, 12);
        assert!(head.has_long_loca());
    }

    #[test]
    fn truncated() {
        let font = ttf_test_data::simple_font();
        let data = font.head();
        assert!(Head::read(FontData::new(&data)).is_ok());
        assert_eq!(
            Head::read(FontData::new(&data[..data.len() - 1])),
            Err(ReadError::OutOfBounds)
        );
    }

    #[test]
    fn bad_loca_format() {
        let mut data = ttf_test_data::simple_font().head();
        // indexToLocFormat is the second to last field
        let pos = data.len() - 3;
        data[pos] = 2;
        assert_eq!(
            Head::read(FontData::new(&data)),
            Err(ReadError::InvalidFormat(2))
        );
    }
}
