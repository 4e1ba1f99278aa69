//! cmap test data for scenarios the synthetic builder does not produce

use crate::{be_buffer, bebuffer::BeBuffer};

/// A format 4 subtable with a glyph id array, written out by hand.
///
/// 'a'..='c' map through the array to 10, 0 (explicitly unmapped) and 12,
/// with an idDelta of 5 applied to non-zero entries. 'x'..='z' map by delta
/// to 20..=22.
pub fn cmap4_with_glyph_array() -> BeBuffer {
    // <https://learn.microsoft.com/en-us/typography/opentype/spec/cmap#format-4-segment-mapping-to-delta-values>
    be_buffer! {
      4_u16,                      // uint16	format
      {0_u16: "length"},          // uint16	length
      0_u16,                      // uint16	language
      6_u16,                      // uint16	segCountX2, 2 * 3 segments
      4_u16,                      // uint16	searchRange
      1_u16,                      // uint16	entrySelector
      2_u16,                      // uint16	rangeShift

      // segCount endCode entries
      0x63_u16,                   // uint16	endCode[0]
      0x7A_u16,                   // uint16	endCode[1]
      0xFFFF_u16,                 // uint16	endCode[2]

      0_u16,                      // uint16	reservedPad

      // segCount startCode entries
      0x61_u16,                   // uint16	startCode[0]
      0x78_u16,                   // uint16	startCode[1]
      0xFFFF_u16,                 // uint16	startCode[2]

      // segCount idDelta entries
      5_u16,                      // int16	idDelta[0]
      (20_u16.wrapping_sub(0x78)),// int16	idDelta[1]
      1_u16,                      // int16	idDelta[2]

      // segCount idRangeOffset entries
      6_u16,                      // uint16	idRangeOffset[0], 3 words to the glyph array
      0_u16,                      // uint16	idRangeOffset[1]
      0_u16,                      // uint16	idRangeOffset[2]

      // glyphIdArray
      [5_u16, 0, 7]
    }
}

/// A format 4 subtable whose idRangeOffset points past the glyph id array.
///
/// Codepoints 0x30..=0x31 resolve to array indices 2 and 3 of an array
/// with a single entry.
pub fn cmap4_range_offset_past_end() -> BeBuffer {
    be_buffer! {
      4_u16,                      // uint16	format
      34_u16,                     // uint16	length
      0_u16,                      // uint16	language
      4_u16,                      // uint16	segCountX2, 2 * 2 segments
      4_u16,                      // uint16	searchRange
      1_u16,                      // uint16	entrySelector
      0_u16,                      // uint16	rangeShift

      0x31_u16,                   // uint16	endCode[0]
      0xFFFF_u16,                 // uint16	endCode[1]
      0_u16,                      // uint16	reservedPad
      0x30_u16,                   // uint16	startCode[0]
      0xFFFF_u16,                 // uint16	startCode[1]
      0_u16,                      // int16	idDelta[0]
      1_u16,                      // int16	idDelta[1]
      8_u16,                      // uint16	idRangeOffset[0]
      0_u16,                      // uint16	idRangeOffset[1]

      // glyphIdArray
      9_u16
    }
}

/// A format 0 (byte encoding) subtable, which is not decoded.
pub fn cmap0_subtable() -> BeBuffer {
    let buf = be_buffer! {
      0_u16,                      // uint16	format
      262_u16,                    // uint16	length
      0_u16                       // uint16	language
    };
    buf.extend((0..=255u8).map(|b| b / 2))
}
