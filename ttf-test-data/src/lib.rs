//! test data shared between the ttf crates.

pub mod bebuffer;
pub mod cmap;
pub mod synthetic;

pub use bebuffer::BeBuffer;
pub use synthetic::{simple_font, SyntheticFont};

/// A truncated font: a valid offset subtable claiming more table records
/// than are present.
#[rustfmt::skip]
pub static TRUNCATED_DIRECTORY: &[u8] = &[
    0x00, 0x01, 0x00, 0x00, // sfntVersion 1.0
    0x00, 0x02,             // numTables
    0x00, 0x20,             // searchRange
    0x00, 0x01,             // entrySelector
    0x00, 0x00,             // rangeShift
    b'c', b'm', b'a', b'p', // tableTag
    0x00, 0x00, 0x00, 0x00, // checksum
    0x00, 0x00, 0x00, 0x2C, // offset
];

/// An OpenType font with CFF outlines, which is not a TrueType font.
#[rustfmt::skip]
pub static CFF_HEADER: &[u8] = &[
    b'O', b'T', b'T', b'O', // sfntVersion
    0x00, 0x00,             // numTables
    0x00, 0x00,             // searchRange
    0x00, 0x00,             // entrySelector
    0x00, 0x00,             // rangeShift
];
