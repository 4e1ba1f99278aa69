//! Common [scalar data types][data types] used in TrueType font files
//!
//! [data types]: https://docs.microsoft.com/en-us/typography/opentype/spec/otff#data-types

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(any(feature = "std", test))]
#[macro_use]
extern crate std;

#[cfg(all(not(feature = "std"), not(test)))]
#[macro_use]
extern crate core as std;

mod bbox;
mod fixed;
mod glyph_id;
mod longdatetime;
mod point;
mod raw;
mod tag;


pub use bbox::BoundingBox;
pub use fixed::{F2Dot14, Fixed};
pub use glyph_id::GlyphId;
pub use longdatetime::LongDateTime;
pub use point::Point;
pub use raw::Scalar;
pub use tag::{InvalidTag, Tag};

/// The SFNT version for fonts containing TrueType outlines.
pub const TT_SFNT_VERSION: u32 = 0x00010000;

/// The legacy Apple SFNT version (`'true'`) for TrueType fonts.
pub const TRUE_SFNT_VERSION: u32 = 0x74727565;
