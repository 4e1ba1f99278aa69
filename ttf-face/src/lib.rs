//! Character mapping and glyph outlines for TrueType fonts.
//!
//! This crate sits above the table decoding provided by
//! [`ttf-read`](ttf_read). A [`FontFace`] owns an arena holding the font and
//! its decoded tables, and answers two questions: which glyph a character
//! maps to, and what the outline of that glyph is.
//!
//! Outlines are returned in font units. Composite glyphs are flattened into a
//! single list of points, and hinting instructions are ignored.
//!
//! # Example
//!
//! ```
//! use ttf_face::{FontFace, GlyphId};
//! use ttf_read::Arena;
//!
//! let font_data = ttf_test_data::simple_font().build();
//! let mut storage = vec![0u8; 1 << 16];
//! let mut face = FontFace::new(Arena::new(&mut storage), &font_data).unwrap();
//! let glyph_id = face.glyph_index('A');
//! assert_ne!(glyph_id, GlyphId::NOTDEF);
//! let outline = face.load_outline(glyph_id).unwrap();
//! for contour in outline.contour_points() {
//!     println!("{contour:?}");
//! }
//! ```

#![forbid(unsafe_code)]

/// Expose our "raw" underlying parser crate.
pub extern crate ttf_read as raw;

mod error;
mod face;
mod outline;

pub use error::{DrawError, FaceError};
pub use face::FontFace;
pub use outline::GlyphOutline;

/// Type for a glyph identifier.
pub type GlyphId = ttf_read::types::GlyphId;

/// Type for a 4-byte tag used to identify font tables and other resources.
pub type Tag = ttf_read::types::Tag;

/// Limit for recursion when loading TrueType composite glyphs.
const GLYF_COMPOSITE_RECURSION_LIMIT: usize = 32;
