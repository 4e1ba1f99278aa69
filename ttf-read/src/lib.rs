//! Decoding TrueType font files
//!
//! This crate decodes the tables needed to map characters to glyphs and to
//! load glyph outlines from a TrueType (`glyf` based) font. Decoded arrays are
//! not kept as views of the font data: they are converted to native endianness
//! and stored in an [`Arena`], a caller provided block of memory, which is the
//! only place the crate allocates.
//!
//! Tables decoded:
//!
//! - `head`, `maxp` and `hhea`, which are small fixed size records
//! - `hmtx` and `loca`, whose size depends on values in the tables above
//! - `cmap`, of which only a [format 4][cmap4] subtable is used
//! - `glyf`, which is read lazily, one glyph at a time
//!
//! For resolving composite glyphs into outlines, see the `ttf-face` crate.
//!
//! # Example
//!
//! ```no_run
//! # let path_to_my_font_file = std::path::Path::new("");
//! use ttf_read::{Arena, FontDirectory};
//! let mut storage = vec![0u8; 1 << 20];
//! let mut arena = Arena::new(&mut storage);
//! let font = ttf_read::read_entire_file(&mut arena, path_to_my_font_file).unwrap();
//! let directory = FontDirectory::load(&mut arena, font).expect("failed to read font data");
//!
//! println!(
//!     "{} units per em containing {} glyphs",
//!     directory.head.units_per_em, directory.maxp.num_glyphs
//! );
//! ```
//!
//! [cmap4]: tables::cmap::Cmap4

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(any(feature = "std", test))]
#[macro_use]
extern crate std;

#[cfg(all(not(feature = "std"), not(test)))]
#[macro_use]
extern crate core as std;

pub mod arena;
mod directory;
mod font_data;
#[cfg(feature = "std")]
mod io;
mod read;
pub mod tables;

pub use arena::{Arena, ArenaError, ArenaSlice, ArenaView, Span};
pub use directory::{FontDirectory, TableRecord};
pub use font_data::{Cursor, FontData};
#[cfg(feature = "std")]
pub use io::read_entire_file;
pub use read::{ArenaDecode, FontRead, ReadArgs, ReadError, TopLevelTable};

/// Public re-export of the ttf-types crate.
pub extern crate ttf_types as types;
