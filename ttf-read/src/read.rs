//! Traits for interpreting font data

use types::Tag;

use crate::{arena::Arena, arena::ArenaError, font_data::FontData};

/// A type that can be read from raw table data.
///
/// This is implemented for tables made up only of fixed-size fields, which
/// are copied out of the font data directly.
pub trait FontRead<'a>: Sized {
    /// Read an instance of `Self` from the provided data, performing validation.
    fn read(data: FontData<'a>) -> Result<Self, ReadError>;
}

/// A trait for a type that needs additional arguments to be read.
pub trait ReadArgs {
    type Args: Copy;
}

/// A table whose arrays are decoded into an [`Arena`].
///
/// The decoded value holds handles into the arena, so the arena must outlive
/// any use of the table.
pub trait ArenaDecode: Sized + ReadArgs {
    /// Decode the table, using the provided args.
    ///
    /// If a type requires multiple arguments, they will be passed as a tuple.
    fn decode(data: FontData, arena: &mut Arena, args: &Self::Args) -> Result<Self, ReadError>;
}

/// A table that is referenced from the table directory.
pub trait TopLevelTable {
    /// The table's tag.
    const TAG: Tag;
}

/// An error that occurs when reading font data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    OutOfBounds,
    // i64 is flexible enough to store any value we might encounter
    InvalidFormat(i64),
    InvalidSfnt(u32),
    InvalidArrayLen,
    TableIsMissing(Tag),
    TableOutOfBounds(Tag),
    MalformedData(&'static str),
    Arena(ArenaError),
}

impl From<ArenaError> for ReadError {
    fn from(e: ArenaError) -> Self {
        Self::Arena(e)
    }
}

impl std::fmt::Display for ReadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReadError::OutOfBounds => write!(f, "An offset was out of bounds"),
            ReadError::InvalidFormat(x) => write!(f, "Invalid format '{x}'"),
            ReadError::InvalidSfnt(ver) => write!(f, "Invalid sfnt version 0x{ver:08X}"),
            ReadError::InvalidArrayLen => {
                write!(f, "Buffer length does not match the number of items")
            }
            ReadError::TableIsMissing(tag) => write!(f, "the {tag} table is missing"),
            ReadError::TableOutOfBounds(tag) => {
                write!(f, "the {tag} table extends past the end of the font")
            }
            ReadError::MalformedData(msg) => write!(f, "Malformed data: '{msg}'"),
            ReadError::Arena(e) => write!(f, "{e}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ReadError {}
