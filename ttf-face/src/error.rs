//! Error types for loading faces and outlines.

use core::fmt;

use ttf_read::{types::GlyphId, ArenaError, ReadError};

/// Errors that may occur when loading glyph outlines.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawError {
    /// The requested glyph was not present in the font.
    GlyphNotFound(GlyphId),
    /// Exceeded a recursion limit when loading a glyph.
    RecursionLimitExceeded(GlyphId),
    /// A component of the composite glyph is positioned by matching points.
    UnsupportedPointMatching(GlyphId),
    /// Exceeded memory limits when loading a glyph.
    InsufficientMemory,
    /// Error occurred when reading font data.
    Read(ReadError),
}

impl From<ReadError> for DrawError {
    fn from(e: ReadError) -> Self {
        match e {
            ReadError::Arena(_) => Self::InsufficientMemory,
            e => Self::Read(e),
        }
    }
}

impl From<ArenaError> for DrawError {
    fn from(_: ArenaError) -> Self {
        Self::InsufficientMemory
    }
}

impl fmt::Display for DrawError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::GlyphNotFound(gid) => write!(f, "Glyph {gid} was not found in the given font"),
            Self::RecursionLimitExceeded(gid) => write!(
                f,
                "Recursion limit ({}) exceeded when loading composite component {gid}",
                crate::GLYF_COMPOSITE_RECURSION_LIMIT,
            ),
            Self::UnsupportedPointMatching(gid) => write!(
                f,
                "Composite glyph {gid} positions a component by point matching, which is not supported"
            ),
            Self::InsufficientMemory => write!(f, "exceeded memory limits"),
            Self::Read(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DrawError {}

/// Errors that may occur when creating a [`FontFace`](crate::FontFace).
#[derive(Debug)]
pub enum FaceError {
    /// The font file could not be read.
    Io(std::io::Error),
    /// The font data could not be decoded.
    Read(ReadError),
}

impl From<std::io::Error> for FaceError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ReadError> for FaceError {
    fn from(e: ReadError) -> Self {
        Self::Read(e)
    }
}

impl From<ArenaError> for FaceError {
    fn from(e: ArenaError) -> Self {
        Self::Read(e.into())
    }
}

impl fmt::Display for FaceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read font file: {e}"),
            Self::Read(e) => write!(f, "failed to load font: {e}"),
        }
    }
}

impl std::error::Error for FaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Read(e) => Some(e),
        }
    }
}
