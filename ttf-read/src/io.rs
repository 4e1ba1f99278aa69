//! Loading font files into an arena.

use std::{
    fs::File,
    io::{self, Read},
    path::Path,
};

use crate::arena::{Arena, ArenaError, Span};

/// Reads the file at `path` into the arena.
///
/// The returned span covers the file contents. A single zero byte is
/// allocated after it, so the total size allocated is the file size plus
/// one. If the file cannot be read, nothing remains allocated.
pub fn read_entire_file(arena: &mut Arena, path: impl AsRef<Path>) -> io::Result<Span> {
    let path = path.as_ref();
    let mark = arena.mark();
    let result = read_into(arena, path);
    if result.is_err() {
        arena.release(mark).map_err(arena_error)?;
    }
    result
}

fn read_into(arena: &mut Arena, path: &Path) -> io::Result<Span> {
    let mut file = File::open(path)?;
    let size = usize::try_from(file.metadata()?.len())
        .map_err(|_| io::Error::new(io::ErrorKind::OutOfMemory, "file too large"))?;
    let span = arena.push(size).map_err(arena_error)?;
    file.read_exact(arena.bytes_mut(span))?;
    arena.push_zero(1).map_err(arena_error)?;
    log::debug!("read {size} bytes from {}", path.display());
    Ok(span)
}

fn arena_error(error: ArenaError) -> io::Error {
    io::Error::new(io::ErrorKind::OutOfMemory, error)
}
