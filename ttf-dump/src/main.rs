//! Print the tables and glyph outlines of a TrueType font.
//!
//! With no options, prints a summary of the head, maxp and hhea tables.
//! Set `RUST_LOG=debug` to trace table decoding.

use ttf_face::{FontFace, GlyphId};
use ttf_read::Arena;

mod print;

use print::PrettyPrinter;

// large enough for most fonts, including their decoded tables
const DEFAULT_ARENA_SIZE: usize = 16 << 20;

fn main() -> Result<(), Error> {
    env_logger::init();
    let args = flags::Args::from_env().map_err(|e| Error(e.to_string()))?;
    let glyph = GlyphRequest::from_args(&args)?;

    let mut storage = vec![0u8; args.arena_size.unwrap_or(DEFAULT_ARENA_SIZE)];
    let mut face = FontFace::from_file(Arena::new(&mut storage), &args.input)
        .map_err(|e| Error(format!("{}: {e}", args.input.display())))?;
    log::info!(
        "{} uses {} of {} arena bytes",
        args.input.display(),
        face.arena().used(),
        face.arena().capacity()
    );

    if args.list {
        list_tables(&face);
        return Ok(());
    }

    let stdout = std::io::stdout();
    let mut locked = stdout.lock();
    let mut printer = PrettyPrinter::new(&mut locked);
    if args.cmap {
        printer.print_cmap(face.directory().cmap.as_ref(), face.view())?;
    }
    match glyph {
        Some(request) => {
            let (glyph_id, codepoint) = match request {
                GlyphRequest::Char(ch) => (face.glyph_index(ch), Some(ch)),
                GlyphRequest::Id(gid) => (GlyphId::new(gid), None),
            };
            let outline = face.load_outline(glyph_id).map_err(Error::new)?;
            printer.print_outline(
                &outline,
                codepoint,
                face.advance_width(glyph_id),
                face.left_side_bearing(glyph_id),
            )?;
        }
        None if !args.cmap => {
            let directory = face.directory();
            printer.print_head(&directory.head)?;
            printer.print_maxp(&directory.maxp)?;
            printer.print_hhea(&directory.hhea)?;
        }
        None => (),
    }
    Ok(())
}

fn list_tables(face: &FontFace) {
    println!("Tag  Offset  Length  Checksum");
    println!("-------------------------------");

    let records = face.directory().table_records(face.view());
    // pick how much padding we use for offsets based on the max offset in directory
    let offset_pad = hex_width(
        records
            .iter()
            .map(|record| record.offset)
            .max()
            .unwrap_or_default(),
    );

    for record in records {
        println!(
            "{0} 0x{1:02$X} {3:8} 0x{4:08X} ",
            record.tag, record.offset, offset_pad, record.length, record.checksum
        );
    }
}

fn hex_width(val: u32) -> usize {
    match val {
        0..=0xffff => 4usize,
        0x10000..=0xffff_ff => 6,
        0x1000000.. => 8,
    }
}

enum GlyphRequest {
    Char(char),
    Id(u16),
}

impl GlyphRequest {
    fn from_args(args: &flags::Args) -> Result<Option<Self>, Error> {
        match (args.glyph, args.gid) {
            (Some(_), Some(_)) => Err(Error::new("pass only one of --glyph and --gid")),
            (Some(ch), None) => Ok(Some(GlyphRequest::Char(ch))),
            (None, Some(gid)) => Ok(Some(GlyphRequest::Id(gid))),
            (None, None) => Ok(None),
        }
    }
}

#[derive(Debug, Clone)]
struct Error(String);

impl Error {
    fn new(t: impl std::fmt::Display) -> Self {
        Self(t.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::new(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for Error {}

mod flags {
    use std::path::PathBuf;

    xflags::xflags! {
        /// Print the tables and glyph outlines of a TrueType font
        cmd args {
            /// Path to the font file.
            required input: PathBuf
            /// List the table directory.
            optional -l, --list
            /// Print the cmap encoding records and format 4 segments.
            optional -c, --cmap
            /// Print the outline of the glyph mapped to this character.
            optional -g, --glyph glyph: char
            /// Print the outline of the glyph with this id.
            optional --gid gid: u16
            /// Size in bytes of the memory used to hold the font.
            optional --arena-size arena_size: usize
        }
    }
}
