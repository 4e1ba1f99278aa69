//! The [glyf (Glyph Data)](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf) table

use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use types::{BoundingBox, F2Dot14, GlyphId, Point, Tag};

use crate::{
    arena::{Arena, ArenaSlice},
    font_data::Cursor,
    FontData, FontRead, ReadError, TopLevelTable,
};

macro_rules! glyph_flags {
    (
        $(#[$attr:meta])*
        $name:ident($ty:ty, $raw:ty) {
            $( $(#[$flag_attr:meta])* const $flag:ident = $value:expr; )*
        }
    ) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        pub struct $name($ty);

        impl $name {
            $( $(#[$flag_attr])* pub const $flag: Self = Self($value); )*

            const ALL_BITS: $ty = 0 $( | $value )*;

            /// Returns an empty set of flags.
            pub const fn empty() -> Self {
                Self(0)
            }

            /// Returns the raw value of the flags currently stored.
            pub const fn bits(self) -> $ty {
                self.0
            }

            /// Convert from underlying bit representation, dropping any bits
            /// that do not correspond to flags.
            pub const fn from_bits_truncate(bits: $ty) -> Self {
                Self(bits & Self::ALL_BITS)
            }

            /// Returns `true` if all of the flags in `other` are contained within `self`.
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = Self;

            fn bitor(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }
        }

        types::newtype_scalar!($name, $raw);
    };
}

glyph_flags! {
    /// Flags used in [SimpleGlyph]
    SimpleGlyphFlags(u8, [u8; 1]) {
        /// Bit 0: If set, the point is on the curve; otherwise, it is off
        /// the curve.
        const ON_CURVE_POINT = 0x01;
        /// Bit 1: If set, the corresponding x-coordinate is 1 byte long,
        /// and the sign is determined by the
        /// X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR flag. If not set, its
        /// interpretation depends on the
        /// X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR flag.
        const X_SHORT_VECTOR = 0x02;
        /// Bit 2: If set, the corresponding y-coordinate is 1 byte long.
        const Y_SHORT_VECTOR = 0x04;
        /// Bit 3: If set, the next byte (read as unsigned) specifies the
        /// number of additional times this flag byte is to be repeated in
        /// the logical flags array.
        const REPEAT_FLAG = 0x08;
        /// Bit 4: If X_SHORT_VECTOR is set, this is the sign of the delta.
        /// Otherwise, if set, the x-coordinate is the same as the previous
        /// one.
        const X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR = 0x10;
        /// Bit 5: The y counterpart of X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR.
        const Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR = 0x20;
        /// Bit 6: If set, contours in the glyph description may overlap.
        const OVERLAP_SIMPLE = 0x40;
    }
}

glyph_flags! {
    /// Flags used in [CompositeGlyph]
    CompositeGlyphFlags(u16, [u8; 2]) {
        /// Bit 0: If this is set, the arguments are 16-bit (uint16 or
        /// int16); otherwise, they are bytes (uint8 or int8).
        const ARG_1_AND_2_ARE_WORDS = 0x0001;
        /// Bit 1: If this is set, the arguments are signed xy values;
        /// otherwise, they are unsigned point numbers.
        const ARGS_ARE_XY_VALUES = 0x0002;
        /// Bit 2: If set and ARGS_ARE_XY_VALUES is also set, the xy values
        /// are rounded to the nearest grid line.
        const ROUND_XY_TO_GRID = 0x0004;
        /// Bit 3: This indicates that there is a simple scale for the
        /// component.
        const WE_HAVE_A_SCALE = 0x0008;
        /// Bit 5: Indicates at least one more glyph after this one.
        const MORE_COMPONENTS = 0x0020;
        /// Bit 6: The x direction will use a different scale from the y
        /// direction.
        const WE_HAVE_AN_X_AND_Y_SCALE = 0x0040;
        /// Bit 7: There is a 2 by 2 transformation that will be used to
        /// scale the component.
        const WE_HAVE_A_TWO_BY_TWO = 0x0080;
        /// Bit 8: Following the last component are instructions for the
        /// composite character.
        const WE_HAVE_INSTRUCTIONS = 0x0100;
        /// Bit 9: If set, this forces the aw and lsb (and rsb) for the
        /// composite to be equal to those from this component glyph.
        const USE_MY_METRICS = 0x0200;
        /// Bit 10: If set, the components of the compound glyph overlap.
        const OVERLAP_COMPOUND = 0x0400;
        /// Bit 11: The composite is designed to have the component offset
        /// scaled.
        const SCALED_COMPONENT_OFFSET = 0x0800;
        /// Bit 12: The composite is designed not to have the component
        /// offset scaled.
        const UNSCALED_COMPONENT_OFFSET = 0x1000;
    }
}

/// The [glyf](https://docs.microsoft.com/en-us/typography/opentype/spec/glyf) table.
#[derive(Clone, Copy, Debug, Default)]
pub struct Glyf<'a> {
    data: FontData<'a>,
}

impl TopLevelTable for Glyf<'_> {
    const TAG: Tag = Tag::new(b"glyf");
}

impl<'a> Glyf<'a> {
    pub fn new(data: FontData<'a>) -> Self {
        Self { data }
    }

    /// Returns the glyph stored at `range`, as computed from loca.
    ///
    /// Returns `None` for an empty range, which is a glyph with no outline.
    pub fn glyph(&self, range: Range<usize>) -> Result<Option<Glyph<'a>>, ReadError> {
        if range.is_empty() {
            return Ok(None);
        }
        let data = self.data.slice(range).ok_or(ReadError::OutOfBounds)?;
        Glyph::read(data).map(Some)
    }
}

/// The contour count and bounding box that start every glyph record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphHeader {
    /// If the number of contours is greater than or equal to zero, this is
    /// a simple glyph. If negative, this is a composite glyph.
    pub number_of_contours: i16,
    pub bbox: BoundingBox<i16>,
}

impl GlyphHeader {
    fn read(cursor: &mut Cursor) -> Result<Self, ReadError> {
        Ok(GlyphHeader {
            number_of_contours: cursor.read()?,
            bbox: BoundingBox {
                x_min: cursor.read()?,
                y_min: cursor.read()?,
                x_max: cursor.read()?,
                y_max: cursor.read()?,
            },
        })
    }
}

/// A glyph record, either simple or composite.
#[derive(Clone, Copy, Debug)]
pub enum Glyph<'a> {
    Simple(SimpleGlyph<'a>),
    Composite(CompositeGlyph<'a>),
}

macro_rules! field_getter {
    ($field:ident, $ty:ty) => {
        pub fn $field(&self) -> $ty {
            match self {
                Self::Simple(table) => table.header.$field,
                Self::Composite(table) => table.header.$field,
            }
        }
    };
}

impl Glyph<'_> {
    field_getter!(number_of_contours, i16);
    field_getter!(bbox, BoundingBox<i16>);
}

impl<'a> FontRead<'a> for Glyph<'a> {
    fn read(data: FontData<'a>) -> Result<Self, ReadError> {
        let mut cursor = data.cursor();
        let header = GlyphHeader::read(&mut cursor)?;
        if header.number_of_contours >= 0 {
            SimpleGlyph::read_body(header, data, cursor).map(Glyph::Simple)
        } else {
            let component_data = data
                .split_off(cursor.position()?)
                .ok_or(ReadError::OutOfBounds)?;
            Ok(Glyph::Composite(CompositeGlyph {
                header,
                component_data: component_data.as_bytes(),
            }))
        }
    }
}

/// A glyph made of quadratic contours.
#[derive(Clone, Copy, Debug)]
pub struct SimpleGlyph<'a> {
    pub header: GlyphHeader,
    end_pts_of_contours: &'a [u8],
    instructions: &'a [u8],
    glyph_data: &'a [u8],
}

impl<'a> SimpleGlyph<'a> {
    fn read_body(
        header: GlyphHeader,
        data: FontData<'a>,
        mut cursor: Cursor<'a>,
    ) -> Result<Self, ReadError> {
        let end_pts_of_contours = cursor.read_bytes(header.number_of_contours as usize * 2)?;
        let instruction_length: u16 = cursor.read()?;
        let instructions = cursor.read_bytes(instruction_length as usize)?;
        let glyph_data = data
            .split_off(cursor.position()?)
            .ok_or(ReadError::OutOfBounds)?
            .as_bytes();
        let glyph = SimpleGlyph {
            header,
            end_pts_of_contours,
            instructions,
            glyph_data,
        };
        let mut last = None;
        for end in glyph.end_pts_of_contours() {
            if last.is_some_and(|last| end < last) {
                return Err(ReadError::MalformedData(
                    "contour end points are not sorted",
                ));
            }
            last = Some(end);
        }
        Ok(glyph)
    }

    /// Returns the index of the last point of each contour.
    pub fn end_pts_of_contours(&self) -> impl Iterator<Item = u16> + 'a + Clone {
        self.end_pts_of_contours
            .chunks_exact(2)
            .map(|raw| u16::from_be_bytes([raw[0], raw[1]]))
    }

    /// Returns the total number of points.
    pub fn num_points(&self) -> usize {
        self.end_pts_of_contours()
            .last()
            .map(|last| last as usize + 1)
            .unwrap_or(0)
    }

    /// The TrueType instructions, which are not interpreted.
    pub fn instructions(&self) -> &'a [u8] {
        self.instructions
    }

    /// Reads points and flags into the provided buffers.
    ///
    /// Drops all flag bits except on-curve. The lengths of the buffers must be
    /// equal to the value returned by [num_points](Self::num_points).
    pub fn read_points(&self, points: &mut [Point<i32>], flags: &mut [u8]) -> Result<(), ReadError> {
        let n_points = self.num_points();
        if points.len() != n_points || flags.len() != n_points {
            return Err(ReadError::InvalidArrayLen);
        }
        let mut cursor = FontData::new(self.glyph_data).cursor();
        let mut i = 0;
        while i < n_points {
            let flag = cursor.read::<SimpleGlyphFlags>()?;
            let flag_bits = flag.bits();
            if flag.contains(SimpleGlyphFlags::REPEAT_FLAG) {
                let count = (cursor.read::<u8>()? as usize + 1).min(n_points - i);
                flags[i..i + count].fill(flag_bits);
                i += count;
            } else {
                flags[i] = flag_bits;
                i += 1;
            }
        }
        let mut x = 0i32;
        for (&flag_bits, point) in flags.iter().zip(points.iter_mut()) {
            x = x.wrapping_add(read_delta(
                &mut cursor,
                SimpleGlyphFlags::from_bits_truncate(flag_bits),
                SimpleGlyphFlags::X_SHORT_VECTOR,
                SimpleGlyphFlags::X_IS_SAME_OR_POSITIVE_X_SHORT_VECTOR,
            )?);
            point.x = x;
        }
        let mut y = 0i32;
        for (flag_bits, point) in flags.iter_mut().zip(points.iter_mut()) {
            y = y.wrapping_add(read_delta(
                &mut cursor,
                SimpleGlyphFlags::from_bits_truncate(*flag_bits),
                SimpleGlyphFlags::Y_SHORT_VECTOR,
                SimpleGlyphFlags::Y_IS_SAME_OR_POSITIVE_Y_SHORT_VECTOR,
            )?);
            point.y = y;
            // Only keep the on-curve bit
            *flag_bits &= SimpleGlyphFlags::ON_CURVE_POINT.bits();
        }
        Ok(())
    }
}

fn read_delta(
    cursor: &mut Cursor,
    flag: SimpleGlyphFlags,
    short: SimpleGlyphFlags,
    same_or_positive: SimpleGlyphFlags,
) -> Result<i32, ReadError> {
    Ok(match (flag.contains(short), flag.contains(same_or_positive)) {
        (true, true) => cursor.read::<u8>()? as i32,
        (true, false) => -(cursor.read::<u8>()? as i32),
        (false, false) => cursor.read::<i16>()? as i32,
        (false, true) => 0,
    })
}

/// A glyph built from transformed references to other glyphs.
#[derive(Clone, Copy, Debug)]
pub struct CompositeGlyph<'a> {
    pub header: GlyphHeader,
    component_data: &'a [u8],
}

/// Transform for a composite component.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// X scale factor.
    pub xx: F2Dot14,
    /// YX skew factor.
    pub yx: F2Dot14,
    /// XY skew factor.
    pub xy: F2Dot14,
    /// Y scale factor.
    pub yy: F2Dot14,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            xx: F2Dot14::ONE,
            yx: F2Dot14::ZERO,
            xy: F2Dot14::ZERO,
            yy: F2Dot14::ONE,
        }
    }
}

/// Anchor position for a composite component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Offset { x: i16, y: i16 },
    Point { base: u16, component: u16 },
}

/// A reference to another glyph. Part of [CompositeGlyph].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Component {
    /// Component flags.
    pub flags: CompositeGlyphFlags,
    /// Glyph identifier.
    pub glyph: GlyphId,
    /// Anchor for component placement.
    pub anchor: Anchor,
    /// Component transformation matrix.
    pub transform: Transform,
}

/// A [`Component`] in a form that can be stored in an [`Arena`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct ComponentRecord {
    pub flags: u16,
    pub glyph: u16,
    pub arg1: i16,
    pub arg2: i16,
    pub xx: f32,
    pub yx: f32,
    pub xy: f32,
    pub yy: f32,
}

impl ComponentRecord {
    pub fn flags(&self) -> CompositeGlyphFlags {
        CompositeGlyphFlags::from_bits_truncate(self.flags)
    }

    pub fn glyph(&self) -> GlyphId {
        GlyphId::new(self.glyph)
    }

    pub fn anchor(&self) -> Anchor {
        if self
            .flags()
            .contains(CompositeGlyphFlags::ARGS_ARE_XY_VALUES)
        {
            Anchor::Offset {
                x: self.arg1,
                y: self.arg2,
            }
        } else {
            Anchor::Point {
                base: self.arg1 as u16,
                component: self.arg2 as u16,
            }
        }
    }
}

impl From<Component> for ComponentRecord {
    fn from(component: Component) -> Self {
        let (arg1, arg2) = match component.anchor {
            Anchor::Offset { x, y } => (x, y),
            Anchor::Point { base, component } => (base as i16, component as i16),
        };
        let transform = component.transform;
        ComponentRecord {
            flags: component.flags.bits(),
            glyph: component.glyph.to_u16(),
            arg1,
            arg2,
            xx: transform.xx.to_f32(),
            yx: transform.yx.to_f32(),
            xy: transform.xy.to_f32(),
            yy: transform.yy.to_f32(),
        }
    }
}

// flags, glyph index and two byte sized arguments
const MIN_COMPONENT_SIZE: usize = 6;

impl<'a> CompositeGlyph<'a> {
    /// Returns an iterator over the components of the composite glyph.
    ///
    /// Iteration stops early if a component is truncated.
    pub fn components(&self) -> impl Iterator<Item = Component> + 'a + Clone {
        self.component_iter()
    }

    fn component_iter(&self) -> ComponentIter<'a> {
        ComponentIter {
            cur_flags: CompositeGlyphFlags::empty(),
            done: false,
            cursor: FontData::new(self.component_data).cursor(),
        }
    }

    /// Returns the TrueType interpreter instructions.
    pub fn instructions(&self) -> Option<&'a [u8]> {
        self.component_iter().instructions()
    }

    /// Decodes all components into the arena.
    ///
    /// Space for the largest number of components that could fit in the
    /// glyph is allocated up front and the unused tail is popped once the
    /// actual count is known.
    pub fn decode_components(
        &self,
        arena: &mut Arena,
    ) -> Result<ArenaSlice<ComponentRecord>, ReadError> {
        let max_components = self.component_data.len() / MIN_COMPONENT_SIZE;
        let mark = arena.mark();
        let records = arena.push_slice::<ComponentRecord>(max_components)?;
        let mut iter = self.component_iter();
        let mut count = 0;
        let slots = arena.slice_mut(records);
        let mut fill = || -> Result<(), ReadError> {
            while let Some(component) = iter.next_component()? {
                let slot = slots
                    .get_mut(count)
                    .ok_or(ReadError::MalformedData("too many components"))?;
                *slot = component.into();
                count += 1;
            }
            Ok(())
        };
        if let Err(e) = fill() {
            arena.release(mark)?;
            return Err(e);
        }
        arena.pop((max_components - count) * std::mem::size_of::<ComponentRecord>())?;
        Ok(records.truncate(count))
    }
}

#[derive(Clone)]
struct ComponentIter<'a> {
    cur_flags: CompositeGlyphFlags,
    done: bool,
    cursor: Cursor<'a>,
}

impl<'a> ComponentIter<'a> {
    fn instructions(&mut self) -> Option<&'a [u8]> {
        while self.by_ref().next().is_some() {}
        if self
            .cur_flags
            .contains(CompositeGlyphFlags::WE_HAVE_INSTRUCTIONS)
        {
            let len = self.cursor.read::<u16>().ok()? as usize;
            self.cursor.read_bytes(len).ok()
        } else {
            None
        }
    }

    fn next_component(&mut self) -> Result<Option<Component>, ReadError> {
        if self.done {
            return Ok(None);
        }
        // stop on error
        self.done = true;
        let flags: CompositeGlyphFlags = self.cursor.read()?;
        self.cur_flags = flags;
        let glyph = self.cursor.read::<GlyphId>()?;
        let args_are_words = flags.contains(CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS);
        let args_are_xy_values = flags.contains(CompositeGlyphFlags::ARGS_ARE_XY_VALUES);
        let anchor = match (args_are_xy_values, args_are_words) {
            (true, true) => Anchor::Offset {
                x: self.cursor.read()?,
                y: self.cursor.read()?,
            },
            (true, false) => Anchor::Offset {
                x: self.cursor.read::<i8>()? as _,
                y: self.cursor.read::<i8>()? as _,
            },
            (false, true) => Anchor::Point {
                base: self.cursor.read()?,
                component: self.cursor.read()?,
            },
            (false, false) => Anchor::Point {
                base: self.cursor.read::<u8>()? as _,
                component: self.cursor.read::<u8>()? as _,
            },
        };
        let mut transform = Transform::default();
        if flags.contains(CompositeGlyphFlags::WE_HAVE_A_SCALE) {
            transform.xx = self.cursor.read()?;
            transform.yy = transform.xx;
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_AN_X_AND_Y_SCALE) {
            transform.xx = self.cursor.read()?;
            transform.yy = self.cursor.read()?;
        } else if flags.contains(CompositeGlyphFlags::WE_HAVE_A_TWO_BY_TWO) {
            transform.xx = self.cursor.read()?;
            transform.yx = self.cursor.read()?;
            transform.xy = self.cursor.read()?;
            transform.yy = self.cursor.read()?;
        }
        self.done = !flags.contains(CompositeGlyphFlags::MORE_COMPONENTS);
        Ok(Some(Component {
            flags,
            glyph,
            anchor,
            transform,
        }))
    }
}

impl Iterator for ComponentIter<'_> {
    type Item = Component;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_component().ok().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ttf_test_data::{
        be_buffer,
        synthetic::{self, glyphs, Component as TestComponent, Transform as TestTransform},
    };

    fn read_glyph(data: &[u8]) -> Glyph {
        Glyph::read(FontData::new(data)).unwrap()
    }

    fn simple_points(glyph: &SimpleGlyph) -> (Vec<Point<i32>>, Vec<u8>) {
        let mut points = vec![Point::default(); glyph.num_points()];
        let mut flags = vec![0u8; glyph.num_points()];
        glyph.read_points(&mut points, &mut flags).unwrap();
        (points, flags)
    }

    #[test]
    fn simple_glyph() {
        let data = synthetic::simple_glyph(&synthetic::LETTER_A_CONTOURS, &[]);
        let Glyph::Simple(glyph) = read_glyph(&data) else {
            panic!("expected a simple glyph");
        };
        assert_eq!(glyph.header.number_of_contours, 2);
        assert_eq!(glyph.end_pts_of_contours().collect::<Vec<_>>(), [4, 7]);
        assert_eq!(glyph.num_points(), 8);
        let (points, flags) = simple_points(&glyph);
        let expected: Vec<_> = synthetic::LETTER_A_CONTOURS
            .iter()
            .flat_map(|contour| contour.iter())
            .map(|(x, y, on_curve)| (Point::new(*x as i32, *y as i32), *on_curve as u8))
            .collect();
        let actual: Vec<_> = points.into_iter().zip(flags).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn instructions_are_skipped() {
        let data = synthetic::simple_glyph(&synthetic::SQUARE_WITH_HOLE_CONTOURS, &[1, 2, 3]);
        let Glyph::Simple(glyph) = read_glyph(&data) else {
            panic!("expected a simple glyph");
        };
        assert_eq!(glyph.instructions(), &[1, 2, 3]);
        let (points, _) = simple_points(&glyph);
        assert_eq!(points[5], Point::new(450, 150));
    }

    #[test]
    fn flag_repeat_counts() {
        for repeat in 0..=255u8 {
            let n_points = repeat as usize + 1;
            // one on-curve flag with short positive x and same y, repeated.
            // the x deltas follow immediately, so they only decode correctly
            // if the flag run took exactly two bytes
            let deltas: Vec<u8> = (0..n_points).map(|i| (i % 100) as u8 + 1).collect();
            let buf = be_buffer! {
                1i16,
                [0i16, 0, 0, 0],
                (repeat as u16),
                0u16,
                (0x33u8 | 0x08),
                (repeat)
            }
            .extend(deltas.iter().copied());
            let Glyph::Simple(glyph) = read_glyph(&buf) else {
                panic!("expected a simple glyph");
            };
            let (points, flags) = simple_points(&glyph);
            let mut x = 0;
            let expected: Vec<_> = deltas
                .iter()
                .map(|delta| {
                    x += *delta as i32;
                    Point::new(x, 0)
                })
                .collect();
            assert_eq!(points, expected, "repeat count {repeat}");
            assert!(flags.iter().all(|flag| *flag == 1));
        }
    }

    #[test]
    fn flag_repeat_is_clamped() {
        // three points, but the repeat count claims ten
        let buf = be_buffer! {
            1i16,
            [0i16, 0, 0, 0],
            2u16,
            0u16,
            (0x31u8 | 0x08),
            9u8
        };
        let Glyph::Simple(glyph) = read_glyph(&buf) else {
            panic!("expected a simple glyph");
        };
        let (points, flags) = simple_points(&glyph);
        assert_eq!(points, [Point::default(); 3]);
        assert_eq!(flags, [1, 1, 1]);
    }

    #[test]
    fn coordinate_encodings() {
        // long positive, short negative, same, short positive, long negative
        let buf = be_buffer! {
            1i16,
            [0i16, 0, 0, 0],
            4u16,
            0u16,
            // flags
            [0x21u8, 0x26, 0x14, 0x32, 0x01],
            // x: +1000, -20, same, +30, -500
            (1000i16),
            20u8,
            30u8,
            (-500i16),
            // y: same, +5, -7, same, +300
            5u8,
            7u8,
            (300i16)
        };
        let Glyph::Simple(glyph) = read_glyph(&buf) else {
            panic!("expected a simple glyph");
        };
        let (points, _) = simple_points(&glyph);
        let expected = [(1000, 0), (980, 5), (980, -2), (1010, -2), (510, 298)]
            .map(|(x, y)| Point::new(x, y));
        assert_eq!(points, expected);
    }

    #[test]
    fn unsorted_contour_ends() {
        let buf = be_buffer! {
            2i16,
            [0i16, 0, 0, 0],
            [3u16, 1],
            0u16
        };
        assert_eq!(
            Glyph::read(FontData::new(&buf)).unwrap_err(),
            ReadError::MalformedData("contour end points are not sorted")
        );
    }

    #[test]
    fn wrong_buffer_len() {
        let data = synthetic::simple_glyph(&synthetic::LETTER_A_CONTOURS, &[]);
        let Glyph::Simple(glyph) = read_glyph(&data) else {
            panic!("expected a simple glyph");
        };
        let mut points = [Point::default(); 3];
        let mut flags = [0u8; 3];
        assert_eq!(
            glyph.read_points(&mut points, &mut flags),
            Err(ReadError::InvalidArrayLen)
        );
    }

    #[test]
    fn composite_components() {
        let data = synthetic::composite_glyph(
            BoundingBox::default(),
            &[
                TestComponent::offset(2, -10, 300),
                TestComponent::offset(3, 1, 2).with_transform(TestTransform::Scale(0.5)),
                TestComponent::offset(4, 0, 0)
                    .with_transform(TestTransform::TwoByTwo(1.0, 0.25, -0.25, 1.0))
                    .words(),
                TestComponent::matching_points(5, 7, 1),
            ],
            &[0xAA, 0xBB],
        );
        let Glyph::Composite(glyph) = read_glyph(&data) else {
            panic!("expected a composite glyph");
        };
        let components: Vec<_> = glyph.components().collect();
        assert_eq!(components.len(), 4);
        assert_eq!(components[0].anchor, Anchor::Offset { x: -10, y: 300 });
        assert_eq!(components[0].glyph, GlyphId::new(2));
        assert!(components[0]
            .flags
            .contains(CompositeGlyphFlags::ARG_1_AND_2_ARE_WORDS));
        assert_eq!(components[1].transform.xx.to_f32(), 0.5);
        assert_eq!(components[1].transform.yy.to_f32(), 0.5);
        assert_eq!(
            components[2].transform,
            Transform {
                xx: F2Dot14::ONE,
                yx: F2Dot14::from_f32(0.25),
                xy: F2Dot14::from_f32(-0.25),
                yy: F2Dot14::ONE,
            }
        );
        assert_eq!(
            components[3].anchor,
            Anchor::Point {
                base: 7,
                component: 1
            }
        );
        assert_eq!(glyph.instructions(), Some([0xAA, 0xBB].as_slice()));
    }

    #[test]
    fn decode_components_shrinks_to_fit() {
        let data = synthetic::composite_glyph(
            BoundingBox::default(),
            &[
                TestComponent::offset(glyphs::LETTER_A, 100, -50),
                TestComponent::offset(glyphs::SQUARE_WITH_HOLE, 5, 5)
                    .with_transform(TestTransform::XYScale(1.5, -1.0)),
            ],
            &[],
        );
        let Glyph::Composite(glyph) = read_glyph(&data) else {
            panic!("expected a composite glyph");
        };
        let mut storage = [0u8; 256];
        let mut arena = Arena::new(&mut storage);
        arena.push(3).unwrap();
        let records = glyph.decode_components(&mut arena).unwrap();
        assert_eq!(records.len(), 2);
        // only the two records (plus alignment padding) remain allocated
        assert_eq!(arena.used(), records.span().range().end);
        let records = arena.slice(records);
        assert_eq!(records[0].glyph(), GlyphId::new(glyphs::LETTER_A));
        assert_eq!(records[0].anchor(), Anchor::Offset { x: 100, y: -50 });
        assert_eq!((records[0].xx, records[0].yy), (1.0, 1.0));
        assert_eq!((records[1].xx, records[1].yy), (1.5, -1.0));
        assert_eq!((records[1].yx, records[1].xy), (0.0, 0.0));
    }

    #[test]
    fn truncated_component() {
        let mut data = synthetic::composite_glyph(
            BoundingBox::default(),
            &[
                TestComponent::offset(1, 0, 0),
                TestComponent::offset(2, 0, 0),
            ],
            &[],
        );
        data.truncate(data.len() - 1);
        let Glyph::Composite(glyph) = read_glyph(&data) else {
            panic!("expected a composite glyph");
        };
        assert_eq!(glyph.components().count(), 1);
        let mut storage = [0u8; 256];
        let mut arena = Arena::new(&mut storage);
        assert_eq!(
            glyph.decode_components(&mut arena),
            Err(ReadError::OutOfBounds)
        );
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn empty_glyph_range() {
        let glyf = Glyf::new(FontData::new(&[0u8; 4]));
        assert!(glyf.glyph(2..2).unwrap().is_none());
        assert_eq!(glyf.glyph(2..10).unwrap_err(), ReadError::OutOfBounds);
    }
}
