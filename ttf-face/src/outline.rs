//! Loading glyph outlines from the glyf table.
//!
//! Composite glyphs are flattened: the points of every component are
//! transformed into the coordinate space of the outermost glyph and appended
//! to a single list, with contour end indices adjusted to match.

use ttf_read::{
    tables::{
        glyf::{Anchor, ComponentRecord, CompositeGlyph, Glyf, Glyph, SimpleGlyph, SimpleGlyphFlags},
        loca::Loca,
    },
    types::{BoundingBox, GlyphId, Point},
    Arena, ArenaView, ReadError,
};

use crate::{DrawError, GLYF_COMPOSITE_RECURSION_LIMIT};

/// The outline of a glyph in font units.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlyphOutline {
    pub glyph_id: GlyphId,
    /// The bounding box stored in the glyph header.
    pub bounds: BoundingBox<i16>,
    pub points: Vec<Point<i32>>,
    /// Point flags, parallel to `points`. Only the on-curve bit is retained.
    pub flags: Vec<u8>,
    /// The index of the last point of each contour.
    pub contours: Vec<u16>,
}

impl GlyphOutline {
    /// Returns true if the glyph has no points, such as a space.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns true if the point at `index` is on the curve.
    pub fn is_on_curve(&self, index: usize) -> bool {
        self.flags
            .get(index)
            .is_some_and(|flags| flags & SimpleGlyphFlags::ON_CURVE_POINT.bits() != 0)
    }

    /// Returns an iterator over the points of each contour.
    pub fn contour_points(&self) -> impl Iterator<Item = &[Point<i32>]> + '_ {
        let mut start = 0;
        self.contours.iter().map(move |&end| {
            let end = (end as usize + 1).min(self.points.len());
            let points = self.points.get(start..end).unwrap_or_default();
            start = end;
            points
        })
    }

    /// Computes the bounding box of all points, on or off the curve.
    ///
    /// Returns `None` for an empty outline.
    pub fn control_bounds(&self) -> Option<BoundingBox<i32>> {
        let first = self.points.first()?;
        let init = BoundingBox {
            x_min: first.x,
            y_min: first.y,
            x_max: first.x,
            y_max: first.y,
        };
        Some(self.points.iter().fold(init, |bounds, point| BoundingBox {
            x_min: bounds.x_min.min(point.x),
            y_min: bounds.y_min.min(point.y),
            x_max: bounds.x_max.max(point.x),
            y_max: bounds.y_max.max(point.y),
        }))
    }
}

/// Resolves glyph ids to outlines, recursing into composite components.
pub(crate) struct OutlineLoader<'a> {
    view: ArenaView<'a>,
    loca: Loca,
    glyf: Glyf<'a>,
}

impl<'a> OutlineLoader<'a> {
    /// `view` must resolve the handles in `loca`.
    pub(crate) fn new(view: ArenaView<'a>, loca: Loca, glyf: Glyf<'a>) -> Self {
        Self { view, loca, glyf }
    }

    /// Loads the outline of `glyph_id`, using `scratch` for component lists.
    pub(crate) fn load(
        &self,
        scratch: &mut Arena,
        glyph_id: GlyphId,
    ) -> Result<GlyphOutline, DrawError> {
        let glyph = self.glyph(glyph_id)?;
        let mut outline = GlyphOutline {
            glyph_id,
            bounds: glyph.as_ref().map(Glyph::bbox).unwrap_or_default(),
            ..Default::default()
        };
        self.load_rec(scratch, glyph, glyph_id, 0, &mut outline)?;
        Ok(outline)
    }

    fn glyph(&self, glyph_id: GlyphId) -> Result<Option<Glyph<'a>>, DrawError> {
        let range = self
            .loca
            .glyph_range(self.view, glyph_id)
            .map_err(|_| DrawError::GlyphNotFound(glyph_id))?;
        Ok(self.glyf.glyph(range)?)
    }

    fn load_rec(
        &self,
        scratch: &mut Arena,
        glyph: Option<Glyph>,
        glyph_id: GlyphId,
        recurse_depth: usize,
        outline: &mut GlyphOutline,
    ) -> Result<(), DrawError> {
        if recurse_depth > GLYF_COMPOSITE_RECURSION_LIMIT {
            return Err(DrawError::RecursionLimitExceeded(glyph_id));
        }
        match glyph {
            Some(Glyph::Simple(simple)) => self.load_simple(&simple, glyph_id, outline),
            Some(Glyph::Composite(composite)) => {
                self.load_composite(scratch, &composite, glyph_id, recurse_depth, outline)
            }
            None => {
                log::debug!("{glyph_id} has no outline");
                Ok(())
            }
        }
    }

    fn load_simple(
        &self,
        glyph: &SimpleGlyph,
        glyph_id: GlyphId,
        outline: &mut GlyphOutline,
    ) -> Result<(), DrawError> {
        let point_base = outline.points.len();
        let num_points = glyph.num_points();
        log::debug!(
            "{glyph_id}: {} contours, {num_points} points, skipped {} bytes of instructions",
            glyph.header.number_of_contours,
            glyph.instructions().len()
        );
        outline
            .points
            .resize(point_base + num_points, Point::default());
        outline.flags.resize(point_base + num_points, 0);
        glyph.read_points(
            &mut outline.points[point_base..],
            &mut outline.flags[point_base..],
        )?;
        for end in glyph.end_pts_of_contours() {
            let end = u16::try_from(point_base + end as usize)
                .map_err(|_| ReadError::MalformedData("too many points in composite glyph"))?;
            outline.contours.push(end);
        }
        Ok(())
    }

    fn load_composite(
        &self,
        scratch: &mut Arena,
        glyph: &CompositeGlyph,
        glyph_id: GlyphId,
        recurse_depth: usize,
        outline: &mut GlyphOutline,
    ) -> Result<(), DrawError> {
        let mark = scratch.mark();
        let result = self.load_components(scratch, glyph, glyph_id, recurse_depth, outline);
        scratch.release(mark)?;
        result
    }

    fn load_components(
        &self,
        scratch: &mut Arena,
        glyph: &CompositeGlyph,
        glyph_id: GlyphId,
        recurse_depth: usize,
        outline: &mut GlyphOutline,
    ) -> Result<(), DrawError> {
        let components = glyph.decode_components(scratch)?;
        log::debug!("{glyph_id}: {} components", components.len());
        for i in 0..components.len() {
            let Some(component) = scratch.view().get(components, i) else {
                break;
            };
            let Anchor::Offset { x: dx, y: dy } = component.anchor() else {
                log::error!(
                    "{glyph_id}: component {} is positioned by point matching, which is not supported",
                    component.glyph()
                );
                return Err(DrawError::UnsupportedPointMatching(glyph_id));
            };
            let child_id = component.glyph();
            let child = self.glyph(child_id)?;
            let start_point = outline.points.len();
            self.load_rec(scratch, child, child_id, recurse_depth + 1, outline)?;
            let points = &mut outline.points[start_point..];
            if has_transform(&component) {
                let transform = [
                    component.xx,
                    component.yx,
                    component.xy,
                    component.yy,
                    dx as f32,
                    dy as f32,
                ];
                for point in points.iter_mut() {
                    *point = map_point(transform, *point);
                }
            } else {
                let offset = Point::new(dx as i32, dy as i32);
                for point in points.iter_mut() {
                    *point = *point + offset;
                }
            }
        }
        Ok(())
    }
}

fn has_transform(component: &ComponentRecord) -> bool {
    [component.xx, component.yx, component.xy, component.yy] != [1.0, 0.0, 0.0, 1.0]
}

fn map_point(transform: [f32; 6], p: Point<i32>) -> Point<i32> {
    let (x, y) = (p.x as f32, p.y as f32);
    Point {
        x: (transform[0] * x + transform[2] * y + transform[4]).round() as i32,
        y: (transform[1] * x + transform[3] * y + transform[5]).round() as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use ttf_read::{FontData, FontDirectory};
    use ttf_test_data::{
        simple_font,
        synthetic::{composite_glyph, glyphs, simple_glyph, Component, Transform},
        SyntheticFont,
    };

    fn load(font_data: &[u8], glyph_id: u16) -> Result<GlyphOutline, DrawError> {
        let mut storage = vec![0u8; 8192];
        let mut arena = Arena::new(&mut storage);
        let directory = FontDirectory::read(FontData::new(font_data), &mut arena).unwrap();
        let glyf = Glyf::new(directory.glyf.data(FontData::new(font_data)).unwrap());
        let remaining = arena.remaining();
        arena
            .scoped(remaining, |view, scratch| {
                OutlineLoader::new(view, directory.loca, glyf).load(scratch, GlyphId::new(glyph_id))
            })
            .unwrap()
    }

    fn points(coords: &[(i32, i32)]) -> Vec<Point<i32>> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn simple_outline() {
        let font = simple_font().build();
        let outline = load(&font, glyphs::LETTER_A).unwrap();
        assert_eq!(outline.glyph_id, GlyphId::new(glyphs::LETTER_A));
        assert_eq!(
            outline.points,
            points(&[
                (0, 0),
                (300, 700),
                (600, 0),
                (450, 0),
                (300, 0),
                (200, 200),
                (400, 200),
                (300, 400)
            ])
        );
        assert_eq!(outline.flags, [1, 1, 1, 0, 0, 1, 1, 1]);
        assert_eq!(outline.contours, [4, 7]);
        assert!(outline.is_on_curve(2));
        assert!(!outline.is_on_curve(3));
        assert!(!outline.is_on_curve(100));
        let contours: Vec<_> = outline.contour_points().map(|c| c.len()).collect();
        assert_eq!(contours, [5, 3]);
    }

    #[test]
    fn bounds_match_glyph_header() {
        let font = simple_font().build();
        for gid in [glyphs::NOTDEF, glyphs::SQUARE_WITH_HOLE, glyphs::LETTER_A] {
            let outline = load(&font, gid).unwrap();
            let bounds = outline.control_bounds().unwrap();
            assert_eq!(
                bounds,
                BoundingBox {
                    x_min: outline.bounds.x_min as i32,
                    y_min: outline.bounds.y_min as i32,
                    x_max: outline.bounds.x_max as i32,
                    y_max: outline.bounds.y_max as i32,
                },
                "glyph {gid}"
            );
        }
    }

    #[test]
    fn offset_component_shifts_points() {
        let font = simple_font().build();
        let base = load(&font, glyphs::LETTER_A).unwrap();
        let shifted = load(&font, glyphs::SHIFTED_A).unwrap();
        let expected: Vec<_> = base
            .points
            .iter()
            .map(|p| Point::new(p.x + 100, p.y - 50))
            .collect();
        assert_eq!(shifted.points, expected);
        assert_eq!(shifted.flags, base.flags);
        assert_eq!(shifted.contours, base.contours);
        assert_eq!(
            shifted.bounds,
            BoundingBox {
                x_min: 100,
                y_min: -50,
                x_max: 700,
                y_max: 650
            }
        );
    }

    #[test]
    fn nested_components() {
        let font = simple_font().build();
        let outline = load(&font, glyphs::NESTED).unwrap();
        assert_eq!(outline.points.len(), 16);
        // square scaled by 0.5 then moved by (10, 20)
        assert_eq!(
            &outline.points[..8],
            points(&[
                (10, 20),
                (10, 320),
                (310, 320),
                (310, 20),
                (85, 95),
                (235, 95),
                (235, 245),
                (85, 245)
            ])
        );
        // shifted A, moved again by (0, 300)
        assert_eq!(outline.points[8], Point::new(100, 250));
        assert_eq!(outline.points[15], Point::new(400, 650));
        assert_eq!(outline.contours, [3, 7, 12, 15]);
    }

    #[test]
    fn two_by_two_transform_is_rounded() {
        let triangle = simple_glyph(&[&[(0, 0, true), (100, 0, true), (0, 101, true)]], &[]);
        // swap x and y, halve the result
        let swapped = composite_glyph(
            BoundingBox::default(),
            &[Component::offset(0, 5, -5)
                .with_transform(Transform::TwoByTwo(0.0, 0.5, 0.5, 0.0))],
            &[],
        );
        let font = SyntheticFont::new()
            .glyph(triangle, 500)
            .glyph(swapped, 500)
            .build();
        let outline = load(&font, 1).unwrap();
        // (0, 101) maps to (50.5 + 5, 0 - 5), rounded away from zero
        assert_eq!(outline.points, points(&[(5, -5), (5, 45), (56, -5)]));
    }

    #[test]
    fn point_matching_is_rejected() {
        let _ = env_logger::builder().is_test(true).try_init();
        let font = simple_font().build();
        assert_eq!(
            load(&font, glyphs::POINT_MATCHING),
            Err(DrawError::UnsupportedPointMatching(GlyphId::new(
                glyphs::POINT_MATCHING
            )))
        );
    }

    #[test]
    fn recursion_limit() {
        let font = simple_font().build();
        assert_eq!(
            load(&font, glyphs::SELF_REFERENCE),
            Err(DrawError::RecursionLimitExceeded(GlyphId::new(
                glyphs::SELF_REFERENCE
            )))
        );
    }

    #[test]
    fn scratch_is_released_on_error() {
        let font = simple_font().build();
        let mut storage = vec![0u8; 8192];
        let mut arena = Arena::new(&mut storage);
        let directory = FontDirectory::read(FontData::new(&font), &mut arena).unwrap();
        let glyf = Glyf::new(directory.glyf.data(FontData::new(&font)).unwrap());
        let remaining = arena.remaining();
        arena
            .scoped(remaining, |view, scratch| {
                let loader = OutlineLoader::new(view, directory.loca, glyf);
                for gid in [glyphs::POINT_MATCHING, glyphs::SELF_REFERENCE, glyphs::NESTED] {
                    let _ = loader.load(scratch, GlyphId::new(gid));
                    assert_eq!(scratch.used(), 0, "glyph {gid}");
                }
            })
            .unwrap();
    }

    #[test]
    fn empty_glyph() {
        let font = simple_font().build();
        let outline = load(&font, glyphs::SPACE).unwrap();
        assert!(outline.is_empty());
        assert_eq!(outline.bounds, BoundingBox::default());
        assert_eq!(outline.control_bounds(), None);
        assert_eq!(outline.contour_points().count(), 0);
    }

    #[test]
    fn missing_component() {
        let broken = composite_glyph(
            BoundingBox::default(),
            &[Component::offset(42, 0, 0)],
            &[],
        );
        let font = SyntheticFont::new().glyph(broken, 500).build();
        assert_eq!(
            load(&font, 0),
            Err(DrawError::GlyphNotFound(GlyphId::new(42)))
        );
    }
}
