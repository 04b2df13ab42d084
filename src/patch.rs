// Copyright 2020 the Meshwarp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bézier mesh patches.

use core::ops::{Index, IndexMut};

use crate::inverse::{solve_local, DefaultMinimizer, LocalSolution, Minimizer};
use crate::mapping::{LevelBasedMapping, PatchCurves, PatchMapping, PatchMethod, Svg2Mapping};
use crate::{CubicBez, Point, Rect};

/// Names of the twelve control points of a [`BezierPatch`].
///
/// Every corner has a horizontal handle, controlling the top or bottom
/// curve, and a vertical handle, controlling the left or right curve.
/// The discriminants are the indices into [`BezierPatch::points`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PatchPoint {
    /// The top left corner.
    TopLeft = 0,
    /// The handle of the top curve at the top left corner.
    TopLeftHorizontal,
    /// The handle of the left curve at the top left corner.
    TopLeftVertical,
    /// The top right corner.
    TopRight,
    /// The handle of the top curve at the top right corner.
    TopRightHorizontal,
    /// The handle of the right curve at the top right corner.
    TopRightVertical,
    /// The bottom left corner.
    BottomLeft,
    /// The handle of the bottom curve at the bottom left corner.
    BottomLeftHorizontal,
    /// The handle of the left curve at the bottom left corner.
    BottomLeftVertical,
    /// The bottom right corner.
    BottomRight,
    /// The handle of the bottom curve at the bottom right corner.
    BottomRightHorizontal,
    /// The handle of the right curve at the bottom right corner.
    BottomRightVertical,
}

/// One cell of a Bézier mesh.
///
/// The patch maps the rectangle `original_rect` of the source image onto
/// the region bounded by its four boundary curves. Local coordinates
/// `(u, v)` in the unit square are the common parametrization of both.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BezierPatch {
    /// The source rectangle.
    pub original_rect: Rect,
    /// The control points, indexed by [`PatchPoint`].
    pub points: [Point; 12],
}

impl BezierPatch {
    /// Create a patch from its source rectangle and control points.
    #[inline]
    pub fn new(original_rect: Rect, points: [Point; 12]) -> BezierPatch {
        BezierPatch {
            original_rect,
            points,
        }
    }

    /// The identity patch of a rectangle.
    ///
    /// The boundary curves are the straight edges with handles at 1/3 and
    /// 2/3, so local coordinates map linearly onto the rectangle.
    pub fn from_rect(rect: Rect) -> BezierPatch {
        let tl = Point::new(rect.x0, rect.y0);
        let tr = Point::new(rect.x1, rect.y0);
        let bl = Point::new(rect.x0, rect.y1);
        let br = Point::new(rect.x1, rect.y1);
        let third = |a: Point, b: Point| a.lerp(b, 1.0 / 3.0);
        BezierPatch {
            original_rect: rect,
            points: [
                tl,
                third(tl, tr),
                third(tl, bl),
                tr,
                third(tr, tl),
                third(tr, br),
                bl,
                third(bl, br),
                third(bl, tl),
                br,
                third(br, bl),
                third(br, tr),
            ],
        }
    }

    /// The bounding box of the twelve control points.
    ///
    /// This contains the whole warped patch.
    pub fn dst_bounding_rect(&self) -> Rect {
        let first = self.points[0];
        self.points[1..]
            .iter()
            .fold(Rect::from_points(first, first), |rect, &pt| rect.union_pt(pt))
    }

    /// The source rectangle.
    #[inline]
    pub fn src_bounding_rect(&self) -> Rect {
        self.original_rect
    }

    /// The four boundary curves.
    pub fn curves(&self) -> PatchCurves {
        use PatchPoint::*;

        PatchCurves {
            top: CubicBez::new(
                self[TopLeft],
                self[TopLeftHorizontal],
                self[TopRightHorizontal],
                self[TopRight],
            ),
            bottom: CubicBez::new(
                self[BottomLeft],
                self[BottomLeftHorizontal],
                self[BottomRightHorizontal],
                self[BottomRight],
            ),
            left: CubicBez::new(
                self[TopLeft],
                self[TopLeftVertical],
                self[BottomLeftVertical],
                self[BottomLeft],
            ),
            right: CubicBez::new(
                self[TopRight],
                self[TopRightVertical],
                self[BottomRightVertical],
                self[BottomRight],
            ),
        }
    }

    /// Map local coordinates into image space with the level based method.
    ///
    /// ```
    /// use meshwarp::{BezierPatch, Point, Rect};
    ///
    /// let patch = BezierPatch::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
    /// let p = patch.local_to_global(Point::new(0.5, 0.5));
    /// assert!(p.fuzzy_eq(Point::new(5.0, 5.0), 1e-9));
    /// ```
    pub fn local_to_global(&self, local: Point) -> Point {
        LevelBasedMapping::new(&self.curves()).eval(local)
    }

    /// Find the local coordinates of an image point with the level based
    /// method.
    ///
    /// The result is accurate only with the `optimizer` feature; otherwise
    /// it is the relative position in [`BezierPatch::dst_bounding_rect`].
    pub fn global_to_local(&self, global: Point) -> Point {
        self.solve_local(PatchMethod::LevelBased, global, &DefaultMinimizer::default())
            .local
    }

    /// Map local coordinates into image space with the SVG2 Coons method.
    pub fn local_to_global_svg2(&self, local: Point) -> Point {
        Svg2Mapping::new(&self.curves()).eval(local)
    }

    /// Find the local coordinates of an image point with the SVG2 Coons
    /// method.
    pub fn global_to_local_svg2(&self, global: Point) -> Point {
        self.solve_local(PatchMethod::Svg2, global, &DefaultMinimizer::default())
            .local
    }

    /// Map local coordinates into image space with the given method.
    pub fn map_local(&self, method: PatchMethod, local: Point) -> Point {
        match method {
            PatchMethod::LevelBased => self.local_to_global(local),
            PatchMethod::Svg2 => self.local_to_global_svg2(local),
        }
    }

    /// Invert the given method at `global`, refining with `minimizer`.
    pub fn solve_local<Z: Minimizer>(
        &self,
        method: PatchMethod,
        global: Point,
        minimizer: &Z,
    ) -> LocalSolution {
        let curves = self.curves();
        let bounds = self.dst_bounding_rect();
        match method {
            PatchMethod::LevelBased => {
                solve_local(&LevelBasedMapping::new(&curves), bounds, global, minimizer)
            }
            PatchMethod::Svg2 => solve_local(&Svg2Mapping::new(&curves), bounds, global, minimizer),
        }
    }

    /// Split the patch along the vertical parameter line `u = t`.
    ///
    /// Returns the left and right patches. The top and bottom curves are
    /// split with de Casteljau; the handles of the new vertical boundary
    /// interpolate the vertical handle offsets of the old corners.
    pub fn split_horizontally(&self, t: f64) -> (BezierPatch, BezierPatch) {
        use PatchPoint::*;

        let curves = self.curves();
        let [t0, t1, t2, t3, t4] = curves.top.split_points(t);
        let [b0, b1, b2, b3, b4] = curves.bottom.split_points(t);

        let top_offset =
            (self[TopLeftVertical] - self[TopLeft]).lerp(self[TopRightVertical] - self[TopRight], t);
        let bottom_offset = (self[BottomLeftVertical] - self[BottomLeft])
            .lerp(self[BottomRightVertical] - self[BottomRight], t);

        let rect = self.original_rect;
        let mid_x = rect.x0 + t * rect.width();

        let mut left = *self;
        left.original_rect = Rect::new(rect.x0, rect.y0, mid_x, rect.y1);
        left[TopLeftHorizontal] = t0;
        left[TopRightHorizontal] = t1;
        left[TopRight] = t2;
        left[TopRightVertical] = t2 + top_offset;
        left[BottomLeftHorizontal] = b0;
        left[BottomRightHorizontal] = b1;
        left[BottomRight] = b2;
        left[BottomRightVertical] = b2 + bottom_offset;

        let mut right = *self;
        right.original_rect = Rect::new(mid_x, rect.y0, rect.x1, rect.y1);
        right[TopLeft] = t2;
        right[TopLeftHorizontal] = t3;
        right[TopRightHorizontal] = t4;
        right[TopLeftVertical] = t2 + top_offset;
        right[BottomLeft] = b2;
        right[BottomLeftHorizontal] = b3;
        right[BottomRightHorizontal] = b4;
        right[BottomLeftVertical] = b2 + bottom_offset;

        (left, right)
    }

    /// Split the patch along the horizontal parameter line `v = t`.
    ///
    /// Returns the top and bottom patches.
    pub fn split_vertically(&self, t: f64) -> (BezierPatch, BezierPatch) {
        use PatchPoint::*;

        let curves = self.curves();
        let [l0, l1, l2, l3, l4] = curves.left.split_points(t);
        let [r0, r1, r2, r3, r4] = curves.right.split_points(t);

        let left_offset = (self[TopLeftHorizontal] - self[TopLeft])
            .lerp(self[BottomLeftHorizontal] - self[BottomLeft], t);
        let right_offset = (self[TopRightHorizontal] - self[TopRight])
            .lerp(self[BottomRightHorizontal] - self[BottomRight], t);

        let rect = self.original_rect;
        let mid_y = rect.y0 + t * rect.height();

        let mut top = *self;
        top.original_rect = Rect::new(rect.x0, rect.y0, rect.x1, mid_y);
        top[TopLeftVertical] = l0;
        top[BottomLeftVertical] = l1;
        top[BottomLeft] = l2;
        top[BottomLeftHorizontal] = l2 + left_offset;
        top[TopRightVertical] = r0;
        top[BottomRightVertical] = r1;
        top[BottomRight] = r2;
        top[BottomRightHorizontal] = r2 + right_offset;

        let mut bottom = *self;
        bottom.original_rect = Rect::new(rect.x0, mid_y, rect.x1, rect.y1);
        bottom[TopLeft] = l2;
        bottom[TopLeftVertical] = l3;
        bottom[BottomLeftVertical] = l4;
        bottom[TopLeftHorizontal] = l2 + left_offset;
        bottom[TopRight] = r2;
        bottom[TopRightVertical] = r3;
        bottom[BottomRightVertical] = r4;
        bottom[TopRightHorizontal] = r2 + right_offset;

        (top, bottom)
    }
}

impl Index<PatchPoint> for BezierPatch {
    type Output = Point;

    #[inline]
    fn index(&self, index: PatchPoint) -> &Point {
        &self.points[index as usize]
    }
}

impl IndexMut<PatchPoint> for BezierPatch {
    #[inline]
    fn index_mut(&mut self, index: PatchPoint) -> &mut Point {
        &mut self.points[index as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::PatchPoint::*;
    use crate::{BezierPatch, PatchMethod, Point, Rect, Vec2};

    fn square() -> BezierPatch {
        BezierPatch::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0))
    }

    fn warped() -> BezierPatch {
        let mut patch = BezierPatch::from_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        patch[TopRight] = Point::new(110.0, -10.0);
        patch[TopLeftHorizontal] += Vec2::new(0.0, -20.0);
        patch[TopRightHorizontal] += Vec2::new(0.0, 15.0);
        patch[BottomLeftVertical] += Vec2::new(15.0, 0.0);
        patch[BottomRight] = Point::new(95.0, 110.0);
        patch[BottomRightHorizontal] += Vec2::new(-5.0, 10.0);
        patch[TopRightVertical] += Vec2::new(20.0, -10.0);
        patch
    }

    #[test]
    fn square_patch_center() {
        let patch = square();
        assert_eq!(patch.dst_bounding_rect(), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(patch.src_bounding_rect(), Rect::new(0.0, 0.0, 10.0, 10.0));
        let center = Point::new(0.5, 0.5);
        assert!(patch.local_to_global(center).fuzzy_eq(Point::new(5.0, 5.0), 1e-9));
        assert!(patch.local_to_global_svg2(center).fuzzy_eq(Point::new(5.0, 5.0), 1e-9));
    }

    #[test]
    fn curves_share_corners() {
        let c = warped().curves();
        assert_eq!(c.top.p0, c.left.p0);
        assert_eq!(c.top.p3, c.right.p0);
        assert_eq!(c.bottom.p0, c.left.p3);
        assert_eq!(c.bottom.p3, c.right.p3);
    }

    #[test]
    fn boundary_is_exact_for_both_methods() {
        let patch = warped();
        let c = patch.curves();
        for method in [PatchMethod::LevelBased, PatchMethod::Svg2] {
            for i in 0..=8 {
                let t = i as f64 / 8.0;
                let top = patch.map_local(method, Point::new(t, 0.0));
                assert!(top.fuzzy_eq(c.top.eval(t), 1e-9), "{method:?} top at {t}");
                let right = patch.map_local(method, Point::new(1.0, t));
                assert!(right.fuzzy_eq(c.right.eval(t), 1e-9), "{method:?} right at {t}");
            }
        }
    }

    #[test]
    fn identity_patch_is_linear() {
        let patch = BezierPatch::from_rect(Rect::new(10.0, 20.0, 50.0, 40.0));
        let local = Point::new(0.25, 0.6);
        let expected = Point::new(20.0, 32.0);
        assert!(patch.local_to_global(local).fuzzy_eq(expected, 1e-9));
        assert!(patch.local_to_global_svg2(local).fuzzy_eq(expected, 1e-9));
    }

    #[cfg(feature = "optimizer")]
    #[test]
    fn inverse_round_trip() {
        use rand::{Rng, SeedableRng};

        let patch = warped();
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..40 {
            let local = Point::new(rng.random_range(0.05..0.95), rng.random_range(0.05..0.95));
            for method in [PatchMethod::LevelBased, PatchMethod::Svg2] {
                let global = patch.map_local(method, local);
                let solution = patch.solve_local(method, global, &crate::Bfgs::default());
                assert!(solution.converged, "{method:?} at {local:?}");
                assert!(
                    solution.local.fuzzy_eq(local, 1e-3),
                    "{method:?}: {local:?} came back as {:?}",
                    solution.local
                );
            }
        }
        let global = patch.local_to_global(Point::new(0.3, 0.8));
        assert!(patch.global_to_local(global).fuzzy_eq(Point::new(0.3, 0.8), 1e-3));
        let global = patch.local_to_global_svg2(Point::new(0.7, 0.2));
        assert!(patch.global_to_local_svg2(global).fuzzy_eq(Point::new(0.7, 0.2), 1e-3));
    }

    #[test]
    fn inverse_without_refinement_returns_seed() {
        let patch = warped();
        let bounds = patch.dst_bounding_rect();
        let global = Point::new(40.0, 30.0);
        let solution = patch.solve_local(PatchMethod::LevelBased, global, &crate::NoRefinement);
        assert!(!solution.converged);
        assert_eq!(solution.local, bounds.absolute_to_relative(global));
    }

    #[test]
    fn split_preserves_mapping() {
        let patch = warped();
        let (left, right) = patch.split_horizontally(0.4);
        assert_eq!(left.original_rect, Rect::new(0.0, 0.0, 40.0, 100.0));
        assert_eq!(right.original_rect, Rect::new(40.0, 0.0, 100.0, 100.0));
        // the halves share the outer curves of the original exactly
        for i in 0..=4 {
            let s = i as f64 / 4.0;
            let c = patch.curves();
            assert!(left.curves().top.eval(s).fuzzy_eq(c.top.eval(0.4 * s), 1e-9));
            assert!(right.curves().bottom.eval(s).fuzzy_eq(c.bottom.eval(0.4 + 0.6 * s), 1e-9));
        }
        assert_eq!(left.curves().right, right.curves().left);

        let (top, bottom) = patch.split_vertically(0.5);
        assert_eq!(top.curves().bottom, bottom.curves().top);
        assert_eq!(top[TopLeft], patch[TopLeft]);
        assert_eq!(bottom[BottomRight], patch[BottomRight]);
    }

    #[test]
    fn split_identity_patch_stays_identity() {
        let (left, right) = square().split_horizontally(0.5);
        let expected = [
            BezierPatch::from_rect(Rect::new(0.0, 0.0, 5.0, 10.0)),
            BezierPatch::from_rect(Rect::new(5.0, 0.0, 10.0, 10.0)),
        ];
        for (half, expected) in [left, right].iter().zip(expected.iter()) {
            assert_eq!(half.original_rect, expected.original_rect);
            for (a, b) in half.points.iter().zip(expected.points.iter()) {
                assert!(a.fuzzy_eq(*b, 1e-12), "{a:?} != {b:?}");
            }
        }
    }
}
