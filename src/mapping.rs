// Copyright 2020 the Meshwarp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Forward mappings from patch parameters to image space.
//!
//! A patch is bounded by four cubic curves. Two interpolation schemes fill
//! the interior: [`LevelBasedMapping`] blends two ruled surfaces whose
//! rulings follow the handles of the boundary nodes, and [`Svg2Mapping`]
//! is the bicubic Coons patch of the SVG2 mesh gradient. Both reproduce
//! the boundary curves exactly on the edges of the unit square.

use crate::common::{bernstein3, bernstein3_deriv, linear_blend, linear_blend_deriv};
use crate::{CubicBez, Point, Vec2};

/// The four boundary curves of a patch.
///
/// `top` and `bottom` run left to right, `left` and `right` top to
/// bottom, so the corners are shared: `top.p0 == left.p0` and so on.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatchCurves {
    /// The curve at `v = 0`.
    pub top: CubicBez,
    /// The curve at `v = 1`.
    pub bottom: CubicBez,
    /// The curve at `u = 0`.
    pub left: CubicBez,
    /// The curve at `u = 1`.
    pub right: CubicBez,
}

/// Selects the interpolation scheme of a patch interior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PatchMethod {
    /// Averaged ruled surfaces, see [`LevelBasedMapping`].
    #[default]
    LevelBased,
    /// The SVG2 Coons patch, see [`Svg2Mapping`].
    Svg2,
}

/// A smooth map from the unit square onto a patch.
pub trait PatchMapping {
    /// The image of the local point `(u, v)`.
    fn eval(&self, local: Point) -> Point;

    /// Partial derivative with respect to `u`.
    fn diff_u(&self, local: Point) -> Vec2;

    /// Partial derivative with respect to `v`.
    fn diff_v(&self, local: Point) -> Vec2;
}

/// One row of blending weights: cubic Bernstein weights for positions
/// along a curve and linear weights for interpolating across the patch.
#[derive(Clone, Copy)]
struct Basis {
    cubic: [f64; 4],
    linear: [f64; 2],
}

impl Basis {
    fn value(t: f64) -> Basis {
        Basis {
            cubic: bernstein3(t),
            linear: linear_blend(t),
        }
    }

    fn deriv(t: f64) -> Basis {
        Basis {
            cubic: bernstein3_deriv(t),
            linear: linear_blend_deriv(),
        }
    }
}

#[inline]
fn blend(w: [f64; 4], pts: [Vec2; 4]) -> Vec2 {
    w[0] * pts[0] + w[1] * pts[1] + w[2] * pts[2] + w[3] * pts[3]
}

#[inline]
fn vecs(c: &CubicBez) -> [Vec2; 4] {
    c.points().map(Point::to_vec2)
}

/// The mesh warp mapping of Krita.
///
/// For a given `v` the left and right curves give the end points of a
/// horizontal ruling curve, and the node handles of the top and bottom
/// curves, interpolated linearly in `v`, give its handles. Symmetrically
/// for a vertical ruling at `u`. The image of `(u, v)` is the average of
/// the two rulings evaluated at the complementary parameter.
///
/// All of this is linear in the blending rows, so the partial derivatives
/// come from substituting the derivative row of one parameter.
#[derive(Clone, Copy, Debug)]
pub struct LevelBasedMapping {
    p: [Vec2; 4],
    q: [Vec2; 4],
    r: [Vec2; 4],
    s: [Vec2; 4],
}

impl LevelBasedMapping {
    /// Create the mapping for a patch.
    pub fn new(curves: &PatchCurves) -> LevelBasedMapping {
        LevelBasedMapping {
            p: vecs(&curves.top),
            q: vecs(&curves.bottom),
            r: vecs(&curves.left),
            s: vecs(&curves.right),
        }
    }

    fn level(&self, u: Basis, v: Basis) -> Vec2 {
        let (p, q, r, s) = (&self.p, &self.q, &self.r, &self.s);

        // horizontal ruling
        let l1 = blend(v.cubic, *r);
        let l4 = blend(v.cubic, *s);
        let l2 = v.linear[0] * (p[1] - p[0]) + v.linear[1] * (q[1] - q[0]);
        let l3 = v.linear[0] * (p[2] - p[3]) + v.linear[1] * (q[2] - q[3]);
        let horizontal = blend(u.cubic, [l1, l1 + l2, l4 + l3, l4]);

        // vertical ruling
        let h1 = blend(u.cubic, *p);
        let h4 = blend(u.cubic, *q);
        let h2 = u.linear[0] * (r[1] - r[0]) + u.linear[1] * (s[1] - s[0]);
        let h3 = u.linear[0] * (r[2] - r[3]) + u.linear[1] * (s[2] - s[3]);
        let vertical = blend(v.cubic, [h1, h1 + h2, h4 + h3, h4]);

        0.5 * (horizontal + vertical)
    }
}

impl PatchMapping for LevelBasedMapping {
    fn eval(&self, local: Point) -> Point {
        self.level(Basis::value(local.x), Basis::value(local.y))
            .to_point()
    }

    fn diff_u(&self, local: Point) -> Vec2 {
        self.level(Basis::deriv(local.x), Basis::value(local.y))
    }

    fn diff_v(&self, local: Point) -> Vec2 {
        self.level(Basis::value(local.x), Basis::deriv(local.y))
    }
}

/// The bicubic Coons patch used by SVG2 mesh gradients.
///
/// The sum of the two ruled surfaces minus the bilinear corner surface,
/// expanded to a polynomial in `u` and `v` whose vector coefficients are
/// computed once per patch.
#[derive(Clone, Copy, Debug)]
pub struct Svg2Mapping {
    a: Vec2,
    b: Vec2,
    c: Vec2,
    d: Vec2,
    e: Vec2,
    f: Vec2,
    g: Vec2,
    h: Vec2,
    i: Vec2,
    j: Vec2,
    k: Vec2,
    origin: Vec2,
}

impl Svg2Mapping {
    /// Create the mapping for a patch.
    pub fn new(curves: &PatchCurves) -> Svg2Mapping {
        let [p0, p1, p2, p3] = vecs(&curves.top);
        let [q0, q1, q2, q3] = vecs(&curves.bottom);
        let [r0, r1, r2, r3] = vecs(&curves.left);
        let [s0, s1, s2, s3] = vecs(&curves.right);

        Svg2Mapping {
            a: p0 - 3.0 * p1 + 3.0 * p2 - p3 - q0 + 3.0 * q1 - 3.0 * q2 + q3,
            b: -p0 + 3.0 * p1 - 3.0 * p2 + p3,
            c: -3.0 * p0 + 6.0 * p1 - 3.0 * p2 + 3.0 * q0 - 6.0 * q1 + 3.0 * q2,
            d: 3.0 * p0 - 6.0 * p1 + 3.0 * p2,
            e: r0 - 3.0 * r1 + 3.0 * r2 - r3 - s0 + 3.0 * s1 - 3.0 * s2 + s3,
            f: -3.0 * r0 + 6.0 * r1 - 3.0 * r2 + 3.0 * s0 - 6.0 * s1 + 3.0 * s2,
            g: 2.0 * p0 - 3.0 * p1 + p3 - 2.0 * q0 + 3.0 * q1 - q3 + 3.0 * r0 - 3.0 * r1 - 3.0 * s0
                + 3.0 * s1,
            h: -2.0 * p0 + 3.0 * p1 - p3 - r0 + s0,
            i: -r0 + 3.0 * r1 - 3.0 * r2 + r3,
            j: 3.0 * r0 - 6.0 * r1 + 3.0 * r2,
            k: -3.0 * r0 + 3.0 * r1,
            origin: r0,
        }
    }
}

impl PatchMapping for Svg2Mapping {
    fn eval(&self, local: Point) -> Point {
        let Point { x: u, y: v } = local;
        let (u2, v2) = (u * u, v * v);
        let (u3, v3) = (u2 * u, v2 * v);
        (self.origin
            + u3 * v * self.a
            + u3 * self.b
            + u2 * v * self.c
            + u2 * self.d
            + u * v3 * self.e
            + u * v2 * self.f
            + u * v * self.g
            + u * self.h
            + v3 * self.i
            + v2 * self.j
            + v * self.k)
            .to_point()
    }

    fn diff_u(&self, local: Point) -> Vec2 {
        let Point { x: u, y: v } = local;
        let (u2, v2) = (u * u, v * v);
        self.h
            + 3.0 * u2 * v * self.a
            + 3.0 * u2 * self.b
            + 2.0 * u * v * self.c
            + 2.0 * u * self.d
            + v2 * v * self.e
            + v2 * self.f
            + v * self.g
    }

    fn diff_v(&self, local: Point) -> Vec2 {
        let Point { x: u, y: v } = local;
        let (u2, v2) = (u * u, v * v);
        self.k
            + u2 * u * self.a
            + u2 * self.c
            + 3.0 * u * v2 * self.e
            + 2.0 * u * v * self.f
            + u * self.g
            + 3.0 * v2 * self.i
            + 2.0 * v * self.j
    }
}
