// Copyright 2020 the Meshwarp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cubic Bézier segments.

use alloc::vec;
use alloc::vec::Vec;

use smallvec::SmallVec;

use crate::bernstein::{nearest_point, Nearest};
use crate::common::{bernstein3, fuzzy_eq};
use crate::{Line, Point, Vec2};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// Tolerance used by [`CubicBez::degree`].
const DEGREE_EPSILON: f64 = 1e-4;

/// Safety cap on the arclength and inverse arclength recursions.
const MAX_ARCLEN_DEPTH: usize = 32;

/// Cap on the subdivision depth of [`CubicBez::intersect_line`].
const MAX_INTERSECT_DEPTH: usize = 64;

/// A single cubic Bézier segment.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CubicBez {
    /// The start point.
    pub p0: Point,
    /// The first control point.
    pub p1: Point,
    /// The second control point.
    pub p2: Point,
    /// The end point.
    pub p3: Point,
}

impl CubicBez {
    /// Create a new cubic Bézier segment.
    #[inline(always)]
    pub fn new<P: Into<Point>>(p0: P, p1: P, p2: P, p3: P) -> CubicBez {
        CubicBez {
            p0: p0.into(),
            p1: p1.into(),
            p2: p2.into(),
            p3: p3.into(),
        }
    }

    /// A straight segment with its handles at 1/3 and 2/3 of the chord.
    ///
    /// This is the cubic whose parametrization is uniform along the line.
    #[inline]
    pub fn line(p0: impl Into<Point>, p3: impl Into<Point>) -> CubicBez {
        let p0 = p0.into();
        let p3 = p3.into();
        CubicBez::new(p0, p0.lerp(p3, 1.0 / 3.0), p0.lerp(p3, 2.0 / 3.0), p3)
    }

    /// The four control points, in order.
    #[inline]
    pub fn points(&self) -> [Point; 4] {
        [self.p0, self.p1, self.p2, self.p3]
    }

    /// Split the curve at `t` with de Casteljau's algorithm.
    ///
    /// Returns the five points `[q0, q1, q2, q3, q4]` so that the left
    /// daughter curve is `(p0, q0, q1, q2)` and the right one is
    /// `(q2, q3, q4, p3)`. `q2` is the point on the curve at `t`.
    #[inline]
    pub fn split_points(&self, t: f64) -> [Point; 5] {
        let p01 = self.p0.lerp(self.p1, t);
        let p12 = self.p1.lerp(self.p2, t);
        let p23 = self.p2.lerp(self.p3, t);
        let p012 = p01.lerp(p12, t);
        let p123 = p12.lerp(p23, t);
        let p0123 = p012.lerp(p123, t);
        [p01, p012, p0123, p123, p23]
    }

    /// Split the curve at `t` into two daughter curves.
    #[inline]
    pub fn split(&self, t: f64) -> (CubicBez, CubicBez) {
        let [q0, q1, q2, q3, q4] = self.split_points(t);
        (
            CubicBez::new(self.p0, q0, q1, q2),
            CubicBez::new(q2, q3, q4, self.p3),
        )
    }

    /// Subdivide into halves, using de Casteljau.
    #[inline]
    pub fn subdivide(&self) -> (CubicBez, CubicBez) {
        self.split(0.5)
    }

    /// Evaluate the curve at parameter `t`.
    ///
    /// This runs the three lerp rounds of de Casteljau's algorithm.
    #[inline]
    pub fn eval(&self, t: f64) -> Point {
        self.split_points(t)[2]
    }

    /// The first derivative at parameter `t`.
    #[inline]
    pub fn deriv(&self, t: f64) -> Vec2 {
        let mt = 1.0 - t;
        3.0 * mt * mt * (self.p1 - self.p0)
            + 6.0 * mt * t * (self.p2 - self.p1)
            + 3.0 * t * t * (self.p3 - self.p2)
    }

    /// The second derivative at parameter `t`.
    #[inline]
    pub fn deriv2(&self, t: f64) -> Vec2 {
        let mt = 1.0 - t;
        let a = (self.p2 - self.p1) - (self.p1 - self.p0);
        let b = (self.p3 - self.p2) - (self.p2 - self.p1);
        6.0 * mt * a + 6.0 * t * b
    }

    /// The effective degree of the curve.
    ///
    /// Returns 1 when both handles lie on the chord (within `1e-4`), 2 when
    /// the two handles coincide, and 3 otherwise.
    pub fn degree(&self) -> u8 {
        let linear = is_linear_segment(
            self.p0,
            self.deriv(0.0),
            self.p3,
            self.deriv(1.0),
            DEGREE_EPSILON,
        );
        if linear {
            1
        } else if self.p1.fuzzy_eq(self.p2, DEGREE_EPSILON) {
            2
        } else {
            3
        }
    }

    /// Adaptively flatten the curve.
    ///
    /// Returns a strictly increasing list of parameters, starting at `0.0`
    /// and ending at `1.0`, such that every span between consecutive values
    /// passes [`is_linear_segment`] with tolerance `eps`. Spans shorter than
    /// `2 / chord_length` are accepted without testing, which bounds the
    /// work on tiny curves.
    pub fn linearize(&self, eps: f64) -> Vec<f64> {
        let min_step = 2.0 / (self.p3 - self.p0).hypot();

        let mut steps = vec![0.0];
        let mut stack: SmallVec<[(Point, Vec2, f64); 16]> = SmallVec::new();
        stack.push((self.p3, self.deriv(1.0), 1.0));

        let mut last_p = self.p0;
        let mut last_d = self.deriv(0.0);
        let mut last_t = 0.0;

        while let Some(&(p, d, t)) = stack.last() {
            if t - last_t < min_step || is_linear_segment(last_p, last_d, p, d, eps) {
                last_p = p;
                last_d = d;
                last_t = t;
                steps.push(t);
                stack.pop();
            } else {
                let t = 0.5 * (last_t + t);
                stack.push((self.eval(t), self.deriv(t), t));
            }
        }
        steps
    }

    /// Arclength of the curve.
    ///
    /// This is Gravesen's estimator: the mean of chord and control polygon
    /// lengths, subdividing at `t = 0.5` until the two differ by at most
    /// `accuracy`. Quadratic-like curves (see [`CubicBez::degree`]) use the
    /// weighted mean `(2 * chord + polygon) / 3`, straight ones the chord.
    pub fn arclen(&self, accuracy: f64) -> f64 {
        arclen_rec(self, accuracy, 0)
    }

    /// Arclength of the sub-curve `[0, t]`.
    #[inline]
    pub fn arclen_at(&self, t: f64, accuracy: f64) -> f64 {
        self.split(t).0.arclen(accuracy)
    }

    /// Solve for the parameter at which the sub-curve `[0, t]` has length
    /// `length`, given the precomputed `total` length of the curve.
    pub fn param_by_arclen(&self, length: f64, total: f64, accuracy: f64) -> f64 {
        param_by_arclen_rec(self, length, total, accuracy, 0)
    }

    /// Solve for the parameter that splits off the given proportion of the
    /// total arclength.
    ///
    /// A zero-length curve returns `proportion` unchanged.
    pub fn param_by_proportion(&self, proportion: f64, accuracy: f64) -> f64 {
        let total = self.arclen(accuracy);
        if total <= 0.0 {
            return proportion;
        }
        self.param_by_arclen(proportion * total, total, accuracy)
    }

    /// The proportion of the total arclength covered by `[0, t]`.
    ///
    /// A zero-length curve returns `t` unchanged.
    pub fn proportion_by_param(&self, t: f64, accuracy: f64) -> f64 {
        let total = self.arclen(accuracy);
        if total <= 0.0 {
            return t;
        }
        self.arclen_at(t, accuracy) / total
    }

    /// Find the point on the curve nearest to `p`.
    ///
    /// See [`nearest_point`] for the method.
    #[inline]
    pub fn nearest(&self, p: Point) -> Nearest {
        nearest_point(&self.points(), p)
    }

    /// Parameters at which the curve crosses the segment `line`.
    ///
    /// The curve is subdivided while its control polygon touches the line;
    /// once the polygon is shorter than `eps` the middle of the remaining
    /// parameter span is reported, provided its chord crosses the line.
    /// Crossings found in adjacent spans are reported once.
    pub fn intersect_line(&self, line: Line, eps: f64) -> SmallVec<[f64; 4]> {
        let mut spans: SmallVec<[(f64, f64); 4]> = SmallVec::new();
        intersect_line_rec(self, line, eps, 1.0, 0.0, 0, &mut spans);
        spans.iter().map(|&(t0, t1)| 0.5 * (t0 + t1)).collect()
    }

    /// The crossing with `line` whose curve point is nearest to `anchor`.
    pub fn intersect_line_nearest(&self, line: Line, anchor: Point, eps: f64) -> Option<f64> {
        let mut best: Option<(f64, f64)> = None;
        for t in self.intersect_line(line, eps) {
            let d = self.eval(t).distance_squared(anchor);
            if best.map(|(_, best_d)| d < best_d).unwrap_or(true) {
                best = Some((t, d));
            }
        }
        best.map(|(t, _)| t)
    }

    /// Handle displacements that move the curve point at `t` by `offset`.
    ///
    /// The drag is split between the two handles depending on where `t`
    /// lies; within 1/6 of an end only the nearer handle moves. Returns
    /// the offsets to add to `p1` and `p2`. Endpoints cannot be moved by
    /// their handles, so `t` outside `(0, 1)` yields zero offsets.
    pub fn drag_offsets(&self, t: f64, offset: Vec2) -> (Vec2, Vec2) {
        if t <= 0.0 || t >= 1.0 {
            return (Vec2::ZERO, Vec2::ZERO);
        }
        let weight = if t <= 1.0 / 6.0 {
            0.0
        } else if t <= 0.5 {
            ((6.0 * t - 1.0) / 2.0).powi(3) / 2.0
        } else if t <= 5.0 / 6.0 {
            (1.0 - ((6.0 * (1.0 - t) - 1.0) / 2.0).powi(3)) / 2.0 + 0.5
        } else {
            1.0
        };
        let mt = 1.0 - t;
        let move_p1 = ((1.0 - weight) / (3.0 * t * mt * mt)) * offset;
        let move_p2 = (weight / (3.0 * t * t * mt)) * offset;
        (move_p1, move_p2)
    }

    /// Replace this curve and the adjacent curve `next` by a single cubic.
    ///
    /// `next` must start where `self` ends. The handles of the result are
    /// the least squares fit such that splitting it at
    /// `t = len(self) / (len(self) + len(next))` reproduces the interior
    /// control points of both inputs as closely as possible. If the fit is
    /// singular the outer handles are kept.
    pub fn merge_adjacent(&self, next: &CubicBez) -> CubicBez {
        const ACCURACY: f64 = 0.001;
        let len_p = self.arclen(ACCURACY);
        let len_q = next.arclen(ACCURACY);
        let z = if len_p + len_q > 0.0 {
            len_p / (len_p + len_q)
        } else {
            0.5
        };
        let mz = 1.0 - z;

        // Weights of (b0, b1, b2, b3) in the control points of the two
        // halves of the merged curve split at z; the shared rows 0 and 7
        // are fixed and omitted.
        let rows: [([f64; 4], Point); 6] = [
            ([mz, z, 0.0, 0.0], self.p1),
            ([mz * mz, 2.0 * z * mz, z * z, 0.0], self.p2),
            (bernstein3(z), self.p3),
            (bernstein3(z), next.p0),
            ([0.0, mz * mz, 2.0 * z * mz, z * z], next.p1),
            ([0.0, 0.0, mz, z], next.p2),
        ];

        let b0 = self.p0.to_vec2();
        let b3 = next.p3.to_vec2();
        let (mut a11, mut a12, mut a22) = (0.0, 0.0, 0.0);
        let (mut r1, mut r2) = (Vec2::ZERO, Vec2::ZERO);
        for (w, target) in rows {
            let residual = target.to_vec2() - w[0] * b0 - w[3] * b3;
            a11 += w[1] * w[1];
            a12 += w[1] * w[2];
            a22 += w[2] * w[2];
            r1 += w[1] * residual;
            r2 += w[2] * residual;
        }
        let det = a11 * a22 - a12 * a12;
        if det.abs() < 1e-12 {
            return CubicBez::new(self.p0, self.p1, next.p2, next.p3);
        }
        let b1 = (a22 * r1 - a12 * r2) / det;
        let b2 = (a11 * r2 - a12 * r1) / det;
        CubicBez::new(self.p0, b1.to_point(), b2.to_point(), next.p3)
    }
}

/// Whether a span is flat enough to be replaced by its chord.
///
/// `p0`, `p1` are the span's endpoints and `d0`, `d1` the curve derivatives
/// there. Each derivative, scaled by 1/3 as a handle would be, must lie
/// within `eps` of the chord line. A degenerate chord is flat only if both
/// handles collapse onto it.
pub fn is_linear_segment(p0: Point, d0: Vec2, p1: Point, d1: Vec2, eps: f64) -> bool {
    let chord = p1 - p0;
    let len = chord.hypot();
    if len == 0.0 {
        return d0.hypot() <= 3.0 * eps && d1.hypot() <= 3.0 * eps;
    }
    let norm = 1.0 / (3.0 * len);
    (norm * chord.cross(d0)).abs() <= eps && (norm * chord.cross(d1)).abs() <= eps
}

/// Merge two sorted lists of curve parameters.
///
/// Values that compare fuzzily equal are kept once.
pub fn merge_linearization_steps(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut result = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        let next = if j >= b.len() || (i < a.len() && a[i] <= b[j]) {
            i += 1;
            a[i - 1]
        } else {
            j += 1;
            b[j - 1]
        };
        match result.last() {
            Some(&last) if fuzzy_eq(last, next) => {}
            _ => result.push(next),
        }
    }
    result
}

/// The middle control point of the quadratic from `p0` to `p2` that passes
/// through `pt` at parameter `t`.
///
/// Falls back to the midpoint of `p0` and `p2` when `t` is not in `(0, 1)`.
pub fn interpolate_quadric(p0: Point, p2: Point, pt: Point, t: f64) -> Point {
    if t <= 0.0 || t >= 1.0 {
        return p0.midpoint(p2);
    }
    let mt = 1.0 - t;
    let c1 = pt.to_vec2() - mt * mt * p0.to_vec2() - t * t * p2.to_vec2();
    (c1 / (2.0 * t * mt)).to_point()
}

fn arclen_rec(c: &CubicBez, accuracy: f64, depth: usize) -> f64 {
    let degree = c.degree();
    let chord = (c.p3 - c.p0).hypot();
    if degree == 1 {
        return chord;
    }
    let poly = (c.p1 - c.p0).hypot() + (c.p2 - c.p1).hypot() + (c.p3 - c.p2).hypot();
    if poly - chord > accuracy {
        if depth < MAX_ARCLEN_DEPTH {
            let (c0, c1) = c.subdivide();
            return arclen_rec(&c0, accuracy, depth + 1) + arclen_rec(&c1, accuracy, depth + 1);
        }
        log::trace!("arclength recursion capped at depth {depth}, gap {}", poly - chord);
    }
    if degree == 3 {
        0.5 * chord + 0.5 * poly
    } else {
        (2.0 * chord + poly) / 3.0
    }
}

fn param_by_arclen_rec(c: &CubicBez, length: f64, total: f64, accuracy: f64, depth: usize) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    let split_at = (length / total).clamp(0.0, 1.0);
    let (left, right) = c.split(split_at);
    let portion = left.arclen(accuracy);

    if (portion - length).abs() < accuracy {
        split_at
    } else if depth >= MAX_ARCLEN_DEPTH {
        log::trace!("inverse arclength capped at depth {depth}");
        split_at
    } else if portion < length {
        split_at
            + (1.0 - split_at)
                * param_by_arclen_rec(&right, length - portion, total - portion, accuracy, depth + 1)
    } else {
        split_at * param_by_arclen_rec(&left, length, portion, accuracy, depth + 1)
    }
}

fn intersect_line_rec(
    c: &CubicBez,
    line: Line,
    eps: f64,
    span: f64,
    start: f64,
    depth: usize,
    out: &mut SmallVec<[(f64, f64); 4]>,
) {
    let poly = (c.p1 - c.p0).hypot() + (c.p2 - c.p1).hypot() + (c.p3 - c.p2).hypot();

    if poly < eps || depth >= MAX_INTERSECT_DEPTH {
        if Line::new(c.p0, c.p3).intersects(line) {
            let end = start + span;
            if let Some(last) = out.last_mut() {
                if last.1 == start {
                    last.1 = end;
                    return;
                }
            }
            out.push((start, end));
        }
        return;
    }

    let touches = Line::new(c.p0, c.p1).intersects(line)
        || Line::new(c.p1, c.p2).intersects(line)
        || Line::new(c.p2, c.p3).intersects(line);
    if touches {
        let (c0, c1) = c.subdivide();
        let half = 0.5 * span;
        intersect_line_rec(&c0, line, eps, half, start, depth + 1, out);
        intersect_line_rec(&c1, line, eps, half, start + half, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use crate::cubicbez::{interpolate_quadric, is_linear_segment, merge_linearization_steps};
    use crate::{CubicBez, Line, Point, Vec2};

    // y = x^2
    fn parabola() -> CubicBez {
        CubicBez::new(
            (0.0, 0.0),
            (1.0 / 3.0, 0.0),
            (2.0 / 3.0, 1.0 / 3.0),
            (1.0, 1.0),
        )
    }

    #[test]
    fn cubicbez_eval_matches_bernstein() {
        let c = CubicBez::new((0.0, 0.0), (30.0, 80.0), (70.0, -40.0), (100.0, 10.0));
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            let mt = 1.0 - t;
            let expected = (mt * mt * mt) * c.p0.to_vec2()
                + (3.0 * mt * mt * t) * c.p1.to_vec2()
                + (3.0 * mt * t * t) * c.p2.to_vec2()
                + (t * t * t) * c.p3.to_vec2();
            assert!(c.eval(t).fuzzy_eq(expected.to_point(), 1e-9));
        }
    }

    #[test]
    fn cubicbez_split_daughters() {
        let c = CubicBez::new((0.0, 0.0), (30.0, 80.0), (70.0, -40.0), (100.0, 10.0));
        let t = 0.3;
        let (a, b) = c.split(t);
        assert_eq!(a.p3, b.p0);
        assert!(a.p3.fuzzy_eq(c.eval(t), 1e-12));
        for i in 0..=4 {
            let s = i as f64 / 4.0;
            assert!(a.eval(s).fuzzy_eq(c.eval(s * t), 1e-9));
            assert!(b.eval(s).fuzzy_eq(c.eval(t + s * (1.0 - t)), 1e-9));
        }
    }

    #[test]
    fn cubicbez_deriv() {
        let c = parabola();
        let delta = 1e-6;
        for i in 0..10 {
            let t = i as f64 / 10.0;
            let d_approx = (c.eval(t + delta) - c.eval(t)) * delta.recip();
            assert!((c.deriv(t) - d_approx).hypot() < delta * 10.0);
            let dd_approx = (c.deriv(t + delta) - c.deriv(t)) * delta.recip();
            assert!((c.deriv2(t) - dd_approx).hypot() < 1e-4);
        }
    }

    #[test]
    fn cubicbez_degree() {
        let line = CubicBez::new((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0));
        assert_eq!(line.degree(), 1);
        let quad_like = CubicBez::new((0.0, 0.0), (5.0, 5.0), (5.0, 5.0), (10.0, 0.0));
        assert_eq!(quad_like.degree(), 2);
        assert_eq!(parabola().degree(), 3);
    }

    #[test]
    fn cubicbez_arclen() {
        let c = parabola();
        let true_arclen = 0.5 * 5.0f64.sqrt() + 0.25 * (2.0 + 5.0f64.sqrt()).ln();
        for i in 1..6 {
            let accuracy = 0.1f64.powi(i);
            let error = c.arclen(accuracy) - true_arclen;
            assert!(error.abs() < accuracy, "accuracy {accuracy:e}: error {error:e}");
        }
        let line = CubicBez::line((0.0, 0.0), (3.0, 4.0));
        assert_eq!(line.arclen(1e-3), 5.0);
    }

    #[test]
    fn cubicbez_arclen_at_is_monotonic() {
        let c = CubicBez::new((0.0, 0.0), (0.0, 100.0), (100.0, 100.0), (100.0, 0.0));
        let accuracy = 1e-3;
        let mut last = 0.0;
        for i in 0..=20 {
            let t = i as f64 / 20.0;
            let len = c.arclen_at(t, accuracy);
            assert!(len >= last - accuracy, "t={t}: {len} < {last}");
            last = len;
        }
        assert!((c.arclen_at(1.0, accuracy) - c.arclen(accuracy)).abs() < 1e-9);
        assert_eq!(c.arclen_at(0.0, accuracy), 0.0);
    }

    #[test]
    fn cubicbez_param_by_proportion() {
        let c = CubicBez::new((0.0, 0.0), (10.0, 60.0), (90.0, 60.0), (100.0, 0.0));
        let accuracy = 1e-4;
        let total = c.arclen(accuracy);
        for i in 0..=10 {
            let proportion = i as f64 / 10.0;
            let t = c.param_by_proportion(proportion, accuracy);
            assert!((0.0..=1.0).contains(&t));
            let len = c.arclen_at(t, accuracy);
            assert!(
                (len - proportion * total).abs() < 1e-2,
                "proportion {proportion}: wanted {} got {len}",
                proportion * total
            );
            assert!((c.proportion_by_param(t, accuracy) - proportion).abs() < 1e-3);
        }
        // symmetric curve: half of the length is reached at t = 0.5
        assert!((c.param_by_proportion(0.5, accuracy) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn cubicbez_uniform_line_params() {
        let c = CubicBez::line((0.0, 0.0), (10.0, 0.0));
        for i in 0..=8 {
            let p = i as f64 / 8.0;
            assert!((c.param_by_proportion(p, 1e-6) - p).abs() < 1e-6);
        }
    }

    #[test]
    fn linearize_fidelity() {
        let c = CubicBez::new((0.0, 0.0), (0.0, 300.0), (400.0, -100.0), (400.0, 200.0));
        for eps in [2.0, 0.5, 0.1] {
            let steps = c.linearize(eps);
            assert_eq!(steps[0], 0.0);
            assert_eq!(*steps.last().unwrap(), 1.0);
            let min_step = 2.0 / (c.p3 - c.p0).hypot();
            for w in steps.windows(2) {
                let (a, b) = (w[0], w[1]);
                assert!(a < b);
                assert!(
                    b - a < min_step
                        || is_linear_segment(c.eval(a), c.deriv(a), c.eval(b), c.deriv(b), eps)
                );
            }
        }
        let coarse = c.linearize(2.0).len();
        let fine = c.linearize(0.1).len();
        assert!(fine > coarse);
    }

    #[test]
    fn linearize_straight_curve() {
        let c = CubicBez::line((0.0, 0.0), (100.0, 50.0));
        assert_eq!(c.linearize(0.1), vec![0.0, 1.0]);
    }

    #[test]
    fn merge_steps() {
        let a = [0.0, 0.25, 0.5, 1.0];
        let b = [0.0, 0.5, 0.75, 1.0];
        assert_eq!(merge_linearization_steps(&a, &b), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(merge_linearization_steps(&a, &[]), a.to_vec());
    }

    #[test]
    fn intersect_with_line() {
        // an arch crossing the horizontal line y = 30 twice
        let c = CubicBez::new((0.0, 0.0), (0.0, 80.0), (100.0, 80.0), (100.0, 0.0));
        let line = Line::new((-10.0, 30.0), (110.0, 30.0));
        let roots = c.intersect_line(line, 1e-3);
        assert_eq!(roots.len(), 2);
        for &t in &roots {
            assert!((c.eval(t).y - 30.0).abs() < 1e-2, "t={t} gives {:?}", c.eval(t));
        }
        let left = c.intersect_line_nearest(line, Point::new(0.0, 30.0), 1e-3).unwrap();
        assert!(c.eval(left).x < 50.0);

        let miss = Line::new((-10.0, 90.0), (110.0, 90.0));
        assert!(c.intersect_line(miss, 1e-3).is_empty());
        assert!(c.intersect_line_nearest(miss, Point::ZERO, 1e-3).is_none());
    }

    #[test]
    fn drag_moves_curve_point() {
        let c = CubicBez::new((0.0, 0.0), (30.0, 40.0), (70.0, 40.0), (100.0, 0.0));
        let offset = Vec2::new(5.0, -8.0);
        for t in [0.1, 0.3, 0.5, 0.7, 0.9] {
            let (d1, d2) = c.drag_offsets(t, offset);
            let moved = CubicBez::new(c.p0, c.p1 + d1, c.p2 + d2, c.p3);
            assert!(moved.eval(t).fuzzy_eq(c.eval(t) + offset, 1e-9), "t={t}");
        }
        assert_eq!(c.drag_offsets(0.0, offset), (Vec2::ZERO, Vec2::ZERO));
    }

    #[test]
    fn quadric_through_point() {
        let p0 = Point::new(0.0, 0.0);
        let p2 = Point::new(10.0, 0.0);
        let c1 = Point::new(5.0, 10.0);
        let t = 0.3;
        let mt = 1.0 - t;
        let pt = (mt * mt * p0.to_vec2() + 2.0 * t * mt * c1.to_vec2() + t * t * p2.to_vec2())
            .to_point();
        assert!(interpolate_quadric(p0, p2, pt, t).fuzzy_eq(c1, 1e-9));
        assert_eq!(interpolate_quadric(p0, p2, pt, 1.0), Point::new(5.0, 0.0));
    }

    #[test]
    fn merge_adjacent_restores_split_curve() {
        let c = CubicBez::new((0.0, 0.0), (20.0, 60.0), (80.0, 60.0), (100.0, 0.0));
        let (a, b) = c.split(0.5);
        let merged = a.merge_adjacent(&b);
        assert_eq!(merged.p0, c.p0);
        assert_eq!(merged.p3, c.p3);
        assert!(merged.p1.fuzzy_eq(c.p1, 1e-3), "{:?}", merged.p1);
        assert!(merged.p2.fuzzy_eq(c.p2, 1e-3), "{:?}", merged.p2);
    }
}
