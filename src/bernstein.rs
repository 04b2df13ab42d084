// Copyright 2020 the Meshwarp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nearest point queries by Bernstein-form root finding.
//!
//! The squared distance from a point to a Bézier curve of degree `n` has
//! its extrema where `(B(t) - p) · B'(t)` vanishes. That product is itself
//! a polynomial of degree `2n - 1`, and it is built directly in Bernstein
//! form from products of the control point offsets and the hodograph.
//! Its roots are isolated by counting sign changes of the control polygon
//! and bisecting, which finds every root in `[0, 1]`.

use arrayvec::ArrayVec;
use smallvec::SmallVec;

use crate::{Point, Vec2};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// Maximum bisection depth of the root finder.
const MAX_DEPTH: usize = 64;

/// Chord flatness tolerance, `2^-(MAX_DEPTH + 1)`.
const FLATNESS_TOLERANCE: f64 = 2.710_505_431_213_761e-20;

/// Products of binomial coefficients for the quadratic case, indexed by
/// `j * 3 + i` where `i` runs over control points and `j` over the hodograph.
const Z2: [f64; 6] = [
    1.0,
    2.0 / 3.0,
    1.0 / 3.0,
    1.0 / 3.0,
    2.0 / 3.0,
    1.0,
];

/// As [`Z2`] for the cubic case, indexed by `j * 4 + i`.
const Z3: [f64; 12] = [1.0, 0.6, 0.3, 0.1, 0.4, 0.6, 0.6, 0.4, 0.1, 0.3, 0.6, 1.0];

/// The result of a nearest point query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Nearest {
    /// The parameter of the nearest point, in `[0, 1]`.
    pub t: f64,
    /// The distance from the query point to the curve.
    pub distance: f64,
    /// The nearest point on the curve.
    pub point: Point,
}

/// Find the point on a Bézier curve nearest to `p`.
///
/// `ctrl` holds the control points of a curve of degree 1 to 3. Lines are
/// solved by projecting onto the chord; quadratics and cubics by finding
/// every root of the distance derivative. Endpoints are always candidates.
///
/// Higher degrees only compare the endpoints. A single control point is
/// its own nearest point, and an empty slice reports an infinite distance.
pub fn nearest_point(ctrl: &[Point], p: Point) -> Nearest {
    let (first, last) = match (ctrl.first(), ctrl.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => {
            return Nearest {
                t: 0.0,
                distance: f64::INFINITY,
                point: p,
            }
        }
    };
    let at = |t: f64| {
        let point = eval(ctrl, t);
        Nearest {
            t,
            distance: point.distance(p),
            point,
        }
    };

    match ctrl.len() {
        1 => at(0.0),
        2 => {
            let d = last - first;
            let len2 = d.hypot2();
            let t = if len2 > 0.0 {
                ((p - first).dot(d) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            at(t)
        }
        3 | 4 => {
            let mut candidates = distance_derivative(ctrl, p).roots();
            candidates.push(0.0);
            candidates.push(1.0);
            let mut best = at(0.0);
            for t in candidates {
                let candidate = at(t);
                if candidate.distance < best.distance {
                    best = candidate;
                }
            }
            best
        }
        n => {
            log::debug!("nearest point on a degree {} curve: comparing endpoints only", n - 1);
            let (da, db) = (first.distance(p), last.distance(p));
            if db < da {
                Nearest {
                    t: 1.0,
                    distance: db,
                    point: last,
                }
            } else {
                Nearest {
                    t: 0.0,
                    distance: da,
                    point: first,
                }
            }
        }
    }
}

/// Evaluate a Bézier curve of any degree up to 5 with de Casteljau.
pub(crate) fn eval(ctrl: &[Point], t: f64) -> Point {
    let mut buf: ArrayVec<Point, 6> = ctrl.iter().copied().take(6).collect();
    while buf.len() > 1 {
        for i in 0..buf.len() - 1 {
            buf[i] = buf[i].lerp(buf[i + 1], t);
        }
        buf.pop();
    }
    buf.first().copied().unwrap_or(Point::ZERO)
}

/// The function `(B(t) - p) · B'(t)` as a Bernstein polynomial.
fn distance_derivative(ctrl: &[Point], p: Point) -> BernsteinSegment {
    let n = ctrl.len() - 1;
    let z: &[f64] = if n == 2 { &Z2 } else { &Z3 };

    let c: ArrayVec<Vec2, 4> = ctrl.iter().map(|&q| q - p).collect();
    let d: ArrayVec<Vec2, 3> = ctrl
        .windows(2)
        .map(|w| n as f64 * (w[1] - w[0]))
        .collect();

    let degree = 2 * n - 1;
    let mut points: ArrayVec<Point, 6> = (0..=degree)
        .map(|k| Point::new(k as f64 / degree as f64, 0.0))
        .collect();
    for (j, dj) in d.iter().enumerate() {
        for (i, ci) in c.iter().enumerate() {
            points[i + j].y += ci.dot(*dj) * z[j * (n + 1) + i];
        }
    }
    BernsteinSegment { points }
}

/// A scalar Bézier function given by control points `(u, f(u))`.
struct BernsteinSegment {
    points: ArrayVec<Point, 6>,
}

impl BernsteinSegment {
    fn roots(&self) -> SmallVec<[f64; 8]> {
        let mut out = SmallVec::new();
        self.find_roots(0, &mut out);
        out
    }

    fn find_roots(&self, depth: usize, out: &mut SmallVec<[f64; 8]>) {
        let crossings = self.sign_changes();
        if crossings == 0 {
            return;
        }
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        if depth >= MAX_DEPTH {
            log::trace!("root isolation hit depth {depth} with {crossings} crossings");
            out.push(0.5 * (first.x + last.x));
            return;
        }
        if crossings == 1 && self.is_flat() {
            out.push(x_intercept(first, last));
            return;
        }
        let (left, right) = self.split_half();
        left.find_roots(depth + 1, out);
        right.find_roots(depth + 1, out);
    }

    /// Number of sign changes along the control polygon; zero counts as
    /// positive.
    fn sign_changes(&self) -> usize {
        let sign = |y: f64| y < 0.0;
        self.points
            .windows(2)
            .filter(|w| sign(w[0].y) != sign(w[1].y))
            .count()
    }

    /// Whether the interior control points lie close enough to the chord
    /// that the chord's x-intercept is an accurate root.
    fn is_flat(&self) -> bool {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        let a = first.y - last.y;
        let b = last.x - first.x;
        let c = first.x * last.y - last.x * first.y;
        if a == 0.0 {
            return false;
        }

        let mut above = 0.0_f64;
        let mut below = 0.0_f64;
        for q in &self.points[1..self.points.len() - 1] {
            let dist = a * q.x + b * q.y + c;
            above = above.max(dist);
            below = below.min(dist);
        }
        // The two intercepts of lines parallel to the chord through the
        // extreme points bound the root.
        0.5 * (above - below) / a.abs() < FLATNESS_TOLERANCE
    }

    fn split_half(&self) -> (BernsteinSegment, BernsteinSegment) {
        let mut left = ArrayVec::new();
        let mut right = ArrayVec::new();
        let mut buf = self.points.clone();
        left.push(buf[0]);
        right.push(buf[buf.len() - 1]);
        while buf.len() > 1 {
            for i in 0..buf.len() - 1 {
                buf[i] = buf[i].midpoint(buf[i + 1]);
            }
            buf.pop();
            left.push(buf[0]);
            right.push(buf[buf.len() - 1]);
        }
        right.reverse();
        (
            BernsteinSegment { points: left },
            BernsteinSegment { points: right },
        )
    }
}

/// Where the chord from `p0` to `p1` crosses `y = 0`.
fn x_intercept(p0: Point, p1: Point) -> f64 {
    let dy = p1.y - p0.y;
    if dy == 0.0 {
        return 0.5 * (p0.x + p1.x);
    }
    p0.x - p0.y * (p1.x - p0.x) / dy
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};

    use super::{eval, nearest_point};
    use crate::{CubicBez, Point};

    #[test]
    fn long_control_polygon_uses_endpoints() {
        let ctrl: Vec<Point> = (0..7).map(|i| Point::new(10.0 * i as f64, 0.0)).collect();
        let n = nearest_point(&ctrl, Point::new(61.0, 0.0));
        assert_eq!(n.t, 1.0);
        assert_eq!(n.point, Point::new(60.0, 0.0));
        assert!((n.distance - 1.0).abs() < 1e-12);

        let n = nearest_point(&ctrl, Point::new(-2.0, 0.0));
        assert_eq!(n.t, 0.0);
        assert_eq!(n.point, Point::new(0.0, 0.0));
    }

    #[test]
    fn nearest_on_line() {
        let line = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let n = nearest_point(&line, Point::new(3.0, 4.0));
        assert_eq!(n.t, 0.3);
        assert_eq!(n.distance, 4.0);
        assert_eq!(n.point, Point::new(3.0, 0.0));

        // clamped beyond the ends
        let n = nearest_point(&line, Point::new(-5.0, 0.0));
        assert_eq!(n.t, 0.0);
        assert_eq!(n.distance, 5.0);
        let n = nearest_point(&line, Point::new(13.0, 4.0));
        assert_eq!(n.t, 1.0);
        assert_eq!(n.distance, 5.0);
    }

    #[test]
    fn nearest_on_straight_cubic_matches_projection() {
        let c = CubicBez::line((0.0, 0.0), (20.0, 10.0));
        let p = Point::new(5.0, 12.0);
        let line = nearest_point(&[c.p0, c.p3], p);
        let cubic = c.nearest(p);
        assert!((line.distance - cubic.distance).abs() < 1e-9);
        assert!(line.point.fuzzy_eq(cubic.point, 1e-9));
    }

    #[test]
    fn nearest_on_quadratic() {
        // y = x^2 on [-1, 1]
        let ctrl = [
            Point::new(-1.0, 1.0),
            Point::new(0.0, -1.0),
            Point::new(1.0, 1.0),
        ];
        let n = nearest_point(&ctrl, Point::new(0.0, -0.5));
        assert!((n.t - 0.5).abs() < 1e-9);
        assert!((n.distance - 0.5).abs() < 1e-9);
    }

    #[test]
    fn nearest_is_global_minimum() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let c = CubicBez::new((0.0, 0.0), (120.0, 200.0), (-20.0, 200.0), (100.0, 0.0));
        for _ in 0..50 {
            let p = Point::new(rng.random_range(-50.0..150.0), rng.random_range(-50.0..200.0));
            let n = c.nearest(p);
            assert!((n.distance - n.point.distance(p)).abs() < 1e-9);
            assert!(n.point.fuzzy_eq(c.eval(n.t), 1e-9));
            for i in 0..=1000 {
                let t = i as f64 / 1000.0;
                assert!(n.distance <= c.eval(t).distance(p) + 1e-9);
            }
        }
    }

    #[test]
    fn degenerate_inputs() {
        let p = Point::new(1.0, 1.0);
        assert_eq!(nearest_point(&[], p).distance, f64::INFINITY);
        let single = nearest_point(&[Point::new(4.0, 5.0)], p);
        assert_eq!(single.distance, 5.0);
        assert_eq!(eval(&[Point::new(4.0, 5.0)], 0.7), Point::new(4.0, 5.0));
    }
}
