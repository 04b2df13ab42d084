// Copyright 2020 the Meshwarp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line segments.

use crate::{Point, Vec2};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// A single line segment.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    /// The line's start point.
    pub p0: Point,
    /// The line's end point.
    pub p1: Point,
}

impl Line {
    /// Create a new line.
    #[inline(always)]
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Line {
        Line {
            p0: p0.into(),
            p1: p1.into(),
        }
    }

    /// The length of the line.
    #[inline]
    pub fn length(self) -> f64 {
        (self.p1 - self.p0).hypot()
    }

    /// Evaluate the line at parameter `t`.
    #[inline]
    pub fn eval(&self, t: f64) -> Point {
        self.p0.lerp(self.p1, t)
    }

    /// Whether the two segments share at least one point.
    ///
    /// Touching endpoints count as an intersection. Collinear segments
    /// intersect when their projections overlap.
    pub fn intersects(self, other: Line) -> bool {
        let d = self.p1 - self.p0;
        let e = other.p1 - other.p0;

        let o1 = d.cross(other.p0 - self.p0);
        let o2 = d.cross(other.p1 - self.p0);
        let o3 = e.cross(self.p0 - other.p0);
        let o4 = e.cross(self.p1 - other.p0);

        if o1 == 0.0 && o2 == 0.0 {
            // Collinear: compare extents along the dominant axis.
            let axis = if d.x.abs() + e.x.abs() >= d.y.abs() + e.y.abs() {
                Vec2::new(1.0, 0.0)
            } else {
                Vec2::new(0.0, 1.0)
            };
            let proj = |p: Point| p.to_vec2().dot(axis);
            let (a0, a1) = minmax(proj(self.p0), proj(self.p1));
            let (b0, b1) = minmax(proj(other.p0), proj(other.p1));
            return a0 <= b1 && b0 <= a1;
        }

        o1 * o2 <= 0.0 && o3 * o4 <= 0.0
    }
}

#[inline]
fn minmax(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl From<(Point, Point)> for Line {
    #[inline(always)]
    fn from((from, to): (Point, Point)) -> Self {
        Line::new(from, to)
    }
}

#[cfg(test)]
mod tests {
    use crate::Line;

    #[test]
    fn segment_intersection() {
        let l1 = Line::new((0., 0.), (10., 10.));
        assert!(l1.intersects(Line::new((0., 10.), (10., 0.))));
        assert!(!l1.intersects(Line::new((0., 10.), (4., 6.5))));
        // touching endpoint
        assert!(l1.intersects(Line::new((10., 10.), (20., 0.))));
        // collinear overlap and collinear gap
        assert!(l1.intersects(Line::new((5., 5.), (15., 15.))));
        assert!(!l1.intersects(Line::new((11., 11.), (15., 15.))));
    }
}
