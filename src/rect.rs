// Copyright 2020 the Meshwarp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A rectangle.

use crate::{Point, Vec2};

/// An axis-aligned rectangle.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// The minimum x coordinate (left edge).
    pub x0: f64,
    /// The minimum y coordinate (top edge in y-down spaces).
    pub y0: f64,
    /// The maximum x coordinate (right edge).
    pub x1: f64,
    /// The maximum y coordinate (bottom edge in y-down spaces).
    pub y1: f64,
}

impl Rect {
    /// The empty rectangle at the origin.
    pub const ZERO: Rect = Rect::new(0., 0., 0., 0.);

    /// A new rectangle from minimum and maximum coordinates.
    #[inline(always)]
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
        Rect { x0, y0, x1, y1 }
    }

    /// A new rectangle from two points.
    ///
    /// The result will have non-negative width and height.
    #[inline]
    pub fn from_points(p0: impl Into<Point>, p1: impl Into<Point>) -> Rect {
        let p0 = p0.into();
        let p1 = p1.into();
        Rect {
            x0: p0.x.min(p1.x),
            y0: p0.y.min(p1.y),
            x1: p0.x.max(p1.x),
            y1: p0.y.max(p1.y),
        }
    }

    /// A new rectangle from its top-left corner, width and height.
    ///
    /// The result will have non-negative width and height.
    #[inline]
    pub fn from_origin_size(origin: impl Into<Point>, size: impl Into<Vec2>) -> Rect {
        let origin = origin.into();
        Rect::from_points(origin, origin + size.into())
    }

    /// The bounding box of a set of points.
    ///
    /// Returns `None` when the iterator is empty.
    pub fn bounding<I>(points: I) -> Option<Rect>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Rect::from_points(first, first), |rect, pt| {
            rect.union_pt(pt)
        }))
    }

    /// The width of the rectangle.
    ///
    /// Note: nothing forbids negative width.
    #[inline]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// The height of the rectangle.
    ///
    /// Note: nothing forbids negative height.
    #[inline]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// The top left corner of the rectangle.
    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.x0, self.y0)
    }

    /// The area of the rectangle.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Whether this rectangle has zero area.
    #[inline]
    pub fn is_zero_area(&self) -> bool {
        self.area() == 0.0
    }

    /// The center point of the rectangle.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(0.5 * (self.x0 + self.x1), 0.5 * (self.y0 + self.y1))
    }

    /// Returns `true` if `point` lies within `self`, edges included.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x0 && point.x <= self.x1 && point.y >= self.y0 && point.y <= self.y1
    }

    /// The smallest rectangle enclosing two rectangles.
    ///
    /// Results are valid only if width and height are non-negative.
    #[inline]
    pub fn union(&self, other: Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Compute the union with one point.
    ///
    /// This method includes the perimeter of zero-area rectangles.
    /// Thus, a succession of `union_pt` operations on a series of
    /// points yields their enclosing rectangle.
    #[inline]
    pub fn union_pt(&self, pt: Point) -> Rect {
        Rect::new(
            self.x0.min(pt.x),
            self.y0.min(pt.y),
            self.x1.max(pt.x),
            self.y1.max(pt.y),
        )
    }

    /// Map a point given relative to this rectangle (`(0, 0)` is the top
    /// left corner, `(1, 1)` the bottom right one) into absolute coordinates.
    #[inline]
    pub fn relative_to_absolute(&self, rel: Point) -> Point {
        Point::new(
            self.x0 + rel.x * self.width(),
            self.y0 + rel.y * self.height(),
        )
    }

    /// The inverse of [`Rect::relative_to_absolute`].
    ///
    /// A degenerate axis (zero width or height) maps to `0.5`.
    #[inline]
    pub fn absolute_to_relative(&self, abs: Point) -> Point {
        fn rel(x: f64, x0: f64, len: f64) -> f64 {
            if len == 0.0 {
                0.5
            } else {
                (x - x0) / len
            }
        }
        Point::new(
            rel(abs.x, self.x0, self.width()),
            rel(abs.y, self.y0, self.height()),
        )
    }
}

impl From<(Point, Point)> for Rect {
    #[inline(always)]
    fn from(points: (Point, Point)) -> Rect {
        Rect::from_points(points.0, points.1)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Point, Rect};

    #[test]
    fn bounding_accumulates() {
        let pts = [
            Point::new(3.0, 1.0),
            Point::new(-1.0, 4.0),
            Point::new(2.0, -2.0),
        ];
        let r = Rect::bounding(pts).unwrap();
        assert_eq!(r, Rect::new(-1.0, -2.0, 3.0, 4.0));
        assert!(Rect::bounding(core::iter::empty()).is_none());
    }

    #[test]
    fn origin_size() {
        let r = Rect::from_origin_size((10.0, 5.0), (5.0, 5.0));
        assert_eq!(r, Rect::new(10.0, 5.0, 15.0, 10.0));
        let r = Rect::from_origin_size((10.0, 5.0), (-5.0, 5.0));
        assert_eq!(r, Rect::new(5.0, 5.0, 10.0, 10.0));
    }

    #[test]
    fn zero_area() {
        let r = Rect::bounding([Point::new(1.0, 1.0)]).unwrap();
        assert!(r.is_zero_area());
        assert!(r.contains(Point::new(1.0, 1.0)));
        assert_eq!(r.absolute_to_relative(Point::new(7.0, 1.0)), Point::new(0.5, 0.5));
    }

    #[test]
    fn relative_round_trip() {
        let r = Rect::new(10.0, 20.0, 30.0, 60.0);
        let p = Point::new(15.0, 50.0);
        let rel = r.absolute_to_relative(p);
        assert_eq!(rel, Point::new(0.25, 0.75));
        assert_eq!(r.relative_to_absolute(rel), p);
    }
}
