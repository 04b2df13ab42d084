// Copyright 2020 the Meshwarp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-dimensional closed intervals.

use core::ops::Range;

use crate::common::fuzzy_eq;
use crate::Rect;

/// A closed interval `[start, end]` over the reals.
///
/// Used both for coordinates projected onto one axis of the image and for
/// parameter sub-ranges of a curve or patch.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamRange {
    /// The lower end of the interval.
    pub start: f64,
    /// The upper end of the interval.
    pub end: f64,
}

impl ParamRange {
    /// The unit interval `[0, 1]`.
    pub const UNIT: ParamRange = ParamRange::new(0.0, 1.0);

    /// Create a new range.
    #[inline(always)]
    pub const fn new(start: f64, end: f64) -> ParamRange {
        ParamRange { start, end }
    }

    /// The degenerate range `[x, x]`.
    #[inline(always)]
    pub const fn point(x: f64) -> ParamRange {
        ParamRange { start: x, end: x }
    }

    /// The horizontal extent of a rectangle.
    #[inline]
    pub fn from_rect_x(rect: Rect) -> ParamRange {
        ParamRange::new(rect.x0, rect.x1)
    }

    /// The vertical extent of a rectangle.
    #[inline]
    pub fn from_rect_y(rect: Rect) -> ParamRange {
        ParamRange::new(rect.y0, rect.y1)
    }

    /// Whether the range has (fuzzily) zero length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        fuzzy_eq(self.start, self.end)
    }

    /// The length of the range.
    #[inline]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// The midpoint of the range.
    #[inline]
    pub fn mid(&self) -> f64 {
        0.5 * (self.start + self.end)
    }

    /// The point at relative position `t`; `0.0` is `start`, `1.0` is `end`.
    #[inline]
    pub fn interpolate(&self, t: f64) -> f64 {
        self.start + t * self.length()
    }

    /// Whether `x` lies inside the range, ends included.
    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        x >= self.start && x <= self.end
    }

    /// Clamp `x` into the range.
    #[inline]
    pub fn clamp(&self, x: f64) -> f64 {
        x.max(self.start).min(self.end)
    }

    /// The sub-range selected by a relative range.
    ///
    /// `relative` is expressed in fractions of `self`, so squeezing by
    /// [`ParamRange::UNIT`] is the identity.
    #[must_use]
    #[inline]
    pub fn squeeze(&self, relative: ParamRange) -> ParamRange {
        ParamRange::new(self.interpolate(relative.start), self.interpolate(relative.end))
    }

    /// Signed gap from `self` to `other`.
    ///
    /// Returns a positive distance when `self` lies strictly before `other`,
    /// a negative one when it lies strictly after, and `None` when the two
    /// ranges touch or overlap.
    pub fn forward_distance_to(&self, other: ParamRange) -> Option<f64> {
        if self.end < other.start {
            Some(other.start - self.end)
        } else if self.start > other.end {
            Some(other.end - self.start)
        } else {
            None
        }
    }
}

impl From<Range<f64>> for ParamRange {
    #[inline(always)]
    fn from(r: Range<f64>) -> ParamRange {
        ParamRange::new(r.start, r.end)
    }
}

impl From<ParamRange> for Range<f64> {
    #[inline(always)]
    fn from(r: ParamRange) -> Range<f64> {
        r.start..r.end
    }
}
