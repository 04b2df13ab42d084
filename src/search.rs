// Copyright 2020 the Meshwarp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parameter ranges covering a target region.
//!
//! Rendering a warped patch into a tile only needs the part of the patch
//! whose image meets the tile. [`tight_param_range_1d`] estimates that
//! part along one parameter axis by bisecting separately for each edge of
//! the target.

use crate::ParamRange;

/// Upper bound on bisection steps per edge.
const MAX_STEPS: usize = 64;

/// The result of [`tight_param_range_1d`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TightRanges {
    /// A parameter range whose image covers the target.
    pub outer: ParamRange,
    /// A parameter range whose image lies inside the target.
    ///
    /// This is a degenerate range when no such range was found.
    pub inner: ParamRange,
}

/// Find the parameter ranges mapping around and into `target`.
///
/// `map` gives, for a parameter in `search_param`, the range covered by
/// the image of the corresponding parameter line projected on the
/// searched axis. It must be monotonically non-decreasing, and
/// `search_src` is the image of the whole `search_param`. When `squeeze`
/// is given, every mapped range is narrowed to that relative sub-range
/// first.
///
/// Each edge of `target` is bracketed by bisection until the mapped
/// ranges on both sides of it are within `src_precision`. A probe whose
/// image touches the edge ends the search for that edge.
///
/// ```
/// use meshwarp::{tight_param_range_1d, ParamRange};
///
/// let ranges = tight_param_range_1d(
///     ParamRange::UNIT,
///     ParamRange::new(0.0, 100.0),
///     ParamRange::new(25.0, 50.0),
///     |t| ParamRange::point(100.0 * t),
///     1e-6,
///     None,
/// );
/// assert_eq!(ranges.outer, ParamRange::new(0.25, 0.5));
/// assert_eq!(ranges.inner, ParamRange::new(0.25, 0.5));
/// ```
pub fn tight_param_range_1d<F>(
    search_param: ParamRange,
    search_src: ParamRange,
    target: ParamRange,
    mut map: F,
    src_precision: f64,
    squeeze: Option<ParamRange>,
) -> TightRanges
where
    F: FnMut(f64) -> ParamRange,
{
    let mut search = |edge: f64| {
        bracket_edge(
            search_param,
            search_src,
            edge,
            &mut map,
            src_precision,
            squeeze,
        )
    };
    let (left_before, left_after) = search(target.start);
    let (right_before, right_after) = search(target.end);

    let outer = ParamRange::new(left_before, right_after);
    let mut inner = ParamRange::new(left_after, right_before);
    if inner.start > inner.end {
        inner = ParamRange::point(inner.mid());
    }
    TightRanges { outer, inner }
}

/// Bisect for the parameter at which the mapped range crosses `edge`.
///
/// Returns the last parameters found to map entirely before and entirely
/// after the edge.
fn bracket_edge<F>(
    param: ParamRange,
    src: ParamRange,
    edge: f64,
    map: &mut F,
    precision: f64,
    squeeze: Option<ParamRange>,
) -> (f64, f64)
where
    F: FnMut(f64) -> ParamRange,
{
    if edge <= src.start {
        return (param.start, param.start);
    }
    if edge >= src.end {
        return (param.end, param.end);
    }

    let target = ParamRange::point(edge);
    let (mut before, mut after) = (param.start, param.end);
    let mut before_gap = edge - src.start;
    let mut after_gap = src.end - edge;

    for _ in 0..MAX_STEPS {
        if before_gap < precision && after_gap < precision {
            return (before, after);
        }
        let mid = 0.5 * (before + after);
        let mut mapped = map(mid);
        if let Some(squeeze) = squeeze {
            mapped = mapped.squeeze(squeeze);
        }
        match mapped.forward_distance_to(target) {
            None => return (mid, mid),
            Some(d) if d > 0.0 => {
                before = mid;
                before_gap = d;
            }
            Some(d) => {
                after = mid;
                after_gap = -d;
            }
        }
    }
    log::trace!("edge {edge} not bracketed within {precision} after {MAX_STEPS} steps");
    (before, after)
}
