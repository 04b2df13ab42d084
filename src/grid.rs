// Copyright 2020 the Meshwarp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sampling patches on grids of point pairs.
//!
//! A rasterizer warps an image by mapping every cell of a grid of source
//! points onto the corresponding quad of mapped points. The functions in
//! this module produce such grids for a single patch.

use alloc::vec::Vec;

use crate::common::lerp;
use crate::cubicbez::merge_linearization_steps;
use crate::mapping::{LevelBasedMapping, PatchMapping, PatchMethod, Svg2Mapping};
use crate::{BezierPatch, CubicBez, PatchPoint, Point, Vec2};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// Accuracy of the arclength estimates used for spacing grid lines.
const ARCLEN_ACCURACY: f64 = 0.01;

/// Upper bound on the number of samples along one grid axis.
const MAX_SAMPLES: usize = 1024;

/// A grid of corresponding source and mapped points.
///
/// Points are stored row by row; see [`SampledGrid::point_index`].
#[derive(Clone, Debug, PartialEq)]
pub struct SampledGrid {
    /// Number of samples along each row.
    pub columns: usize,
    /// Number of rows.
    pub rows: usize,
    /// Points in the source rectangle.
    pub src_points: Vec<Point>,
    /// The corresponding points in image space.
    pub dst_points: Vec<Point>,
}

impl SampledGrid {
    /// Index of the sample in column `col` of row `row`.
    #[inline]
    pub fn point_index(&self, col: usize, row: usize) -> usize {
        row * self.columns + col
    }

    /// The grid cells as `(source quad, mapped quad)` pairs.
    ///
    /// Each quad lists its top left, top right, bottom right and bottom
    /// left samples, in that order.
    pub fn cell_polygons(&self) -> impl Iterator<Item = ([Point; 4], [Point; 4])> + '_ {
        let cols = self.columns.saturating_sub(1);
        let rows = self.rows.saturating_sub(1);
        (0..rows).flat_map(move |row| {
            (0..cols).map(move |col| {
                let idx = [
                    self.point_index(col, row),
                    self.point_index(col + 1, row),
                    self.point_index(col + 1, row + 1),
                    self.point_index(col, row + 1),
                ];
                (
                    idx.map(|i| self.src_points[i]),
                    idx.map(|i| self.dst_points[i]),
                )
            })
        })
    }
}

/// Number of samples needed to cover `extent` with steps of `step`.
fn sample_count(extent: f64, step: f64) -> usize {
    if !(step > 0.0 && step.is_finite()) {
        log::debug!("invalid grid step {step}, sampling the patch corners only");
        return 2;
    }
    let count = (extent / step).ceil();
    if !(count > 2.0) {
        return 2;
    }
    if count > MAX_SAMPLES as f64 {
        log::debug!("grid step {step} needs {count} samples, capping at {MAX_SAMPLES}");
        return MAX_SAMPLES;
    }
    count as usize
}

#[inline]
fn proportion(i: usize, count: usize) -> f64 {
    i as f64 / (count - 1) as f64
}

/// A ruling curve of the grid together with the boundary parameters it
/// was split at.
struct Ruling {
    curve: CubicBez,
    start_param: f64,
    end_param: f64,
    proportion: f64,
}

impl Ruling {
    /// Build the ruling between two opposite boundary curves.
    ///
    /// Its end points are at `proportion` of the arclength of `first` and
    /// `second`, and its handle offsets interpolate the offsets at the
    /// corners where `first` and `second` start and end.
    fn new(
        first: &CubicBez,
        second: &CubicBez,
        start_offsets: (Vec2, Vec2),
        end_offsets: (Vec2, Vec2),
        proportion: f64,
    ) -> Ruling {
        let start_param = first.param_by_proportion(proportion, ARCLEN_ACCURACY);
        let end_param = second.param_by_proportion(proportion, ARCLEN_ACCURACY);
        let p0 = first.eval(start_param);
        let p3 = second.eval(end_param);
        let p1 = p0 + start_offsets.0.lerp(start_offsets.1, proportion);
        let p2 = p3 + end_offsets.0.lerp(end_offsets.1, proportion);
        Ruling {
            curve: CubicBez::new(p0, p1, p2, p3),
            start_param,
            end_param,
            proportion,
        }
    }
}

/// Sample a patch with the level based method, spacing grid lines evenly
/// by arclength.
///
/// The grid has `ceil(size / dst_step)` samples along each axis of the
/// mapped bounding box, at least 2 and at most 1024. Non-positive or
/// non-finite steps give a 2 by 2 grid of the corners.
///
/// Every row is a cubic running between the left and right curves, with
/// handles interpolated from the horizontal corner handles; every column
/// likewise between the top and bottom curves. A sample is the midpoint of
/// its row and column curves, each evaluated where the other one crosses
/// the patch.
///
/// ```
/// use meshwarp::{sample_regular_grid, BezierPatch, Rect, Vec2};
///
/// let patch = BezierPatch::from_rect(Rect::new(0.0, 0.0, 100.0, 50.0));
/// let grid = sample_regular_grid(&patch, Vec2::new(10.0, 10.0));
/// assert_eq!((grid.columns, grid.rows), (10, 5));
/// assert_eq!(grid.cell_polygons().count(), 9 * 4);
/// ```
pub fn sample_regular_grid(patch: &BezierPatch, dst_step: Vec2) -> SampledGrid {
    use PatchPoint::*;

    let bounds = patch.dst_bounding_rect();
    let columns = sample_count(bounds.width(), dst_step.x);
    let rows = sample_count(bounds.height(), dst_step.y);
    let c = patch.curves();

    let offset = |handle: PatchPoint, node: PatchPoint| patch[handle] - patch[node];
    let row_rulings: Vec<Ruling> = (0..rows)
        .map(|row| {
            Ruling::new(
                &c.left,
                &c.right,
                (
                    offset(TopLeftHorizontal, TopLeft),
                    offset(BottomLeftHorizontal, BottomLeft),
                ),
                (
                    offset(TopRightHorizontal, TopRight),
                    offset(BottomRightHorizontal, BottomRight),
                ),
                proportion(row, rows),
            )
        })
        .collect();
    let col_rulings: Vec<Ruling> = (0..columns)
        .map(|col| {
            Ruling::new(
                &c.top,
                &c.bottom,
                (
                    offset(TopLeftVertical, TopLeft),
                    offset(TopRightVertical, TopRight),
                ),
                (
                    offset(BottomLeftVertical, BottomLeft),
                    offset(BottomRightVertical, BottomRight),
                ),
                proportion(col, columns),
            )
        })
        .collect();

    let mut src_points = Vec::with_capacity(rows * columns);
    let mut dst_points = Vec::with_capacity(rows * columns);
    for row in &row_rulings {
        for col in &col_rulings {
            let on_row = row
                .curve
                .eval(lerp(col.start_param, col.end_param, row.proportion));
            let on_col = col
                .curve
                .eval(lerp(row.start_param, row.end_param, col.proportion));
            src_points.push(
                patch
                    .original_rect
                    .relative_to_absolute(Point::new(col.proportion, row.proportion)),
            );
            dst_points.push(on_row.midpoint(on_col));
        }
    }

    SampledGrid {
        columns,
        rows,
        src_points,
        dst_points,
    }
}

/// Sample a patch with the SVG2 Coons method on a uniform grid of local
/// coordinates.
///
/// The grid dimensions follow [`sample_regular_grid`].
pub fn sample_regular_grid_svg2(patch: &BezierPatch, dst_step: Vec2) -> SampledGrid {
    let bounds = patch.dst_bounding_rect();
    let columns = sample_count(bounds.width(), dst_step.x);
    let rows = sample_count(bounds.height(), dst_step.y);
    let xs: Vec<f64> = (0..columns).map(|i| proportion(i, columns)).collect();
    let ys: Vec<f64> = (0..rows).map(|i| proportion(i, rows)).collect();
    sample_local_grid(patch, &Svg2Mapping::new(&patch.curves()), &xs, &ys)
}

/// Sample a patch on the parameters of the adaptive linearizations of its
/// boundary curves.
///
/// The columns are the merged steps of the top and bottom curves, the rows
/// those of the left and right curves, each flattened with tolerance `eps`.
/// Flat patches thus get few samples and strongly bent ones many.
pub fn sample_irregular_grid(patch: &BezierPatch, method: PatchMethod, eps: f64) -> SampledGrid {
    let c = patch.curves();
    let xs = merge_linearization_steps(&c.top.linearize(eps), &c.bottom.linearize(eps));
    let ys = merge_linearization_steps(&c.left.linearize(eps), &c.right.linearize(eps));
    match method {
        PatchMethod::LevelBased => {
            sample_local_grid(patch, &LevelBasedMapping::new(&c), &xs, &ys)
        }
        PatchMethod::Svg2 => sample_local_grid(patch, &Svg2Mapping::new(&c), &xs, &ys),
    }
}

fn sample_local_grid<M: PatchMapping>(
    patch: &BezierPatch,
    mapping: &M,
    xs: &[f64],
    ys: &[f64],
) -> SampledGrid {
    let mut src_points = Vec::with_capacity(xs.len() * ys.len());
    let mut dst_points = Vec::with_capacity(xs.len() * ys.len());
    for &y in ys {
        for &x in xs {
            let local = Point::new(x, y);
            src_points.push(patch.original_rect.relative_to_absolute(local));
            dst_points.push(mapping.eval(local));
        }
    }
    SampledGrid {
        columns: xs.len(),
        rows: ys.len(),
        src_points,
        dst_points,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        sample_irregular_grid, sample_regular_grid, sample_regular_grid_svg2, MAX_SAMPLES,
    };
    use crate::{BezierPatch, PatchMethod, PatchPoint, Point, Rect, Vec2};

    fn warped() -> BezierPatch {
        let mut patch = BezierPatch::from_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        patch[PatchPoint::TopRight] = Point::new(110.0, -10.0);
        patch[PatchPoint::TopLeftHorizontal] += Vec2::new(0.0, -20.0);
        patch[PatchPoint::TopRightHorizontal] += Vec2::new(0.0, 15.0);
        patch[PatchPoint::BottomLeftVertical] += Vec2::new(15.0, 0.0);
        patch[PatchPoint::BottomRight] = Point::new(95.0, 110.0);
        patch
    }

    #[test]
    fn identity_patch_grid() {
        let patch = BezierPatch::from_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let grid = sample_regular_grid(&patch, Vec2::new(2.5, 5.0));
        assert_eq!((grid.columns, grid.rows), (4, 2));
        assert_eq!(grid.src_points.len(), 8);
        for (src, dst) in grid.src_points.iter().zip(&grid.dst_points) {
            assert!(src.fuzzy_eq(*dst, 1e-9), "{src:?} mapped to {dst:?}");
        }
        assert_eq!(grid.src_points[grid.point_index(3, 1)], Point::new(10.0, 10.0));

        let svg2 = sample_regular_grid_svg2(&patch, Vec2::new(2.5, 5.0));
        assert_eq!(svg2.src_points, grid.src_points);
        for (a, b) in svg2.dst_points.iter().zip(&grid.dst_points) {
            assert!(a.fuzzy_eq(*b, 1e-9));
        }
    }

    #[test]
    fn grid_corners_and_edges() {
        let patch = warped();
        let grid = sample_regular_grid(&patch, Vec2::new(10.0, 10.0));
        let (cols, rows) = (grid.columns, grid.rows);
        let corner = |col, row| grid.dst_points[grid.point_index(col, row)];
        assert!(corner(0, 0).fuzzy_eq(patch[PatchPoint::TopLeft], 1e-9));
        assert!(corner(cols - 1, 0).fuzzy_eq(patch[PatchPoint::TopRight], 1e-9));
        assert!(corner(0, rows - 1).fuzzy_eq(patch[PatchPoint::BottomLeft], 1e-9));
        assert!(corner(cols - 1, rows - 1).fuzzy_eq(patch[PatchPoint::BottomRight], 1e-9));

        // the first row lies on the top curve, evenly spaced by arclength
        let top = patch.curves().top;
        for col in 0..cols {
            let p = corner(col, 0);
            let nearest = top.nearest(p);
            assert!(nearest.distance < 1e-6, "column {col} is off the curve");
            let expected = col as f64 / (cols - 1) as f64;
            assert!((top.proportion_by_param(nearest.t, 1e-4) - expected).abs() < 1e-2);
        }
    }

    #[test]
    fn invalid_step_samples_corners() {
        let patch = warped();
        for step in [Vec2::new(0.0, 0.0), Vec2::new(-3.0, f64::NAN)] {
            let grid = sample_regular_grid(&patch, step);
            assert_eq!((grid.columns, grid.rows), (2, 2));
            assert_eq!(grid.cell_polygons().count(), 1);
        }
    }

    #[test]
    fn tiny_step_is_capped() {
        let patch = BezierPatch::from_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        let grid = sample_regular_grid(&patch, Vec2::new(1e-30, 1e-30));
        assert_eq!((grid.columns, grid.rows), (MAX_SAMPLES, MAX_SAMPLES));

        let grid = sample_regular_grid_svg2(&patch, Vec2::new(1e-30, 1e-30));
        assert_eq!((grid.columns, grid.rows), (MAX_SAMPLES, MAX_SAMPLES));
        assert_eq!(grid.dst_points.len(), MAX_SAMPLES * MAX_SAMPLES);
        let last = grid.point_index(MAX_SAMPLES - 1, MAX_SAMPLES - 1);
        assert!(grid.dst_points[last].fuzzy_eq(Point::new(100.0, 100.0), 1e-9));
    }

    #[test]
    fn cell_polygons_are_adjacent_samples() {
        let patch = warped();
        let grid = sample_regular_grid(&patch, Vec2::new(40.0, 60.0));
        let cells: Vec<_> = grid.cell_polygons().collect();
        assert_eq!(cells.len(), (grid.columns - 1) * (grid.rows - 1));
        let (src, dst) = cells[0];
        assert_eq!(src[0], grid.src_points[0]);
        assert_eq!(src[2], grid.src_points[grid.point_index(1, 1)]);
        assert_eq!(dst[1], grid.dst_points[1]);
        assert_eq!(dst[3], grid.dst_points[grid.columns]);
    }

    #[test]
    fn irregular_grid_follows_curvature() {
        let flat = BezierPatch::from_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        let grid = sample_irregular_grid(&flat, PatchMethod::LevelBased, 0.5);
        assert_eq!((grid.columns, grid.rows), (2, 2));

        let patch = warped();
        let grid = sample_irregular_grid(&patch, PatchMethod::LevelBased, 0.5);
        assert!(grid.columns > 2);
        let top = patch.curves().top;
        for col in 0..grid.columns {
            let p = grid.dst_points[grid.point_index(col, 0)];
            assert!(top.nearest(p).distance < 1e-6);
        }
        let svg2 = sample_irregular_grid(&patch, PatchMethod::Svg2, 0.5);
        assert_eq!((svg2.columns, svg2.rows), (grid.columns, grid.rows));
        assert_eq!(svg2.src_points, grid.src_points);
    }
}
