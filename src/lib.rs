// Copyright 2020 the Meshwarp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry of Bézier mesh warps.
//!
//! A mesh warp deforms an image with a grid of cubic Bézier patches. Each
//! [`BezierPatch`] maps a rectangle of the source image onto the region
//! bounded by four cubic curves. This crate contains the geometry needed
//! to apply such a warp: mapping points forward and back through a patch,
//! sampling a patch on a grid for rasterization, and narrowing the part of
//! a patch that is relevant to a region of the image.
//!
//! Two interpolation schemes fill the interior of a patch, selected with
//! [`PatchMethod`]. Both reproduce the boundary curves exactly but warp
//! the interior differently, so a caller should use one of them
//! consistently for forward and inverse mapping.
//!
//! # Examples
//!
//! Mapping through a patch and back:
//! ```
//! use meshwarp::{BezierPatch, PatchPoint, Point, Rect, Vec2};
//!
//! let mut patch = BezierPatch::from_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
//! patch[PatchPoint::TopLeftHorizontal] += Vec2::new(0.0, -20.0);
//! patch[PatchPoint::BottomRight] = Point::new(110.0, 105.0);
//!
//! let local = Point::new(0.25, 0.5);
//! let global = patch.local_to_global(local);
//! assert!(patch.global_to_local(global).distance(local) < 1e-3);
//! ```
//!
//! Measuring a curve:
//! ```
//! use meshwarp::CubicBez;
//!
//! let c = CubicBez::new((0.0, 0.0), (0.0, 50.0), (100.0, 50.0), (100.0, 0.0));
//! let half = c.param_by_proportion(0.5, 1e-6);
//! assert!((half - 0.5).abs() < 1e-6);
//! assert!(c.arclen(1e-6) > 100.0);
//! ```
//!
//! # Features
//!
//! The following crate [feature flags](https://doc.rust-lang.org/cargo/reference/features.html#dependency-features) are available:
//!
//! - `std` (enabled by default): Get floating point functions from the standard library
//!   (likely using your target's libc).
//! - `libm`: Use floating point implementations from [libm][].
//!   This is useful for `no_std` environments.
//!   However, note that the `libm` crate is not as efficient as the standard library.
//! - `optimizer` (enabled by default): Refine inverse mappings with [`Bfgs`].
//!   Without it, inverse mappings return the cheap bounding box estimate.
//! - `mint`: Enable `From`/`Into` conversion of Meshwarp and [mint][] types, enabling interoperability
//!   with other graphics libraries.
//! - `serde`: Implement `serde::Deserialize` and `serde::Serialize` on various types.
//! - `schemars`: Add best-effort support for using Meshwarp types in JSON schemas using [schemars][].
//!
//! At least one of `std` and `libm` is required; `std` overrides `libm`.
//! Note that Meshwarp does require that an allocator is available (i.e. it uses [alloc]).
//!
//! # Diagnostics
//!
//! Iteration caps and degenerate inputs never fail a call; they are
//! reported through the [`log`] facade at `debug` and `trace` level.
//!
//! [libm]: https://docs.rs/libm
//! [mint]: https://docs.rs/mint
//! [schemars]: https://docs.rs/schemars

// LINEBENDER LINT SET - lib.rs - v1
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]
#![allow(
    clippy::unreadable_literal,
    clippy::many_single_char_names,
    clippy::excessive_precision,
    clippy::bool_to_int_with_if
)]
// The following lints are part of the Linebender standard set,
// but resolving them has been deferred for now.
// Feel free to send a PR that solves one or more of these.
#![allow(
    clippy::use_self,
    clippy::return_self_not_must_use,
    clippy::cast_possible_truncation,
    clippy::wildcard_imports,
    clippy::missing_assert_message,
    clippy::exhaustive_enums,
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason
)]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("meshwarp requires either the `std` or `libm` feature");

// Suppress the unused_crate_dependencies lint when both std and libm are specified.
#[cfg(all(feature = "std", feature = "libm"))]
use libm as _;

extern crate alloc;

mod bernstein;
pub mod common;
mod cubicbez;
mod grid;
mod inverse;
mod line;
mod mapping;
mod patch;
mod point;
mod range;
mod rect;
mod search;
mod vec2;

pub use crate::bernstein::{nearest_point, Nearest};
pub use crate::cubicbez::{
    interpolate_quadric, is_linear_segment, merge_linearization_steps, CubicBez,
};
pub use crate::grid::{
    sample_irregular_grid, sample_regular_grid, sample_regular_grid_svg2, SampledGrid,
};
#[cfg(feature = "optimizer")]
pub use crate::inverse::Bfgs;
pub use crate::inverse::{
    solve_local, DefaultMinimizer, LocalSolution, Minimizer, Minimum, NoRefinement, Objective,
    SquaredDistance,
};
pub use crate::line::Line;
pub use crate::mapping::{LevelBasedMapping, PatchCurves, PatchMapping, PatchMethod, Svg2Mapping};
pub use crate::patch::{BezierPatch, PatchPoint};
pub use crate::point::Point;
pub use crate::range::ParamRange;
pub use crate::rect::Rect;
pub use crate::search::{tight_param_range_1d, TightRanges};
pub use crate::vec2::Vec2;
