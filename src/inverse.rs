// Copyright 2020 the Meshwarp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Inversion of a patch mapping.
//!
//! Finding the local coordinates of an image point means minimizing the
//! squared distance between the mapped point and the target. The search
//! starts from the target's relative position in the patch bounding box
//! and is refined by a [`Minimizer`]; without the `optimizer` feature the
//! seed is returned as is.

use crate::mapping::PatchMapping;
use crate::{Point, Rect, Vec2};

/// A function of two variables with an analytic gradient.
pub trait Objective {
    /// The value at `x`.
    fn eval(&self, x: Point) -> f64;

    /// The value and gradient at `x`.
    fn eval_with_gradient(&self, x: Point) -> (f64, Vec2);
}

/// The outcome of a minimization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Minimum {
    /// The best point found.
    pub point: Point,
    /// The objective value at `point`.
    pub value: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the gradient tolerance was met.
    pub converged: bool,
}

/// A local minimization method.
pub trait Minimizer {
    /// Minimize `f` starting from `start`.
    ///
    /// The best point found is always returned; non-convergence is
    /// reported through [`Minimum::converged`].
    fn minimize<F: Objective>(&self, f: &F, start: Point) -> Minimum;
}

/// A minimizer that does not move from the starting point.
///
/// This is the degraded mode used when the `optimizer` feature is off.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoRefinement;

impl Minimizer for NoRefinement {
    fn minimize<F: Objective>(&self, f: &F, start: Point) -> Minimum {
        log::debug!("no refinement, returning the bounding box estimate {start:?}");
        Minimum {
            point: start,
            value: f.eval(start),
            iterations: 0,
            converged: false,
        }
    }
}

/// The minimizer used by the patch methods that do not take one.
#[cfg(feature = "optimizer")]
pub type DefaultMinimizer = Bfgs;

/// The minimizer used by the patch methods that do not take one.
#[cfg(not(feature = "optimizer"))]
pub type DefaultMinimizer = NoRefinement;

/// Quasi-Newton minimization with BFGS updates and a backtracking line
/// search.
#[cfg(feature = "optimizer")]
#[derive(Clone, Copy, Debug)]
pub struct Bfgs {
    /// Stop once the gradient norm is below this value.
    pub gradient_tolerance: f64,
    /// Upper bound on the number of iterations.
    pub max_iterations: usize,
    /// Length of the first trial step.
    pub initial_step: f64,
}

#[cfg(feature = "optimizer")]
impl Default for Bfgs {
    fn default() -> Self {
        Bfgs {
            gradient_tolerance: 1e-4,
            max_iterations: 10_000,
            initial_step: 0.01,
        }
    }
}

/// Sufficient decrease constant of the Armijo condition.
#[cfg(feature = "optimizer")]
const ARMIJO: f64 = 1e-4;

#[cfg(feature = "optimizer")]
const MAX_BACKTRACKS: usize = 60;

/// A symmetric 2x2 matrix.
#[cfg(feature = "optimizer")]
#[derive(Clone, Copy)]
struct Sym2 {
    xx: f64,
    xy: f64,
    yy: f64,
}

#[cfg(feature = "optimizer")]
impl Sym2 {
    const IDENTITY: Sym2 = Sym2 {
        xx: 1.0,
        xy: 0.0,
        yy: 1.0,
    };

    fn apply(&self, v: Vec2) -> Vec2 {
        Vec2::new(
            self.xx * v.x + self.xy * v.y,
            self.xy * v.x + self.yy * v.y,
        )
    }

    fn scaled(s: f64) -> Sym2 {
        Sym2 {
            xx: s,
            xy: 0.0,
            yy: s,
        }
    }

    /// The BFGS update of an inverse Hessian approximation for step `s`
    /// and gradient change `y`, where `s · y > 0`.
    fn bfgs_update(&self, s: Vec2, y: Vec2) -> Sym2 {
        let rho = 1.0 / s.dot(y);
        let hy = self.apply(y);
        let k = rho * rho * y.dot(hy) + rho;
        Sym2 {
            xx: self.xx - 2.0 * rho * s.x * hy.x + k * s.x * s.x,
            xy: self.xy - rho * (s.x * hy.y + hy.x * s.y) + k * s.x * s.y,
            yy: self.yy - 2.0 * rho * s.y * hy.y + k * s.y * s.y,
        }
    }
}

#[cfg(feature = "optimizer")]
impl Minimizer for Bfgs {
    fn minimize<F: Objective>(&self, f: &F, start: Point) -> Minimum {
        let mut x = start;
        let (mut fx, mut g) = f.eval_with_gradient(x);
        let mut h = Sym2::IDENTITY;
        let mut first = true;

        for iteration in 0..self.max_iterations {
            if g.hypot() < self.gradient_tolerance {
                return Minimum {
                    point: x,
                    value: fx,
                    iterations: iteration,
                    converged: true,
                };
            }

            let mut dir = -h.apply(g);
            if dir.dot(g) >= 0.0 {
                h = Sym2::IDENTITY;
                dir = -g;
            }
            if first {
                dir = dir * (self.initial_step / dir.hypot());
            }

            let slope = dir.dot(g);
            let mut alpha = 1.0;
            let mut accepted = None;
            for _ in 0..MAX_BACKTRACKS {
                let candidate = x + alpha * dir;
                let (f_new, g_new) = f.eval_with_gradient(candidate);
                if f_new.is_finite() && f_new <= fx + ARMIJO * alpha * slope {
                    accepted = Some((candidate, f_new, g_new));
                    break;
                }
                alpha *= 0.5;
            }
            let Some((x_new, f_new, g_new)) = accepted else {
                log::debug!(
                    "line search failed after {iteration} iterations at {x:?}, |g| = {}",
                    g.hypot()
                );
                return Minimum {
                    point: x,
                    value: fx,
                    iterations: iteration,
                    converged: false,
                };
            };

            let s = x_new - x;
            let y = g_new - g;
            let sy = s.dot(y);
            if sy > 1e-12 {
                if first {
                    h = Sym2::scaled(sy / y.hypot2());
                }
                h = h.bfgs_update(s, y);
            }
            first = false;
            x = x_new;
            fx = f_new;
            g = g_new;
        }

        log::debug!(
            "minimizer stopped at the iteration cap ({}), |g| = {}",
            self.max_iterations,
            g.hypot()
        );
        Minimum {
            point: x,
            value: fx,
            iterations: self.max_iterations,
            converged: g.hypot() < self.gradient_tolerance,
        }
    }
}

/// Squared distance between a mapped local point and a target.
#[derive(Debug)]
pub struct SquaredDistance<'a, M> {
    mapping: &'a M,
    target: Point,
}

impl<'a, M: PatchMapping> SquaredDistance<'a, M> {
    /// The objective `|mapping(local) - target|²`.
    pub fn new(mapping: &'a M, target: Point) -> Self {
        SquaredDistance { mapping, target }
    }
}

impl<M: PatchMapping> Objective for SquaredDistance<'_, M> {
    fn eval(&self, x: Point) -> f64 {
        self.mapping.eval(x).distance_squared(self.target)
    }

    fn eval_with_gradient(&self, x: Point) -> (f64, Vec2) {
        let d = self.mapping.eval(x) - self.target;
        let grad = Vec2::new(
            2.0 * d.dot(self.mapping.diff_u(x)),
            2.0 * d.dot(self.mapping.diff_v(x)),
        );
        (d.hypot2(), grad)
    }
}

/// The result of inverting a patch mapping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalSolution {
    /// The local `(u, v)` coordinates.
    pub local: Point,
    /// Whether the minimizer met its tolerance.
    pub converged: bool,
    /// Number of minimizer iterations.
    pub iterations: usize,
}

/// Find the local coordinates whose image under `mapping` is nearest to
/// `target`.
///
/// `bounds` is the bounding box of the patch in image space, used to seed
/// the search. The result is not clamped to the unit square, so targets
/// outside the patch give local coordinates outside `[0, 1]`.
pub fn solve_local<M, Z>(mapping: &M, bounds: Rect, target: Point, minimizer: &Z) -> LocalSolution
where
    M: PatchMapping,
    Z: Minimizer,
{
    let seed = bounds.absolute_to_relative(target);
    let min = minimizer.minimize(&SquaredDistance::new(mapping, target), seed);
    LocalSolution {
        local: min.point,
        converged: min.converged,
        iterations: min.iterations,
    }
}
