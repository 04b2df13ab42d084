// Copyright 2020 the Meshwarp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Common mathematical operations

#![allow(missing_docs)]

/// Defines a trait that chooses between libstd or libm implementations of float methods.
macro_rules! define_float_funcs {
    ($(
        fn $name:ident(self $(,$arg:ident: $arg_ty:ty)*) -> $ret:ty
        => $lname:ident;
    )+) => {
        #[cfg(not(feature = "std"))]
        pub(crate) trait FloatFuncs : Sized {
            $(fn $name(self $(,$arg: $arg_ty)*) -> $ret;)+
        }

        #[cfg(not(feature = "std"))]
        impl FloatFuncs for f64 {
            $(fn $name(self $(,$arg: $arg_ty)*) -> $ret {
                #[cfg(feature = "libm")]
                return libm::$lname(self $(,$arg as _)*);

                #[cfg(not(feature = "libm"))]
                compile_error!("meshwarp requires either the `std` or `libm` feature")
            })+
        }
    }
}

define_float_funcs! {
    fn abs(self) -> Self => fabs;
    fn ceil(self) -> Self => ceil;
    fn powi(self, n: i32) -> Self => pow;
    fn sqrt(self) -> Self => sqrt;
}

/// Fuzzy equality with a relative tolerance of 1e-12.
///
/// Two zeros compare equal; a zero never compares equal to a non-zero value.
#[inline]
pub fn fuzzy_eq(a: f64, b: f64) -> bool {
    (a - b).abs() * 1e12 <= a.abs().min(b.abs())
}

/// Linear interpolation between two scalars.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// The cubic Bernstein basis evaluated at `t`.
///
/// This is the row `[1, t, t², t³]` multiplied by the power-to-Bernstein
/// matrix, so `blend(bernstein3(t), pts)` evaluates a cubic Bézier.
#[inline]
pub fn bernstein3(t: f64) -> [f64; 4] {
    let mt = 1.0 - t;
    [mt * mt * mt, 3.0 * mt * mt * t, 3.0 * mt * t * t, t * t * t]
}

/// Derivative of [`bernstein3`] with respect to `t`.
#[inline]
pub fn bernstein3_deriv(t: f64) -> [f64; 4] {
    let mt = 1.0 - t;
    [
        -3.0 * mt * mt,
        3.0 * mt * mt - 6.0 * mt * t,
        6.0 * mt * t - 3.0 * t * t,
        3.0 * t * t,
    ]
}

/// The linear blend row `[1 - t, t]`.
#[inline]
pub fn linear_blend(t: f64) -> [f64; 2] {
    [1.0 - t, t]
}

/// Derivative of [`linear_blend`] with respect to `t`.
#[inline]
pub fn linear_blend_deriv() -> [f64; 2] {
    [-1.0, 1.0]
}
