// Copyright 2026 the Kerf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Numerical building blocks: polynomial root finding and a bracketed
//! scalar solver.
//!
//! These are exposed publicly because they are useful on their own, but the
//! main consumers are the offset and stroke engines.

use arrayvec::ArrayVec;

/// Defines a trait that chooses between libstd or libm implementations of float methods.
macro_rules! define_float_funcs {
    ($(
        fn $name:ident(self $(,$arg:ident: $arg_ty:ty)*) -> $ret:ty
        => $lname:ident;
    )+) => {
        #[cfg(not(feature = "std"))]
        pub(crate) trait FloatFuncs : Sized {
            /// Special implementation for signum, because libm doesn't have it.
            fn signum(self) -> Self;

            $(fn $name(self $(,$arg: $arg_ty)*) -> $ret;)+
        }

        #[cfg(not(feature = "std"))]
        impl FloatFuncs for f64 {
            #[inline]
            fn signum(self) -> f64 {
                if self.is_nan() {
                    f64::NAN
                } else {
                    1.0_f64.copysign(self)
                }
            }

            $(fn $name(self $(,$arg: $arg_ty)*) -> $ret {
                #[cfg(feature = "libm")]
                return libm::$lname(self $(,$arg as _)*);

                #[cfg(not(feature = "libm"))]
                compile_error!("kerf requires either the `std` or `libm` feature")
            })+
        }
    }
}

define_float_funcs! {
    fn abs(self) -> Self => fabs;
    fn atan2(self, other: Self) -> Self => atan2;
    fn cbrt(self) -> Self => cbrt;
    fn ceil(self) -> Self => ceil;
    fn copysign(self, sign: Self) -> Self => copysign;
    fn cos(self) -> Self => cos;
    fn hypot(self, other: Self) -> Self => hypot;
    fn log2(self) -> Self => log2;
    fn mul_add(self, a: Self, b: Self) -> Self => fma;
    fn powf(self, n: Self) -> Self => pow;
    fn powi(self, n: i32) -> Self => pow;
    fn sin(self) -> Self => sin;
    fn sin_cos(self) -> (Self, Self) => sincos;
    fn sqrt(self) -> Self => sqrt;
    fn tan(self) -> Self => tan;
}

/// Find real roots of a quadratic equation.
///
/// Return values of x for which c0 + c1 x + c2 x² = 0, sorted in
/// ascending order.
///
/// One root is computed with the usual formula, choosing the sign that
/// adds magnitudes rather than cancelling them, and the other from the
/// product of the roots (the "citardauq" form). When the equation is
/// nearly linear, only the root of the linear part is returned, as the
/// other one is out of representable range. When all coefficients are
/// zero, so every x is a solution, a single `0.0` is returned.
pub fn solve_quadratic(c0: f64, c1: f64, c2: f64) -> ArrayVec<f64, 2> {
    let mut result = ArrayVec::new();
    let sc0 = c0 * c2.recip();
    let sc1 = c1 * c2.recip();
    if !sc0.is_finite() || !sc1.is_finite() {
        // c2 is zero or tiny, solve c0 + c1 x = 0.
        let root = -c0 / c1;
        if root.is_finite() {
            result.push(root);
        } else if c0 == 0.0 && c1 == 0.0 {
            result.push(0.0);
        }
        return result;
    }
    let disc = sc1 * sc1 - 4.0 * sc0;
    let root1 = if disc.is_finite() {
        if disc < 0.0 {
            return result;
        }
        if disc == 0.0 {
            result.push(-0.5 * sc1);
            return result;
        }
        -0.5 * (sc1 + disc.sqrt().copysign(sc1))
    } else {
        // sc1² overflowed; x² + sc1 x ≈ 0 gives the large root.
        -sc1
    };
    let root2 = sc0 / root1;
    if !root2.is_finite() {
        result.push(root1);
    } else if root1 < root2 {
        result.push(root1);
        result.push(root2);
    } else {
        result.push(root2);
        result.push(root1);
    }
    result
}

/// Find real roots of a cubic equation.
///
/// Return values of x for which c0 + c1 x + c2 x² + c3 x³ = 0, sorted in
/// ascending order. A zero or negligible `c3` falls back to
/// [`solve_quadratic`].
///
/// This follows Jim Blinn's "How to Solve a Cubic Equation": the equation
/// is depressed, and the sign of the discriminant selects a single real
/// root (hyperbolic case), a double root, or three real roots found with
/// trigonometry, all without complex arithmetic.
pub fn solve_cubic(c0: f64, c1: f64, c2: f64, c3: f64) -> ArrayVec<f64, 3> {
    const ONE_THIRD: f64 = 1.0 / 3.0;
    let mut result = ArrayVec::new();
    let c3_recip = c3.recip();
    let b = c2 * (ONE_THIRD * c3_recip);
    let c = c1 * (ONE_THIRD * c3_recip);
    let d = c0 * c3_recip;
    if !(b.is_finite() && c.is_finite() && d.is_finite()) {
        result.extend(solve_quadratic(c0, c1, c2));
        return result;
    }
    // Hessian coefficients of the normalized cubic x³ + 3b x² + 3c x + d.
    let delta0 = (-b).mul_add(b, c);
    let delta1 = (-c).mul_add(b, d);
    let delta2 = b * d - c * c;
    let disc = 4.0 * delta0 * delta2 - delta1 * delta1;
    let depressed = (-2.0 * b).mul_add(delta0, delta1);
    if disc < 0.0 {
        let sq = (-0.25 * disc).sqrt();
        let r = -0.5 * depressed;
        let x = (r + sq).cbrt() + (r - sq).cbrt();
        result.push(x - b);
    } else if disc == 0.0 {
        let x = (-delta0).sqrt().copysign(depressed);
        let (x0, x1) = (x - b, -2.0 * x - b);
        if x0 < x1 {
            result.push(x0);
            result.push(x1);
        } else {
            result.push(x1);
            result.push(x0);
        }
    } else {
        let theta = disc.sqrt().atan2(-depressed) * ONE_THIRD;
        let (sin_th, cos_th) = theta.sin_cos();
        let ss3 = sin_th * 3.0_f64.sqrt();
        let scale = 2.0 * (-delta0).sqrt();
        // cos_th >= 1/2 since theta is in [0, π/3], so this is the largest.
        let r_hi = scale.mul_add(cos_th, -b);
        let r_mid = scale.mul_add(0.5 * (-cos_th + ss3), -b);
        let r_lo = scale.mul_add(0.5 * (-cos_th - ss3), -b);
        result.push(r_lo);
        result.push(r_mid);
        result.push(r_hi);
    }
    result
}

/// Solve an arbitrary function for a zero-crossing.
///
/// This uses the [ITP method], as described in the paper
/// [An Enhancement of the Bisection Method Average Performance Preserving Minmax Optimality].
///
/// The values of `ya` and `yb` are passed in rather than computed from
/// `f`, as the caller usually knows them already. It is assumed that
/// `ya < 0.0` and `yb > 0.0`.
///
/// The `epsilon` argument is the width of the final bracket, and must be
/// larger than 2^-63 times `b - a`. The `n0` parameter trades between
/// bisection (0: never more iterations than bisection) and the secant step
/// (1: usually fewer iterations on smooth functions). A `k1` of
/// `0.2 / (b - a)` matches the paper. `k2` is fixed at 2.
///
/// When `f` is monotonic on the bracket, the result is within `epsilon` of
/// the root.
///
/// [ITP method]: https://en.wikipedia.org/wiki/ITP_Method
/// [An Enhancement of the Bisection Method Average Performance Preserving Minmax Optimality]: https://dl.acm.org/doi/10.1145/3423597
#[allow(clippy::too_many_arguments, reason = "mirrors the parameters of the paper")]
pub fn solve_itp(
    mut f: impl FnMut(f64) -> f64,
    mut a: f64,
    mut b: f64,
    epsilon: f64,
    n0: usize,
    k1: f64,
    mut ya: f64,
    mut yb: f64,
) -> f64 {
    let n_half = (((b - a) / epsilon).log2().ceil() - 1.0).max(0.0) as usize;
    let n_max = n0 + n_half;
    let mut scaled_epsilon = epsilon * (1_u64 << n_max) as f64;
    while b - a > 2.0 * epsilon {
        let x_half = 0.5 * (a + b);
        let r = scaled_epsilon - 0.5 * (b - a);
        // Interpolate (regula falsi).
        let x_f = (yb * a - ya * b) / (yb - ya);
        let sigma = x_half - x_f;
        // Truncate.
        let delta = k1 * (b - a).powi(2);
        let x_t = if delta <= sigma.abs() {
            x_f + delta.copysign(sigma)
        } else {
            x_half
        };
        // Project onto the minmax interval.
        let x_itp = if (x_t - x_half).abs() <= r {
            x_t
        } else {
            x_half - r.copysign(sigma)
        };
        let y_itp = f(x_itp);
        if y_itp > 0.0 {
            b = x_itp;
            yb = y_itp;
        } else if y_itp < 0.0 {
            a = x_itp;
            ya = y_itp;
        } else {
            return x_itp;
        }
        scaled_epsilon *= 0.5;
    }
    0.5 * (a + b)
}

/// Euclidean remainder that is always in `[0, rhs)` for positive `rhs`.
#[inline]
pub(crate) fn wrap_phase(x: f64, rhs: f64) -> f64 {
    let mut r = x % rhs;
    if r < 0.0 {
        r += rhs;
    }
    // Adding rhs can round up to exactly rhs for tiny negative x.
    if r >= rhs {
        0.0
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::{solve_cubic, solve_itp, solve_quadratic, wrap_phase};
    use arrayvec::ArrayVec;

    fn verify<const N: usize>(roots: ArrayVec<f64, N>, expected: &[f64]) {
        assert_eq!(expected.len(), roots.len(), "roots: {roots:?}");
        let epsilon = 1e-12;
        for (root, expected) in roots.iter().zip(expected) {
            assert!(
                (root - expected).abs() < epsilon,
                "got {root}, expected {expected}"
            );
        }
    }

    #[test]
    fn quadratic() {
        verify(
            solve_quadratic(-5.0, 0.0, 1.0),
            &[-(5.0f64.sqrt()), 5.0f64.sqrt()],
        );
        verify(solve_quadratic(5.0, 0.0, 1.0), &[]);
        verify(solve_quadratic(5.0, 1.0, 0.0), &[-5.0]);
        verify(solve_quadratic(1.0, 2.0, 1.0), &[-1.0]);
        verify(solve_quadratic(0.0, 0.0, 0.0), &[0.0]);
        verify(solve_quadratic(1.0, 0.0, 0.0), &[]);
    }

    #[test]
    fn quadratic_avoids_cancellation() {
        // Roots 1e-8 and 1e8; the naive formula loses the small one.
        let roots = solve_quadratic(1.0, -(1e8 + 1e-8), 1.0);
        assert_eq!(roots.len(), 2);
        assert!((roots[0] - 1e-8).abs() < 1e-18);
        assert!((roots[1] - 1e8).abs() < 1e-4);
    }

    #[test]
    fn cubic() {
        verify(solve_cubic(-5.0, 0.0, 0.0, 1.0), &[5.0f64.cbrt()]);
        verify(solve_cubic(-5.0, -1.0, 0.0, 1.0), &[1.90416085913492]);
        verify(solve_cubic(0.0, -1.0, 0.0, 1.0), &[-1.0, 0.0, 1.0]);
        verify(solve_cubic(-2.0, -3.0, 0.0, 1.0), &[-1.0, 2.0]);
        verify(solve_cubic(2.0, -3.0, 0.0, 1.0), &[-2.0, 1.0]);
        verify(
            solve_cubic(2.0 - 1e-12, 5.0, 4.0, 1.0),
            &[
                -1.9999999999989995,
                -1.0000010000848456,
                -0.9999989999161546,
            ],
        );
        verify(solve_cubic(2.0 + 1e-12, 5.0, 4.0, 1.0), &[-2.0]);
    }

    #[test]
    fn cubic_degenerates_to_quadratic() {
        verify(solve_cubic(-4.0, 0.0, 1.0, 0.0), &[-2.0, 2.0]);
    }

    #[test]
    fn cubic_three_roots_sorted() {
        // (x - 1)(x - 2)(x - 3)
        let roots = solve_cubic(-6.0, 11.0, -6.0, 1.0);
        assert_eq!(roots.len(), 3);
        for (root, expected) in roots.iter().zip([1.0, 2.0, 3.0]) {
            assert!((root - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn itp() {
        let f = |x: f64| x.powi(3) - x - 2.0;
        let x = solve_itp(f, 1., 2., 1e-12, 0, 0.2, f(1.), f(2.));
        assert!(f(x).abs() < 6e-12);
    }

    #[test]
    fn itp_exact_hit() {
        let f = |x: f64| x - 0.5;
        let x = solve_itp(f, 0., 1., 1e-12, 1, 0.2, -0.5, 0.5);
        assert!((x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn phase_wrapping() {
        assert_eq!(wrap_phase(5.0, 4.0), 1.0);
        assert_eq!(wrap_phase(-1.0, 4.0), 3.0);
        assert_eq!(wrap_phase(8.0, 4.0), 0.0);
        assert!(wrap_phase(-1e-20, 4.0) < 4.0);
    }
}
