// Copyright 2026 the Kerf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Affine transforms, used to place unit-space join and cap geometry.

use core::ops::Mul;

use crate::Point;

/// A 2D affine transform.
///
/// The coefficients `[a, b, c, d, e, f]` map a point (x, y) to
/// (a x + c y + e, b x + d y + f).
///
/// Round joins and square caps are laid out on the unit circle and placed
/// with a transform whose linear part is the (rotated, scaled) normal, so
/// the columns `(a, b)` and `(c, d)` are the images of the x and y axes.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Affine([f64; 6]);

impl Affine {
    /// The identity transform.
    pub const IDENTITY: Affine = Affine::new([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// Construct a transform from its coefficients.
    #[inline(always)]
    pub const fn new(c: [f64; 6]) -> Affine {
        Affine(c)
    }
}

impl Default for Affine {
    #[inline]
    fn default() -> Affine {
        Affine::IDENTITY
    }
}

impl Mul<Point> for Affine {
    type Output = Point;

    #[inline]
    fn mul(self, p: Point) -> Point {
        let c = self.0;
        Point::new(
            c[0] * p.x + c[2] * p.y + c[4],
            c[1] * p.x + c[3] * p.y + c[5],
        )
    }
}
