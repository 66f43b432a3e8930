// Copyright 2026 the Kerf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Displacement vectors in the plane.

use core::fmt;
use core::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::Point;

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// Squared length below which a vector is considered to have no direction.
pub(crate) const DIRECTION_EPSILON: f64 = 1e-12;

/// A 2D vector.
///
/// Used for tangents, normals and the difference of two [`Point`]s.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    /// The x component.
    pub x: f64,
    /// The y component.
    pub y: f64,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Vec2 = Vec2::new(0., 0.);

    /// Create a new vector.
    #[inline(always)]
    pub const fn new(x: f64, y: f64) -> Vec2 {
        Vec2 { x, y }
    }

    /// The point reached by displacing the origin by this vector.
    #[inline(always)]
    pub const fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Dot product.
    #[inline]
    pub fn dot(self, other: Vec2) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Cross product (the z component of the 3D cross product).
    ///
    /// Positive when `other` is counter-clockwise from `self` in a Y-up
    /// coordinate system, so (1, 0) × (0, 1) = 1.
    #[inline]
    pub fn cross(self, other: Vec2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Length of the vector.
    #[inline]
    pub fn hypot(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Squared length of the vector.
    #[inline]
    pub fn hypot2(self) -> f64 {
        self.dot(self)
    }

    /// Squared length of the vector; an alias of [`Vec2::hypot2`].
    #[inline]
    pub fn length_squared(self) -> f64 {
        self.hypot2()
    }

    /// Angle of the vector in radians, measured from the positive x axis.
    #[inline]
    pub fn atan2(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// The unit vector at angle `th` (radians).
    #[inline]
    pub fn from_angle(th: f64) -> Vec2 {
        let (s, c) = th.sin_cos();
        Vec2::new(c, s)
    }

    /// Linear interpolation towards `other`.
    #[inline]
    pub fn lerp(self, other: Vec2, t: f64) -> Vec2 {
        self + t * (other - self)
    }

    /// Scale to unit length.
    ///
    /// The result is NaN for the zero vector; see [`Vec2::normalize_or`]
    /// for a version that never fails.
    #[inline]
    pub fn normalize(self) -> Vec2 {
        self / self.hypot()
    }

    /// Scale to unit length, or return `fallback` if the vector has no
    /// usable direction.
    ///
    /// The vector is considered directionless when its squared length is
    /// below 1e-12 or is not finite.
    #[inline]
    pub fn normalize_or(self, fallback: Vec2) -> Vec2 {
        let len2 = self.hypot2();
        if !len2.is_finite() || len2 < DIRECTION_EPSILON {
            fallback
        } else {
            self / len2.sqrt()
        }
    }

    /// Rotate by 90 degrees, mapping (x, y) to (-y, x).
    ///
    /// For a tangent direction this gives the left-hand normal in a Y-up
    /// coordinate system.
    #[inline]
    pub fn turn_90(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    /// Multiply as complex numbers: angles add, lengths multiply.
    #[inline]
    pub fn rotate_scale(self, rhs: Vec2) -> Vec2 {
        Vec2::new(
            self.x * rhs.x - self.y * rhs.y,
            self.x * rhs.y + self.y * rhs.x,
        )
    }

    /// Is this vector finite?
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Is either component NaN?
    #[inline]
    pub fn is_nan(self) -> bool {
        self.x.is_nan() || self.y.is_nan()
    }
}

impl From<(f64, f64)> for Vec2 {
    #[inline(always)]
    fn from(v: (f64, f64)) -> Vec2 {
        Vec2::new(v.0, v.1)
    }
}

impl From<Vec2> for (f64, f64) {
    #[inline(always)]
    fn from(v: Vec2) -> (f64, f64) {
        (v.x, v.y)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    #[inline]
    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, other: Vec2) {
        *self = *self + other;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    #[inline]
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl SubAssign for Vec2 {
    #[inline]
    fn sub_assign(&mut self, other: Vec2) {
        *self = *self - other;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    #[inline]
    fn mul(self, other: f64) -> Vec2 {
        Vec2::new(self.x * other, self.y * other)
    }
}

impl MulAssign<f64> for Vec2 {
    #[inline]
    fn mul_assign(&mut self, other: f64) {
        *self = *self * other;
    }
}

impl Mul<Vec2> for f64 {
    type Output = Vec2;

    #[inline]
    fn mul(self, other: Vec2) -> Vec2 {
        other * self
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;

    #[inline]
    fn div(self, other: f64) -> Vec2 {
        Vec2::new(self.x / other, self.y / other)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<")?;
        fmt::Display::fmt(&self.x, f)?;
        write!(f, ", ")?;
        fmt::Display::fmt(&self.y, f)?;
        write!(f, ">")
    }
}

#[cfg(feature = "mint")]
impl From<Vec2> for mint::Vector2<f64> {
    #[inline(always)]
    fn from(v: Vec2) -> mint::Vector2<f64> {
        mint::Vector2 { x: v.x, y: v.y }
    }
}

#[cfg(feature = "mint")]
impl From<mint::Vector2<f64>> for Vec2 {
    #[inline(always)]
    fn from(v: mint::Vector2<f64>) -> Vec2 {
        Vec2::new(v.x, v.y)
    }
}

#[cfg(test)]
mod tests {
    use super::Vec2;

    #[test]
    fn cross_sign() {
        assert_eq!(Vec2::new(1., 0.).cross(Vec2::new(0., 1.)), 1.);
        assert_eq!(Vec2::new(0., 1.).cross(Vec2::new(1., 0.)), -1.);
    }

    #[test]
    fn turn_90_is_left_normal() {
        let v = Vec2::new(3., 0.);
        assert_eq!(v.turn_90(), Vec2::new(0., 3.));
        let u = Vec2::new(0.1, 0.2);
        assert_eq!(u.dot(u.turn_90()), 0.);
        assert!((u.cross(u.turn_90()) - u.hypot2()).abs() < 1e-15);
    }

    #[test]
    fn normalize_or_falls_back() {
        let fallback = Vec2::new(1., 0.);
        assert_eq!(Vec2::ZERO.normalize_or(fallback), fallback);
        assert_eq!(Vec2::new(1e-7, 0.).normalize_or(fallback), fallback);
        assert_eq!(
            Vec2::new(f64::INFINITY, 0.).normalize_or(fallback),
            fallback
        );
        assert_eq!(Vec2::new(f64::NAN, 0.).normalize_or(fallback), fallback);
        let n = Vec2::new(0., -4.).normalize_or(fallback);
        assert_eq!(n, Vec2::new(0., -1.));
    }

    #[test]
    fn rotate_scale() {
        let u = Vec2::new(0.1, 0.2);
        let v = Vec2::new(0.3, -0.4);
        let uv = u.rotate_scale(v);
        assert!((u.hypot() * v.hypot() - uv.hypot()).abs() < 1e-12);
        assert!((u.atan2() + v.atan2() - uv.atan2()).abs() < 1e-12);
    }

    #[test]
    fn display() {
        let v = Vec2::new(1.2332421, 532.10721213123);
        assert_eq!(format!("{v:.2}"), "<1.23, 532.11>");
    }
}
