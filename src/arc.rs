// Copyright 2026 the Kerf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Elliptical arcs, approximated by cubic Béziers.

use core::f64::consts::{FRAC_PI_2, PI};

use crate::{PathEl, Point, Vec2};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// A single elliptical arc segment.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Arc {
    /// The arc's center point.
    pub center: Point,
    /// The arc's radii, where the vector's x-component is the radius in the
    /// positive x direction after applying `x_rotation`.
    pub radii: Vec2,
    /// The start angle in radians.
    pub start_angle: f64,
    /// The angle between the start and end of the arc, in radians.
    pub sweep_angle: f64,
    /// How much the arc is rotated, in radians.
    pub x_rotation: f64,
}

/// An iterator over the cubic Béziers approximating an [`Arc`].
///
/// Only `CurveTo` elements are produced; the caller is expected to be at
/// the arc's start point already.
#[derive(Debug)]
pub struct ArcAppendIter {
    idx: usize,
    center: Point,
    radii: Vec2,
    x_rotation: f64,
    n: usize,
    arm_len: f64,
    angle_step: f64,
    p0: Vec2,
    angle0: f64,
}

impl Arc {
    /// Create a new circular or elliptical arc.
    #[inline]
    pub fn new(
        center: impl Into<Point>,
        radii: impl Into<Vec2>,
        start_angle: f64,
        sweep_angle: f64,
        x_rotation: f64,
    ) -> Arc {
        Arc {
            center: center.into(),
            radii: radii.into(),
            start_angle,
            sweep_angle,
            x_rotation,
        }
    }

    /// The point where the arc starts.
    #[inline]
    pub fn start_point(&self) -> Point {
        self.center + sample_ellipse(self.radii, self.x_rotation, self.start_angle)
    }

    /// Generate the cubic Béziers, with maximum distance error `tolerance`.
    ///
    /// The number of pieces is derived from the error bound of a cubic
    /// approximating a circular arc, which scales with the sixth power of
    /// the angle.
    pub fn append_iter(&self, tolerance: f64) -> ArcAppendIter {
        let sign = self.sweep_angle.signum();
        let scaled_err = self.radii.x.max(self.radii.y) / tolerance;
        // Number of subdivisions per ellipse based on error tolerance.
        // Note: this may slightly underestimate the error for quadrants.
        let n_err = (1.1163 * scaled_err).powf(1.0 / 6.0).max(3.999_999);
        let n = (n_err * self.sweep_angle.abs() * (1.0 / (2.0 * PI))).ceil();
        let angle_step = self.sweep_angle / n;
        let n = if n.is_finite() { n as usize } else { 0 };
        let arm_len = (4.0 / 3.0) * (angle_step / 4.0).tan().abs() * sign;
        let angle0 = self.start_angle;
        let p0 = sample_ellipse(self.radii, self.x_rotation, angle0);
        ArcAppendIter {
            idx: 0,
            center: self.center,
            radii: self.radii,
            x_rotation: self.x_rotation,
            n,
            arm_len,
            angle_step,
            p0,
            angle0,
        }
    }

    /// Call `p` with the control points and end point of each cubic
    /// approximating the arc.
    pub fn to_cubic_beziers<P>(self, tolerance: f64, mut p: P)
    where
        P: FnMut(Point, Point, Point),
    {
        for el in self.append_iter(tolerance) {
            if let PathEl::CurveTo(p1, p2, p3) = el {
                p(p1, p2, p3);
            }
        }
    }
}

impl Iterator for ArcAppendIter {
    type Item = PathEl;

    fn next(&mut self) -> Option<Self::Item> {
        if self.idx >= self.n {
            return None;
        }
        let angle1 = self.angle0 + self.angle_step;
        let p0 = self.p0;
        let p1 = p0
            + self.arm_len * sample_ellipse(self.radii, self.x_rotation, self.angle0 + FRAC_PI_2);
        let p3 = sample_ellipse(self.radii, self.x_rotation, angle1);
        let p2 =
            p3 - self.arm_len * sample_ellipse(self.radii, self.x_rotation, angle1 + FRAC_PI_2);
        self.angle0 = angle1;
        self.p0 = p3;
        self.idx += 1;
        Some(PathEl::CurveTo(
            self.center + p1,
            self.center + p2,
            self.center + p3,
        ))
    }
}

fn sample_ellipse(radii: Vec2, x_rotation: f64, angle: f64) -> Vec2 {
    let (angle_sin, angle_cos) = angle.sin_cos();
    let u = radii.x * angle_cos;
    let v = radii.y * angle_sin;
    Vec2::new(u, v).rotate_scale(Vec2::from_angle(x_rotation))
}

#[cfg(test)]
mod tests {
    use core::f64::consts::{FRAC_PI_2, PI};

    use crate::{Arc, Point, Vec2};

    #[test]
    fn quarter_circle() {
        let arc = Arc::new((0.0, 0.0), (1.0, 1.0), 0.0, FRAC_PI_2, 0.0);
        let mut pieces = vec![];
        arc.to_cubic_beziers(0.1, |p1, p2, p3| pieces.push((p1, p2, p3)));
        assert_eq!(pieces.len(), 1);
        let (p1, p2, p3) = pieces[0];
        let k = 4.0 / 3.0 * (PI / 8.0).tan();
        assert!((p1 - Point::new(1.0, k)).hypot() < 1e-12);
        assert!((p2 - Point::new(k, 1.0)).hypot() < 1e-12);
        assert!((p3 - Point::new(0.0, 1.0)).hypot() < 1e-12);
    }

    #[test]
    fn subdivision_follows_tolerance() {
        let arc = Arc::new((0.0, 0.0), (100.0, 100.0), 0.0, PI, 0.0);
        let coarse = arc.append_iter(1.0).count();
        let fine = arc.append_iter(1e-4).count();
        assert!(fine > coarse);
        let negative = Arc::new((0.0, 0.0), (100.0, 100.0), 0.0, -PI, 0.0);
        let mut end = Point::ORIGIN;
        negative.to_cubic_beziers(1e-3, |_, _, p3| end = p3);
        assert!((end - Point::new(-100.0, 0.0)).hypot() < 1e-9);
    }

    #[test]
    fn stays_on_circle() {
        let center = Point::new(3.0, -2.0);
        let arc = Arc::new(center, Vec2::new(5.0, 5.0), 0.3, 2.5, 0.0);
        assert!(((arc.start_point() - center).hypot() - 5.0).abs() < 1e-12);
        arc.to_cubic_beziers(1e-3, |_, _, p3| {
            assert!(((p3 - center).hypot() - 5.0).abs() < 1e-12);
        });
    }

    #[test]
    fn zero_sweep_is_empty() {
        let arc = Arc::new((0.0, 0.0), (1.0, 1.0), 0.0, 0.0, 0.0);
        assert_eq!(arc.append_iter(0.1).count(), 0);
    }
}
