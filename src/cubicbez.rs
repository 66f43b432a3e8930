// Copyright 2026 the Kerf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cubic Bézier segments, including cusp detection and regularization.

use core::ops::Range;

use arrayvec::ArrayVec;

use crate::common::solve_quadratic;
use crate::vec2::DIRECTION_EPSILON;
use crate::{
    ParamCurve, ParamCurveArclen, ParamCurveArea, ParamCurveBounds, ParamCurveDeriv,
    ParamCurveNearest, Point, QuadBez, Rect, Vec2,
};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// A single cubic Bézier segment.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CubicBez {
    /// The start point.
    pub p0: Point,
    /// The first control point.
    pub p1: Point,
    /// The second control point.
    pub p2: Point,
    /// The end point.
    pub p3: Point,
}

/// Classification of a cusp in a cubic Bézier.
///
/// Both kinds are places where the derivative comes close to vanishing,
/// which makes the curvature, and so the offset curve, badly behaved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CuspType {
    /// The curve makes a tight loop; the control arms point away from each
    /// other across the chord.
    Loop,
    /// The curve has two inflection points very close together.
    DoubleInflection,
}

impl CubicBez {
    /// Create a new cubic Bézier segment.
    #[inline]
    pub fn new<P: Into<Point>>(p0: P, p1: P, p2: P, p3: P) -> CubicBez {
        CubicBez {
            p0: p0.into(),
            p1: p1.into(),
            p2: p2.into(),
            p3: p3.into(),
        }
    }

    /// A cubic tracing the straight line from `p0` to `p3` at uniform speed.
    #[inline]
    pub fn linear(p0: Point, p3: Point) -> CubicBez {
        let d = p3 - p0;
        CubicBez::new(p0, p0 + d * (1.0 / 3.0), p0 + d * (2.0 / 3.0), p3)
    }

    /// Split at parameter `t` using de Casteljau's construction.
    pub fn split_at(&self, t: f64) -> (CubicBez, CubicBez) {
        let p01 = self.p0.lerp(self.p1, t);
        let p12 = self.p1.lerp(self.p2, t);
        let p23 = self.p2.lerp(self.p3, t);
        let p012 = p01.lerp(p12, t);
        let p123 = p12.lerp(p23, t);
        let pm = p012.lerp(p123, t);
        (
            CubicBez::new(self.p0, p01, p012, pm),
            CubicBez::new(pm, p123, p23, self.p3),
        )
    }

    /// Are all control points finite?
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.p0.is_finite() && self.p1.is_finite() && self.p2.is_finite() && self.p3.is_finite()
    }

    /// Tangent vectors at the start and end, not normalized.
    ///
    /// When a control point coincides with its endpoint the tangent is taken
    /// from the next control point, and then from the chord, so a usable
    /// direction is found for any curve that is not a single point.
    #[inline]
    pub fn tangents(&self) -> (Vec2, Vec2) {
        self.tangents_with(DIRECTION_EPSILON)
    }

    /// Tangents with a caller-chosen squared length below which a
    /// difference vector is considered degenerate.
    pub(crate) fn tangents_with(&self, min_len_sq: f64) -> (Vec2, Vec2) {
        let pick = |candidates: [Vec2; 3]| {
            candidates
                .into_iter()
                .find(|v| v.hypot2() >= min_len_sq)
                .unwrap_or(candidates[2])
        };
        let tan0 = pick([self.p1 - self.p0, self.p2 - self.p0, self.p3 - self.p0]);
        let tan1 = pick([self.p3 - self.p2, self.p3 - self.p1, self.p3 - self.p0]);
        (tan0, tan1)
    }

    /// Unit tangents at the start and end, falling back to (1, 0) for a
    /// curve with no direction at all.
    pub fn unit_tangents(&self) -> (Vec2, Vec2) {
        let (tan0, tan1) = self.tangents();
        let fallback = Vec2::new(1.0, 0.0);
        (tan0.normalize_or(fallback), tan1.normalize_or(fallback))
    }

    /// Parameter values of the inflection points within `[0, 1]`.
    ///
    /// These are the zeros of the cross product of the first and second
    /// derivatives.
    pub fn inflections(&self) -> ArrayVec<f64, 2> {
        let a = self.p1 - self.p0;
        let b = (self.p2 - self.p1) - a;
        let c = (self.p3 - self.p0) - 3. * (self.p2 - self.p1);
        let mut roots = solve_quadratic(a.cross(b), a.cross(c), b.cross(c));
        roots.retain(|t| (0.0..=1.0).contains(t));
        roots
    }

    /// Detect a cusp whose curvature exceeds the reciprocal of `dimension`.
    ///
    /// A candidate is recognized from the signs of the signed areas spanned
    /// by the control points. It is confirmed by finding where the
    /// derivative comes nearest to zero and testing the curvature there,
    /// without dividing.
    pub fn detect_cusp(&self, dimension: f64) -> Option<CuspType> {
        let d01 = self.p1 - self.p0;
        let d02 = self.p2 - self.p0;
        let d03 = self.p3 - self.p0;
        let d12 = self.p2 - self.p1;
        let d23 = self.p3 - self.p2;
        let det_012 = d01.cross(d02);
        let det_123 = d12.cross(d23);
        let det_013 = d01.cross(d03);
        let det_023 = d02.cross(d03);
        if det_012 * det_123 > 0.0 && det_012 * det_013 < 0.0 && det_012 * det_023 < 0.0 {
            let q = self.deriv();
            let nearest = q.nearest(Point::ORIGIN, 1e-9);
            let d = q.eval(nearest.t).to_vec2();
            let d2 = q.deriv().eval(nearest.t).to_vec2();
            let cross = d.cross(d2);
            if nearest.distance_sq.powi(3) <= (cross * dimension).powi(2) {
                let a = 3. * det_012 + det_023 - 2. * det_013;
                let b = -3. * det_012 + det_013;
                let c = det_012;
                let disc = b * b - 4. * a * c;
                return if disc > 0.0 {
                    Some(CuspType::DoubleInflection)
                } else {
                    Some(CuspType::Loop)
                };
            }
        }
        None
    }

    /// Perturb the control points to remove a cusp sharper than
    /// `dimension`.
    ///
    /// A loop is opened by pushing both control points outward along their
    /// arms; a double inflection is straightened by pulling them inward,
    /// which is only done for arms longer than twice `dimension`.
    #[must_use]
    pub fn regularize(&self, dimension: f64) -> CubicBez {
        let mut c = *self;
        let Some(cusp_type) = self.detect_cusp(dimension) else {
            return c;
        };
        let d01 = c.p1 - c.p0;
        let d01h = d01.hypot();
        let d23 = c.p3 - c.p2;
        let d23h = d23.hypot();
        match cusp_type {
            CuspType::Loop => {
                if d01h > 0.0 {
                    c.p1 += (dimension / d01h) * d01;
                }
                if d23h > 0.0 {
                    c.p2 -= (dimension / d23h) * d23;
                }
            }
            CuspType::DoubleInflection => {
                if d01h > 2.0 * dimension {
                    c.p1 -= (dimension / d01h) * d01;
                }
                if d23h > 2.0 * dimension {
                    c.p2 += (dimension / d23h) * d23;
                }
            }
        }
        c
    }
}

impl ParamCurve for CubicBez {
    #[inline]
    fn eval(&self, t: f64) -> Point {
        let mt = 1.0 - t;
        let v = self.p0.to_vec2() * (mt * mt * mt)
            + (self.p1.to_vec2() * (mt * mt * 3.0)
                + (self.p2.to_vec2() * (mt * 3.0) + self.p3.to_vec2() * t) * t)
                * t;
        v.to_point()
    }

    fn subsegment(&self, range: Range<f64>) -> CubicBez {
        let (t0, t1) = (range.start, range.end);
        let p0 = self.eval(t0);
        let p3 = self.eval(t1);
        let d = self.deriv();
        let scale = (t1 - t0) * (1.0 / 3.0);
        let p1 = p0 + scale * d.eval(t0).to_vec2();
        let p2 = p3 - scale * d.eval(t1).to_vec2();
        CubicBez { p0, p1, p2, p3 }
    }

    #[inline]
    fn subdivide(&self) -> (CubicBez, CubicBez) {
        self.split_at(0.5)
    }

    #[inline(always)]
    fn start(&self) -> Point {
        self.p0
    }

    #[inline(always)]
    fn end(&self) -> Point {
        self.p3
    }
}

impl ParamCurveDeriv for CubicBez {
    type DerivResult = QuadBez;

    #[inline]
    fn deriv(&self) -> QuadBez {
        QuadBez::new(
            (3.0 * (self.p1 - self.p0)).to_point(),
            (3.0 * (self.p2 - self.p1)).to_point(),
            (3.0 * (self.p3 - self.p2)).to_point(),
        )
    }
}

impl ParamCurveArclen for CubicBez {
    /// Arc length by adaptive subdivision, after Gravesen's "Adaptive
    /// subdivision and the length and energy of Bézier curves".
    fn arclen(&self, accuracy: f64) -> f64 {
        fn estimate(c: &CubicBez) -> f64 {
            let chord = (c.p3 - c.p0).hypot();
            let polygon =
                (c.p1 - c.p0).hypot() + (c.p2 - c.p1).hypot() + (c.p3 - c.p2).hypot();
            (chord + polygon) * 0.5
        }
        const MAX_DEPTH: usize = 16;
        fn rec(c: &CubicBez, l0: f64, accuracy: f64, depth: usize) -> f64 {
            let (c0, c1) = c.subdivide();
            let l0_c0 = estimate(&c0);
            let l0_c1 = estimate(&c1);
            let l1 = l0_c0 + l0_c1;
            let error = (l0 - l1) * (1.0 / 15.0);
            if error.abs() < accuracy || depth == MAX_DEPTH {
                l1 - error
            } else {
                rec(&c0, l0_c0, accuracy * 0.5, depth + 1)
                    + rec(&c1, l0_c1, accuracy * 0.5, depth + 1)
            }
        }
        rec(self, estimate(self), accuracy, 0)
    }
}

impl ParamCurveArea for CubicBez {
    fn signed_area(&self) -> f64 {
        (self.p0.x * (6.0 * self.p1.y + 3.0 * self.p2.y + self.p3.y)
            + 3.0
                * (self.p1.x * (-2.0 * self.p0.y + self.p2.y + self.p3.y)
                    - self.p2.x * (self.p0.y + self.p1.y - 2.0 * self.p3.y))
            - self.p3.x * (self.p0.y + 3.0 * self.p1.y + 6.0 * self.p2.y))
            * (1.0 / 20.0)
    }
}

impl ParamCurveBounds for CubicBez {
    #[inline]
    fn control_box(&self) -> Rect {
        Rect::from_points(self.p0, self.p3)
            .union_pt(self.p1)
            .union_pt(self.p2)
    }
}
