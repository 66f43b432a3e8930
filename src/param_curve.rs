// Copyright 2026 the Kerf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Traits for curves parametrized by a scalar.

use core::ops::Range;

use crate::common::solve_itp;
use crate::{Point, Rect};

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

/// A curve parametrized by a scalar.
///
/// The parameter usually runs over `0..1`. For derivative curves the
/// result is interpreted as a vector.
pub trait ParamCurve: Sized {
    /// Evaluate the curve at parameter `t`.
    fn eval(&self, t: f64) -> Point;

    /// The part of the curve over the given parameter range.
    fn subsegment(&self, range: Range<f64>) -> Self;

    /// Split into halves.
    fn subdivide(&self) -> (Self, Self) {
        (self.subsegment(0.0..0.5), self.subsegment(0.5..1.0))
    }

    /// The start point.
    fn start(&self) -> Point {
        self.eval(0.0)
    }

    /// The end point.
    fn end(&self) -> Point {
        self.eval(1.0)
    }
}

/// A differentiable parametrized curve.
pub trait ParamCurveDeriv {
    /// The parametric curve obtained by taking the derivative of this one.
    type DerivResult: ParamCurve;

    /// The derivative of the curve.
    ///
    /// The derivative of a polynomial curve is again a polynomial curve of
    /// one degree lower; its "points" are vectors.
    fn deriv(&self) -> Self::DerivResult;
}

/// A parametrized curve whose arc length can be measured.
pub trait ParamCurveArclen: ParamCurve {
    /// The arc length of the curve, to within `accuracy`.
    fn arclen(&self, accuracy: f64) -> f64;

    /// Find the parameter at which the arc length from the start equals
    /// `arclen`.
    ///
    /// Arc lengths outside the curve clamp to 0 or 1. The default
    /// implementation is a bracketed search that measures the arc length
    /// of progressively shorter pieces, so each evaluation is cheap.
    fn inv_arclen(&self, arclen: f64, accuracy: f64) -> f64 {
        if arclen <= 0.0 {
            return 0.0;
        }
        let total_arclen = self.arclen(accuracy);
        if arclen >= total_arclen {
            return 1.0;
        }
        let mut t_last = 0.0;
        let mut arclen_last = 0.0;
        let epsilon = accuracy / total_arclen;
        let n = 1.0 - epsilon.log2().ceil().min(0.0);
        let inner_accuracy = accuracy / n;
        let f = |t: f64| {
            let (range, dir) = if t > t_last {
                (t_last..t, 1.0)
            } else {
                (t..t_last, -1.0)
            };
            let arc = self.subsegment(range).arclen(inner_accuracy);
            arclen_last += arc * dir;
            t_last = t;
            arclen_last - arclen
        };
        solve_itp(f, 0.0, 1.0, epsilon, 1, 0.2, -arclen, total_arclen - arclen)
    }
}

/// A parametrized curve that can have its signed area measured.
pub trait ParamCurveArea {
    /// The signed area between the curve and the origin.
    ///
    /// Summed over the segments of a closed path this is the area it
    /// encloses: positive when the path runs counter-clockwise in a Y-up
    /// coordinate system. This is the shoelace formula, integrated exactly
    /// for polynomial segments using Green's theorem.
    fn signed_area(&self) -> f64;
}

/// The result of [`ParamCurveNearest::nearest`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Nearest {
    /// The square of the distance from the query point to the curve.
    pub distance_sq: f64,
    /// The parameter of the nearest point on the curve.
    pub t: f64,
}

/// A parametrized curve that can find the point on it nearest a query point.
pub trait ParamCurveNearest {
    /// Find the point on the curve nearest `p`.
    fn nearest(&self, p: Point, accuracy: f64) -> Nearest;
}

/// A curve with a cheap, conservative bounding box.
pub trait ParamCurveBounds {
    /// A rectangle containing the whole curve.
    ///
    /// This is the bounding box of the control polygon, so it may be larger
    /// than the tight bounds.
    fn control_box(&self) -> Rect;
}
