// Copyright 2026 the Kerf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Line segments.

use core::ops::Range;

use crate::{
    Nearest, ParamCurve, ParamCurveArclen, ParamCurveArea, ParamCurveBounds,
    ParamCurveNearest, Point, Rect,
};

/// A single line segment.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    /// The start point.
    pub p0: Point,
    /// The end point.
    pub p1: Point,
}

impl Line {
    /// Create a new line segment.
    #[inline(always)]
    pub fn new(p0: impl Into<Point>, p1: impl Into<Point>) -> Line {
        Line {
            p0: p0.into(),
            p1: p1.into(),
        }
    }

    /// The length of the segment.
    #[inline]
    pub fn length(self) -> f64 {
        (self.p1 - self.p0).hypot()
    }

    /// Are both endpoints finite?
    #[inline]
    pub fn is_finite(self) -> bool {
        self.p0.is_finite() && self.p1.is_finite()
    }
}

impl ParamCurve for Line {
    #[inline]
    fn eval(&self, t: f64) -> Point {
        self.p0.lerp(self.p1, t)
    }

    #[inline]
    fn subsegment(&self, range: Range<f64>) -> Line {
        Line::new(self.eval(range.start), self.eval(range.end))
    }

    #[inline(always)]
    fn start(&self) -> Point {
        self.p0
    }

    #[inline(always)]
    fn end(&self) -> Point {
        self.p1
    }
}

impl ParamCurveArclen for Line {
    #[inline]
    fn arclen(&self, _accuracy: f64) -> f64 {
        self.length()
    }

    /// Closed form: arc length is proportional to the parameter.
    #[inline]
    fn inv_arclen(&self, arclen: f64, _accuracy: f64) -> f64 {
        let length = self.length();
        if length <= 0.0 {
            return 0.0;
        }
        (arclen / length).clamp(0.0, 1.0)
    }
}

impl ParamCurveArea for Line {
    #[inline]
    fn signed_area(&self) -> f64 {
        self.p0.to_vec2().cross(self.p1.to_vec2()) * 0.5
    }
}

impl ParamCurveNearest for Line {
    fn nearest(&self, p: Point, _accuracy: f64) -> Nearest {
        let d = self.p1 - self.p0;
        let dotp = d.dot(p - self.p0);
        let d_squared = d.hypot2();
        let (t, distance_sq) = if dotp <= 0.0 {
            (0.0, (p - self.p0).hypot2())
        } else if dotp >= d_squared {
            (1.0, (p - self.p1).hypot2())
        } else {
            let t = dotp / d_squared;
            (t, (p - self.eval(t)).hypot2())
        };
        Nearest { distance_sq, t }
    }
}

impl ParamCurveBounds for Line {
    #[inline]
    fn control_box(&self) -> Rect {
        Rect::from_points(self.p0, self.p1)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Line, ParamCurve, ParamCurveArclen, ParamCurveNearest, Point};

    #[test]
    fn arclen_closed_form() {
        let l = Line::new((0.0, 0.0), (10.0, 0.0));
        assert_eq!(l.arclen(1e-9), 10.0);
        assert_eq!(l.inv_arclen(2.5, 1e-9), 0.25);
        assert_eq!(l.inv_arclen(-1.0, 1e-9), 0.0);
        assert_eq!(l.inv_arclen(11.0, 1e-9), 1.0);
        let degenerate = Line::new((1.0, 1.0), (1.0, 1.0));
        assert_eq!(degenerate.inv_arclen(1.0, 1e-9), 0.0);
    }

    #[test]
    fn nearest() {
        let l = Line::new((0.0, 0.0), (4.0, 0.0));
        let n = l.nearest(Point::new(1.0, 2.0), 1e-9);
        assert_eq!(n.t, 0.25);
        assert_eq!(n.distance_sq, 4.0);
        let n = l.nearest(Point::new(-3.0, 0.0), 1e-9);
        assert_eq!(n.t, 0.0);
        assert_eq!(l.subsegment(0.25..0.75), Line::new((1.0, 0.0), (3.0, 0.0)));
    }
}
