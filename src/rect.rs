// Copyright 2026 the Kerf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned bounding rectangles.

use crate::Point;

/// An axis-aligned rectangle, used as a bounding box.
#[derive(Clone, Copy, Default, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// The minimum x coordinate.
    pub x0: f64,
    /// The minimum y coordinate.
    pub y0: f64,
    /// The maximum x coordinate.
    pub x1: f64,
    /// The maximum y coordinate.
    pub y1: f64,
}

impl Rect {
    /// A new rectangle from minimum and maximum coordinates.
    #[inline]
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Rect {
        Rect { x0, y0, x1, y1 }
    }

    /// The smallest rectangle containing both points.
    #[inline]
    pub fn from_points(p0: Point, p1: Point) -> Rect {
        Rect::new(p0.x.min(p1.x), p0.y.min(p1.y), p0.x.max(p1.x), p0.y.max(p1.y))
    }

    /// The width of the rectangle.
    #[inline]
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// The height of the rectangle.
    #[inline]
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// The smallest rectangle containing both rectangles.
    #[inline]
    pub fn union(&self, other: Rect) -> Rect {
        Rect::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }

    /// The smallest rectangle containing this one and the point.
    #[inline]
    pub fn union_pt(&self, pt: Point) -> Rect {
        Rect::new(
            self.x0.min(pt.x),
            self.y0.min(pt.y),
            self.x1.max(pt.x),
            self.y1.max(pt.y),
        )
    }

    /// Do the closed rectangles share at least one point?
    #[inline]
    pub fn overlaps(&self, other: Rect) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }
}

#[cfg(test)]
mod tests {
    use crate::{Point, Rect};

    #[test]
    fn from_points_orders_corners() {
        let r = Rect::from_points(Point::new(3., -1.), Point::new(-2., 4.));
        assert_eq!(r, Rect::new(-2., -1., 3., 4.));
        assert_eq!(r.width(), 5.);
        assert_eq!(r.height(), 5.);
    }

    #[test]
    fn overlap_is_closed() {
        let a = Rect::new(0., 0., 1., 1.);
        assert!(a.overlaps(Rect::new(1., 1., 2., 2.)));
        assert!(!a.overlaps(Rect::new(1.5, 0., 2., 1.)));
        let u = a.union(Rect::new(2., 2., 3., 3.)).union_pt(Point::new(-1., 0.5));
        assert_eq!(u, Rect::new(-1., 0., 3., 3.));
    }
}
