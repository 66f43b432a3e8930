// Copyright 2026 the Kerf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bézier paths (up to cubic), in double precision.

use core::iter::{Extend, FromIterator};
use core::ops::Range;

use alloc::vec::Vec;

use crate::{
    CubicBez, Line, ParamCurve, ParamCurveArclen, ParamCurveArea, ParamCurveBounds, Point,
    QuadBez, Rect, Vec2,
};

/// A path made of Bézier segments up to cubic, possibly with several
/// subpaths.
///
/// This is the working representation for all of the path engines. A well
/// formed path starts every subpath with [`PathEl::MoveTo`]; the engines
/// tolerate paths that don't, by treating the origin as the current point.
#[derive(Clone, Default, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BezPath(Vec<PathEl>);

/// An element of a Bézier path.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathEl {
    /// Start a new subpath at the point.
    MoveTo(Point),
    /// Straight line to the point.
    LineTo(Point),
    /// Quadratic Bézier with a control point and an end point.
    QuadTo(Point, Point),
    /// Cubic Bézier with two control points and an end point.
    CurveTo(Point, Point, Point),
    /// Close the subpath with a straight line back to its start.
    ClosePath,
}

/// A segment of a Bézier path, with its start point made explicit.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathSeg {
    /// A line segment.
    Line(Line),
    /// A quadratic Bézier segment.
    Quad(QuadBez),
    /// A cubic Bézier segment.
    Cubic(CubicBez),
}

impl BezPath {
    /// Create a new, empty path.
    #[inline]
    pub fn new() -> BezPath {
        BezPath::default()
    }

    /// Create an empty path with room for `capacity` elements.
    #[inline]
    pub fn with_capacity(capacity: usize) -> BezPath {
        BezPath(Vec::with_capacity(capacity))
    }

    /// Create a path from a vector of elements.
    #[inline]
    pub fn from_vec(v: Vec<PathEl>) -> BezPath {
        BezPath(v)
    }

    /// Push an element onto the path.
    #[inline]
    pub fn push(&mut self, el: PathEl) {
        self.0.push(el);
    }

    /// Push a [`PathEl::MoveTo`].
    #[inline]
    pub fn move_to<P: Into<Point>>(&mut self, p: P) {
        self.push(PathEl::MoveTo(p.into()));
    }

    /// Push a [`PathEl::LineTo`].
    #[inline]
    pub fn line_to<P: Into<Point>>(&mut self, p: P) {
        self.push(PathEl::LineTo(p.into()));
    }

    /// Push a [`PathEl::QuadTo`].
    #[inline]
    pub fn quad_to<P: Into<Point>>(&mut self, p1: P, p2: P) {
        self.push(PathEl::QuadTo(p1.into(), p2.into()));
    }

    /// Push a [`PathEl::CurveTo`].
    #[inline]
    pub fn curve_to<P: Into<Point>>(&mut self, p1: P, p2: P, p3: P) {
        self.push(PathEl::CurveTo(p1.into(), p2.into(), p3.into()));
    }

    /// Push a [`PathEl::ClosePath`].
    #[inline]
    pub fn close_path(&mut self) {
        self.push(PathEl::ClosePath);
    }

    /// The path elements.
    #[inline]
    pub fn elements(&self) -> &[PathEl] {
        &self.0
    }

    /// The path elements, mutably.
    #[inline]
    pub fn elements_mut(&mut self) -> &mut [PathEl] {
        &mut self.0
    }

    /// Iterate over the path elements.
    pub fn iter(&self) -> impl Iterator<Item = PathEl> + Clone + '_ {
        self.0.iter().copied()
    }

    /// Iterate over the segments of the path.
    ///
    /// A `ClosePath` yields the closing line, unless the subpath already
    /// ends at its start.
    pub fn segments(&self) -> Segments<core::iter::Copied<core::slice::Iter<'_, PathEl>>> {
        segments(self.0.iter().copied())
    }

    /// Remove all elements.
    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// The number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Does the path have no elements?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The point the next element would start from.
    ///
    /// After a `ClosePath` this is the start of the closed subpath. Returns
    /// `None` for an empty path.
    pub fn current_point(&self) -> Option<Point> {
        match self.0.last()? {
            PathEl::MoveTo(p) | PathEl::LineTo(p) | PathEl::QuadTo(_, p) => Some(*p),
            PathEl::CurveTo(_, _, p) => Some(*p),
            PathEl::ClosePath => self.0.iter().rev().find_map(|el| match el {
                PathEl::MoveTo(p) => Some(*p),
                _ => None,
            }),
        }
    }

    /// Are all coordinates finite?
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(PathEl::is_finite)
    }

    /// Total arc length of all segments.
    pub fn arclen(&self, accuracy: f64) -> f64 {
        self.segments().map(|seg| seg.arclen(accuracy)).sum()
    }

    /// The signed area enclosed by the path, treating every subpath as
    /// closed.
    pub fn area(&self) -> f64 {
        self.segments().map(|seg| seg.signed_area()).sum::<f64>() + self.open_closing_area()
    }

    /// Area contribution of the implicit closing lines of open subpaths.
    fn open_closing_area(&self) -> f64 {
        let mut area = 0.0;
        let mut start = None;
        let mut last = Point::ORIGIN;
        let close = |start: Option<Point>, last: Point| match start {
            Some(start) => Line::new(last, start).signed_area(),
            None => 0.0,
        };
        for el in self.iter() {
            match el {
                PathEl::MoveTo(p) => {
                    area += close(start, last);
                    start = Some(p);
                    last = p;
                }
                PathEl::LineTo(p) | PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => last = p,
                PathEl::ClosePath => {
                    if let Some(s) = start {
                        last = s;
                    }
                }
            }
        }
        area + close(start, last)
    }

    /// A conservative bounding box of all segments, or `None` if there are
    /// none.
    pub fn control_box(&self) -> Option<Rect> {
        self.segments()
            .map(|seg| seg.control_box())
            .reduce(|a, b| a.union(b))
    }
}

impl FromIterator<PathEl> for BezPath {
    fn from_iter<T: IntoIterator<Item = PathEl>>(iter: T) -> Self {
        BezPath(iter.into_iter().collect())
    }
}

impl Extend<PathEl> for BezPath {
    fn extend<I: IntoIterator<Item = PathEl>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a BezPath {
    type Item = PathEl;
    type IntoIter = core::iter::Copied<core::slice::Iter<'a, PathEl>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

impl IntoIterator for BezPath {
    type Item = PathEl;
    type IntoIter = alloc::vec::IntoIter<PathEl>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl PathEl {
    /// The end point of the element, if it has one.
    #[inline]
    pub fn end_point(&self) -> Option<Point> {
        match *self {
            PathEl::MoveTo(p) | PathEl::LineTo(p) | PathEl::QuadTo(_, p) => Some(p),
            PathEl::CurveTo(_, _, p) => Some(p),
            PathEl::ClosePath => None,
        }
    }

    /// Are all coordinates finite?
    pub fn is_finite(&self) -> bool {
        match *self {
            PathEl::MoveTo(p) | PathEl::LineTo(p) => p.is_finite(),
            PathEl::QuadTo(p1, p2) => p1.is_finite() && p2.is_finite(),
            PathEl::CurveTo(p1, p2, p3) => p1.is_finite() && p2.is_finite() && p3.is_finite(),
            PathEl::ClosePath => true,
        }
    }
}

/// Turn an iterator of path elements into an iterator of segments.
pub fn segments<I>(elements: I) -> Segments<I::IntoIter>
where
    I: IntoIterator<Item = PathEl>,
{
    Segments {
        elements: elements.into_iter(),
        start: Point::ORIGIN,
        last: Point::ORIGIN,
    }
}

/// An iterator over the segments of a path, created by [`segments`].
#[derive(Clone, Debug)]
pub struct Segments<I: Iterator<Item = PathEl>> {
    elements: I,
    start: Point,
    last: Point,
}

impl<I: Iterator<Item = PathEl>> Iterator for Segments<I> {
    type Item = PathSeg;

    fn next(&mut self) -> Option<PathSeg> {
        for el in &mut self.elements {
            let (seg, end) = match el {
                PathEl::MoveTo(p) => {
                    self.start = p;
                    self.last = p;
                    continue;
                }
                PathEl::LineTo(p) => (PathSeg::Line(Line::new(self.last, p)), p),
                PathEl::QuadTo(p1, p2) => (PathSeg::Quad(QuadBez::new(self.last, p1, p2)), p2),
                PathEl::CurveTo(p1, p2, p3) => {
                    (PathSeg::Cubic(CubicBez::new(self.last, p1, p2, p3)), p3)
                }
                PathEl::ClosePath => {
                    if self.last == self.start {
                        continue;
                    }
                    (PathSeg::Line(Line::new(self.last, self.start)), self.start)
                }
            };
            self.last = end;
            return Some(seg);
        }
        None
    }
}

impl PathSeg {
    /// The element that draws this segment from its start point.
    #[inline]
    pub fn as_path_el(&self) -> PathEl {
        match *self {
            PathSeg::Line(line) => PathEl::LineTo(line.p1),
            PathSeg::Quad(q) => PathEl::QuadTo(q.p1, q.p2),
            PathSeg::Cubic(c) => PathEl::CurveTo(c.p1, c.p2, c.p3),
        }
    }

    /// Split at parameter `t`.
    pub fn split_at(&self, t: f64) -> (PathSeg, PathSeg) {
        match *self {
            PathSeg::Line(line) => {
                let m = line.eval(t);
                (
                    PathSeg::Line(Line::new(line.p0, m)),
                    PathSeg::Line(Line::new(m, line.p1)),
                )
            }
            PathSeg::Quad(q) => {
                let (a, b) = q.split_at(t);
                (PathSeg::Quad(a), PathSeg::Quad(b))
            }
            PathSeg::Cubic(c) => {
                let (a, b) = c.split_at(t);
                (PathSeg::Cubic(a), PathSeg::Cubic(b))
            }
        }
    }

    /// Tangent vectors at the start and end, not normalized.
    ///
    /// Degenerate control points are skipped as for
    /// [`CubicBez::tangents`].
    pub fn tangents(&self) -> (Vec2, Vec2) {
        match *self {
            PathSeg::Line(line) => {
                let d = line.p1 - line.p0;
                (d, d)
            }
            PathSeg::Quad(q) => q.raise().tangents(),
            PathSeg::Cubic(c) => c.tangents(),
        }
    }

    /// Are all control points finite?
    pub fn is_finite(&self) -> bool {
        match *self {
            PathSeg::Line(line) => line.is_finite(),
            PathSeg::Quad(q) => q.is_finite(),
            PathSeg::Cubic(c) => c.is_finite(),
        }
    }
}

impl ParamCurve for PathSeg {
    fn eval(&self, t: f64) -> Point {
        match *self {
            PathSeg::Line(line) => line.eval(t),
            PathSeg::Quad(quad) => quad.eval(t),
            PathSeg::Cubic(cubic) => cubic.eval(t),
        }
    }

    fn subsegment(&self, range: Range<f64>) -> PathSeg {
        match *self {
            PathSeg::Line(line) => PathSeg::Line(line.subsegment(range)),
            PathSeg::Quad(quad) => PathSeg::Quad(quad.subsegment(range)),
            PathSeg::Cubic(cubic) => PathSeg::Cubic(cubic.subsegment(range)),
        }
    }

    fn start(&self) -> Point {
        match *self {
            PathSeg::Line(line) => line.p0,
            PathSeg::Quad(quad) => quad.p0,
            PathSeg::Cubic(cubic) => cubic.p0,
        }
    }

    fn end(&self) -> Point {
        match *self {
            PathSeg::Line(line) => line.p1,
            PathSeg::Quad(quad) => quad.p2,
            PathSeg::Cubic(cubic) => cubic.p3,
        }
    }
}

impl ParamCurveArclen for PathSeg {
    fn arclen(&self, accuracy: f64) -> f64 {
        match *self {
            PathSeg::Line(line) => line.arclen(accuracy),
            PathSeg::Quad(quad) => quad.arclen(accuracy),
            PathSeg::Cubic(cubic) => cubic.arclen(accuracy),
        }
    }

    fn inv_arclen(&self, arclen: f64, accuracy: f64) -> f64 {
        match *self {
            PathSeg::Line(line) => line.inv_arclen(arclen, accuracy),
            PathSeg::Quad(quad) => quad.inv_arclen(arclen, accuracy),
            PathSeg::Cubic(cubic) => cubic.inv_arclen(arclen, accuracy),
        }
    }
}

impl ParamCurveArea for PathSeg {
    fn signed_area(&self) -> f64 {
        match *self {
            PathSeg::Line(line) => line.signed_area(),
            PathSeg::Quad(quad) => quad.signed_area(),
            PathSeg::Cubic(cubic) => cubic.signed_area(),
        }
    }
}

impl ParamCurveBounds for PathSeg {
    fn control_box(&self) -> Rect {
        match *self {
            PathSeg::Line(line) => line.control_box(),
            PathSeg::Quad(quad) => quad.control_box(),
            PathSeg::Cubic(cubic) => cubic.control_box(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{BezPath, Line, ParamCurve, PathEl, PathSeg, Point};

    fn square() -> BezPath {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((1.0, 0.0));
        path.line_to((1.0, 1.0));
        path.line_to((0.0, 1.0));
        path.close_path();
        path
    }

    #[test]
    fn segments_include_closing_line() {
        let path = square();
        let segs: Vec<_> = path.segments().collect();
        assert_eq!(segs.len(), 4);
        assert_eq!(
            segs[3],
            PathSeg::Line(Line::new((0.0, 1.0), (0.0, 0.0)))
        );
    }

    #[test]
    fn close_at_start_adds_no_segment() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((1.0, 0.0));
        path.line_to((0.0, 0.0));
        path.close_path();
        assert_eq!(path.segments().count(), 2);
    }

    #[test]
    fn current_point() {
        let mut path = BezPath::new();
        assert_eq!(path.current_point(), None);
        path.move_to((2.0, 3.0));
        path.quad_to((4.0, 5.0), (6.0, 7.0));
        assert_eq!(path.current_point(), Some(Point::new(6.0, 7.0)));
        path.close_path();
        assert_eq!(path.current_point(), Some(Point::new(2.0, 3.0)));
    }

    #[test]
    fn area_of_square() {
        assert!((square().area() - 1.0).abs() < 1e-12);
        // Orientation flips the sign.
        let mut cw = BezPath::new();
        cw.move_to((0.0, 0.0));
        cw.line_to((0.0, 1.0));
        cw.line_to((1.0, 1.0));
        cw.line_to((1.0, 0.0));
        assert!((cw.area() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn split_segment() {
        let seg = PathSeg::Line(Line::new((0.0, 0.0), (4.0, 0.0)));
        let (a, b) = seg.split_at(0.25);
        assert_eq!(a.end(), Point::new(1.0, 0.0));
        assert_eq!(b.start(), Point::new(1.0, 0.0));
        assert_eq!(a.as_path_el(), PathEl::LineTo(Point::new(1.0, 0.0)));
    }

    #[test]
    fn finiteness() {
        let mut path = square();
        assert!(path.is_finite());
        path.line_to((f64::NAN, 0.0));
        assert!(!path.is_finite());
    }
}
