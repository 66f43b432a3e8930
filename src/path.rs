// Copyright 2026 the Kerf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-precision paths and shapes.
//!
//! These are the types that cross the public boundary of the offset, stroke
//! and dash operations. All computation happens on [`BezPath`] in double
//! precision; points are converted once on the way in and once on the way
//! out.

use alloc::vec::Vec;
use core::fmt;

use crate::{BezPath, PathEl, Point};

/// A point with single-precision coordinates.
#[derive(Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point32 {
    /// The x coordinate.
    pub x: f32,
    /// The y coordinate.
    pub y: f32,
}

impl Point32 {
    /// The point (0, 0).
    pub const ZERO: Point32 = Point32::new(0., 0.);

    /// Create a new point.
    #[inline(always)]
    pub const fn new(x: f32, y: f32) -> Point32 {
        Point32 { x, y }
    }

    /// Widen to double precision.
    #[inline]
    pub fn to_f64(self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }

    /// Narrow a double-precision point, rounding to the nearest `f32`.
    #[inline]
    pub fn from_f64(p: Point) -> Point32 {
        Point32::new(p.x as f32, p.y as f32)
    }

    /// Are both coordinates finite?
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f32, f32)> for Point32 {
    #[inline(always)]
    fn from(v: (f32, f32)) -> Point32 {
        Point32::new(v.0, v.1)
    }
}

impl From<Point32> for Point {
    #[inline]
    fn from(p: Point32) -> Point {
        p.to_f64()
    }
}

impl fmt::Debug for Point32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?})", self.x, self.y)
    }
}

#[cfg(feature = "mint")]
impl From<Point32> for mint::Point2<f32> {
    #[inline(always)]
    fn from(p: Point32) -> mint::Point2<f32> {
        mint::Point2 { x: p.x, y: p.y }
    }
}

#[cfg(feature = "mint")]
impl From<mint::Point2<f32>> for Point32 {
    #[inline(always)]
    fn from(p: mint::Point2<f32>) -> Point32 {
        Point32::new(p.x, p.y)
    }
}

/// An element of a [`Path`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathElement {
    /// Start a new subpath at the point.
    MoveTo(Point32),
    /// A straight line to the point.
    LineTo(Point32),
    /// A quadratic Bézier with a control point and an end point.
    QuadTo(Point32, Point32),
    /// A cubic Bézier with two control points and an end point.
    CubicTo(Point32, Point32, Point32),
    /// Close the subpath with a line back to its start.
    Close,
}

impl PathElement {
    /// Widen to a double-precision element.
    pub fn to_path_el(self) -> PathEl {
        match self {
            PathElement::MoveTo(p) => PathEl::MoveTo(p.to_f64()),
            PathElement::LineTo(p) => PathEl::LineTo(p.to_f64()),
            PathElement::QuadTo(p1, p2) => PathEl::QuadTo(p1.to_f64(), p2.to_f64()),
            PathElement::CubicTo(p1, p2, p3) => {
                PathEl::CurveTo(p1.to_f64(), p2.to_f64(), p3.to_f64())
            }
            PathElement::Close => PathEl::ClosePath,
        }
    }

    /// Narrow a double-precision element.
    pub fn from_path_el(el: PathEl) -> PathElement {
        let narrow = Point32::from_f64;
        match el {
            PathEl::MoveTo(p) => PathElement::MoveTo(narrow(p)),
            PathEl::LineTo(p) => PathElement::LineTo(narrow(p)),
            PathEl::QuadTo(p1, p2) => PathElement::QuadTo(narrow(p1), narrow(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                PathElement::CubicTo(narrow(p1), narrow(p2), narrow(p3))
            }
            PathEl::ClosePath => PathElement::Close,
        }
    }
}

/// Reasons a list of elements is not a valid [`Path`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathError {
    /// The first element is not a `MoveTo`.
    MissingMoveTo,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::MissingMoveTo => write!(f, "path does not start with a MoveTo"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PathError {}

/// A sequence of path elements in single precision.
///
/// A `Path` may hold several subpaths. When it is built with
/// [`Path::from_elements`], the first element is guaranteed to be a
/// `MoveTo`; the builder methods leave that to the caller.
#[derive(Clone, Default, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    elements: Vec<PathElement>,
}

impl Path {
    /// Create a new, empty path.
    #[inline]
    pub fn new() -> Path {
        Path::default()
    }

    /// Create a path from a list of elements.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::MissingMoveTo`] if `elements` is not empty and
    /// does not start with a `MoveTo`.
    pub fn from_elements(elements: Vec<PathElement>) -> Result<Path, PathError> {
        match elements.first() {
            None | Some(PathElement::MoveTo(_)) => Ok(Path { elements }),
            Some(_) => Err(PathError::MissingMoveTo),
        }
    }

    /// Start a new subpath.
    pub fn move_to<P: Into<Point32>>(&mut self, p: P) {
        self.elements.push(PathElement::MoveTo(p.into()));
    }

    /// Add a line.
    pub fn line_to<P: Into<Point32>>(&mut self, p: P) {
        self.elements.push(PathElement::LineTo(p.into()));
    }

    /// Add a quadratic Bézier.
    pub fn quad_to<P: Into<Point32>>(&mut self, p1: P, p2: P) {
        self.elements
            .push(PathElement::QuadTo(p1.into(), p2.into()));
    }

    /// Add a cubic Bézier.
    pub fn cubic_to<P: Into<Point32>>(&mut self, p1: P, p2: P, p3: P) {
        self.elements
            .push(PathElement::CubicTo(p1.into(), p2.into(), p3.into()));
    }

    /// Close the current subpath.
    pub fn close(&mut self) {
        self.elements.push(PathElement::Close);
    }

    /// The elements of the path.
    #[inline]
    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    /// The number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Is the path empty?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterate over the elements, widened to double precision.
    pub fn path_els(&self) -> impl Iterator<Item = PathEl> + Clone + '_ {
        self.elements.iter().map(|el| el.to_path_el())
    }

    /// Convert to a double-precision path.
    pub fn to_bez_path(&self) -> BezPath {
        self.path_els().collect()
    }

    /// Convert from a double-precision path, rounding every coordinate to
    /// the nearest `f32`.
    pub fn from_bez_path(path: &BezPath) -> Path {
        Path {
            elements: path.iter().map(PathElement::from_path_el).collect(),
        }
    }
}

impl FromIterator<PathElement> for Path {
    fn from_iter<T: IntoIterator<Item = PathElement>>(iter: T) -> Self {
        Path {
            elements: iter.into_iter().collect(),
        }
    }
}

impl Extend<PathElement> for Path {
    fn extend<I: IntoIterator<Item = PathElement>>(&mut self, iter: I) {
        self.elements.extend(iter);
    }
}

/// A set of contours, each a [`Path`] with a single subpath.
///
/// This is the result of stroking and dashing, where the outlines are meant
/// to be filled together with the nonzero winding rule.
#[derive(Clone, Default, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shape {
    contours: Vec<Path>,
}

impl Shape {
    /// Create an empty shape.
    #[inline]
    pub fn new() -> Shape {
        Shape::default()
    }

    /// Add a contour.
    pub fn push(&mut self, contour: Path) {
        self.contours.push(contour);
    }

    /// The contours of the shape.
    #[inline]
    pub fn contours(&self) -> &[Path] {
        &self.contours
    }

    /// The number of contours.
    #[inline]
    pub fn len(&self) -> usize {
        self.contours.len()
    }

    /// Does the shape have no contours?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Split a double-precision path into contours, one per `MoveTo`.
    pub fn from_bez_path(path: &BezPath) -> Shape {
        let mut contours = Vec::new();
        let mut current = Vec::new();
        for el in path {
            if matches!(el, PathEl::MoveTo(_)) && !current.is_empty() {
                contours.push(Path {
                    elements: core::mem::take(&mut current),
                });
            }
            current.push(PathElement::from_path_el(el));
        }
        if !current.is_empty() {
            contours.push(Path { elements: current });
        }
        Shape { contours }
    }

    /// All contours as one double-precision path.
    pub fn to_bez_path(&self) -> BezPath {
        self.contours.iter().flat_map(Path::path_els).collect()
    }
}

impl FromIterator<Path> for Shape {
    fn from_iter<T: IntoIterator<Item = Path>>(iter: T) -> Self {
        Shape {
            contours: iter.into_iter().collect(),
        }
    }
}

impl Extend<Path> for Shape {
    fn extend<I: IntoIterator<Item = Path>>(&mut self, iter: I) {
        self.contours.extend(iter);
    }
}

impl IntoIterator for Shape {
    type Item = Path;
    type IntoIter = alloc::vec::IntoIter<Path>;

    fn into_iter(self) -> Self::IntoIter {
        self.contours.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::{BezPath, Path, PathElement, PathError, Point, Point32, Shape};

    #[test]
    fn validation() {
        assert_eq!(Path::from_elements(vec![]), Ok(Path::new()));
        let ok = Path::from_elements(vec![
            PathElement::MoveTo(Point32::new(0., 0.)),
            PathElement::LineTo(Point32::new(1., 0.)),
        ]);
        assert_eq!(ok.map(|p| p.len()), Ok(2));
        let err = Path::from_elements(vec![PathElement::LineTo(Point32::new(1., 0.))]);
        assert_eq!(err, Err(PathError::MissingMoveTo));
        assert_eq!(
            PathError::MissingMoveTo.to_string(),
            "path does not start with a MoveTo"
        );
    }

    #[test]
    fn precision_conversion() {
        let mut path = Path::new();
        path.move_to((0.1, 0.2));
        path.quad_to((1.5, 2.5), (3.0, -4.0));
        path.cubic_to((1., 2.), (3., 4.), (5., 6.));
        path.close();
        let bez = path.to_bez_path();
        assert_eq!(bez.len(), 4);
        assert_eq!(bez.elements()[0].end_point(), Some(Point::new(0.1f32 as f64, 0.2f32 as f64)));
        assert_eq!(Path::from_bez_path(&bez), path);
    }

    #[test]
    fn shape_splits_at_move_to() {
        let mut bez = BezPath::new();
        bez.move_to((0., 0.));
        bez.line_to((1., 0.));
        bez.close_path();
        bez.move_to((5., 5.));
        bez.line_to((6., 5.));
        bez.move_to((9., 9.));
        let shape = Shape::from_bez_path(&bez);
        let lens: Vec<usize> = shape.contours().iter().map(Path::len).collect();
        assert_eq!(lens, [3, 2, 1]);
        assert_eq!(shape.to_bez_path(), bez);
        assert!(Shape::from_bez_path(&BezPath::new()).is_empty());
    }
}
