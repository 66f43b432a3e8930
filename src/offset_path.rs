// Copyright 2026 the Kerf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parallel offset of a whole path.
//!
//! Every segment is offset by the same signed distance, positive to the left
//! of the direction of travel. Corners where the offset segments diverge
//! (convex with respect to the offset side) are filled with a join; corners
//! where they converge are trimmed to the crossing of the offset lines.
//!
//! A segment's offset is held back until the tangent of the following
//! segment is known, so that its end can be placed without revisiting
//! output that was already written.

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

use crate::stroke::{round_join, round_join_rev};
use crate::{offset_cubic, BezPath, CubicBez, Join, PathEl, Point, QuadBez, Vec2};

/// Tangents shorter than this have no usable direction.
const TANGENT_EPSILON: f64 = 1e-9;

/// Below this `|cross|` of the unit tangents a corner is straight.
const PARALLEL_EPSILON: f64 = 1e-6;

/// Offset lines closer to parallel than this don't get intersected.
const INTERSECT_EPSILON: f64 = 1e-9;

/// The segment whose offset has been computed but not yet emitted.
#[derive(Clone, Copy, Debug)]
enum Pending {
    Empty,
    Line { end: Point, tan: Vec2 },
    /// The offset pieces are kept in `OffsetCtx::curve`.
    Curve { end: Point, tan: Vec2 },
}

#[derive(Debug)]
struct OffsetCtx {
    distance: f64,
    join: Join,
    miter_limit: f64,
    tolerance: f64,
    output: BezPath,
    curve: BezPath,
    pending: Pending,
    start_pt: Point,
    last_pt: Point,
    /// Entry tangent of the subpath, and the index of its `MoveTo` in the
    /// output.
    first: Option<(Vec2, usize)>,
}

/// Offset a path by a signed `distance`.
///
/// Positive distances offset to the left of the direction of travel (with
/// the y axis pointing up). Lines are offset exactly; curves are
/// approximated with [`offset_cubic`] to within `tolerance`. The result has
/// one subpath per input subpath that contains at least one segment of
/// nonzero length; closed subpaths stay closed.
///
/// For a miter join, `miter_limit` bounds the distance from the miter tip
/// to the end of the offset segment, in units of `|distance|`. Corners
/// beyond the limit are beveled.
pub fn offset_path(
    path: impl IntoIterator<Item = PathEl>,
    distance: f64,
    join: Join,
    miter_limit: f64,
    tolerance: f64,
) -> BezPath {
    let mut ctx = OffsetCtx {
        distance,
        join,
        miter_limit,
        tolerance,
        output: BezPath::new(),
        curve: BezPath::new(),
        pending: Pending::Empty,
        start_pt: Point::ORIGIN,
        last_pt: Point::ORIGIN,
        first: None,
    };
    for el in path {
        ctx.process_element(el);
    }
    ctx.finish();
    ctx.output
}

fn usable(tan: Vec2) -> bool {
    tan.hypot() >= TANGENT_EPSILON
}

impl OffsetCtx {
    fn offset_point(&self, pt: Point, tan: Vec2) -> Point {
        let len = tan.hypot();
        if !(len >= TANGENT_EPSILON) {
            return pt;
        }
        pt + (self.distance / len) * tan.turn_90()
    }

    /// The crossing of the offset lines of the two tangents at `corner`.
    fn intersection(&self, corner: Point, prev_tan: Vec2, next_tan: Vec2) -> Point {
        if !usable(prev_tan) || !usable(next_tan) {
            return self.offset_point(corner, next_tan);
        }
        let prev_dir = prev_tan.normalize();
        let next_dir = next_tan.normalize();
        let offset1 = corner + self.distance * prev_dir.turn_90();
        let offset2 = corner + self.distance * next_dir.turn_90();
        let denom = prev_dir.cross(next_dir);
        if !(denom.abs() >= INTERSECT_EPSILON) {
            return offset2;
        }
        let t = (offset2 - offset1).cross(next_dir) / denom;
        offset1 + t * prev_dir
    }

    fn process_element(&mut self, el: PathEl) {
        // Segments with non-finite coordinates are dropped; the pen stays put.
        if !matches!(el, PathEl::MoveTo(_)) && !(self.last_pt.is_finite() && el.is_finite()) {
            return;
        }
        match el {
            PathEl::MoveTo(p) => {
                self.finish();
                self.start_pt = p;
                self.last_pt = p;
            }
            PathEl::LineTo(p1) => {
                let tan = p1 - self.last_pt;
                if !usable(tan) {
                    return;
                }
                self.begin_segment(tan);
                self.pending = Pending::Line { end: p1, tan };
                self.last_pt = p1;
            }
            PathEl::QuadTo(p1, p2) => {
                self.do_cubic(QuadBez::new(self.last_pt, p1, p2).raise());
            }
            PathEl::CurveTo(p1, p2, p3) => {
                self.do_cubic(CubicBez::new(self.last_pt, p1, p2, p3));
            }
            PathEl::ClosePath => self.close(),
        }
    }

    fn do_cubic(&mut self, c: CubicBez) {
        if [c.p1, c.p2, c.p3].iter().all(|&p| !usable(p - c.p0)) {
            return;
        }
        let (tan0, tan1) = c.tangents_with(TANGENT_EPSILON * TANGENT_EPSILON);
        self.begin_segment(tan0);
        offset_cubic(c, self.distance, self.tolerance, &mut self.curve);
        self.pending = Pending::Curve {
            end: c.p3,
            tan: tan1,
        };
        self.last_pt = c.p3;
    }

    /// Start the subpath, or flush the previous segment against `tan`.
    fn begin_segment(&mut self, tan: Vec2) {
        if self.first.is_none() {
            let start = self.offset_point(self.last_pt, tan);
            self.first = Some((tan, self.output.len()));
            self.output.move_to(start);
        } else {
            self.flush(tan);
        }
    }

    /// Emit the pending segment's offset verbatim.
    fn emit_natural(&mut self, end: Point, tan: Vec2, is_line: bool) {
        if is_line {
            let p = self.offset_point(end, tan);
            self.output.line_to(p);
        } else {
            self.output.extend(self.curve.iter().skip(1));
        }
    }

    /// Emit the pending segment, ending it according to the corner it
    /// makes with `next_tan`.
    fn flush(&mut self, next_tan: Vec2) {
        let (end, prev_tan, is_line) = match self.pending {
            Pending::Empty => return,
            Pending::Line { end, tan } => (end, tan, true),
            Pending::Curve { end, tan } => (end, tan, false),
        };
        self.pending = Pending::Empty;
        if !usable(prev_tan) || !usable(next_tan) {
            self.emit_natural(end, prev_tan, is_line);
            return;
        }
        let prev_dir = prev_tan.normalize();
        let next_dir = next_tan.normalize();
        let cross = prev_dir.cross(next_dir);
        let dot = prev_dir.dot(next_dir);
        let parallel = cross.abs() < PARALLEL_EPSILON && dot > 0.0;
        let convex = cross * self.distance < 0.0;
        if is_line && !parallel && !convex {
            let p = self.intersection(end, prev_tan, next_tan);
            self.output.line_to(p);
        } else {
            // Concave corners after a curve keep the curve's own end.
            self.emit_natural(end, prev_tan, is_line);
        }
        if !parallel && convex {
            self.emit_join(end, prev_tan, next_tan, cross.atan2(dot));
        }
    }

    /// Fill the gap at a convex corner.
    fn emit_join(&mut self, corner: Point, prev_tan: Vec2, next_tan: Vec2, angle: f64) {
        let next_start = self.offset_point(corner, next_tan);
        match self.join {
            Join::Round => {
                let arc_norm = corner - next_start;
                if self.distance > 0.0 {
                    round_join_rev(&mut self.output, self.tolerance, corner, arc_norm, -angle);
                } else {
                    round_join(&mut self.output, self.tolerance, corner, arc_norm, angle);
                }
            }
            Join::Bevel => self.output.line_to(next_start),
            Join::Miter => {
                let miter_pt = self.intersection(corner, prev_tan, next_tan);
                let prev_end = self.offset_point(corner, prev_tan);
                let ratio = (miter_pt - prev_end).hypot() / self.distance.abs();
                if ratio <= self.miter_limit {
                    self.output.line_to(miter_pt);
                }
                self.output.line_to(next_start);
            }
        }
    }

    fn close(&mut self) {
        let Some((first_tan, move_ix)) = self.first.take() else {
            // Nothing was drawn, so there is no contour to close.
            self.pending = Pending::Empty;
            self.last_pt = self.start_pt;
            return;
        };
        let closing_tan = self.start_pt - self.last_pt;
        if usable(closing_tan) {
            self.flush(closing_tan);
            self.pending = Pending::Line {
                end: self.start_pt,
                tan: closing_tan,
            };
        }
        self.flush(first_tan);
        // The corner at the start decided where the contour really begins.
        if let Some(p) = self.output.current_point() {
            if let Some(el) = self.output.elements_mut().get_mut(move_ix) {
                *el = PathEl::MoveTo(p);
            }
        }
        self.output.close_path();
        self.last_pt = self.start_pt;
    }

    /// End an open subpath at the natural end of its last segment.
    fn finish(&mut self) {
        match self.pending {
            Pending::Empty => {}
            Pending::Line { end, tan } => self.emit_natural(end, tan, true),
            Pending::Curve { end, tan } => self.emit_natural(end, tan, false),
        }
        self.pending = Pending::Empty;
        self.first = None;
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use crate::{offset_path, Arc, BezPath, Join, ParamCurve, PathEl, Point};

    fn square() -> BezPath {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        path.line_to((10.0, 10.0));
        path.line_to((0.0, 10.0));
        path.close_path();
        path
    }

    #[test]
    fn line_offset_is_exact() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let p0 = Point::new(rng.random_range(-50.0..50.0), rng.random_range(-50.0..50.0));
            let p1 = Point::new(rng.random_range(-50.0..50.0), rng.random_range(-50.0..50.0));
            let d = rng.random_range(-10.0..10.0);
            let mut path = BezPath::new();
            path.move_to(p0);
            path.line_to(p1);
            let result = offset_path(&path, d, Join::Round, 4.0, 0.1);
            let pts: Vec<Point> = result.iter().filter_map(|el| el.end_point()).collect();
            assert_eq!(pts.len(), 2);
            assert!((pts[0].distance(p0) - d.abs()).abs() < 1e-9);
            assert!((pts[1].distance(p1) - d.abs()).abs() < 1e-9);
            // On the left for positive distances.
            assert!((p1 - p0).cross(pts[0] - p0) * d >= 0.0);
        }
    }

    #[test]
    fn zero_offset_reproduces_lines() {
        let result = offset_path(&square(), 0.0, Join::Miter, 4.0, 0.1);
        let expected = [
            PathEl::MoveTo((0.0, 0.0).into()),
            PathEl::LineTo((10.0, 0.0).into()),
            PathEl::LineTo((10.0, 10.0).into()),
            PathEl::LineTo((0.0, 10.0).into()),
            PathEl::LineTo((0.0, 0.0).into()),
            PathEl::ClosePath,
        ];
        assert_eq!(result.elements(), &expected);
    }

    #[test]
    fn inward_square_trims_corners() {
        let result = offset_path(&square(), 1.0, Join::Round, 4.0, 0.1);
        assert_eq!(result.elements()[0], PathEl::MoveTo((1.0, 1.0).into()));
        assert_eq!(result.elements().last(), Some(&PathEl::ClosePath));
        assert!(result.iter().all(|el| !matches!(el, PathEl::CurveTo(..))));
        assert!((result.area() - 64.0).abs() < 1e-9);
    }

    #[test]
    fn outward_square_joins() {
        let miter = offset_path(&square(), -1.0, Join::Miter, 4.0, 0.1);
        assert!((miter.area() - 144.0).abs() < 1e-9);
        let clipped = offset_path(&square(), -1.0, Join::Miter, 0.9, 0.1);
        assert!((clipped.area() - 142.0).abs() < 1e-9);
        let bevel = offset_path(&square(), -1.0, Join::Bevel, 4.0, 0.1);
        assert!((bevel.area() - 142.0).abs() < 1e-9);
        let round = offset_path(&square(), -1.0, Join::Round, 4.0, 1e-5);
        assert!((round.area() - (140.0 + core::f64::consts::PI)).abs() < 1e-3);
        let PathEl::MoveTo(start) = round.elements()[0] else {
            panic!("offset should start with a MoveTo");
        };
        assert!(start.distance(Point::new(0.0, -1.0)) < 1e-9);
    }

    #[test]
    fn straight_corner_has_no_join() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((5.0, 0.0));
        path.line_to((10.0, 0.0));
        let result = offset_path(&path, -2.0, Join::Round, 4.0, 0.1);
        let expected = [
            PathEl::MoveTo((0.0, -2.0).into()),
            PathEl::LineTo((5.0, -2.0).into()),
            PathEl::LineTo((10.0, -2.0).into()),
        ];
        assert_eq!(result.elements(), &expected);
    }

    #[test]
    fn circle_offset_is_accurate() {
        let radius = 50.0;
        let arc = Arc::new((0.0, 0.0), (radius, radius), 0.0, 2.0 * core::f64::consts::PI, 0.0);
        let mut path = BezPath::new();
        path.move_to(arc.start_point());
        path.extend(arc.append_iter(1e-9));
        path.close_path();
        for d in [-5.0, 5.0] {
            let result = offset_path(&path, d, Join::Round, 4.0, 0.01);
            // Positive distances go to the left, towards the center.
            let target = radius - d;
            for seg in result.segments() {
                for i in 0..=8 {
                    let p = seg.eval(i as f64 / 8.0);
                    let err = (p.to_vec2().hypot() - target).abs();
                    assert!(err < 0.02, "d = {d}: {err}");
                }
            }
        }
    }

    #[test]
    fn subpaths_are_independent() {
        let mut path = square();
        path.move_to((20.0, 0.0));
        path.line_to((30.0, 0.0));
        let result = offset_path(&path, 1.0, Join::Bevel, 4.0, 0.1);
        let moves: Vec<_> = result
            .iter()
            .filter(|el| matches!(el, PathEl::MoveTo(_)))
            .collect();
        assert_eq!(
            moves,
            [
                PathEl::MoveTo((1.0, 1.0).into()),
                PathEl::MoveTo((20.0, 1.0).into())
            ]
        );
    }

    #[test]
    fn empty_closed_subpath_emits_nothing() {
        let mut path = BezPath::new();
        path.move_to((1.0, 1.0));
        path.close_path();
        assert!(offset_path(&path, 2.0, Join::Round, 4.0, 0.1).is_empty());
        // A following subpath is unaffected.
        path.move_to((0.0, 0.0));
        path.line_to((3.0, 0.0));
        let result = offset_path(&path, 2.0, Join::Round, 4.0, 0.1);
        assert_eq!(
            result.elements(),
            &[
                PathEl::MoveTo((0.0, 2.0).into()),
                PathEl::LineTo((3.0, 2.0).into())
            ]
        );
    }

    #[test]
    fn degenerate_input() {
        let mut path = BezPath::new();
        path.move_to((1.0, 1.0));
        path.line_to((1.0, 1.0));
        path.close_path();
        assert!(offset_path(&path, 1.0, Join::Round, 4.0, 0.1).is_empty());
        path.line_to((f64::NAN, 3.0));
        path.curve_to((f64::INFINITY, 0.0), (2.0, 2.0), (3.0, 3.0));
        path.quad_to((1.0, 1.0), (1.0, 1.0));
        path.line_to((5.0, 1.0));
        let result = offset_path(&path, 1.0, Join::Miter, 4.0, 0.1);
        assert!(result.is_finite(), "{result:?}");
        // Only the last line survives, from the pen left at (1, 1).
        assert_eq!(
            result.elements(),
            &[
                PathEl::MoveTo((1.0, 2.0).into()),
                PathEl::LineTo((5.0, 2.0).into())
            ]
        );
        let mut lost = BezPath::new();
        lost.move_to((f64::NAN, 0.0));
        lost.line_to((1.0, 1.0));
        lost.close_path();
        assert!(offset_path(&lost, 1.0, Join::Round, 4.0, 0.1).is_empty());
    }
}
