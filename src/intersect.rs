// Copyright 2026 the Kerf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Removal of self-intersection loops from paths.
//!
//! Offsetting a path by more than the radius of curvature of a concave part
//! makes the result cross itself, leaving small loops behind. This module
//! finds crossings between the segments of each subpath and cuts out the
//! loop between them.

use alloc::vec::Vec;
use core::ops::Range;

use arrayvec::ArrayVec;
use tracing::debug;

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

use crate::{
    BezPath, CubicBez, Line, ParamCurve, ParamCurveArclen, ParamCurveBounds, PathEl, PathSeg,
    Point, QuadBez,
};

/// Number of loops cut from one subpath before giving up on it.
const MAX_ITERATIONS: usize = 64;

/// Subdivision depth at which a pair of pieces is treated as flat.
const MAX_DEPTH: usize = 48;

/// Number of leaf piece pairs examined for one pair of segments. Bounds the
/// work on overlapping segments, which touch everywhere.
const MAX_LEAVES: usize = 4096;

/// Parameter distance trimmed around the point shared by adjacent segments.
const ADJACENT_TRIM: f64 = 1e-3;

/// One subpath, as segments.
#[derive(Debug)]
struct Contour {
    segs: Vec<PathSeg>,
    closed: bool,
}

/// A crossing of segment `i` at parameter `t_i` with segment `j > i`.
#[derive(Clone, Copy, Debug)]
struct Crossing {
    i: usize,
    t_i: f64,
    j: usize,
    t_j: f64,
    pt: Point,
}

/// Remove the loops formed where a subpath crosses itself.
///
/// Each subpath is processed on its own; crossings between different
/// subpaths are left alone. For every crossing found, the part of the
/// subpath between the two crossing segments is cut out and the segments are
/// joined at the crossing point. In a closed subpath the shorter of the two
/// parts is removed, and the subpath stays closed. Crossings are located to
/// within `accuracy`.
///
/// Crossings of a segment with itself are not detected.
pub fn remove_self_intersections(path: &BezPath, accuracy: f64) -> BezPath {
    let mut result = BezPath::new();
    for mut contour in contours(path) {
        let mut n_cut = 0;
        while let Some(crossing) = first_crossing(&contour, accuracy) {
            if n_cut == MAX_ITERATIONS {
                debug!(
                    n_segs = contour.segs.len(),
                    "self-intersection removal reached iteration limit"
                );
                break;
            }
            contour.excise(crossing, accuracy);
            n_cut += 1;
        }
        contour.append_to(&mut result);
    }
    result
}

fn contours(path: &BezPath) -> Vec<Contour> {
    let mut result = Vec::new();
    let mut segs = Vec::new();
    let mut start = Point::ORIGIN;
    let mut last = Point::ORIGIN;
    for el in path {
        match el {
            PathEl::MoveTo(p) => {
                if !segs.is_empty() {
                    result.push(Contour {
                        segs: core::mem::take(&mut segs),
                        closed: false,
                    });
                }
                start = p;
                last = p;
            }
            PathEl::LineTo(p1) => {
                if p1 != last {
                    segs.push(PathSeg::Line(Line::new(last, p1)));
                    last = p1;
                }
            }
            PathEl::QuadTo(p1, p2) => {
                segs.push(PathSeg::Quad(QuadBez::new(last, p1, p2)));
                last = p2;
            }
            PathEl::CurveTo(p1, p2, p3) => {
                segs.push(PathSeg::Cubic(CubicBez::new(last, p1, p2, p3)));
                last = p3;
            }
            PathEl::ClosePath => {
                if last != start {
                    segs.push(PathSeg::Line(Line::new(last, start)));
                }
                if !segs.is_empty() {
                    result.push(Contour {
                        segs: core::mem::take(&mut segs),
                        closed: true,
                    });
                }
                last = start;
            }
        }
    }
    if !segs.is_empty() {
        result.push(Contour {
            segs,
            closed: false,
        });
    }
    result
}

fn first_crossing(contour: &Contour, accuracy: f64) -> Option<Crossing> {
    let n = contour.segs.len();
    for i in 0..n {
        for j in i + 1..n {
            let seg_i = contour.segs[i];
            let seg_j = contour.segs[j];
            // Adjacent segments always meet at their shared point; only look
            // for crossings away from it.
            let follows = j == i + 1;
            let wraps = contour.closed && i == 0 && j == n - 1;
            let trim = |trimmed: bool| if trimmed { ADJACENT_TRIM } else { 0.0 };
            let range_i = trim(wraps)..1.0 - trim(follows);
            let range_j = trim(follows)..1.0 - trim(wraps);
            let mut leaves = 0;
            if let Some((t_i, t_j, pt)) = seg_crossing(
                &seg_i,
                range_i,
                &seg_j,
                range_j,
                accuracy,
                0,
                &mut leaves,
            ) {
                return Some(Crossing { i, t_i, j, t_j, pt });
            }
        }
    }
    None
}

/// Find a crossing of two segments within the parameter ranges, by
/// subdividing while the control boxes overlap.
fn seg_crossing(
    a: &PathSeg,
    range_a: Range<f64>,
    b: &PathSeg,
    range_b: Range<f64>,
    accuracy: f64,
    depth: usize,
    leaves: &mut usize,
) -> Option<(f64, f64, Point)> {
    let sub_a = a.subsegment(range_a.clone());
    let sub_b = b.subsegment(range_b.clone());
    let box_a = sub_a.control_box();
    let box_b = sub_b.control_box();
    if !box_a.overlaps(box_b) {
        return None;
    }
    let small = |w: f64, h: f64| w.max(h) <= accuracy;
    let flat_a = small(box_a.width(), box_a.height());
    let flat_b = small(box_b.width(), box_b.height());
    if (flat_a && flat_b) || depth == MAX_DEPTH {
        *leaves += 1;
        let (s, u) = chord_crossing(sub_a.start(), sub_a.end(), sub_b.start(), sub_b.end())?;
        let t_a = range_a.start + s * (range_a.end - range_a.start);
        let t_b = range_b.start + u * (range_b.end - range_b.start);
        return Some((t_a, t_b, sub_a.eval(s)));
    }
    if *leaves >= MAX_LEAVES {
        return None;
    }
    let pieces = |r: &Range<f64>, flat: bool| {
        let mut out = ArrayVec::<Range<f64>, 2>::new();
        if flat {
            out.push(r.clone());
        } else {
            let mid = 0.5 * (r.start + r.end);
            out.push(r.start..mid);
            out.push(mid..r.end);
        }
        out
    };
    let pieces_b = pieces(&range_b, flat_b);
    for ra in pieces(&range_a, flat_a) {
        for rb in pieces_b.iter().cloned() {
            if let Some(hit) = seg_crossing(a, ra.clone(), b, rb, accuracy, depth + 1, leaves) {
                return Some(hit);
            }
        }
    }
    None
}

/// Parameters of the crossing of two chords, if they cross.
fn chord_crossing(a0: Point, a1: Point, b0: Point, b1: Point) -> Option<(f64, f64)> {
    let da = a1 - a0;
    let db = b1 - b0;
    let denom = da.cross(db);
    if !(denom.abs() > 1e-300) {
        return None;
    }
    let d0 = b0 - a0;
    let s = d0.cross(db) / denom;
    let u = d0.cross(da) / denom;
    ((0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&u)).then_some((s, u))
}

/// Replace the start point of a segment.
fn with_start(seg: PathSeg, p: Point) -> PathSeg {
    match seg {
        PathSeg::Line(l) => PathSeg::Line(Line::new(p, l.p1)),
        PathSeg::Quad(q) => PathSeg::Quad(QuadBez::new(p, q.p1, q.p2)),
        PathSeg::Cubic(c) => PathSeg::Cubic(CubicBez::new(p, c.p1, c.p2, c.p3)),
    }
}

/// Replace the end point of a segment.
fn with_end(seg: PathSeg, p: Point) -> PathSeg {
    match seg {
        PathSeg::Line(l) => PathSeg::Line(Line::new(l.p0, p)),
        PathSeg::Quad(q) => PathSeg::Quad(QuadBez::new(q.p0, q.p1, p)),
        PathSeg::Cubic(c) => PathSeg::Cubic(CubicBez::new(c.p0, c.p1, c.p2, p)),
    }
}

impl Contour {
    /// Cut out the loop closed by `crossing`.
    fn excise(&mut self, crossing: Crossing, accuracy: f64) {
        let Crossing { i, t_i, j, t_j, pt } = crossing;
        let head = with_end(self.segs[i].subsegment(0.0..t_i), pt);
        let tail = with_start(self.segs[j].subsegment(t_j..1.0), pt);
        let inner_head = with_start(self.segs[i].subsegment(t_i..1.0), pt);
        let inner_tail = with_end(self.segs[j].subsegment(0.0..t_j), pt);
        let keep_inner = self.closed && {
            let len = |segs: &[PathSeg]| -> f64 { segs.iter().map(|s| s.arclen(accuracy)).sum() };
            let inner = len(&self.segs[i + 1..j])
                + inner_head.arclen(accuracy)
                + inner_tail.arclen(accuracy);
            let outer = len(&self.segs[..i])
                + len(&self.segs[j + 1..])
                + head.arclen(accuracy)
                + tail.arclen(accuracy);
            inner > outer
        };
        let mut segs = Vec::with_capacity(self.segs.len());
        if keep_inner {
            segs.push(inner_head);
            segs.extend_from_slice(&self.segs[i + 1..j]);
            segs.push(inner_tail);
        } else {
            segs.extend_from_slice(&self.segs[..i]);
            segs.push(head);
            segs.push(tail);
            segs.extend_from_slice(&self.segs[j + 1..]);
        }
        self.segs = segs;
    }

    fn append_to(&self, out: &mut BezPath) {
        let Some(first) = self.segs.first() else {
            return;
        };
        out.move_to(first.start());
        out.extend(self.segs.iter().map(PathSeg::as_path_el));
        if self.closed {
            out.close_path();
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{remove_self_intersections, BezPath, PathEl, Point};

    fn points(path: &BezPath) -> Vec<Point> {
        path.iter().filter_map(|el| el.end_point()).collect()
    }

    #[test]
    fn open_loop_is_cut() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        path.line_to((10.0, 5.0));
        path.line_to((5.0, 5.0));
        path.line_to((5.0, -5.0));
        let result = remove_self_intersections(&path, 1e-6);
        let pts = points(&result);
        assert_eq!(pts.len(), 3);
        let expected = [(0.0, 0.0), (5.0, 0.0), (5.0, -5.0)];
        for (p, e) in pts.iter().zip(expected) {
            assert!(p.distance(e.into()) < 1e-5, "{p:?} != {e:?}");
        }
    }

    #[test]
    fn corner_loop_in_closed_contour() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        path.line_to((10.0, 12.0));
        path.line_to((12.0, 10.0));
        path.line_to((0.0, 10.0));
        path.close_path();
        let result = remove_self_intersections(&path, 1e-6);
        assert_eq!(result.elements().last(), Some(&PathEl::ClosePath));
        assert!((result.area() - 100.0).abs() < 1e-4, "{}", result.area());
        // Nothing left to remove.
        let again = remove_self_intersections(&result, 1e-6);
        assert_eq!(again.len(), result.len());
    }

    #[test]
    fn curved_loop_is_cut() {
        // Two cubics crossing each other, with a line in between.
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.curve_to((10.0, 0.0), (20.0, 5.0), (20.0, 10.0));
        path.line_to((15.0, 12.0));
        path.curve_to((12.0, 5.0), (12.0, -5.0), (14.0, -10.0));
        let result = remove_self_intersections(&path, 1e-6);
        let n_curves = result
            .iter()
            .filter(|el| matches!(el, PathEl::CurveTo(..)))
            .count();
        assert_eq!(n_curves, 2);
        assert!(result.iter().all(|el| !matches!(el, PathEl::LineTo(_))));
        // Both pieces meet at the crossing.
        let PathEl::CurveTo(_, _, mid) = result.elements()[1] else {
            panic!("expected a curve");
        };
        let PathEl::CurveTo(_, _, end) = result.elements()[2] else {
            panic!("expected a curve");
        };
        assert_eq!(end, Point::new(14.0, -10.0));
        assert!(mid.x > 10.0 && mid.x < 20.0);
    }

    #[test]
    fn simple_paths_are_unchanged() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.curve_to((5.0, 10.0), (15.0, 10.0), (20.0, 0.0));
        path.line_to((20.0, -5.0));
        path.close_path();
        path.move_to((30.0, 0.0));
        path.line_to((40.0, 0.0));
        path.line_to((40.0, 10.0));
        let result = remove_self_intersections(&path, 1e-6);
        // The implicit closing line becomes explicit.
        let expected = [
            (0.0, 0.0),
            (20.0, 0.0),
            (20.0, -5.0),
            (0.0, 0.0),
            (30.0, 0.0),
            (40.0, 0.0),
            (40.0, 10.0),
        ]
        .map(Point::from);
        assert_eq!(points(&result), expected);
    }
}
