// Copyright 2026 the Kerf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Splitting paths into dashes.

use tracing::debug;

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

use crate::common::wrap_phase;
use crate::{
    BezPath, CubicBez, Dashes, Line, ParamCurve, ParamCurveArclen, PathEl, PathSeg, Point,
    QuadBez,
};

/// Accuracy of the arc length measurements used to place dash boundaries.
const DASH_ACCURACY: f64 = 1e-12;

/// Remaining lengths below this are considered used up.
const SEG_EPSILON: f64 = 1e-12;

/// The sanitized pattern and its phase at the start of every subpath.
#[derive(Clone, Debug)]
pub(crate) struct DashPhase {
    dashes: Dashes,
    ix: usize,
    remaining: f64,
    active: bool,
}

impl DashPhase {
    /// Sanitize `pattern` and locate `offset` in it.
    ///
    /// Entries are taken by absolute value, and entries that are zero or
    /// not finite are dropped. Returns `None` when nothing usable is left.
    pub(crate) fn new(offset: f64, pattern: &[f64]) -> Option<Self> {
        let dashes: Dashes = pattern
            .iter()
            .map(|dash| dash.abs())
            .filter(|dash| dash.is_finite() && *dash > 0.0)
            .collect();
        let total: f64 = dashes.iter().sum();
        if dashes.is_empty() || !(total.is_finite() && total > 0.0) {
            debug!(len = pattern.len(), "degenerate dash pattern, not dashing");
            return None;
        }
        let mut remaining_offset = if offset.is_finite() {
            wrap_phase(offset, total)
        } else {
            0.0
        };
        let mut ix = 0;
        let mut remaining = dashes[0];
        let mut active = true;
        while remaining_offset > 0.0 && remaining <= remaining_offset {
            remaining_offset -= remaining;
            ix = (ix + 1) % dashes.len();
            remaining = dashes[ix];
            active = !active;
        }
        remaining -= remaining_offset;
        Some(DashPhase {
            dashes,
            ix,
            remaining,
            active,
        })
    }
}

/// An iterator producing the "on" intervals of a dash pattern applied to a
/// path.
///
/// Each dash starts with a `MoveTo`, followed by pieces of the input
/// elements of the same kind (a piece of a quadratic is a quadratic, and so
/// on). A `ClosePath` is walked as a line back to the subpath start; the
/// output contains no `ClosePath` elements. The phase restarts at every
/// `MoveTo`.
#[derive(Clone, Debug)]
pub struct DashIterator<I> {
    inner: I,
    phase: DashPhase,
    dash_ix: usize,
    dash_remaining: f64,
    is_active: bool,
    need_move_to: bool,
    start_pt: Point,
    last_pt: Point,
    /// The part of the current element not yet walked, with its length.
    current: Option<(PathSeg, f64)>,
    /// Whether the current element is the line drawn by a `ClosePath`.
    closing: bool,
    /// An element to emit after the `MoveTo` opening a dash.
    queued: Option<PathEl>,
}

impl<I: Iterator<Item = PathEl>> DashIterator<I> {
    /// Create a dashing iterator.
    ///
    /// Pattern entries are taken by absolute value, and entries that are
    /// zero or not finite are dropped. Returns `None` when nothing usable
    /// is left, in which case the path should be used undashed.
    pub fn new(inner: I, dash_offset: f64, pattern: &[f64]) -> Option<Self> {
        DashPhase::new(dash_offset, pattern).map(|phase| Self::with_phase(inner, phase))
    }

    pub(crate) fn with_phase(inner: I, phase: DashPhase) -> Self {
        DashIterator {
            inner,
            dash_ix: phase.ix,
            dash_remaining: phase.remaining,
            is_active: phase.active,
            phase,
            need_move_to: true,
            start_pt: Point::ORIGIN,
            last_pt: Point::ORIGIN,
            current: None,
            closing: false,
            queued: None,
        }
    }

    fn reset_phase(&mut self) {
        self.dash_ix = self.phase.ix;
        self.dash_remaining = self.phase.remaining;
        self.is_active = self.phase.active;
    }

    fn next_dash(&mut self) {
        self.dash_ix += 1;
        if self.dash_ix == self.phase.dashes.len() {
            self.dash_ix = 0;
        }
        self.dash_remaining = self.phase.dashes[self.dash_ix];
        self.is_active = !self.is_active;
    }

    /// Pull input until there is a segment to walk.
    ///
    /// Returns `false` when the input is exhausted.
    fn get_input(&mut self) -> bool {
        while let Some(el) = self.inner.next() {
            let p0 = self.last_pt;
            self.closing = false;
            let seg = match el {
                PathEl::MoveTo(p) => {
                    self.start_pt = p;
                    self.last_pt = p;
                    self.need_move_to = true;
                    self.reset_phase();
                    continue;
                }
                PathEl::LineTo(p1) => PathSeg::Line(Line::new(p0, p1)),
                PathEl::QuadTo(p1, p2) => PathSeg::Quad(QuadBez::new(p0, p1, p2)),
                PathEl::CurveTo(p1, p2, p3) => PathSeg::Cubic(CubicBez::new(p0, p1, p2, p3)),
                PathEl::ClosePath => {
                    if p0 == self.start_pt {
                        self.need_move_to = true;
                        continue;
                    }
                    self.closing = true;
                    PathSeg::Line(Line::new(p0, self.start_pt))
                }
            };
            self.last_pt = seg.end();
            let len = seg.arclen(DASH_ACCURACY);
            if len.is_finite() {
                self.current = Some((seg, len));
                return true;
            }
            self.end_segment();
        }
        false
    }

    /// Walk the current segment up to the next emitted piece.
    fn step(&mut self) -> Option<PathEl> {
        let (mut seg, mut seg_remaining) = self.current.take()?;
        while seg_remaining > SEG_EPSILON {
            if self.dash_remaining <= seg_remaining {
                let t = seg.inv_arclen(self.dash_remaining, DASH_ACCURACY);
                let (left, right) = seg.split_at(t);
                let emit = self.is_active && t > 0.0;
                seg = right;
                seg_remaining -= self.dash_remaining;
                self.next_dash();
                if emit {
                    let el = self.emit(left);
                    self.need_move_to = true;
                    self.current = Some((seg, seg_remaining));
                    return Some(el);
                }
                self.need_move_to = true;
            } else {
                self.dash_remaining -= seg_remaining;
                let el = self.is_active.then(|| self.emit(seg));
                self.end_segment();
                return el;
            }
        }
        self.end_segment();
        None
    }

    /// Whatever follows a `ClosePath` starts a new dash.
    fn end_segment(&mut self) {
        if self.closing {
            self.closing = false;
            self.need_move_to = true;
        }
    }

    fn emit(&mut self, piece: PathSeg) -> PathEl {
        let el = piece.as_path_el();
        if self.need_move_to {
            self.need_move_to = false;
            self.queued = Some(el);
            PathEl::MoveTo(piece.start())
        } else {
            el
        }
    }
}

impl<I: Iterator<Item = PathEl>> Iterator for DashIterator<I> {
    type Item = PathEl;

    fn next(&mut self) -> Option<PathEl> {
        loop {
            if let Some(el) = self.queued.take() {
                return Some(el);
            }
            if self.current.is_none() && !self.get_input() {
                return None;
            }
            if let Some(el) = self.step() {
                return Some(el);
            }
        }
    }
}

/// Apply a dash pattern to a path.
///
/// The `pattern` alternates "on" and "off" lengths, starting with "on",
/// shifted by `offset` along every subpath. A pattern with no usable
/// entries returns the path unchanged.
pub fn dash_path(path: impl IntoIterator<Item = PathEl>, offset: f64, pattern: &[f64]) -> BezPath {
    match DashPhase::new(offset, pattern) {
        Some(phase) => DashIterator::with_phase(path.into_iter(), phase).collect(),
        None => path.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::{dash_path, DashIterator};
    use crate::{BezPath, PathEl, Point};

    fn line(len: f64) -> BezPath {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((len, 0.0));
        path
    }

    /// The x ranges of the dashes of a horizontal path.
    fn intervals(path: &BezPath) -> Vec<(f64, f64)> {
        let mut result = vec![];
        let mut start = 0.0;
        for el in path.iter() {
            match el {
                PathEl::MoveTo(p) => start = p.x,
                PathEl::LineTo(p) => {
                    result.push((start, p.x));
                    start = p.x;
                }
                _ => panic!("unexpected element {el:?}"),
            }
        }
        result
    }

    fn assert_intervals(actual: &[(f64, f64)], expected: &[(f64, f64)]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a.0 - e.0).abs() < 1e-9 && (a.1 - e.1).abs() < 1e-9, "{actual:?}");
        }
    }

    #[test]
    fn simple_pattern() {
        let dashed = dash_path(&line(10.0), 0.0, &[2.0, 2.0]);
        assert_intervals(&intervals(&dashed), &[(0., 2.), (4., 6.), (8., 10.)]);
    }

    #[test]
    fn phase_offset() {
        let dashed = dash_path(&line(10.0), 1.0, &[2.0, 2.0]);
        assert_intervals(&intervals(&dashed), &[(0., 1.), (3., 5.), (7., 9.)]);
        // Negative offsets wrap around the pattern.
        let dashed = dash_path(&line(10.0), -1.0, &[2.0, 2.0]);
        assert_intervals(&intervals(&dashed), &[(1., 3.), (5., 7.), (9., 10.)]);
    }

    #[test]
    fn degenerate_patterns_pass_through() {
        let path = line(10.0);
        assert_eq!(dash_path(&path, 0.0, &[]), path);
        assert_eq!(dash_path(&path, 0.0, &[0.0, f64::NAN]), path);
        assert!(DashIterator::new(path.iter(), 0.0, &[f64::INFINITY]).is_none());
    }

    #[test]
    fn negative_entries_use_absolute_value() {
        let dashed = dash_path(&line(10.0), 0.0, &[-2.0, 2.0]);
        assert_intervals(&intervals(&dashed), &[(0., 2.), (4., 6.), (8., 10.)]);
    }

    #[test]
    fn phase_resets_per_subpath() {
        let mut path = line(3.0);
        path.move_to((0.0, 5.0));
        path.line_to((3.0, 5.0));
        let dashed = dash_path(&path, 0.0, &[2.0, 2.0]);
        let moves: Vec<Point> = dashed
            .iter()
            .filter_map(|el| match el {
                PathEl::MoveTo(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(moves, vec![Point::new(0.0, 0.0), Point::new(0.0, 5.0)]);
    }

    /// Lengths of the "on" intervals of `pattern` laid along `[0, total]`
    /// from `offset`, and the summed length of the "off" intervals.
    fn expected_dashes(total: f64, offset: f64, pattern: &[f64]) -> (Vec<f64>, f64) {
        let period: f64 = pattern.iter().sum();
        let mut ix = 0;
        let mut remaining = pattern[0];
        let mut skip = offset.rem_euclid(period);
        while skip >= remaining {
            skip -= remaining;
            ix = (ix + 1) % pattern.len();
            remaining = pattern[ix];
        }
        remaining -= skip;
        let (mut on, mut off) = (vec![], 0.0);
        let mut pos = 0.0;
        while pos < total {
            let step = remaining.min(total - pos);
            if ix % 2 == 0 {
                on.push(step);
            } else {
                off += step;
            }
            pos += step;
            ix = (ix + 1) % pattern.len();
            remaining = pattern[ix];
        }
        (on, off)
    }

    #[test]
    fn on_and_off_sum_to_length() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.curve_to((30.0, 40.0), (70.0, -40.0), (100.0, 0.0));
        path.quad_to((120.0, 30.0), (140.0, 0.0));
        path.line_to((140.0, 12.5));
        let total = path.arclen(1e-12);
        let pattern = [3.0, 1.5];
        for offset in [0.0, 1.25, 4.0] {
            let dashed = dash_path(&path, offset, &pattern);
            // One path per dash.
            let mut dashes: Vec<BezPath> = vec![];
            for el in dashed.iter() {
                if let PathEl::MoveTo(_) = el {
                    dashes.push(BezPath::new());
                }
                if let Some(dash) = dashes.last_mut() {
                    dash.push(el);
                }
            }
            let lengths: Vec<f64> = dashes.iter().map(|dash| dash.arclen(1e-12)).collect();
            let (expected, off) = expected_dashes(total, offset, &pattern);
            assert_eq!(lengths.len(), expected.len(), "offset {offset}");
            for (len, want) in lengths.iter().zip(&expected) {
                assert!((len - want).abs() < 1e-9, "offset {offset}: {len} != {want}");
            }
            let on: f64 = lengths.iter().sum();
            assert!((on + off - total).abs() < 1e-9, "offset {offset}: {}", on + off);
            // Element kinds are kept.
            assert!(dashed.iter().any(|el| matches!(el, PathEl::CurveTo(..))));
            assert!(dashed.iter().any(|el| matches!(el, PathEl::QuadTo(..))));
        }
    }

    #[test]
    fn close_is_walked_as_line() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((4.0, 0.0));
        path.line_to((4.0, 4.0));
        path.close_path();
        let dashed = dash_path(&path, 0.0, &[1.0, 1.0]);
        assert!(dashed.iter().all(|el| el != PathEl::ClosePath));
        // 8 + sqrt(32) long: seven full dashes, ending in a gap.
        let on_len = dashed.arclen(1e-12);
        assert!((on_len - 7.0).abs() < 1e-9, "{on_len}");
    }

    #[test]
    fn non_finite_segment_is_skipped() {
        let mut path = line(4.0);
        path.line_to((f64::INFINITY, 0.0));
        path.line_to((4.0, 0.0));
        let dashed = dash_path(&path, 0.0, &[1.0, 1.0]);
        assert!(dashed.is_finite());
    }
}
