// Copyright 2026 the Kerf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stroke expansion: turning a stroked path into a fillable outline.

use core::{borrow::Borrow, f64::consts::PI};

use smallvec::SmallVec;

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

use crate::common::solve_quadratic;
use crate::dash::{DashIterator, DashPhase};
use crate::{offset_cubic, Affine, Arc, BezPath, CubicBez, PathEl, Point, QuadBez, Vec2};

/// Defines the connection between two segments of a stroke.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Join {
    /// A straight line connecting the segments.
    Bevel,
    /// The segments are extended to their natural intersection point.
    Miter,
    /// An arc between the segments.
    Round,
}

/// Defines the shape to be drawn at the ends of a stroke.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cap {
    /// Flat cap.
    Butt,
    /// Square cap with dimensions equal to half the stroke width.
    Square,
    /// Rounded cap with radius equal to half the stroke width.
    Round,
}

/// Describes the visual style of a stroke.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stroke {
    /// Width of the stroke.
    pub width: f64,
    /// Style for connecting segments of the stroke.
    pub join: Join,
    /// Limit for miter joins, as a ratio of miter length to stroke width.
    pub miter_limit: f64,
    /// Style for capping the beginning of an open subpath.
    pub start_cap: Cap,
    /// Style for capping the end of an open subpath.
    pub end_cap: Cap,
    /// Lengths of dashes in alternating on/off order.
    pub dash_pattern: Dashes,
    /// Offset of the first dash.
    pub dash_offset: f64,
}

impl Default for Stroke {
    fn default() -> Self {
        Self {
            width: 1.0,
            join: Join::Round,
            miter_limit: 4.0,
            start_cap: Cap::Round,
            end_cap: Cap::Round,
            dash_pattern: Dashes::default(),
            dash_offset: 0.0,
        }
    }
}

impl Stroke {
    /// Creates a new stroke with the specified width.
    pub fn new(width: f64) -> Self {
        Self {
            width,
            ..Default::default()
        }
    }

    /// Builder method for setting the join style.
    #[must_use]
    pub fn with_join(mut self, join: Join) -> Self {
        self.join = join;
        self
    }

    /// Builder method for setting the limit for miter joins.
    #[must_use]
    pub fn with_miter_limit(mut self, limit: f64) -> Self {
        self.miter_limit = limit;
        self
    }

    /// Builder method for setting the cap style for the start of the stroke.
    #[must_use]
    pub fn with_start_cap(mut self, cap: Cap) -> Self {
        self.start_cap = cap;
        self
    }

    /// Builder method for setting the cap style for the end of the stroke.
    #[must_use]
    pub fn with_end_cap(mut self, cap: Cap) -> Self {
        self.end_cap = cap;
        self
    }

    /// Builder method for setting the cap style.
    #[must_use]
    pub fn with_caps(mut self, cap: Cap) -> Self {
        self.start_cap = cap;
        self.end_cap = cap;
        self
    }

    /// Builder method for setting the dashing parameters.
    #[must_use]
    pub fn with_dashes<P>(mut self, offset: f64, pattern: P) -> Self
    where
        P: IntoIterator,
        P::Item: Borrow<f64>,
    {
        self.dash_offset = offset;
        self.dash_pattern.clear();
        self.dash_pattern
            .extend(pattern.into_iter().map(|dash| *dash.borrow()));
        self
    }
}

/// Collection of values representing lengths in a dash pattern.
pub type Dashes = SmallVec<[f64; 4]>;

/// A closing gap shorter than this is treated as already closed.
const CLOSE_EPSILON: f64 = 1e-9;

/// Progress through the current subpath.
#[derive(Clone, Copy, Debug)]
enum Contour {
    /// No segment has been drawn since the last `MoveTo`.
    Empty,
    /// Segments have been drawn; the start is remembered for the caps and
    /// the closing join.
    Started { start_tan: Vec2, start_norm: Vec2 },
}

/// Internal structure used for creating strokes.
#[derive(Debug)]
struct StrokeCtx<'a> {
    style: &'a Stroke,
    tolerance: f64,
    output: BezPath,
    // Offsets to the right and left of the direction of travel.
    forward_path: BezPath,
    backward_path: BezPath,
    // Scratch space for single-segment offsets.
    result_path: BezPath,
    contour: Contour,
    start_pt: Point,
    last_pt: Point,
    last_tan: Vec2,
    // if |cross| < hypot * join_thresh (and dot > 0), omit the join
    join_thresh: f64,
}

/// Expand a stroke into a fill.
///
/// Every subpath becomes one closed outline, or two for a closed subpath
/// (outer and inner). The outlines are meant to be filled with the nonzero
/// winding rule. If the style has a usable dash pattern, the path is dashed
/// first and every dash gets caps.
pub fn stroke_path(
    path: impl IntoIterator<Item = PathEl>,
    style: &Stroke,
    tolerance: f64,
) -> BezPath {
    if style.dash_pattern.is_empty() {
        return stroke_undashed(path, style, tolerance);
    }
    match DashPhase::new(style.dash_offset, &style.dash_pattern) {
        Some(phase) => stroke_undashed(
            DashIterator::with_phase(path.into_iter(), phase),
            style,
            tolerance,
        ),
        None => stroke_undashed(path, style, tolerance),
    }
}

/// Version of stroke expansion for styles with no dashes.
fn stroke_undashed(
    path: impl IntoIterator<Item = PathEl>,
    style: &Stroke,
    tolerance: f64,
) -> BezPath {
    let mut ctx = StrokeCtx::new(style, tolerance);
    for el in path {
        ctx.process_element(el);
    }
    ctx.finish();
    ctx.output
}

/// Append a round cap: a half circle around `center` starting at
/// `center - norm`.
fn round_cap(out: &mut BezPath, tolerance: f64, center: Point, norm: Vec2) {
    round_join(out, tolerance, center, norm, PI);
}

/// Append an arc around `center` sweeping `angle`, ending at
/// `center - norm`.
pub(crate) fn round_join(out: &mut BezPath, tolerance: f64, center: Point, norm: Vec2, angle: f64) {
    let radius = norm.hypot();
    if !(radius >= 1e-12) {
        return;
    }
    let a = Affine::new([norm.x, norm.y, -norm.y, norm.x, center.x, center.y]);
    let arc = Arc::new(Point::ORIGIN, (1.0, 1.0), PI - angle, angle, 0.0);
    // The arc is drawn on the unit circle and scaled up by the radius.
    arc.to_cubic_beziers(tolerance / radius, |p1, p2, p3| {
        out.curve_to(a * p1, a * p2, a * p3);
    });
}

/// Like [`round_join`], mirrored, for the backward side.
pub(crate) fn round_join_rev(out: &mut BezPath, tolerance: f64, center: Point, norm: Vec2, angle: f64) {
    let radius = norm.hypot();
    if !(radius >= 1e-12) {
        return;
    }
    let a = Affine::new([norm.x, norm.y, norm.y, -norm.x, center.x, center.y]);
    let arc = Arc::new(Point::ORIGIN, (1.0, 1.0), PI - angle, angle, 0.0);
    arc.to_cubic_beziers(tolerance / radius, |p1, p2, p3| {
        out.curve_to(a * p1, a * p2, a * p3);
    });
}

fn square_cap(out: &mut BezPath, close: bool, center: Point, norm: Vec2) {
    let a = Affine::new([norm.x, norm.y, -norm.y, norm.x, center.x, center.y]);
    out.line_to(a * Point::new(1.0, 1.0));
    out.line_to(a * Point::new(-1.0, 1.0));
    if close {
        out.close_path();
    } else {
        out.line_to(a * Point::new(-1.0, 0.0));
    }
}

/// Append `elements` traversed backwards, skipping the initial `MoveTo`.
fn extend_reversed(out: &mut BezPath, elements: &[PathEl]) {
    for i in (1..elements.len()).rev() {
        let Some(end) = elements[i - 1].end_point() else {
            continue;
        };
        match elements[i] {
            PathEl::LineTo(_) => out.line_to(end),
            PathEl::QuadTo(p1, _) => out.quad_to(p1, end),
            PathEl::CurveTo(p1, p2, _) => out.curve_to(p2, p1, end),
            PathEl::MoveTo(_) | PathEl::ClosePath => {}
        }
    }
}

impl<'a> StrokeCtx<'a> {
    fn new(style: &'a Stroke, tolerance: f64) -> Self {
        StrokeCtx {
            style,
            tolerance,
            output: BezPath::new(),
            forward_path: BezPath::new(),
            backward_path: BezPath::new(),
            result_path: BezPath::new(),
            contour: Contour::Empty,
            start_pt: Point::ORIGIN,
            last_pt: Point::ORIGIN,
            last_tan: Vec2::ZERO,
            join_thresh: 2.0 * tolerance / style.width,
        }
    }

    fn process_element(&mut self, el: PathEl) {
        let p0 = self.last_pt;
        // Segments with non-finite coordinates are dropped; the pen stays put.
        if !matches!(el, PathEl::MoveTo(_)) && !(p0.is_finite() && el.is_finite()) {
            return;
        }
        match el {
            PathEl::MoveTo(p) => {
                self.finish();
                self.start_pt = p;
                self.last_pt = p;
            }
            PathEl::LineTo(p1) => {
                if p1 != p0 {
                    let tangent = p1 - p0;
                    self.do_join(tangent);
                    self.last_tan = tangent;
                    self.do_line(tangent, p1);
                }
            }
            PathEl::QuadTo(p1, p2) => {
                if p1 != p0 || p2 != p0 {
                    self.do_curve(QuadBez::new(p0, p1, p2).raise());
                }
            }
            PathEl::CurveTo(p1, p2, p3) => {
                if p1 != p0 || p2 != p0 || p3 != p0 {
                    self.do_curve(CubicBez::new(p0, p1, p2, p3));
                }
            }
            PathEl::ClosePath => {
                let tangent = self.start_pt - p0;
                if tangent.hypot() > CLOSE_EPSILON {
                    self.do_join(tangent);
                    self.last_tan = tangent;
                    self.do_line(tangent, self.start_pt);
                } else {
                    // Rounding left the end a hair off the start.
                    self.last_pt = self.start_pt;
                }
                self.finish_closed();
            }
        }
    }

    fn do_curve(&mut self, c: CubicBez) {
        let (tan0, tan1) = c.tangents();
        self.do_join(tan0);
        self.do_cubic(c);
        self.last_tan = tan1;
    }

    /// Append forward and backward paths to output, with caps.
    fn finish(&mut self) {
        let Contour::Started { start_norm, .. } = self.contour else {
            return;
        };
        self.contour = Contour::Empty;
        self.output.extend(&self.forward_path);
        let style = self.style;
        let tolerance = self.tolerance;
        if let Some(return_p) = self.backward_path.current_point() {
            let d = self.last_pt - return_p;
            match style.end_cap {
                Cap::Butt => self.output.line_to(return_p),
                Cap::Round => round_cap(&mut self.output, tolerance, self.last_pt, d),
                Cap::Square => square_cap(&mut self.output, false, self.last_pt, d),
            }
            extend_reversed(&mut self.output, self.backward_path.elements());
            match style.start_cap {
                Cap::Butt => self.output.close_path(),
                Cap::Round => round_cap(&mut self.output, tolerance, self.start_pt, start_norm),
                Cap::Square => square_cap(&mut self.output, true, self.start_pt, start_norm),
            }
        }
        self.forward_path.clear();
        self.backward_path.clear();
    }

    /// Finish a closed subpath, as two closed contours.
    fn finish_closed(&mut self) {
        let Contour::Started { start_tan, .. } = self.contour else {
            return;
        };
        self.do_join(start_tan);
        self.contour = Contour::Empty;
        self.output.extend(&self.forward_path);
        self.output.close_path();
        if let Some(last_pt) = self.backward_path.current_point() {
            self.output.move_to(last_pt);
            extend_reversed(&mut self.output, self.backward_path.elements());
            self.output.close_path();
        }
        self.forward_path.clear();
        self.backward_path.clear();
    }

    fn do_join(&mut self, tan0: Vec2) {
        self.do_join_with(self.style.join, tan0);
    }

    fn do_join_with(&mut self, join: Join, tan0: Vec2) {
        let scale = 0.5 * self.style.width / tan0.hypot();
        let norm = scale * tan0.turn_90();
        let p0 = self.last_pt;
        if let Contour::Empty = self.contour {
            self.forward_path.move_to(p0 - norm);
            self.backward_path.move_to(p0 + norm);
            self.contour = Contour::Started {
                start_tan: tan0,
                start_norm: norm,
            };
            return;
        }
        let ab = self.last_tan;
        let cd = tan0;
        let cross = ab.cross(cd);
        let dot = ab.dot(cd);
        let hypot = cross.hypot(dot);
        if dot > 0.0 && cross.abs() < hypot * self.join_thresh {
            return;
        }
        match join {
            Join::Bevel => {
                self.forward_path.line_to(p0 - norm);
                self.backward_path.line_to(p0 + norm);
            }
            Join::Miter => {
                let limit = self.style.miter_limit;
                if 2.0 * hypot < (hypot + dot) * limit * limit {
                    let last_scale = 0.5 * self.style.width / ab.hypot();
                    let last_norm = last_scale * ab.turn_90();
                    if cross > 0.0 {
                        let fp_last = p0 - last_norm;
                        let fp_this = p0 - norm;
                        let h = ab.cross(fp_this - fp_last) / cross;
                        let miter_pt = fp_this - cd * h;
                        self.forward_path.line_to(miter_pt);
                        self.backward_path.line_to(p0);
                    } else if cross < 0.0 {
                        let fp_last = p0 + last_norm;
                        let fp_this = p0 + norm;
                        let h = ab.cross(fp_this - fp_last) / cross;
                        let miter_pt = fp_this - cd * h;
                        self.backward_path.line_to(miter_pt);
                        self.forward_path.line_to(p0);
                    }
                }
                self.forward_path.line_to(p0 - norm);
                self.backward_path.line_to(p0 + norm);
            }
            Join::Round => {
                let angle = cross.atan2(dot);
                if angle > 0.0 {
                    self.backward_path.line_to(p0 + norm);
                    round_join(&mut self.forward_path, self.tolerance, p0, norm, angle);
                } else {
                    self.forward_path.line_to(p0 - norm);
                    round_join_rev(&mut self.backward_path, self.tolerance, p0, -norm, -angle);
                }
            }
        }
    }

    fn do_line(&mut self, tangent: Vec2, p1: Point) {
        let scale = 0.5 * self.style.width / tangent.hypot();
        let norm = scale * tangent.turn_90();
        self.forward_path.line_to(p1 - norm);
        self.backward_path.line_to(p1 + norm);
        self.last_pt = p1;
    }

    fn do_cubic(&mut self, c: CubicBez) {
        // First, detect degenerate linear case.
        //
        // Ordinarily, this is the direction of the chord, but if the chord is
        // very short, we take the longer control arm.
        let chord = c.p3 - c.p0;
        let mut chord_ref = chord;
        let mut chord_ref_hypot2 = chord_ref.hypot2();
        let d01 = c.p1 - c.p0;
        if d01.hypot2() > chord_ref_hypot2 {
            chord_ref = d01;
            chord_ref_hypot2 = chord_ref.hypot2();
        }
        let d23 = c.p3 - c.p2;
        if d23.hypot2() > chord_ref_hypot2 {
            chord_ref = d23;
            chord_ref_hypot2 = chord_ref.hypot2();
        }
        // Project Bézier onto chord.
        let p0 = c.p0.to_vec2().dot(chord_ref);
        let p1 = c.p1.to_vec2().dot(chord_ref);
        let p2 = c.p2.to_vec2().dot(chord_ref);
        let p3 = c.p3.to_vec2().dot(chord_ref);
        const ENDPOINT_D: f64 = 0.01;
        if p3 <= p0
            || p1 > p2
            || p1 < p0 + ENDPOINT_D * (p3 - p0)
            || p2 > p3 - ENDPOINT_D * (p3 - p0)
        {
            // Potentially a cusp inside.
            let x01 = d01.cross(chord_ref);
            let x23 = d23.cross(chord_ref);
            let x03 = chord.cross(chord_ref);
            let thresh = self.tolerance.powi(2) * chord_ref_hypot2;
            if x01 * x01 < thresh && x23 * x23 < thresh && x03 * x03 < thresh {
                // It's within tolerance of a line, draw it as straight runs.
                let midpoint = c.p0.midpoint(c.p3);
                // Scale so dot product is in units of the chord.
                let ref_vec = chord_ref / chord_ref_hypot2;
                let ref_pt = midpoint - 0.5 * (p0 + p3) * ref_vec;
                self.do_linear(c, [p0, p1, p2, p3], ref_pt, ref_vec);
                return;
            }
        }

        let half_width = 0.5 * self.style.width;
        offset_cubic(c, -half_width, self.tolerance, &mut self.result_path);
        self.forward_path
            .extend(self.result_path.iter().skip(1));
        offset_cubic(c, half_width, self.tolerance, &mut self.result_path);
        self.backward_path
            .extend(self.result_path.iter().skip(1));
        self.last_pt = c.p3;
    }

    /// Do a cubic which is actually linear.
    ///
    /// The `p` argument is the control points projected to the reference
    /// vector. The ref arguments map the projection back to 2D. The cubic
    /// is drawn as lines split where the motion along the chord reverses,
    /// with round joins between them.
    fn do_linear(&mut self, c: CubicBez, p: [f64; 4], ref_pt: Point, ref_vec: Vec2) {
        let (tan0, tan1) = c.tangents();
        self.last_tan = tan0;
        let c0 = p[1] - p[0];
        let c1 = 2.0 * p[2] - 4.0 * p[1] + 2.0 * p[0];
        let c2 = p[3] - 3.0 * p[2] + 3.0 * p[1] - p[0];
        const EPSILON: f64 = 1e-6;
        for t in solve_quadratic(c0, c1, c2) {
            if t > EPSILON && t < 1.0 - EPSILON {
                let mt = 1.0 - t;
                let z = mt * (mt * mt * p[0] + 3.0 * t * (mt * p[1] + t * p[2])) + t * t * t * p[3];
                let pt = ref_pt + z * ref_vec;
                self.do_linear_step(pt);
            }
        }
        self.do_linear_step(c.p3);
        self.last_pt = c.p3;
        self.do_join_with(Join::Round, tan1);
    }

    fn do_linear_step(&mut self, pt: Point) {
        let tan = pt - self.last_pt;
        if tan.hypot2() > 0.0 {
            self.do_join_with(Join::Round, tan);
            self.do_line(tan, pt);
            self.last_tan = tan;
        }
    }
}

#[cfg(test)]
mod tests {
    use core::f64::consts::PI;

    use rand::{rngs::StdRng, Rng, SeedableRng};

    use crate::{
        remove_self_intersections, stroke_path, Arc, BezPath, Cap, CubicBez, Join, ParamCurve,
        ParamCurveDeriv, PathEl, Point, Stroke,
    };

    fn points(path: &BezPath) -> Vec<Point> {
        path.iter().filter_map(|el| el.end_point()).collect()
    }

    fn assert_contains(pts: &[Point], p: Point) {
        assert!(
            pts.iter().any(|q| (*q - p).hypot() < 1e-9),
            "{p:?} not in {pts:?}"
        );
    }

    #[test]
    fn butt_line_is_rectangle() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        let style = Stroke::new(2.0).with_join(Join::Bevel).with_caps(Cap::Butt);
        let outline = stroke_path(&path, &style, 0.1);
        let pts = points(&outline);
        assert_eq!(pts.len(), 4);
        for corner in [(0., -1.), (0., 1.), (10., 1.), (10., -1.)] {
            assert_contains(&pts, corner.into());
        }
        assert_eq!(outline.elements().last(), Some(&PathEl::ClosePath));
        assert!((outline.area().abs() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn square_caps_extend_by_half_width() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        let style = Stroke::new(2.0).with_caps(Cap::Square);
        let outline = stroke_path(&path, &style, 0.1);
        let pts = points(&outline);
        assert_contains(&pts, Point::new(11.0, 1.0));
        assert_contains(&pts, Point::new(-1.0, -1.0));
        assert!((outline.area().abs() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn round_caps_area() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        let outline = stroke_path(&path, &Stroke::new(2.0), 1e-4);
        let expected = 20.0 + core::f64::consts::PI;
        assert!((outline.area().abs() - expected).abs() < 1e-3);
    }

    #[test]
    fn miter_join_and_limit() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        path.line_to((10.0, 10.0));
        let style = Stroke::new(2.0).with_join(Join::Miter).with_caps(Cap::Butt);
        let pts = points(&stroke_path(&path, &style, 0.1));
        // Outer corner on the right-hand side of travel.
        assert_contains(&pts, Point::new(11.0, -1.0));
        // A right angle needs a limit of at least sqrt(2).
        let style = style.with_miter_limit(1.2);
        let pts = points(&stroke_path(&path, &style, 0.1));
        assert!(pts.iter().all(|p| (*p - Point::new(11.0, -1.0)).hypot() > 1e-6));
    }

    #[test]
    fn closed_path_gives_two_contours() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        path.line_to((10.0, 10.0));
        path.line_to((0.0, 10.0));
        path.close_path();
        let style = Stroke::new(2.0).with_join(Join::Miter);
        let outline = stroke_path(&path, &style, 0.1);
        let n_close = outline
            .iter()
            .filter(|el| *el == PathEl::ClosePath)
            .count();
        assert_eq!(n_close, 2);
        // The outer contour is the mitered 12x12 square.
        let outer: BezPath = outline
            .iter()
            .take_while(|el| *el != PathEl::ClosePath)
            .collect();
        assert!((outer.area() - 144.0).abs() < 1e-9);
    }

    #[test]
    fn near_closed_contour_has_no_closing_join() {
        let outer = |path: &BezPath, style: &Stroke, tolerance: f64| -> BezPath {
            stroke_path(path, style, tolerance)
                .iter()
                .take_while(|el| *el != PathEl::ClosePath)
                .collect()
        };
        // The arc ends within rounding error of its start.
        let arc = Arc::new((0.0, 0.0), (50.0, 50.0), 0.0, 2.0 * PI, 0.0);
        let mut circle = BezPath::new();
        circle.move_to(arc.start_point());
        circle.extend(arc.append_iter(1e-9));
        circle.close_path();
        let area = outer(&circle, &Stroke::new(10.0), 1e-3).area().abs();
        assert!((area - PI * 55.0 * 55.0).abs() < 1.0, "{area}");

        let mut square = BezPath::new();
        square.move_to((0.0, 0.0));
        square.line_to((10.0, 0.0));
        square.line_to((10.0, 10.0));
        square.line_to((0.0, 10.0));
        square.line_to((1e-12, 0.0));
        square.close_path();
        let style = Stroke::new(2.0).with_join(Join::Miter);
        let area = outer(&square, &style, 0.1).area();
        assert!((area - 144.0).abs() < 1e-6, "{area}");
    }

    #[test]
    fn collinear_segments_have_no_join() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((5.0, 0.0));
        path.line_to((10.0, 0.0));
        let style = Stroke::new(2.0).with_join(Join::Round).with_caps(Cap::Butt);
        let outline = stroke_path(&path, &style, 0.1);
        assert!(outline.iter().all(|el| !matches!(el, PathEl::CurveTo(..))));
    }

    #[test]
    fn dashed_stroke_caps_every_dash() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        let style = Stroke::new(1.0)
            .with_caps(Cap::Butt)
            .with_dashes(0.0, [2.0, 2.0]);
        let outline = stroke_path(&path, &style, 0.1);
        let n_contours = outline
            .iter()
            .filter(|el| matches!(el, PathEl::MoveTo(_)))
            .count();
        assert_eq!(n_contours, 3);
        assert!((outline.area().abs() - 6.0).abs() < 1e-9);
        // An unusable pattern strokes the whole path.
        let style = style.with_dashes(0.0, [0.0]);
        let outline = stroke_path(&path, &style, 0.1);
        assert!((outline.area().abs() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn curve_outline_stays_at_half_width() {
        let c = CubicBez::new((0., 0.), (30., 60.), (70., 60.), (100., 0.));
        let mut path = BezPath::new();
        path.move_to(c.p0);
        path.curve_to(c.p1, c.p2, c.p3);
        let style = Stroke::new(8.0).with_caps(Cap::Butt);
        let outline = stroke_path(&path, &style, 0.01);
        for seg in outline.segments() {
            let p = seg.eval(0.5);
            let dist = (0..=2000)
                .map(|i| (c.eval(i as f64 / 2000.0) - p).hypot())
                .fold(f64::INFINITY, f64::min);
            // Points on the butt caps lie between the two sides.
            assert!(dist < 4.0 + 0.1, "{dist}");
        }
    }

    #[test]
    fn near_linear_cubic_is_drawn_straight() {
        // Goes forward, back, and forward again along the x axis.
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.curve_to((20.0, 0.0), (-10.0, 0.0), (10.0, 0.0));
        let style = Stroke::new(2.0).with_caps(Cap::Butt);
        let outline = stroke_path(&path, &style, 0.1);
        assert!(outline.is_finite());
        for p in points(&outline) {
            assert!(p.y.abs() <= 1.0 + 1e-9, "{p:?}");
        }
    }

    #[test]
    fn cusp_cubic_is_regularized_and_stroked() {
        let c = CubicBez::new((0., 0.), (100., 100.), (0., 100.), (100., 0.));
        let min_speed = |c: CubicBez| {
            (0..=10_000)
                .map(|i| c.deriv().eval(i as f64 / 10_000.0).to_vec2().hypot())
                .fold(f64::INFINITY, f64::min)
        };
        // The derivative vanishes in the middle.
        assert!(c.deriv().eval(0.5).to_vec2().hypot() < 1e-12);
        assert!(min_speed(c.regularize(0.01)) > 1e-3);

        let mut path = BezPath::new();
        path.move_to(c.p0);
        path.curve_to(c.p1, c.p2, c.p3);
        let outline = stroke_path(&path, &Stroke::new(10.0), 0.1);
        assert!(outline.is_finite());
        let n_moves = |p: &BezPath| {
            p.iter()
                .filter(|el| matches!(el, PathEl::MoveTo(_)))
                .count()
        };
        assert_eq!(n_moves(&outline), 1);
        assert_eq!(outline.elements().last(), Some(&PathEl::ClosePath));
        for p in points(&outline) {
            let dist = (0..=4000)
                .map(|i| (c.eval(i as f64 / 4000.0) - p).hypot())
                .fold(f64::INFINITY, f64::min);
            assert!(dist < 5.0 + 0.1, "{p:?} is {dist} from the curve");
        }
        // The inside of the cusp folds over itself; removal cuts the fold
        // and keeps a single closed contour.
        let cleaned = remove_self_intersections(&outline, 0.1);
        assert!(cleaned.len() < outline.len(), "{} elements", cleaned.len());
        assert_eq!(n_moves(&cleaned), 1);
        assert_eq!(cleaned.elements().last(), Some(&PathEl::ClosePath));
        assert!(cleaned.is_finite());
    }

    #[test]
    fn random_cubics_give_finite_outlines() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let mut pt = || Point::new(rng.random_range(-100.0..100.0), rng.random_range(-100.0..100.0));
            let mut path = BezPath::new();
            path.move_to(pt());
            path.curve_to(pt(), pt(), pt());
            path.quad_to(pt(), pt());
            let width = rng.random_range(0.5..40.0);
            let style = Stroke::new(width).with_join(Join::Miter);
            let outline = stroke_path(&path, &style, 0.1);
            assert!(outline.is_finite());
            assert!(matches!(outline.elements()[0], PathEl::MoveTo(_)));
        }
    }

    #[test]
    fn degenerate_input_does_not_panic() {
        let mut path = BezPath::new();
        path.move_to((1.0, 1.0));
        path.line_to((1.0, 1.0));
        path.close_path();
        path.line_to((f64::NAN, 2.0));
        path.curve_to((f64::INFINITY, 0.0), (1.0, 1.0), (2.0, 2.0));
        path.line_to((5.0, 1.0));
        let style = Stroke::new(1.0).with_caps(Cap::Butt);
        let outline = stroke_path(&path, &style, 0.1);
        assert!(outline.is_finite(), "{outline:?}");
        // Only the last line survives, from the pen left at (1, 1).
        assert_eq!(points(&outline).len(), 4);
        for p in points(&outline) {
            assert!((1.0..=5.0).contains(&p.x) && (p.y - 1.0).abs() == 0.5, "{p:?}");
        }
        let mut lost = BezPath::new();
        lost.move_to((f64::NAN, 0.0));
        lost.line_to((1.0, 1.0));
        lost.close_path();
        assert!(stroke_path(&lost, &Stroke::new(1.0), 0.1).is_empty());
        let empty = stroke_path(&BezPath::new(), &Stroke::new(1.0), 0.1);
        assert!(empty.is_empty());
    }
}
