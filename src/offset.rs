// Copyright 2026 the Kerf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offset curves of cubic Béziers.
//!
//! The offset (parallel curve) of a cubic at distance `d` is approximated by
//! a sequence of cubics, each fitted to a range of the source parameter. A
//! candidate is seeded from the circular arc through the end tangents,
//! refined by least squares against samples of the exact offset, and the
//! range is subdivided when the error still exceeds the tolerance.
//!
//! Cusps of the offset, where the curvature radius of the source equals
//! `d`, are located first and always become subdivision points, so each
//! fitted piece is smooth.

use arrayvec::ArrayVec;
use tracing::trace;

#[cfg(not(feature = "std"))]
use crate::common::FloatFuncs;

use crate::common::{solve_itp, solve_quadratic};
use crate::{BezPath, CubicBez, ParamCurve, ParamCurveDeriv, QuadBez, Vec2};

/// Cusp values never get an absolute value smaller than this. When a cusp
/// is found, its neighbors take this magnitude with the appropriate sign.
const CUSP_EPSILON: f64 = 1e-12;

/// Number of points for the least-squares fit.
const N_LSE: usize = 8;

/// The proportion of transverse error blended into the least-squares fit.
const BLEND: f64 = 1e-3;

/// Maximum recursion depth.
const MAX_DEPTH: usize = 8;

/// Number of least-squares refinement rounds.
const N_REFINE: usize = 2;

/// Accuracy of the cusp parameter search.
const ITP_EPS: f64 = 1e-12;

/// Lower bound on the derivative length at an endpoint.
const TAN_DIST_EPSILON: f64 = 1e-12;

/// Minimum squared length of a tangent that can be normalized.
const UTAN_EPSILON: f64 = 1e-12;

/// Balance of the tangent crosses required for angle bisection.
const SUBDIVIDE_THRESH: f64 = 0.1;

/// Regularization dimension, as a fraction of the tolerance.
const DIM_TUNE: f64 = 0.25;

/// Smallest Newton denominator that is still divided by.
const NEWTON_EPSILON: f64 = 1e-12;

/// Smallest least-squares determinant that is still inverted.
const LSE_DET_EPSILON: f64 = 1e-12;

/// The offset curve of a cubic Bézier, prepared for fitting.
///
/// Most callers want [`offset_cubic`], which regularizes the source curve
/// and drives the fit.
#[derive(Clone, Debug)]
pub struct CubicOffset {
    /// Source curve.
    c: CubicBez,
    /// Derivative of source curve.
    q: QuadBez,
    /// Offset distance.
    d: f64,
    // c0 + c1 t + c2 t^2 is the cross product of second and first
    // derivatives of the source, multiplied by the offset (for computing
    // cusps).
    c0: f64,
    c1: f64,
    c2: f64,
    tolerance: f64,
}

/// State of one range of the recursive fit.
#[derive(Clone, Copy, Debug)]
struct OffsetRec {
    t0: f64,
    t1: f64,
    // unit tangent at t0
    utan0: Vec2,
    // unit tangent at t1
    utan1: Vec2,
    cusp0: f64,
    cusp1: f64,
    depth: usize,
}

/// Result of error evaluation.
struct ErrEval {
    /// Maximum squared distance error.
    err_squared: f64,
    /// Unit normals sampled uniformly across the approximation.
    unorms: [Vec2; N_LSE],
    /// Difference between the approximation and the exact offset.
    err_vecs: [Vec2; N_LSE],
}

struct SubdivisionPoint {
    /// Source parameter of the subdivision point.
    t: f64,
    /// Unit tangent there.
    utan: Vec2,
}

/// Compute an approximate offset curve of a cubic.
///
/// The result is cleared, then receives a `MoveTo` at the offset start
/// point followed by `CurveTo` elements whose distance from the exact
/// offset is at most `tolerance` (except where the recursion limit is
/// reached). A positive `d` offsets to the left of the direction of
/// travel in a Y-up coordinate system.
///
/// Non-finite input does not panic; the affected ranges are drawn as
/// straight lines.
pub fn offset_cubic(c: CubicBez, d: f64, tolerance: f64, result: &mut BezPath) {
    result.clear();
    let co = CubicOffset::new_regularized(c, d, tolerance);
    // Tangents of the input curve, so the ends meet joins and caps exactly.
    let (utan0, utan1) = c.unit_tangents();
    let cusp0 = co.endpoint_cusp(co.q.p0.to_vec2(), co.c0);
    let cusp1 = co.endpoint_cusp(co.q.p2.to_vec2(), co.c0 + co.c1 + co.c2);
    result.move_to(c.p0 + d * utan0.turn_90());
    let rec = OffsetRec {
        t0: 0.0,
        t1: 1.0,
        utan0,
        utan1,
        cusp0,
        cusp1,
        depth: 0,
    };
    co.offset_rec(&rec, result);
}

impl CubicOffset {
    /// Prepare the offset of `c` at distance `d`.
    ///
    /// The curve is used as is; see [`CubicOffset::new_regularized`] for
    /// curves that may contain cusps.
    pub fn new(c: CubicBez, d: f64, tolerance: f64) -> Self {
        let q = c.deriv();
        let d2 = 2.0 * d;
        let p1xp0 = q.p1.to_vec2().cross(q.p0.to_vec2());
        let p2xp0 = q.p2.to_vec2().cross(q.p0.to_vec2());
        let p2xp1 = q.p2.to_vec2().cross(q.p1.to_vec2());
        CubicOffset {
            c,
            q,
            d,
            c0: d2 * p1xp0,
            c1: d2 * (p2xp0 - 2.0 * p1xp0),
            c2: d2 * (p2xp1 - p2xp0 + p1xp0),
            tolerance,
        }
    }

    /// Prepare the offset after removing cusps sharper than a fraction of
    /// the tolerance.
    pub fn new_regularized(c: CubicBez, d: f64, tolerance: f64) -> Self {
        Self::new(c.regularize(tolerance * DIM_TUNE), d, tolerance)
    }

    /// A function of the source parameter which crosses zero at cusps of
    /// the offset, and is positive where the source curvature is low.
    pub fn cusp_sign(&self, t: f64) -> f64 {
        let ds2 = self.q.eval(t).to_vec2().hypot2();
        ((self.c2 * t + self.c1) * t + self.c0) / (ds2 * ds2.sqrt()) + 1.0
    }

    /// Cusp value at an endpoint.
    ///
    /// `y` is the cusp polynomial evaluated there: `c0` at the start and
    /// `c0 + c1 + c2` at the end.
    fn endpoint_cusp(&self, tan: Vec2, y: f64) -> f64 {
        let tan_dist = tan.hypot().max(TAN_DIST_EPSILON);
        let rsqrt = 1.0 / tan_dist;
        y * (rsqrt * rsqrt * rsqrt) + 1.0
    }

    fn offset_rec(&self, rec: &OffsetRec, result: &mut BezPath) {
        if !(rec.t0.is_finite() && rec.t1.is_finite())
            || !(rec.cusp0.is_finite() && rec.cusp1.is_finite())
        {
            self.linear_fallback(rec, result);
            return;
        }
        if rec.cusp0 * rec.cusp1 < 0.0 {
            if rec.depth >= MAX_DEPTH {
                self.linear_fallback(rec, result);
                return;
            }
            let a = rec.t0;
            let b = rec.t1;
            let s = rec.cusp1.signum();
            let f = |t| s * self.cusp_sign(t);
            let k1 = 0.2 / (b - a);
            let t = solve_itp(f, a, b, ITP_EPS, 1, k1, s * rec.cusp0, s * rec.cusp1);
            // With three cusps in the range the search may land on the middle
            // one, whose neighborhood has the opposite signs.
            let utan_t = self.q.eval(t).to_vec2().normalize_or(rec.utan0);
            let cusp_t_minus = CUSP_EPSILON.copysign(rec.cusp0);
            let cusp_t_plus = CUSP_EPSILON.copysign(rec.cusp1);
            self.subdivide(rec, result, t, utan_t, cusp_t_minus, cusp_t_plus);
            return;
        }
        let (mut a, mut b) = self.draw_arc(rec);
        let dt = (rec.t1 - rec.t0) * (1.0 / (N_LSE + 1) as f64);
        // Source parameters matched to the uniform samples of the fit.
        let mut ts = core::array::from_fn(|i| rec.t0 + (i + 1) as f64 * dt);
        let mut c_approx = self.apply(rec, a, b);
        let mut err = self.eval_err(rec, c_approx, &mut ts);
        let tol2 = self.tolerance * self.tolerance;
        for _ in 0..N_REFINE {
            if err.err_squared <= tol2 {
                break;
            }
            let (a2, b2) = self.refine_least_squares(rec, a, b, &err);
            let c_approx2 = self.apply(rec, a2, b2);
            let err2 = self.eval_err(rec, c_approx2, &mut ts);
            if err2.err_squared >= err.err_squared {
                break;
            }
            err = err2;
            (a, b) = (a2, b2);
            c_approx = c_approx2;
        }
        if rec.depth < MAX_DEPTH && err.err_squared > tol2 {
            let SubdivisionPoint { t, utan } = self.find_subdivision_point(rec);
            let cusp = self.cusp_sign(t);
            self.subdivide(rec, result, t, utan, cusp, cusp);
        } else if c_approx.is_finite() {
            result.curve_to(c_approx.p1, c_approx.p2, c_approx.p3);
        } else {
            self.linear_fallback(rec, result);
        }
    }

    /// Draw the range as a straight line between its offset endpoints.
    fn linear_fallback(&self, rec: &OffsetRec, result: &mut BezPath) {
        let t0 = if rec.t0.is_finite() { rec.t0 } else { 0.0 };
        let t1 = if rec.t1.is_finite() { rec.t1 } else { 1.0 };
        trace!(depth = rec.depth, t0, t1, "offset falls back to a line");
        let p0 = self.c.eval(t0) + self.d * rec.utan0.turn_90();
        let p3 = self.c.eval(t1) + self.d * rec.utan1.turn_90();
        let line = CubicBez::linear(p0, p3);
        result.curve_to(line.p1, line.p2, line.p3);
    }

    fn subdivide(
        &self,
        rec: &OffsetRec,
        result: &mut BezPath,
        t: f64,
        utan_t: Vec2,
        cusp_t_minus: f64,
        cusp_t_plus: f64,
    ) {
        let rec0 = OffsetRec {
            t1: t,
            utan1: utan_t,
            cusp1: cusp_t_minus,
            depth: rec.depth + 1,
            ..*rec
        };
        self.offset_rec(&rec0, result);
        let rec1 = OffsetRec {
            t0: t,
            utan0: utan_t,
            cusp0: cusp_t_plus,
            depth: rec.depth + 1,
            ..*rec
        };
        self.offset_rec(&rec1, result);
    }

    /// Build the candidate cubic from the two tangent-length parameters.
    fn apply(&self, rec: &OffsetRec, a: f64, b: f64) -> CubicBez {
        // Scale factor from derivatives to displacements.
        let s = (1. / 3.) * (rec.t1 - rec.t0);
        let p0 = self.c.eval(rec.t0) + self.d * rec.utan0.turn_90();
        let l0 = s * self.q.eval(rec.t0).to_vec2().hypot() + a * self.d;
        let mut p1 = p0;
        if l0 * rec.cusp0 > 0.0 {
            p1 += l0 * rec.utan0;
        }
        let p3 = self.c.eval(rec.t1) + self.d * rec.utan1.turn_90();
        let mut p2 = p3;
        let l1 = s * self.q.eval(rec.t1).to_vec2().hypot() - b * self.d;
        if l1 * rec.cusp1 > 0.0 {
            p2 -= l1 * rec.utan1;
        }
        CubicBez::new(p0, p1, p2, p3)
    }

    /// Tangent-length parameters of a circular arc between the end tangents.
    fn draw_arc(&self, rec: &OffsetRec) -> (f64, f64) {
        let th = rec.utan1.cross(rec.utan0).atan2(rec.utan1.dot(rec.utan0));
        let a = (2. / 3.) / (1.0 + (0.5 * th).cos()) * 2.0 * (0.5 * th).sin();
        (a, -a)
    }

    /// Evaluate the error of `c_approx`, refining the matched source
    /// parameters with one Newton step each.
    fn eval_err(&self, rec: &OffsetRec, c_approx: CubicBez, ts: &mut [f64; N_LSE]) -> ErrEval {
        let qa = c_approx.deriv();
        let mut err_squared = 0.0;
        let mut unorms = [Vec2::ZERO; N_LSE];
        let mut err_vecs = [Vec2::ZERO; N_LSE];
        let sign = if rec.cusp0 >= 0.0 { 1.0 } else { -1.0 };
        for i in 0..N_LSE {
            let ta = (i + 1) as f64 * (1.0 / (N_LSE + 1) as f64);
            let mut t = ts[i];
            let p = self.c.eval(t);
            let pa = c_approx.eval(ta);
            let tana = qa.eval(ta).to_vec2();
            let denom = tana.dot(self.q.eval(t).to_vec2());
            if denom.abs() > NEWTON_EPSILON {
                t += tana.dot(pa - p) / denom;
            }
            t = t.max(rec.t0).min(rec.t1);
            ts[i] = t;
            let unorm = sign * tana.normalize_or(rec.utan0).turn_90();
            unorms[i] = unorm;
            let p_new = self.c.eval(t) + self.d * unorm;
            let err_vec = pa - p_new;
            err_vecs[i] = err_vec;
            let mut dist_err_squared = err_vec.length_squared();
            if !dist_err_squared.is_finite() {
                // Large enough that the refinement is rejected.
                dist_err_squared = 1e12;
            }
            err_squared = dist_err_squared.max(err_squared);
        }
        ErrEval {
            err_squared,
            unorms,
            err_vecs,
        }
    }

    /// One Gauss-Newton step on the tangent-length parameters.
    fn refine_least_squares(&self, rec: &OffsetRec, a: f64, b: f64, err: &ErrEval) -> (f64, f64) {
        let mut aa = 0.0;
        let mut ab = 0.0;
        let mut ac = 0.0;
        let mut bb = 0.0;
        let mut bc = 0.0;
        for i in 0..N_LSE {
            let n = err.unorms[i];
            let err_vec = err.err_vecs[i];
            let c_n = err_vec.dot(n);
            let c_t = err_vec.cross(n);
            let a_n = A_WEIGHTS[i] * rec.utan0.dot(n);
            let a_t = A_WEIGHTS[i] * rec.utan0.cross(n);
            let b_n = B_WEIGHTS[i] * rec.utan1.dot(n);
            let b_t = B_WEIGHTS[i] * rec.utan1.cross(n);
            aa += a_n * a_n + BLEND * a_t * a_t;
            ab += a_n * b_n + BLEND * a_t * b_t;
            ac += a_n * c_n + BLEND * a_t * c_t;
            bb += b_n * b_n + BLEND * b_t * b_t;
            bc += b_n * c_n + BLEND * b_t * c_t;
        }
        let det = aa * bb - ab * ab;
        if det.abs() < LSE_DET_EPSILON {
            return (a, b);
        }
        let idet = 1.0 / (self.d * det);
        let delta_a = idet * (ac * bb - ab * bc);
        let delta_b = idet * (aa * bc - ac * ab);
        (a - delta_a, b - delta_b)
    }

    /// Decide where to subdivide when the error is exceeded.
    ///
    /// For ranges without an inflection, subdivide at the tangent bisecting
    /// the endpoint tangents, so that near a cusp of the source the pieces
    /// approach circular arcs of shrinking angle.
    ///
    /// When the curve crosses its chord, bisecting the angle can give very
    /// lopsided pieces. Then the tangent matching the sum of the end
    /// tangents is tried, and failing that, the point halving the total
    /// absolute turning angle through the inflections.
    fn find_subdivision_point(&self, rec: &OffsetRec) -> SubdivisionPoint {
        let t = 0.5 * (rec.t0 + rec.t1);
        let q_t = self.q.eval(t).to_vec2();
        let x0 = rec.utan0.cross(q_t).abs();
        let x1 = rec.utan1.cross(q_t).abs();
        if x0 > SUBDIVIDE_THRESH * x1 && x1 > SUBDIVIDE_THRESH * x0 {
            let utan = q_t.normalize_or(rec.utan0);
            return SubdivisionPoint { t, utan };
        }

        let chord = self.c.eval(rec.t1) - self.c.eval(rec.t0);
        if chord.cross(rec.utan0) * chord.cross(rec.utan1) < 0.0 {
            let tan = rec.utan0 + rec.utan1;
            if let Some(subdivision) =
                self.subdivide_for_tangent(rec.utan0, rec.t0, rec.t1, tan, false)
            {
                return subdivision;
            }
        }

        // Tangents at the range endpoints and the inflections between.
        let mut tangents: ArrayVec<Vec2, 4> = ArrayVec::new();
        let mut ts: ArrayVec<f64, 4> = ArrayVec::new();
        tangents.push(rec.utan0);
        ts.push(rec.t0);
        for t in self.c.inflections() {
            if t > rec.t0 && t < rec.t1 {
                tangents.push(self.q.eval(t).to_vec2());
                ts.push(t);
            }
        }
        tangents.push(rec.utan1);
        ts.push(rec.t1);
        let arc_angles: ArrayVec<f64, 3> = tangents
            .windows(2)
            .map(|w| w[0].cross(w[1]).atan2(w[0].dot(w[1])))
            .collect();
        let mut target = arc_angles.iter().map(|th| th.abs()).sum::<f64>() * 0.5;
        let mut i = 0;
        while i + 1 < arc_angles.len() && arc_angles[i].abs() < target {
            target -= arc_angles[i].abs();
            i += 1;
        }
        let rotation = Vec2::from_angle(target.copysign(arc_angles[i]));
        let base = tangents[i];
        let tan = base.rotate_scale(rotation);
        let utan0 = if i == 0 {
            rec.utan0
        } else {
            base.normalize_or(rec.utan0)
        };
        self.subdivide_for_tangent(utan0, ts[i], ts[i + 1], tan, true)
            .unwrap_or(SubdivisionPoint {
                t,
                utan: q_t.normalize_or(rec.utan0),
            })
    }

    /// Find the parameter in `t0..t1` where the source tangent is parallel
    /// to `tan`.
    ///
    /// Without `force`, `None` is returned unless there is exactly one
    /// solution. With it, the endpoint with the smaller derivative is used
    /// instead, as that is where a cusp would be.
    fn subdivide_for_tangent(
        &self,
        utan0: Vec2,
        t0: f64,
        t1: f64,
        tan: Vec2,
        force: bool,
    ) -> Option<SubdivisionPoint> {
        let mut t = 0.0;
        let mut n_soln = 0;
        let z0 = tan.cross(self.q.p0.to_vec2());
        let z1 = tan.cross(self.q.p1.to_vec2());
        let z2 = tan.cross(self.q.p2.to_vec2());
        let c0 = z0;
        let c1 = 2.0 * (z1 - z0);
        let c2 = (z2 - z1) - (z1 - z0);
        for root in solve_quadratic(c0, c1, c2) {
            if root >= t0 && root <= t1 {
                t = root;
                n_soln += 1;
            }
        }
        if n_soln != 1 {
            if !force {
                return None;
            }
            t = if self.q.eval(t0).to_vec2().length_squared()
                > self.q.eval(t1).to_vec2().length_squared()
            {
                t1
            } else {
                t0
            };
        }
        // A zero-derivative cusp with well defined angles takes the target
        // tangent; a U-turn picks a side arbitrarily.
        let fallback = if tan.length_squared() >= UTAN_EPSILON {
            tan.normalize()
        } else {
            utan0.turn_90()
        };
        let utan = if n_soln == 1 {
            let q = self.q.eval(t).to_vec2();
            if q.length_squared() >= UTAN_EPSILON {
                q.normalize()
            } else {
                fallback
            }
        } else {
            fallback
        };
        Some(SubdivisionPoint { t, utan })
    }
}

/// Bernstein weights of the control arms at the least-squares samples.
const fn mk_a_weights(rev: bool) -> [f64; N_LSE] {
    let mut result = [0.0; N_LSE];
    let mut i = 0;
    while i < N_LSE {
        let t = (i + 1) as f64 / (N_LSE + 1) as f64;
        let mt = 1. - t;
        let ix = if rev { N_LSE - 1 - i } else { i };
        result[ix] = 3.0 * mt * t * mt;
        i += 1;
    }
    result
}

const A_WEIGHTS: [f64; N_LSE] = mk_a_weights(false);
const B_WEIGHTS: [f64; N_LSE] = mk_a_weights(true);
