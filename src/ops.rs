// Copyright 2026 the Kerf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offset, stroke and dash on single-precision paths.
//!
//! These convert the input to double precision once, run the engines, and
//! round the result back to `f32`.

use alloc::vec::Vec;

use tracing::debug_span;

use crate::{dash_path, offset_path, stroke_path, Join, Path, Shape, Stroke};

/// Offset a path by a signed distance.
///
/// Positive distances offset to the left of the direction of travel, with
/// the y axis pointing up. See [`offset_path`] for the treatment of corners.
/// With `remove_self_intersections`, the loops formed where the result
/// crosses itself are cut out, locating the crossings to within `tolerance`.
pub fn offset(
    path: &Path,
    distance: f32,
    join: Join,
    miter_limit: f32,
    tolerance: f32,
    remove_self_intersections: bool,
) -> Path {
    debug_span!("offset", elements = path.len(), distance).in_scope(|| {
        let tolerance = tolerance as f64;
        let result = offset_path(
            path.path_els(),
            distance as f64,
            join,
            miter_limit as f64,
            tolerance,
        );
        if remove_self_intersections {
            Path::from_bez_path(&crate::remove_self_intersections(&result, tolerance))
        } else {
            Path::from_bez_path(&result)
        }
    })
}

/// Expand the stroke of a path into a shape to be filled with the nonzero
/// winding rule.
pub fn stroke(path: &Path, style: &Stroke, tolerance: f32) -> Shape {
    debug_span!("stroke", elements = path.len(), width = style.width).in_scope(|| {
        let result = stroke_path(path.path_els(), style, tolerance as f64);
        Shape::from_bez_path(&result)
    })
}

/// Split a path into dashes.
///
/// Every dash becomes a contour of the result. If the pattern has no
/// positive finite entries, the path is returned as it is.
pub fn dash(path: &Path, dash_offset: f32, pattern: &[f32]) -> Shape {
    debug_span!("dash", elements = path.len(), n_dashes = pattern.len()).in_scope(|| {
        let pattern: Vec<f64> = pattern.iter().map(|&dash| dash as f64).collect();
        let result = dash_path(path.path_els(), dash_offset as f64, &pattern);
        Shape::from_bez_path(&result)
    })
}

impl Shape {
    /// Offset every contour, keeping the non-empty results.
    ///
    /// See [`offset`] for the meaning of the arguments.
    pub fn offset(
        &self,
        distance: f32,
        join: Join,
        miter_limit: f32,
        tolerance: f32,
        remove_self_intersections: bool,
    ) -> Shape {
        self.contours()
            .iter()
            .map(|contour| {
                offset(
                    contour,
                    distance,
                    join,
                    miter_limit,
                    tolerance,
                    remove_self_intersections,
                )
            })
            .filter(|result| !result.is_empty())
            .collect()
    }

    /// Stroke every contour, gathering the outlines.
    pub fn stroke(&self, style: &Stroke, tolerance: f32) -> Shape {
        self.contours()
            .iter()
            .flat_map(|contour| stroke(contour, style, tolerance))
            .collect()
    }

    /// Dash every contour, gathering the dashes.
    ///
    /// The dash phase starts over for every contour.
    pub fn dash(&self, dash_offset: f32, pattern: &[f32]) -> Shape {
        self.contours()
            .iter()
            .flat_map(|contour| dash(contour, dash_offset, pattern))
            .collect()
    }
}
