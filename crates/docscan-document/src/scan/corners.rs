// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner ordering — assigns the four vertices of a detected quadrilateral to
// top-left, top-right, bottom-right, and bottom-left.

use docscan_core::{OrderedCorners, Point2D, Quadrilateral};
use tracing::debug;

/// Canonicalises quadrilateral vertex order using coordinate sums and
/// differences.
///
/// The smallest `x + y` is the top-left corner and the largest is the
/// bottom-right. The smallest `y - x` is the top-right corner and the largest is
/// the bottom-left. This holds for convex quadrilaterals rotated less than
/// about 45 degrees from the image axes.
///
/// Ties are not detected: when several vertices share the extreme value, the
/// first one in input order takes the role. For such inputs the result depends
/// on vertex order, and two roles may be given the same vertex.
#[derive(Debug, Clone, Copy, Default)]
pub struct CornerOrderer;

impl CornerOrderer {
    pub fn order(&self, quad: &Quadrilateral) -> OrderedCorners {
        let vertices = quad.vertices();
        let sums = vertices.map(|p| p.x + p.y);
        let diffs = vertices.map(|p| p.y - p.x);

        let corners = OrderedCorners {
            top_left: vertices[first_min(&sums)],
            top_right: vertices[first_min(&diffs)],
            bottom_right: vertices[first_max(&sums)],
            bottom_left: vertices[first_max(&diffs)],
        };
        debug!(?corners, "Corners ordered");
        corners
    }
}

/// Index of the first strictly smallest value.
fn first_min(values: &[f64; 4]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v < values[best] {
            best = i;
        }
    }
    best
}

/// Index of the first strictly largest value.
fn first_max(values: &[f64; 4]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

/// Order four loose points without first wrapping them in a `Quadrilateral`.
pub fn order_points(points: [Point2D; 4]) -> OrderedCorners {
    CornerOrderer.order(&Quadrilateral::new(points))
}
