// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core geometric and artifact types for the Docscan pipeline.

use serde::{Deserialize, Serialize};

/// A point in image space (x to the right, y downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Single-precision pair, as consumed by projective transforms and drawing.
    pub fn to_f32_pair(&self) -> (f32, f32) {
        (self.x as f32, self.y as f32)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A closed polygon traced from an edge map, with its enclosed area.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    points: Vec<Point2D>,
    area: f64,
}

impl Contour {
    /// Build a contour and measure its enclosed area.
    pub fn new(points: Vec<Point2D>) -> Self {
        let area = shoelace_area(&points);
        Self { points, area }
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    /// Absolute enclosed area of the polygon.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Length of the closed outline, including the closing segment.
    pub fn perimeter(&self) -> f64 {
        let n = self.points.len();
        if n < 2 {
            return 0.0;
        }
        (0..n)
            .map(|i| self.points[i].distance(&self.points[(i + 1) % n]))
            .sum()
    }
}

/// Area of a polygon given by its vertices in order (CW or CCW).
pub fn shoelace_area(points: &[Point2D]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        twice_area += points[i].x * points[j].y;
        twice_area -= points[j].x * points[i].y;
    }
    twice_area.abs() / 2.0
}

/// Exactly four vertices, in the order contour approximation discovered them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadrilateral([Point2D; 4]);

impl Quadrilateral {
    pub fn new(vertices: [Point2D; 4]) -> Self {
        Self(vertices)
    }

    /// Accept a vertex list only if it holds exactly four points.
    pub fn from_vertices(vertices: &[Point2D]) -> Option<Self> {
        let vertices: [Point2D; 4] = vertices.try_into().ok()?;
        Some(Self(vertices))
    }

    pub fn vertices(&self) -> &[Point2D; 4] {
        &self.0
    }
}

/// Quadrilateral corners in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderedCorners {
    pub top_left: Point2D,
    pub top_right: Point2D,
    pub bottom_right: Point2D,
    pub bottom_left: Point2D,
}

impl OrderedCorners {
    /// Corners as `[top_left, top_right, bottom_right, bottom_left]`.
    pub fn to_array(&self) -> [Point2D; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Flat single-precision source points for a perspective map, in the same
    /// order as [`OrderedCorners::to_array`].
    pub fn to_control_points(&self) -> [(f32, f32); 4] {
        self.to_array().map(|p| p.to_f32_pair())
    }
}

/// Named artifacts produced by a successful scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Colour input normalised to the canvas.
    Original,
    Gray,
    Blurred,
    /// Binary edge map.
    Edged,
    /// Normalised input with the detected boundary drawn on it.
    Outline,
    /// Rectified page in grayscale.
    Scanned,
    BinaryThresh,
    MeanThresh,
    GaussianThresh,
    OtsuThresh,
}

impl Stage {
    /// Every stage, in pipeline order.
    pub const ALL: [Stage; 10] = [
        Self::Original,
        Self::Gray,
        Self::Blurred,
        Self::Edged,
        Self::Outline,
        Self::Scanned,
        Self::BinaryThresh,
        Self::MeanThresh,
        Self::GaussianThresh,
        Self::OtsuThresh,
    ];

    /// Stable key used for file names and lookups.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Gray => "gray",
            Self::Blurred => "blurred",
            Self::Edged => "edged",
            Self::Outline => "outline",
            Self::Scanned => "scanned",
            Self::BinaryThresh => "binary_thresh",
            Self::MeanThresh => "mean_thresh",
            Self::GaussianThresh => "gaussian_thresh",
            Self::OtsuThresh => "otsu_thresh",
        }
    }

    /// Caption shown under the artifact by a display layer.
    pub fn caption(&self) -> &'static str {
        match self {
            Self::Original => "Original Image",
            Self::Gray => "Grayscale Conversion",
            Self::Blurred => "Blurred Image",
            Self::Edged => "Edge Detection",
            Self::Outline => "Detected Document Outline",
            Self::Scanned => "Scanned Document",
            Self::BinaryThresh => "Binary Threshold",
            Self::MeanThresh => "Mean Adaptive Threshold",
            Self::GaussianThresh => "Gaussian Adaptive Threshold",
            Self::OtsuThresh => "Otsu's Threshold",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|stage| stage.name() == wanted)
            .ok_or_else(|| format!("unknown stage: {s}"))
    }
}
