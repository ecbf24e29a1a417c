// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective rectification — maps the ordered document corners onto a fixed
// square canvas.

use docscan_core::{OrderedCorners, Point2D, ScanError, shoelace_area};
use image::{GrayImage, Rgb, RgbImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use tracing::{debug, info, instrument, warn};

/// Smallest area, in square pixels, of the triangle spanned by any three
/// corners. Anything thinner is treated as collinear.
const MIN_CORNER_TRIANGLE_AREA: f64 = 0.5;

/// A flattened page in colour and grayscale.
#[derive(Debug, Clone)]
pub struct Rectified {
    pub color: RgbImage,
    pub gray: GrayImage,
}

/// Warps a quadrilateral region of the source onto a `size` x `size` square.
///
/// Destination corners are `(0, 0)`, `(size, 0)`, `(size, size)`, `(0, size)`,
/// matching the top-left, top-right, bottom-right, bottom-left corner order.
/// The output is square whatever the page's aspect ratio, so non-square pages
/// are stretched. Samples falling outside the source are black.
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveRectifier {
    size: u32,
}

impl PerspectiveRectifier {
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Destination corners in canonical order.
    pub fn destination(&self) -> [(f32, f32); 4] {
        let s = self.size as f32;
        [(0.0, 0.0), (s, 0.0), (s, s), (0.0, s)]
    }

    /// Solve the homography taking `corners` to the destination square.
    ///
    /// Fails with `NoDocumentFound` when any three corners are collinear
    /// (including repeated corners) or when the solve itself fails. No
    /// projective map takes collinear points onto square corners.
    pub fn projection(&self, corners: &OrderedCorners) -> Result<Projection, ScanError> {
        if has_collinear_triple(&corners.to_array()) {
            warn!(?corners, "Three corners are collinear; no projective transform");
            return Err(ScanError::NoDocumentFound(
                "detected corners are collinear".into(),
            ));
        }
        Projection::from_control_points(corners.to_control_points(), self.destination()).ok_or_else(
            || {
                warn!(?corners, "Degenerate quadrilateral; no projective transform");
                ScanError::NoDocumentFound(
                    "detected corners do not define a projective transform".into(),
                )
            },
        )
    }

    /// Flatten the page bounded by `corners` in `source`.
    #[instrument(skip(self, source), fields(size = self.size))]
    pub fn rectify(
        &self,
        source: &RgbImage,
        corners: &OrderedCorners,
    ) -> Result<Rectified, ScanError> {
        let projection = self.projection(corners)?;
        debug!("Projective transform computed");

        let mut color = RgbImage::new(self.size, self.size);
        warp_into(
            source,
            &projection,
            Interpolation::Bilinear,
            Rgb([0u8, 0, 0]),
            &mut color,
        );
        let gray = image::imageops::grayscale(&color);

        info!(size = self.size, "Perspective rectification applied");
        Ok(Rectified { color, gray })
    }
}

impl Default for PerspectiveRectifier {
    fn default() -> Self {
        Self::new(docscan_core::config::RECTIFIED_SIZE)
    }
}

/// True when some three of the four corners span (almost) no area.
fn has_collinear_triple(points: &[Point2D; 4]) -> bool {
    (0..4).any(|skip| {
        let triangle: Vec<Point2D> = (0..4).filter(|&i| i != skip).map(|i| points[i]).collect();
        shoelace_area(&triangle) < MIN_CORNER_TRIANGLE_AREA
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners(points: [(f64, f64); 4]) -> OrderedCorners {
        let [tl, tr, br, bl] = points.map(Point2D::from);
        OrderedCorners {
            top_left: tl,
            top_right: tr,
            bottom_right: br,
            bottom_left: bl,
        }
    }

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[test]
    fn output_is_always_square() {
        let source = gradient(300, 200);
        let shapes = [
            [(10.0, 10.0), (290.0, 20.0), (280.0, 190.0), (15.0, 180.0)],
            [(100.0, 50.0), (120.0, 50.0), (120.0, 150.0), (100.0, 150.0)],
            [(0.0, 0.0), (300.0, 0.0), (300.0, 20.0), (0.0, 20.0)],
        ];
        for size in [64, 100] {
            let rectifier = PerspectiveRectifier::new(size);
            for shape in shapes {
                let out = rectifier.rectify(&source, &corners(shape)).expect("rectify");
                assert_eq!(out.color.dimensions(), (size, size));
                assert_eq!(out.gray.dimensions(), (size, size));
            }
        }
    }

    #[test]
    fn default_size_is_800() {
        assert_eq!(PerspectiveRectifier::default().size(), 800);
    }

    #[test]
    fn identity_square_reproduces_source() {
        let source = gradient(800, 800);
        let rectifier = PerspectiveRectifier::new(800);
        let out = rectifier
            .rectify(
                &source,
                &corners([(0.0, 0.0), (800.0, 0.0), (800.0, 800.0), (0.0, 800.0)]),
            )
            .expect("rectify");

        // Row and column 0 are skipped: rounding in the solved transform can put
        // them a hair outside the source.
        for y in (7..799).step_by(7) {
            for x in (7..799).step_by(7) {
                let expected = source.get_pixel(x, y).0;
                let actual = out.color.get_pixel(x, y).0;
                for c in 0..3 {
                    let diff = (expected[c] as i32 - actual[c] as i32).abs();
                    assert!(
                        diff <= 2,
                        "pixel ({x},{y}) channel {c}: expected {}, got {}",
                        expected[c],
                        actual[c]
                    );
                }
            }
        }
    }

    #[test]
    fn collinear_corners_are_no_document() {
        let source = gradient(120, 120);
        let rectifier = PerspectiveRectifier::new(64);
        let shapes = [
            // Top edge runs straight on into the bottom-right corner.
            [(0.0, 0.0), (50.0, 0.0), (100.0, 0.0), (0.0, 50.0)],
            // One vertex filling two roles, as a 45 degree tie produces.
            [(10.0, 10.0), (10.0, 10.0), (90.0, 90.0), (10.0, 90.0)],
        ];
        for shape in shapes {
            let result = rectifier.rectify(&source, &corners(shape));
            assert!(
                matches!(result, Err(ScanError::NoDocumentFound(_))),
                "{shape:?} gave {result:?}"
            );
        }
    }

    #[test]
    fn diamond_tie_ordering_cannot_be_rectified() {
        let diamond = [(100.0, 0.0), (200.0, 100.0), (100.0, 200.0), (0.0, 100.0)];
        let ordered = crate::scan::corners::order_points(diamond.map(Point2D::from));
        let result = PerspectiveRectifier::new(64).rectify(&gradient(220, 220), &ordered);
        assert!(matches!(result, Err(ScanError::NoDocumentFound(_))));
    }

    #[test]
    fn uniform_region_stays_uniform() {
        let mut source = RgbImage::from_pixel(400, 300, Rgb([0, 0, 0]));
        for y in 50..250 {
            for x in 100..300 {
                source.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        let out = PerspectiveRectifier::new(120)
            .rectify(
                &source,
                &corners([(110.0, 60.0), (290.0, 60.0), (290.0, 240.0), (110.0, 240.0)]),
            )
            .expect("rectify");
        assert!(out.gray.pixels().all(|p| p.0[0] >= 254));
    }
}
