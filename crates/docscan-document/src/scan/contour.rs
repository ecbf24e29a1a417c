// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contour selection — finds the document boundary as the largest traced contour
// that simplifies to exactly four vertices.

use docscan_core::config::{ContourConfig, EdgeConfig};
use docscan_core::{Contour, Point2D, Quadrilateral, ScanError};
use image::{GrayImage, RgbImage};
use imageproc::edges::canny;
use tracing::{debug, info, instrument, warn};

use crate::image::filter;

/// Intermediate images produced on the way to the edge map.
#[derive(Debug, Clone)]
pub struct EdgeStages {
    pub gray: GrayImage,
    pub blurred: GrayImage,
    /// Binary edge map (255 on edges, 0 elsewhere).
    pub edged: GrayImage,
}

/// Locates the document quadrilateral in a colour image.
///
/// ## Pipeline
///
/// 1. Convert to grayscale
/// 2. Square Gaussian blur to suppress noise
/// 3. Canny edge detection
/// 4. Trace every contour in the edge map (no hierarchy, every boundary point kept)
/// 5. Sort contours by enclosed area, largest first
/// 6. Approximate each contour by a polygon with a tolerance proportional to
///    its perimeter, and accept the first approximation with exactly four
///    vertices
///
/// The search is greedy: it assumes the page is the largest near-quadrilateral
/// shape in the frame. It does not look for a better-fitting candidate once a
/// four-vertex match is found.
#[derive(Debug, Clone, Default)]
pub struct ContourSelector {
    edges: EdgeConfig,
    contour: ContourConfig,
}

impl ContourSelector {
    pub fn new(edges: EdgeConfig, contour: ContourConfig) -> Self {
        Self { edges, contour }
    }

    /// Grayscale, blur, and edge-detect `image`.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn edge_stages(&self, image: &RgbImage) -> EdgeStages {
        let gray = image::imageops::grayscale(image);
        debug!("Converted to grayscale");

        let blurred = filter::gaussian_blur(&gray, self.edges.blur_kernel);
        debug!(kernel = self.edges.blur_kernel, "Applied Gaussian blur");

        // imageproc's hysteresis admits samples >= low, so a zero low threshold
        // would pull every suppressed sample into the edge map. canny also
        // applies its own sigma 1.4 Gaussian before taking gradients.
        let high = self.edges.canny_high.max(f32::MIN_POSITIVE);
        let low = self.edges.canny_low.max(f32::MIN_POSITIVE).min(high);
        let edged = canny(&blurred, low, high);
        debug!(low, high, "Canny edge detection complete");

        EdgeStages {
            gray,
            blurred,
            edged,
        }
    }

    /// Trace every contour in a binary edge map, largest enclosed area first.
    ///
    /// The sort is stable, so contours of equal area keep their trace order.
    pub fn contours(&self, edged: &GrayImage) -> Vec<Contour> {
        let traced: Vec<imageproc::contours::Contour<u32>> =
            imageproc::contours::find_contours(edged);

        let mut contours: Vec<Contour> = traced
            .into_iter()
            .map(|c| {
                let points = c
                    .points
                    .into_iter()
                    .map(|p| Point2D::new(f64::from(p.x), f64::from(p.y)))
                    .collect();
                Contour::new(points)
            })
            .collect();

        contours.sort_by(|a, b| b.area().total_cmp(&a.area()));
        contours
    }

    /// Pick the first contour, in area-descending order, whose approximation
    /// has exactly four vertices.
    #[instrument(skip_all)]
    pub fn select(&self, edged: &GrayImage) -> Result<Quadrilateral, ScanError> {
        let contours = self.contours(edged);
        debug!(contour_count = contours.len(), "Contours traced");

        for (rank, contour) in contours.iter().enumerate() {
            let epsilon = self.contour.epsilon_fraction * contour.perimeter();
            let approx = approximate_closed_polygon(contour.points(), epsilon);

            if let Some(quad) = Quadrilateral::from_vertices(&approx) {
                info!(
                    rank,
                    area = contour.area(),
                    vertices = ?quad.vertices(),
                    "Document quadrilateral found"
                );
                return Ok(quad);
            }
            debug!(
                rank,
                area = contour.area(),
                vertex_count = approx.len(),
                "Contour rejected"
            );
        }

        warn!(
            contour_count = contours.len(),
            "No contour approximates to four vertices"
        );
        Err(ScanError::NoDocumentFound(format!(
            "none of {} contours approximates to a quadrilateral",
            contours.len()
        )))
    }

    /// Edge-detect `image` and select its document quadrilateral, returning the
    /// intermediate images alongside the result.
    pub fn detect(&self, image: &RgbImage) -> (EdgeStages, Result<Quadrilateral, ScanError>) {
        let stages = self.edge_stages(image);
        let quad = self.select(&stages.edged);
        (stages, quad)
    }
}

// -- Polygon approximation ----------------------------------------------------

/// Simplify a closed curve with the Douglas-Peucker algorithm.
///
/// The curve is split at two far-apart anchor vertices: the point farthest from
/// the start, and the point farthest from that one. Each half is simplified as
/// an open chain and the halves are joined, so every output vertex appears once
/// and the closing edge is implicit.
pub fn approximate_closed_polygon(points: &[Point2D], epsilon: f64) -> Vec<Point2D> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let a = farthest_from(points, 0);
    let b = farthest_from(points, a);
    let (first, second) = if a < b { (a, b) } else { (b, a) };
    if first == second {
        // Every point coincides.
        return vec![points[first]];
    }

    let forward = &points[first..=second];
    let backward: Vec<Point2D> = points[second..]
        .iter()
        .chain(&points[..=first])
        .copied()
        .collect();

    let mut polygon = simplify_open(forward, epsilon);
    polygon.pop();
    let mut rest = simplify_open(&backward, epsilon);
    rest.pop();
    polygon.append(&mut rest);
    polygon
}

/// Douglas-Peucker on an open chain of at least two points. Both endpoints are
/// always kept.
fn simplify_open(chain: &[Point2D], epsilon: f64) -> Vec<Point2D> {
    let last = chain.len() - 1;
    let mut keep = vec![false; chain.len()];
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0, last)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let mut index = start;
        let mut dmax = 0.0;
        for i in start + 1..end {
            let d = perpendicular_distance(&chain[i], &chain[start], &chain[end]);
            if d > dmax {
                index = i;
                dmax = d;
            }
        }
        if dmax > epsilon {
            keep[index] = true;
            stack.push((start, index));
            stack.push((index, end));
        }
    }

    chain
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

fn farthest_from(points: &[Point2D], origin: usize) -> usize {
    let anchor = points[origin];
    let mut index = origin;
    let mut dmax = 0.0;
    for (i, p) in points.iter().enumerate() {
        let d = anchor.distance(p);
        if d > dmax {
            index = i;
            dmax = d;
        }
    }
    index
}

/// Distance from `p` to the line through `a` and `b` (or to `a` when the two
/// coincide).
fn perpendicular_distance(p: &Point2D, a: &Point2D, b: &Point2D) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length = dx.hypot(dy);
    if length < 1e-12 {
        return p.distance(a);
    }
    ((p.x - a.x) * dy - (p.y - a.y) * dx).abs() / length
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    fn p(x: f64, y: f64) -> Point2D {
        Point2D::new(x, y)
    }

    /// Densely sampled outline of an axis-aligned rectangle, starting at the
    /// top-left corner and running clockwise, as a tracer would report it.
    fn rectangle_outline(x0: u32, y0: u32, x1: u32, y1: u32) -> Vec<Point2D> {
        let mut pts = Vec::new();
        for x in x0..x1 {
            pts.push(p(x as f64, y0 as f64));
        }
        for y in y0..y1 {
            pts.push(p(x1 as f64, y as f64));
        }
        for x in (x0 + 1..=x1).rev() {
            pts.push(p(x as f64, y1 as f64));
        }
        for y in (y0 + 1..=y1).rev() {
            pts.push(p(x0 as f64, y as f64));
        }
        pts
    }

    fn small_selector() -> ContourSelector {
        ContourSelector::default()
    }

    fn filled_rect(width: u32, height: u32, x0: u32, y0: u32, x1: u32, y1: u32) -> RgbImage {
        let mut img = RgbImage::from_pixel(width, height, Rgb([0, 0, 0]));
        for y in y0..y1 {
            for x in x0..x1 {
                img.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        img
    }

    #[test]
    fn rectangle_outline_approximates_to_corners() {
        let outline = rectangle_outline(10, 20, 110, 70);
        let perimeter = Contour::new(outline.clone()).perimeter();
        let approx = approximate_closed_polygon(&outline, 0.02 * perimeter);
        assert_eq!(approx.len(), 4, "got {approx:?}");
        for corner in [p(10.0, 20.0), p(110.0, 20.0), p(110.0, 70.0), p(10.0, 70.0)] {
            assert!(approx.contains(&corner), "missing {corner:?} in {approx:?}");
        }
    }

    #[test]
    fn small_wobble_is_absorbed() {
        let mut outline = rectangle_outline(0, 0, 200, 100);
        // Nudge a point on the top edge by one pixel.
        outline[50].y = 1.0;
        let perimeter = Contour::new(outline.clone()).perimeter();
        let approx = approximate_closed_polygon(&outline, 0.02 * perimeter);
        assert_eq!(approx.len(), 4);
    }

    #[test]
    fn triangle_approximates_to_three_vertices() {
        let mut outline = Vec::new();
        for i in 0..100 {
            outline.push(p(i as f64, 0.0));
        }
        for i in 0..100 {
            outline.push(p(100.0 - i as f64 * 0.5, i as f64));
        }
        for i in 0..100 {
            outline.push(p(50.0 - i as f64 * 0.5, 100.0 - i as f64));
        }
        let perimeter = Contour::new(outline.clone()).perimeter();
        let approx = approximate_closed_polygon(&outline, 0.02 * perimeter);
        assert_eq!(approx.len(), 3, "got {approx:?}");
    }

    #[test]
    fn tiny_inputs_pass_through() {
        let two = [p(0.0, 0.0), p(3.0, 4.0)];
        assert_eq!(approximate_closed_polygon(&two, 1.0), two.to_vec());
        let same = [p(2.0, 2.0); 5];
        assert_eq!(approximate_closed_polygon(&same, 1.0), vec![p(2.0, 2.0)]);
    }

    #[test]
    fn blank_image_has_no_document() {
        let img = RgbImage::from_pixel(120, 80, Rgb([200, 200, 200]));
        let (stages, result) = small_selector().detect(&img);
        assert!(stages.edged.pixels().all(|px| px.0[0] == 0));
        assert!(matches!(result, Err(ScanError::NoDocumentFound(_))));
    }

    #[test]
    fn triangle_only_edge_map_has_no_document() {
        // One-pixel outline of a right triangle with a 45 degree hypotenuse.
        let mut edged = GrayImage::new(100, 100);
        let white = Luma([255u8]);
        for i in 10..=90 {
            edged.put_pixel(i, 10, white);
            edged.put_pixel(10, i, white);
            edged.put_pixel(i, 100 - i, white);
        }
        let result = small_selector().select(&edged);
        assert!(
            matches!(result, Err(ScanError::NoDocumentFound(_))),
            "got {result:?}"
        );
    }

    #[test]
    fn degenerate_canny_thresholds_do_not_panic() {
        let img = filled_rect(90, 60, 20, 15, 70, 45);
        for (low, high) in [(0.0, 0.0), (-3.0, -1.0), (f32::NAN, f32::NAN)] {
            let edges = EdgeConfig {
                canny_low: low,
                canny_high: high,
                ..EdgeConfig::default()
            };
            let stages = ContourSelector::new(edges, ContourConfig::default()).edge_stages(&img);
            assert_eq!(stages.edged.dimensions(), (90, 60));
        }
    }

    #[test]
    fn edge_stages_keep_canvas_dimensions() {
        let img = filled_rect(90, 60, 20, 15, 70, 45);
        let stages = small_selector().edge_stages(&img);
        assert_eq!(stages.gray.dimensions(), (90, 60));
        assert_eq!(stages.blurred.dimensions(), (90, 60));
        assert_eq!(stages.edged.dimensions(), (90, 60));
        assert!(stages.edged.pixels().all(|px| px.0[0] == 0 || px.0[0] == 255));
        assert!(stages.edged.pixels().any(|px| px.0[0] == 255));
    }

    #[test]
    fn contours_sorted_by_area_descending() {
        let mut edged = GrayImage::new(60, 60);
        // Large hollow square and a small filled blob.
        for i in 5..45 {
            edged.put_pixel(i, 5, Luma([255]));
            edged.put_pixel(i, 44, Luma([255]));
            edged.put_pixel(5, i, Luma([255]));
            edged.put_pixel(44, i, Luma([255]));
        }
        for y in 50..54 {
            for x in 50..54 {
                edged.put_pixel(x, y, Luma([255]));
            }
        }
        let contours = small_selector().contours(&edged);
        assert!(contours.len() >= 2);
        for pair in contours.windows(2) {
            assert!(pair[0].area() >= pair[1].area());
        }
        assert!(contours[0].area() > 1000.0);
    }

    #[test]
    fn selects_white_rectangle() {
        let img = filled_rect(300, 200, 60, 40, 240, 160);
        let (_, result) = small_selector().detect(&img);
        let quad = result.expect("rectangle should be found");
        let expected = [p(60.0, 40.0), p(240.0, 40.0), p(240.0, 160.0), p(60.0, 160.0)];
        for corner in expected {
            assert!(
                quad.vertices().iter().any(|v| v.distance(&corner) <= 6.0),
                "no vertex near {corner:?}: {:?}",
                quad.vertices()
            );
        }
    }

    #[test]
    fn larger_non_quadrilateral_is_skipped() {
        let mut edged = GrayImage::new(100, 100);
        let white = Luma([255u8]);
        // One-pixel outline of an L-shaped hexagon.
        for i in 5..=80 {
            edged.put_pixel(i, 5, white);
            edged.put_pixel(5, i, white);
        }
        for i in 5..=30 {
            edged.put_pixel(80, i, white);
            edged.put_pixel(i, 80, white);
        }
        for i in 30..=80 {
            edged.put_pixel(i, 30, white);
            edged.put_pixel(30, i, white);
        }
        // Smaller square outline inside the notch of the L.
        for i in 50..=70 {
            edged.put_pixel(i, 50, white);
            edged.put_pixel(i, 70, white);
            edged.put_pixel(50, i, white);
            edged.put_pixel(70, i, white);
        }

        let quad = small_selector().select(&edged).expect("square should be selected");
        for corner in [p(50.0, 50.0), p(70.0, 50.0), p(70.0, 70.0), p(50.0, 70.0)] {
            assert!(
                quad.vertices().contains(&corner),
                "missing {corner:?} in {:?}",
                quad.vertices()
            );
        }
    }
}
