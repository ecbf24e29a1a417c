// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan pipeline — load, normalise, detect, order, rectify, binarize. Strictly
// linear: a failure at load or contour search ends the scan with no result.

use std::path::{Path, PathBuf};

use docscan_core::config::OutlineStyle;
use docscan_core::{ConfigError, ExportError, OrderedCorners, ScanConfig, ScanError, Stage};
use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use tracing::{info, instrument};

use crate::image::export::Artifact;
use crate::image::loader;
use crate::scan::contour::ContourSelector;
use crate::scan::corners::CornerOrderer;
use crate::scan::rectify::PerspectiveRectifier;
use crate::scan::threshold::{Binarizer, Thresholds};

/// Every artifact of a successful scan. All stages are always present.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Input normalised to the canvas.
    pub original: RgbImage,
    pub gray: GrayImage,
    pub blurred: GrayImage,
    pub edged: GrayImage,
    /// Normalised input with the detected boundary drawn on it.
    pub outline: RgbImage,
    /// Rectified page, grayscale.
    pub scanned: GrayImage,
    pub thresholds: Thresholds,
    /// Corners the page was rectified from, in canvas coordinates.
    pub corners: OrderedCorners,
}

impl ScanResult {
    /// Borrow the artifact for `stage`.
    pub fn get(&self, stage: Stage) -> Artifact<'_> {
        match stage {
            Stage::Original => Artifact::Color(&self.original),
            Stage::Gray => Artifact::Gray(&self.gray),
            Stage::Blurred => Artifact::Gray(&self.blurred),
            Stage::Edged => Artifact::Gray(&self.edged),
            Stage::Outline => Artifact::Color(&self.outline),
            Stage::Scanned => Artifact::Gray(&self.scanned),
            Stage::BinaryThresh => Artifact::Gray(&self.thresholds.binary),
            Stage::MeanThresh => Artifact::Gray(&self.thresholds.mean),
            Stage::GaussianThresh => Artifact::Gray(&self.thresholds.gaussian),
            Stage::OtsuThresh => Artifact::Gray(&self.thresholds.otsu),
        }
    }

    /// All artifacts in pipeline order.
    pub fn iter(&self) -> impl Iterator<Item = (Stage, Artifact<'_>)> + '_ {
        Stage::ALL.into_iter().map(move |stage| (stage, self.get(stage)))
    }

    /// Write the requested stages into `dir` as `<stem>_<stage>.png`.
    pub fn save_stages(
        &self,
        dir: impl AsRef<Path>,
        stem: &str,
        stages: &[Stage],
    ) -> Result<Vec<PathBuf>, ExportError> {
        std::fs::create_dir_all(dir.as_ref())?;
        let mut written = Vec::with_capacity(stages.len());
        for &stage in stages {
            let path = dir.as_ref().join(format!("{stem}_{}.png", stage.name()));
            self.get(stage).save(&path)?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Runs the full document scan.
///
/// ## Pipeline
///
/// 1. Load and convert to 8-bit RGB
/// 2. Resize to the fixed canvas
/// 3. Grayscale, blur, and Canny edge detection
/// 4. Contour search for the largest four-vertex approximation
/// 5. Order the corners
/// 6. Rectify onto the fixed square
/// 7. Binarize four ways
///
/// Each call is independent and holds no state between scans, so one pipeline
/// may be shared across threads.
#[derive(Debug, Clone)]
pub struct ScanPipeline {
    config: ScanConfig,
    selector: ContourSelector,
    orderer: CornerOrderer,
    rectifier: PerspectiveRectifier,
    binarizer: Binarizer,
}

impl ScanPipeline {
    /// Build a pipeline from a custom configuration.
    pub fn new(config: ScanConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::assemble(config))
    }

    fn assemble(config: ScanConfig) -> Self {
        Self {
            selector: ContourSelector::new(config.edges, config.contour),
            orderer: CornerOrderer,
            rectifier: PerspectiveRectifier::new(config.rectified_size),
            binarizer: Binarizer::new(config.threshold),
            config,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan an image file.
    pub fn scan_path(&self, path: impl AsRef<Path>) -> Result<ScanResult, ScanError> {
        let image = loader::load_path(path)?;
        self.scan_rgb(image)
    }

    /// Scan encoded image bytes (JPEG, PNG, etc.).
    pub fn scan_bytes(&self, data: &[u8]) -> Result<ScanResult, ScanError> {
        let image = loader::load_bytes(data)?;
        self.scan_rgb(image)
    }

    /// Scan an already-decoded image of any colour type.
    pub fn scan_image(&self, image: &DynamicImage) -> Result<ScanResult, ScanError> {
        self.scan_rgb(loader::to_rgb(image))
    }

    /// Scan a decoded RGB image.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn scan_rgb(&self, image: RgbImage) -> Result<ScanResult, ScanError> {
        let original = loader::normalize(image, self.config.canvas);

        let (stages, quad) = self.selector.detect(&original);
        let quad = quad?;

        let corners = self.orderer.order(&quad);
        let rectified = self.rectifier.rectify(&original, &corners)?;

        let mut outline = original.clone();
        draw_outline(&mut outline, &corners, &self.config.outline);

        let thresholds = self.binarizer.binarize_all(&rectified.gray);

        info!(
            top_left = ?corners.top_left,
            bottom_right = ?corners.bottom_right,
            "Scan complete"
        );
        Ok(ScanResult {
            original,
            gray: stages.gray,
            blurred: stages.blurred,
            edged: stages.edged,
            outline,
            scanned: rectified.gray,
            thresholds,
            corners,
        })
    }
}

impl Default for ScanPipeline {
    fn default() -> Self {
        Self::assemble(ScanConfig::default())
    }
}

/// Draw the closed quadrilateral onto `canvas` with the given style.
pub fn draw_outline(canvas: &mut RgbImage, corners: &OrderedCorners, style: &OutlineStyle) {
    let color = Rgb(style.color);
    let points = corners.to_control_points();
    let half = (style.thickness as f32 - 1.0) / 2.0;
    let offsets: Vec<f32> = (0..style.thickness).map(|i| i as f32 - half).collect();

    for i in 0..points.len() {
        let (x0, y0) = points[i];
        let (x1, y1) = points[(i + 1) % points.len()];
        for &dx in &offsets {
            for &dy in &offsets {
                draw_line_segment_mut(canvas, (x0 + dx, y0 + dy), (x1 + dx, y1 + dy), color);
            }
        }
    }
}
