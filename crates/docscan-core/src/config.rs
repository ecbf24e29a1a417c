// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan configuration. Every fixed dimension and threshold of the pipeline lives
// here as a named constant so alternate canvases can be exercised in tests.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Width every input is normalised to before processing.
pub const CANVAS_WIDTH: u32 = 1500;
/// Height every input is normalised to before processing.
pub const CANVAS_HEIGHT: u32 = 880;
/// Side length of the square rectified page.
pub const RECTIFIED_SIZE: u32 = 800;

/// Gaussian blur kernel applied before edge detection.
pub const BLUR_KERNEL_SIZE: u32 = 5;
pub const CANNY_LOW_THRESHOLD: f32 = 0.0;
pub const CANNY_HIGH_THRESHOLD: f32 = 50.0;

/// Polygon approximation tolerance as a fraction of contour perimeter.
pub const APPROX_EPSILON_FRACTION: f64 = 0.02;

pub const GLOBAL_THRESHOLD_LEVEL: u8 = 127;
pub const ADAPTIVE_BLOCK_SIZE: u32 = 11;
pub const ADAPTIVE_OFFSET: i32 = 2;

pub const OUTLINE_COLOR: [u8; 3] = [0, 255, 0];
pub const OUTLINE_THICKNESS: u32 = 2;

/// Neighbourhood statistic used by an adaptive threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdaptiveMethod {
    /// Flat mean over the block.
    Mean,
    /// Gaussian-weighted mean over the block.
    Gaussian,
}

/// The four binarized renderings produced from every rectified page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdVariant {
    Binary,
    Mean,
    Gaussian,
    Otsu,
}

impl ThresholdVariant {
    pub const ALL: [ThresholdVariant; 4] = [Self::Binary, Self::Mean, Self::Gaussian, Self::Otsu];

    /// The adaptive statistic this variant uses, if it is adaptive.
    pub fn adaptive_method(&self) -> Option<AdaptiveMethod> {
        match self {
            Self::Mean => Some(AdaptiveMethod::Mean),
            Self::Gaussian => Some(AdaptiveMethod::Gaussian),
            Self::Binary | Self::Otsu => None,
        }
    }
}

/// Size of the normalisation canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        }
    }
}

/// Noise suppression and edge detection parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Side of the square Gaussian blur kernel (odd).
    pub blur_kernel: u32,
    /// Canny hysteresis low threshold.
    pub canny_low: f32,
    /// Canny hysteresis high threshold.
    pub canny_high: f32,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            blur_kernel: BLUR_KERNEL_SIZE,
            canny_low: CANNY_LOW_THRESHOLD,
            canny_high: CANNY_HIGH_THRESHOLD,
        }
    }
}

/// Quadrilateral search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    /// Approximation tolerance as a fraction of each contour's perimeter.
    pub epsilon_fraction: f64,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            epsilon_fraction: APPROX_EPSILON_FRACTION,
        }
    }
}

/// Binarization parameters shared by the four threshold variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Fixed cutoff for the global binary variant.
    pub global_level: u8,
    /// Side of the adaptive neighbourhood (odd).
    pub block_size: u32,
    /// Constant subtracted from the local statistic.
    pub offset: i32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            global_level: GLOBAL_THRESHOLD_LEVEL,
            block_size: ADAPTIVE_BLOCK_SIZE,
            offset: ADAPTIVE_OFFSET,
        }
    }
}

/// How the accepted quadrilateral is drawn on the diagnostic outline image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineStyle {
    /// RGB colour of the outline.
    pub color: [u8; 3],
    /// Line thickness in pixels.
    pub thickness: u32,
}

impl Default for OutlineStyle {
    fn default() -> Self {
        Self {
            color: OUTLINE_COLOR,
            thickness: OUTLINE_THICKNESS,
        }
    }
}

/// Complete pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Every input is resized to exactly this canvas first.
    pub canvas: CanvasSize,
    /// Side length of the square rectified output.
    pub rectified_size: u32,
    pub edges: EdgeConfig,
    pub contour: ContourConfig,
    pub threshold: ThresholdConfig,
    pub outline: OutlineStyle,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSize::default(),
            rectified_size: RECTIFIED_SIZE,
            edges: EdgeConfig::default(),
            contour: ContourConfig::default(),
            threshold: ThresholdConfig::default(),
            outline: OutlineStyle::default(),
        }
    }
}

impl ScanConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    /// The result is validated before it is returned.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every parameter is usable by the pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas.width == 0 {
            return Err(ConfigError::ZeroDimension {
                name: "canvas.width",
            });
        }
        if self.canvas.height == 0 {
            return Err(ConfigError::ZeroDimension {
                name: "canvas.height",
            });
        }
        if self.rectified_size == 0 {
            return Err(ConfigError::ZeroDimension {
                name: "rectified_size",
            });
        }
        check_kernel("edges.blur_kernel", self.edges.blur_kernel)?;
        check_kernel("threshold.block_size", self.threshold.block_size)?;

        let fraction = self.contour.epsilon_fraction;
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(ConfigError::EpsilonFraction(fraction));
        }
        let (low, high) = (self.edges.canny_low, self.edges.canny_high);
        if !low.is_finite() || !high.is_finite() || low < 0.0 || high <= 0.0 || low > high {
            return Err(ConfigError::CannyThresholds { low, high });
        }
        if self.outline.thickness == 0 {
            return Err(ConfigError::OutlineThickness);
        }
        Ok(())
    }
}

fn check_kernel(name: &'static str, value: u32) -> Result<(), ConfigError> {
    if value < 3 || value % 2 == 0 {
        return Err(ConfigError::KernelSize { name, value });
    }
    Ok(())
}
