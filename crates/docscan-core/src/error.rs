// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Docscan.

use thiserror::Error;

/// Errors raised by a scan. These are the only two outcomes other than success.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The input could not be decoded into an image (missing file, corrupt
    /// data, unsupported format).
    #[error("could not load image: {0}")]
    LoadFailure(String),

    /// No contour in the frame approximates to a usable four-corner boundary.
    #[error("no document found: {0}")]
    NoDocumentFound(String),
}

/// Rejected configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be an odd number of at least 3, got {value}")]
    KernelSize { name: &'static str, value: u32 },

    #[error("{name} must be non-zero")]
    ZeroDimension { name: &'static str },

    #[error("contour epsilon fraction must lie in (0, 1), got {0}")]
    EpsilonFraction(f64),

    #[error("canny thresholds must be finite with 0 <= low <= high and high > 0 (got low {low}, high {high})")]
    CannyThresholds { low: f32, high: f32 },

    #[error("outline thickness must be at least 1")]
    OutlineThickness,

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failures while writing artifacts out for display or download.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias used throughout the scan pipeline.
pub type Result<T> = std::result::Result<T, ScanError>;
