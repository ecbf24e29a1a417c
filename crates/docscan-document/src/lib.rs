// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docscan-document — Page detection and rectification for Docscan.
//
// Provides image loading and normalisation, smoothing filters, and the scanning
// pipeline (contour search, corner ordering, perspective rectification, and four
// binarized renderings of the flattened page).

pub mod image;
pub mod scan;

// Re-export the primary structs so callers can use `docscan_document::ScanPipeline` etc.
pub use crate::image::export::Artifact;
pub use scan::contour::ContourSelector;
pub use scan::corners::CornerOrderer;
pub use scan::pipeline::{ScanPipeline, ScanResult};
pub use scan::rectify::{PerspectiveRectifier, Rectified};
pub use scan::threshold::{Binarizer, Thresholds};
