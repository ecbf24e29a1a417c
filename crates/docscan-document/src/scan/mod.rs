// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanning pipeline — quadrilateral search, corner ordering, perspective
// rectification, and binarization.

pub mod contour;
pub mod corners;
pub mod pipeline;
pub mod rectify;
pub mod threshold;

pub use pipeline::{ScanPipeline, ScanResult};
