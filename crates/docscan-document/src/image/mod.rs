// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding, canvas normalisation, smoothing kernels, and PNG export.

pub mod export;
pub mod filter;
pub mod loader;

pub use export::Artifact;
