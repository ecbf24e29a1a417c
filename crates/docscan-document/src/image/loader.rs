// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image loading and canvas normalisation. Every decoded input becomes an 8-bit
// RGB buffer resized to the configured canvas before any detection runs.

use docscan_core::ScanError;
use docscan_core::config::CanvasSize;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use tracing::{debug, info, instrument};

/// Decode an image file into 8-bit RGB.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_path(path: impl AsRef<std::path::Path>) -> Result<RgbImage, ScanError> {
    let img = image::open(path.as_ref()).map_err(|err| {
        ScanError::LoadFailure(format!(
            "failed to open {}: {}",
            path.as_ref().display(),
            err
        ))
    })?;
    info!(width = img.width(), height = img.height(), "Image loaded");
    Ok(img.to_rgb8())
}

/// Decode raw encoded bytes (JPEG, PNG, etc.) into 8-bit RGB.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn load_bytes(data: &[u8]) -> Result<RgbImage, ScanError> {
    let img = image::load_from_memory(data)
        .map_err(|err| ScanError::LoadFailure(format!("failed to decode image: {}", err)))?;
    debug!(
        width = img.width(),
        height = img.height(),
        "Image decoded from bytes"
    );
    Ok(img.to_rgb8())
}

/// Convert an already-decoded image of any colour type to 8-bit RGB.
pub fn to_rgb(image: &DynamicImage) -> RgbImage {
    image.to_rgb8()
}

/// Resize to exactly the canvas, ignoring aspect ratio, with bilinear filtering.
/// An image already at canvas size is returned as-is.
#[instrument(skip(image), fields(from_w = image.width(), from_h = image.height()))]
pub fn normalize(image: RgbImage, canvas: CanvasSize) -> RgbImage {
    if image.dimensions() == (canvas.width, canvas.height) {
        debug!("Image already at canvas size");
        return image;
    }
    let resized = image::imageops::resize(&image, canvas.width, canvas.height, FilterType::Triangle);
    debug!(
        new_w = resized.width(),
        new_h = resized.height(),
        "Normalised to canvas"
    );
    resized
}
