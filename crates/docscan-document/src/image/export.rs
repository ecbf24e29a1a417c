// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artifact export — borrowed views of pipeline images and lossless PNG encoding
// for display or download.

use docscan_core::ExportError;
use image::{GrayImage, ImageFormat, RgbImage};
use tracing::debug;

/// A borrowed pipeline image, either colour or single-channel.
#[derive(Debug, Clone, Copy)]
pub enum Artifact<'a> {
    Color(&'a RgbImage),
    Gray(&'a GrayImage),
}

impl Artifact<'_> {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Color(img) => img.dimensions(),
            Self::Gray(img) => img.dimensions(),
        }
    }

    /// Number of samples per pixel (3 for colour, 1 for gray).
    pub fn channels(&self) -> u8 {
        match self {
            Self::Color(_) => 3,
            Self::Gray(_) => 1,
        }
    }

    /// Encode the artifact as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, ExportError> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        let encoded = match self {
            Self::Color(img) => img.write_to(&mut cursor, ImageFormat::Png),
            Self::Gray(img) => img.write_to(&mut cursor, ImageFormat::Png),
        };
        encoded.map_err(|err| ExportError::Encode(err.to_string()))?;
        debug!(bytes = buffer.len(), "Artifact encoded as PNG");
        Ok(buffer)
    }

    /// Write the artifact to `path` as PNG, whatever the file extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), ExportError> {
        let bytes = self.to_png_bytes()?;
        std::fs::write(path.as_ref(), bytes)?;
        Ok(())
    }
}
