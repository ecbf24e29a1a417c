// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Separable smoothing kernels shared by the pre-edge blur and the adaptive
// thresholds. Borders are padded by continuity (edge replication).

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::filter::separable_filter_equal;

/// Single-channel floating-point image holding smoothed intensities.
pub type SmoothedImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Sigma implied by a Gaussian kernel size when none is given explicitly.
///
/// Gives 1.1 for a 5-tap kernel and 2.0 for an 11-tap kernel.
pub fn default_sigma(size: u32) -> f32 {
    0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalised 1-D Gaussian kernel of odd length `size`.
pub fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    let radius = (size / 2) as i32;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Normalised 1-D flat kernel of length `size`.
pub fn box_kernel(size: u32) -> Vec<f32> {
    vec![1.0 / size as f32; size as usize]
}

/// Convolve `gray` with `kernel` along both axes, keeping full precision.
pub fn smooth(gray: &GrayImage, kernel: &[f32]) -> SmoothedImage {
    let precise: SmoothedImage =
        ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
            Luma([gray.get_pixel(x, y).0[0] as f32])
        });
    separable_filter_equal(&precise, kernel)
}

/// Round smoothed intensities back to 8 bits.
pub fn quantize(smoothed: &SmoothedImage) -> GrayImage {
    ImageBuffer::from_fn(smoothed.width(), smoothed.height(), |x, y| {
        let value = smoothed.get_pixel(x, y).0[0];
        Luma([value.round().clamp(0.0, 255.0) as u8])
    })
}

/// Square Gaussian blur with a `size` x `size` kernel and the default sigma.
pub fn gaussian_blur(gray: &GrayImage, size: u32) -> GrayImage {
    let kernel = gaussian_kernel(size, default_sigma(size));
    quantize(&smooth(gray, &kernel))
}
