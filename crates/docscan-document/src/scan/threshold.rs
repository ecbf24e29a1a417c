// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Binarization — global, mean-adaptive, Gaussian-adaptive, and Otsu renderings
// of a rectified page. Every output pixel is either 0 or 255.

use docscan_core::config::{AdaptiveMethod, ThresholdConfig, ThresholdVariant};
use image::{GrayImage, Luma};
use tracing::{debug, info, instrument};

use crate::image::filter;

const BLACK: Luma<u8> = Luma([0]);
const WHITE: Luma<u8> = Luma([255]);

/// The four binarized views of one page.
#[derive(Debug, Clone)]
pub struct Thresholds {
    pub binary: GrayImage,
    pub mean: GrayImage,
    pub gaussian: GrayImage,
    pub otsu: GrayImage,
}

impl Thresholds {
    pub fn get(&self, variant: ThresholdVariant) -> &GrayImage {
        match variant {
            ThresholdVariant::Binary => &self.binary,
            ThresholdVariant::Mean => &self.mean,
            ThresholdVariant::Gaussian => &self.gaussian,
            ThresholdVariant::Otsu => &self.otsu,
        }
    }
}

/// Produces black-and-white renderings of a grayscale page.
///
/// The four variants are independent views of the same input; none reads
/// another's output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Binarizer {
    config: ThresholdConfig,
}

impl Binarizer {
    pub fn new(config: ThresholdConfig) -> Self {
        Self { config }
    }

    /// Compute all four variants.
    #[instrument(skip_all, fields(width = gray.width(), height = gray.height()))]
    pub fn binarize_all(&self, gray: &GrayImage) -> Thresholds {
        let thresholds = Thresholds {
            binary: self.binarize(gray, ThresholdVariant::Binary),
            mean: self.binarize(gray, ThresholdVariant::Mean),
            gaussian: self.binarize(gray, ThresholdVariant::Gaussian),
            otsu: self.binarize(gray, ThresholdVariant::Otsu),
        };
        info!("Binarization complete");
        thresholds
    }

    /// Compute a single variant.
    pub fn binarize(&self, gray: &GrayImage, variant: ThresholdVariant) -> GrayImage {
        if let Some(method) = variant.adaptive_method() {
            return self.adaptive(gray, method);
        }
        let level = if variant == ThresholdVariant::Otsu {
            let level = otsu_threshold(gray);
            debug!(level, "Otsu threshold computed");
            level
        } else {
            self.config.global_level
        };
        global_threshold(gray, level)
    }

    /// Adaptive thresholding: a pixel is white when it is brighter than the
    /// local statistic of its `block_size` x `block_size` neighbourhood minus
    /// `offset`.
    pub fn adaptive(&self, gray: &GrayImage, method: AdaptiveMethod) -> GrayImage {
        let block = self.config.block_size;
        let kernel = match method {
            AdaptiveMethod::Mean => filter::box_kernel(block),
            AdaptiveMethod::Gaussian => {
                filter::gaussian_kernel(block, filter::default_sigma(block))
            }
        };
        let local = filter::quantize(&filter::smooth(gray, &kernel));
        debug!(?method, block, offset = self.config.offset, "Applying adaptive threshold");

        let offset = self.config.offset;
        GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            let value = gray.get_pixel(x, y).0[0] as i32;
            let cutoff = local.get_pixel(x, y).0[0] as i32 - offset;
            if value > cutoff { WHITE } else { BLACK }
        })
    }
}

/// Pixels strictly above `level` become white; the rest black.
pub fn global_threshold(gray: &GrayImage, level: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y).0[0] > level {
            WHITE
        } else {
            BLACK
        }
    })
}

/// Compute the Otsu threshold for a grayscale image.
///
/// Returns the level `t` maximising the between-class variance when the lower
/// class holds every intensity up to and including `t`.
pub fn otsu_threshold(gray: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total_pixels = gray.width() as u64 * gray.height() as u64;
    if total_pixels == 0 {
        return 0;
    }

    let mut sum_total: f64 = 0.0;
    for (i, &count) in histogram.iter().enumerate() {
        sum_total += i as f64 * count as f64;
    }

    let mut sum_background: f64 = 0.0;
    let mut weight_background: u64 = 0;
    let mut max_variance: f64 = 0.0;
    let mut best_threshold: u8 = 0;

    for (t, &count) in histogram.iter().enumerate() {
        weight_background += count;
        sum_background += t as f64 * count as f64;
        if weight_background == 0 {
            continue;
        }
        let weight_foreground = total_pixels - weight_background;
        if weight_foreground == 0 {
            break;
        }

        let mean_background = sum_background / weight_background as f64;
        let mean_foreground = (sum_total - sum_background) / weight_foreground as f64;

        let between_variance = weight_background as f64
            * weight_foreground as f64
            * (mean_background - mean_foreground).powi(2);

        if between_variance > max_variance {
            max_variance = between_variance;
            best_threshold = t as u8;
        }
    }

    best_threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_two_valued(img: &GrayImage) -> bool {
        img.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255)
    }

    /// A page-like test image: light paper with dark "text" strokes and a
    /// lighting gradient.
    fn page(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            let paper = 170 + (x * 60 / width) as u8;
            if (y % 12 < 2) && (x % 40 > 5) {
                Luma([paper / 4])
            } else {
                Luma([paper])
            }
        })
    }

    #[test]
    fn all_variants_are_two_valued_and_same_size() {
        let gray = page(96, 80);
        let out = Binarizer::default().binarize_all(&gray);
        for variant in ThresholdVariant::ALL {
            let img = out.get(variant);
            assert_eq!(img.dimensions(), (96, 80), "{variant:?}");
            assert!(is_two_valued(img), "{variant:?} is not binary");
        }
    }

    #[test]
    fn global_threshold_is_strictly_above_level() {
        let gray = GrayImage::from_fn(3, 1, |x, _| Luma([126 + x as u8]));
        let out = global_threshold(&gray, 127);
        assert_eq!(out.as_raw(), &vec![0, 0, 255]);
    }

    #[test]
    fn otsu_splits_bimodal_histogram() {
        let gray = GrayImage::from_fn(20, 10, |x, _| if x < 10 { Luma([40]) } else { Luma([200]) });
        let level = otsu_threshold(&gray);
        assert!((40..200).contains(&level), "level {level}");

        let out = Binarizer::default().binarize(&gray, ThresholdVariant::Otsu);
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
        assert_eq!(out.get_pixel(19, 9).0[0], 255);
    }

    #[test]
    fn otsu_on_uniform_image_is_zero() {
        let gray = GrayImage::from_pixel(8, 8, Luma([90]));
        assert_eq!(otsu_threshold(&gray), 0);
    }

    #[test]
    fn adaptive_uniform_region_is_white() {
        // value > mean - offset holds everywhere on a flat image.
        let gray = GrayImage::from_pixel(30, 30, Luma([60]));
        let binarizer = Binarizer::default();
        for method in [AdaptiveMethod::Mean, AdaptiveMethod::Gaussian] {
            let out = binarizer.adaptive(&gray, method);
            assert!(out.pixels().all(|p| p.0[0] == 255), "{method:?}");
        }
    }

    #[test]
    fn adaptive_marks_dark_stroke_black() {
        let mut gray = GrayImage::from_pixel(31, 31, Luma([200]));
        for x in 0..31 {
            gray.put_pixel(x, 15, Luma([30]));
        }
        let binarizer = Binarizer::default();
        for method in [AdaptiveMethod::Mean, AdaptiveMethod::Gaussian] {
            let out = binarizer.adaptive(&gray, method);
            assert_eq!(out.get_pixel(15, 15).0[0], 0, "{method:?}");
            assert_eq!(out.get_pixel(15, 2).0[0], 255, "{method:?}");
        }
    }

    #[test]
    fn adaptive_variants_use_their_own_statistic() {
        let gray = page(64, 48);
        let binarizer = Binarizer::default();
        assert_eq!(
            binarizer.binarize(&gray, ThresholdVariant::Mean),
            binarizer.adaptive(&gray, AdaptiveMethod::Mean)
        );
        assert_eq!(
            binarizer.binarize(&gray, ThresholdVariant::Gaussian),
            binarizer.adaptive(&gray, AdaptiveMethod::Gaussian)
        );
        assert_eq!(
            binarizer.binarize(&gray, ThresholdVariant::Binary),
            global_threshold(&gray, 127)
        );
    }

    #[test]
    fn adaptive_ignores_lighting_gradient_that_global_misreads() {
        // Dark half of a page whose "paper" is below the global level.
        let gray = GrayImage::from_fn(40, 40, |x, y| {
            let paper = 90 + x as u8;
            if y == 20 { Luma([paper - 60]) } else { Luma([paper]) }
        });
        let binarizer = Binarizer::default();
        let global = binarizer.binarize(&gray, ThresholdVariant::Binary);
        let mean = binarizer.binarize(&gray, ThresholdVariant::Mean);
        assert_eq!(global.get_pixel(5, 5).0[0], 0);
        assert_eq!(mean.get_pixel(5, 5).0[0], 255);
        assert_eq!(mean.get_pixel(5, 20).0[0], 0);
    }
}
