//! Multi-scale finder pattern search
//!
//! Runs preprocess → contours → detect at native resolution, then on a resized
//! copy of the intensity image when the native pass under-detects. Candidates
//! from resized passes are mapped back to original-image coordinates before
//! they leave this module.
use image::imageops::{self, FilterType};
use image::GrayImage;
use log::debug;

use super::contour::extract_contours;
use super::finder::FinderDetector;
use crate::config::ScanConfig;
use crate::models::{FinderPatternCandidate, Frame};
use crate::preprocess::Preprocessor;

/// One resolution level of the search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalePass {
    /// Preprocessing variant for this level
    pub preprocessor: Preprocessor,
    /// Resize factor relative to the original image (1.0 = native)
    pub factor: f32,
    /// Minimum outer area, in this level's pixels
    pub min_area: f32,
}

impl ScalePass {
    /// Native-resolution pass
    pub fn original(config: &ScanConfig) -> Self {
        Self {
            preprocessor: Preprocessor::Standard,
            factor: 1.0,
            min_area: config.finder.min_area_original,
        }
    }

    /// Enlarged pass for small or distant markers
    pub fn upscaled(config: &ScanConfig) -> Self {
        Self {
            preprocessor: Preprocessor::Upscaled,
            factor: config.upscale_factor,
            min_area: config.finder.min_area_upscaled,
        }
    }

    /// Shrunk pass for markers so close their modules outgrow the threshold block
    pub fn downscaled(config: &ScanConfig) -> Option<Self> {
        config.downscale_factor.map(|factor| Self {
            preprocessor: Preprocessor::Downscaled,
            factor,
            min_area: config.finder.min_area_downscaled,
        })
    }

    /// Single pass at an arbitrary `factor`; the preprocessing variant and minimum
    /// area follow the direction of the resize (above 1 upscaled, below 1 downscaled)
    pub fn at(config: &ScanConfig, factor: f32) -> Self {
        let (preprocessor, min_area) = if factor > 1.0 {
            (Preprocessor::Upscaled, config.finder.min_area_upscaled)
        } else if factor < 1.0 {
            (Preprocessor::Downscaled, config.finder.min_area_downscaled)
        } else {
            (Preprocessor::Standard, config.finder.min_area_original)
        };
        Self {
            preprocessor,
            factor,
            min_area,
        }
    }

    /// Map a coordinate on this level back to the original image
    pub fn map_to_original(&self, x: f32, y: f32) -> (f32, f32) {
        (x / self.factor, y / self.factor)
    }

    /// Detect on `gray` (original resolution) at this level.
    ///
    /// Results are already in original-image coordinates. A level whose resized
    /// image would be empty, or whose factor is not a positive finite number,
    /// yields nothing.
    pub fn run(&self, gray: &[u8], width: usize, height: usize, config: &ScanConfig) -> Vec<FinderPatternCandidate> {
        if !self.factor.is_finite() || self.factor <= 0.0 {
            debug!("skipping pass with invalid factor {}", self.factor);
            return Vec::new();
        }

        let native = (self.factor - 1.0).abs() < f32::EPSILON;
        let resized;
        let (level, lw, lh) = if native {
            (gray, width, height)
        } else {
            match resize_gray(gray, width, height, self.factor) {
                Some((buf, w, h)) => {
                    resized = buf;
                    (resized.as_slice(), w, h)
                }
                None => return Vec::new(),
            }
        };

        let mask = self.preprocessor.apply_gray(level, lw, lh, config);
        let tree = extract_contours(&mask);
        let found = FinderDetector::detect(&tree, self.min_area, &config.finder);
        debug!(
            "{:?} pass at {}x{} ({}x): {} contours, {} candidates",
            self.preprocessor,
            lw,
            lh,
            self.factor,
            tree.len(),
            found.len()
        );

        if native {
            found
        } else {
            found.iter().map(|c| c.unscaled(self.factor)).collect()
        }
    }
}

/// Resize an intensity image by `factor` with a triangle (bilinear) filter
fn resize_gray(gray: &[u8], width: usize, height: usize, factor: f32) -> Option<(Vec<u8>, usize, usize)> {
    let new_w = (width as f32 * factor).round() as u32;
    let new_h = (height as f32 * factor).round() as u32;
    if new_w == 0 || new_h == 0 {
        return None;
    }
    let src = GrayImage::from_raw(width as u32, height as u32, gray.to_vec())?;
    let dst = imageops::resize(&src, new_w, new_h, FilterType::Triangle);
    Some((dst.into_raw(), new_w as usize, new_h as usize))
}

/// All candidates for `frame` before deduplication, in original coordinates
pub fn locate(frame: &Frame<'_>, config: &ScanConfig) -> Vec<FinderPatternCandidate> {
    if frame.is_empty() {
        return Vec::new();
    }
    let gray = frame.luma();
    locate_gray(&gray, frame.width(), frame.height(), config)
}

/// [`locate`] over an intensity image
pub fn locate_gray(gray: &[u8], width: usize, height: usize, config: &ScanConfig) -> Vec<FinderPatternCandidate> {
    let mut candidates = ScalePass::original(config).run(gray, width, height, config);

    if candidates.len() < config.min_candidates_before_upscale {
        let upscaled = ScalePass::upscaled(config).run(gray, width, height, config);
        candidates.extend(upscaled);
    }

    if candidates.len() < config.min_candidates_before_upscale {
        if let Some(pass) = ScalePass::downscaled(config) {
            candidates.extend(pass.run(gray, width, height, config));
        }
    }

    candidates
}
