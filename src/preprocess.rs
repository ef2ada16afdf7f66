//! Color frame → binary mask.
//!
//! Intensity, then CLAHE, then inverted adaptive mean threshold: dark marker
//! ink becomes foreground. Which parameter set applies is picked by the
//! [`Preprocessor`] variant the orchestrator selects for its pass.
use crate::config::{PreprocessConfig, ScanConfig};
use crate::models::{BitMatrix, Frame};
use crate::utils::binarization::adaptive_binarize;
use crate::utils::clahe::clahe;

/// Named preprocessing configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preprocessor {
    /// Original resolution
    Standard,
    /// Image enlarged by the upscale factor; larger threshold block
    Upscaled,
    /// Image shrunk by the downscale factor
    Downscaled,
}

impl Preprocessor {
    /// Parameter set this variant reads from `config`
    pub fn params<'c>(&self, config: &'c ScanConfig) -> &'c PreprocessConfig {
        match self {
            Preprocessor::Standard => &config.standard,
            Preprocessor::Upscaled => &config.upscaled,
            Preprocessor::Downscaled => &config.downscaled,
        }
    }

    /// Binarize a frame at its own resolution
    pub fn apply(&self, frame: &Frame<'_>, config: &ScanConfig) -> BitMatrix {
        let gray = frame.luma();
        self.apply_gray(&gray, frame.width(), frame.height(), config)
    }

    /// Binarize an already-converted intensity image
    pub fn apply_gray(&self, gray: &[u8], width: usize, height: usize, config: &ScanConfig) -> BitMatrix {
        binarize_with(gray, width, height, self.params(config))
    }
}

/// CLAHE followed by adaptive threshold; the mask has the input's dimensions
pub fn binarize_with(gray: &[u8], width: usize, height: usize, params: &PreprocessConfig) -> BitMatrix {
    let equalized = clahe(
        gray,
        width,
        height,
        params.clahe_tiles_x,
        params.clahe_tiles_y,
        params.clahe_clip_limit,
    );
    adaptive_binarize(&equalized, width, height, params.block_size, params.offset)
}
