//! qr_guidance - camera alignment guidance from QR finder patterns
//!
//! Locates the three nested-square finder patterns of a QR-style marker in a
//! camera frame, merges duplicates found across resolutions and tells the user
//! how to move the camera ("Move Closer", "Move Camera UP", "Rotate Camera
//! RIGHT", ...). When the patterns cover a plausible area, an external payload
//! decoder is invoked.
//!
//! ```no_run
//! use qr_guidance::{ChannelOrder, Frame, NoDecoder, ScanConfig, Scanner};
//!
//! let (width, height) = (640, 480);
//! let mut pixels = vec![255u8; width * height * 3];
//! let mut frame = Frame::new(&mut pixels, width, height, ChannelOrder::Bgr).unwrap();
//! let scanner = Scanner::new(ScanConfig::default());
//! let report = scanner.process_frame(&mut frame, &mut NoDecoder);
//! println!("{}", report.headline());
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Display-side color conversion of annotated frames
pub mod bridge;
/// Tunable thresholds ([`ScanConfig`])
pub mod config;
/// Area-gated payload decoder hand-off
pub mod decode;
/// Finder pattern detection (contours, shape filter, multi-scale search, dedup)
pub mod detector;
/// Error types
pub mod error;
/// Guidance decisions and overlay rendering
pub mod guidance;
/// Core data structures (Frame, BitMatrix, Point, candidates)
pub mod models;
/// Decoded marker text classification
pub mod payload;
/// Color frame to binary mask
pub mod preprocess;
/// File I/O helpers and synthetic fixtures for the CLI, benches and tests
pub mod tools;
/// Image processing primitives (grayscale, CLAHE, thresholding, geometry)
pub mod utils;

pub use config::ScanConfig;
pub use decode::{NoDecoder, PayloadDecoder};
pub use error::{FrameError, ToolError};
pub use guidance::{GuidanceDecision, GuidanceStatus};
pub use models::{BitMatrix, ChannelOrder, FinderPatternCandidate, Frame, Point};

use log::debug;
use serde::Serialize;

use decode::DecodeTrigger;
use detector::dedup::dedupe;
use detector::pyramid;
use guidance::GuidanceEngine;

/// Banner shown after a successful decode
pub const DECODED_BANNER: &str = "DECODED!";

/// Result of one [`Scanner::process_frame`] call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    /// Payload text, if the decoder was invoked and found one
    pub decoded: Option<String>,
    /// Guidance for this frame; `None` when the frame was empty
    pub decision: Option<GuidanceDecision>,
    /// Deduplicated finder patterns, in original-image coordinates
    pub candidates: Vec<FinderPatternCandidate>,
}

impl FrameReport {
    fn empty() -> Self {
        Self {
            decoded: None,
            decision: None,
            candidates: Vec::new(),
        }
    }

    /// Decoded text, empty when nothing was decoded
    pub fn decoded_text(&self) -> &str {
        self.decoded.as_deref().unwrap_or("")
    }

    /// Primary guidance line, empty for an empty frame
    pub fn headline(&self) -> &'static str {
        self.decision.as_ref().map(|d| d.status.headline()).unwrap_or("")
    }
}

/// Per-frame detection and guidance pipeline.
///
/// Holds only immutable configuration; every call is independent, so one
/// scanner may serve frames from several threads.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: ScanConfig,
    guidance: GuidanceEngine,
    trigger: DecodeTrigger,
}

impl Scanner {
    /// Create a scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        Self {
            guidance: GuidanceEngine::new(config.guidance),
            trigger: DecodeTrigger::new(config.decode),
            config,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// All candidates across scale passes, before deduplication
    pub fn locate(&self, frame: &Frame<'_>) -> Vec<FinderPatternCandidate> {
        pyramid::locate(frame, &self.config)
    }

    /// Deduplicated finder patterns
    pub fn detect(&self, frame: &Frame<'_>) -> Vec<FinderPatternCandidate> {
        dedupe(self.locate(frame), &self.config.dedup)
    }

    /// Guidance for a frame without touching its pixels
    pub fn guide(&self, frame: &Frame<'_>) -> GuidanceDecision {
        let candidates = self.detect(frame);
        self.guidance.guide(frame.width(), frame.height(), &candidates)
    }

    /// locate → dedupe → guide → decode → render.
    ///
    /// The decoder sees the frame before any overlay is drawn. Overlays are
    /// painted in place when `render_overlay` is set. An empty frame is a no-op.
    pub fn process_frame<D>(&self, frame: &mut Frame<'_>, decoder: &mut D) -> FrameReport
    where
        D: PayloadDecoder + ?Sized,
    {
        if frame.is_empty() {
            return FrameReport::empty();
        }

        let candidates = self.detect(frame);
        let mut decision = self.guidance.guide(frame.width(), frame.height(), &candidates);
        let decoded = self.trigger.run(frame, &candidates, decoder);
        if decoded.is_some() {
            decision.overlay.banner = Some(DECODED_BANNER.to_string());
        }

        debug!(
            "frame {}x{}: {} patterns, status {:?}",
            frame.width(),
            frame.height(),
            candidates.len(),
            decision.status
        );

        if self.config.render_overlay {
            guidance::render(&decision.overlay, frame);
        }

        FrameReport {
            decoded,
            decision: Some(decision),
            candidates,
        }
    }
}
