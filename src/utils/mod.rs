//! Utility functions for image processing
//!
//! This module provides helper functions for finder pattern detection:
//! - Grayscale conversion (BGR/RGB to luminance)
//! - Contrast limited adaptive histogram equalization
//! - Adaptive mean binarization
//! - Polygon geometry (moments, convex hull, minimum-area rectangle)

pub mod binarization;
pub mod clahe;
pub mod geometry;
pub mod grayscale;
