//! Finder pattern detection modules
//!
//! This module contains the detection half of the pipeline:
//! - Contour hierarchy extraction from a binary mask
//! - Nested-square finder pattern filtering
//! - Multi-scale search over resized copies of the frame
//! - Duplicate suppression across passes

/// Border following into a parent/child/sibling contour tree
pub mod contour;
/// Duplicate suppression (greedy or clustered)
pub mod dedup;
/// Finder pattern shape filter over the contour tree
pub mod finder;
/// Multi-scale orchestration and coordinate mapping
pub mod pyramid;
