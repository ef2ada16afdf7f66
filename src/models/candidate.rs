use serde::{Deserialize, Serialize};

use super::Point;
use crate::utils::geometry::polygon_moments;

/// One detected nested-square finder pattern.
///
/// `outline` is an implicitly closed polygon (the last point connects back to
/// the first) in original-image coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinderPatternCandidate {
    /// Area-weighted centroid of the outer outline
    pub center: Point,
    /// Enclosed area of the outer outline, in original-image pixels
    pub area: f32,
    /// Outer contour vertices
    pub outline: Vec<Point>,
}

impl FinderPatternCandidate {
    /// Create a candidate from already-validated parts
    pub fn new(center: Point, area: f32, outline: Vec<Point>) -> Self {
        Self {
            center,
            area,
            outline,
        }
    }

    /// Map a candidate found on a frame resized by `factor` back to the source frame
    pub fn unscaled(&self, factor: f32) -> Self {
        Self {
            center: self.center.unscale(factor),
            area: self.area / (factor * factor),
            outline: self.outline.iter().map(|p| p.unscale(factor)).collect(),
        }
    }

    /// Centroid recomputed from the outline moments, `None` for a massless outline
    pub fn outline_centroid(&self) -> Option<Point> {
        let m = polygon_moments(&self.outline);
        m.centroid()
    }
}
