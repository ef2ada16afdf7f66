//! Finder pattern detection over the contour hierarchy.
//!
//! A finder pattern binarizes to three nested borders: the dark 7x7 ring, the
//! light 5x5 gap (a hole border) and the dark 3x3 core. Candidates are root
//! contours with that nesting whose shape and area ratios look like nested squares.
use log::trace;

use super::contour::ContourTree;
use crate::config::FinderConfig;
use crate::models::FinderPatternCandidate;
use crate::utils::geometry::{min_area_rect_area, polygon_area, polygon_moments};

/// Nested-square filter over a contour tree
pub struct FinderDetector;

impl FinderDetector {
    /// Scan `tree` for nested-square candidates with outer area at least `min_area`.
    ///
    /// Candidates come out in contour-scan order; the tree is not modified.
    pub fn detect(tree: &ContourTree, min_area: f32, config: &FinderConfig) -> Vec<FinderPatternCandidate> {
        let nodes = tree.nodes();
        let mut candidates = Vec::new();

        for (i, outer) in nodes.iter().enumerate() {
            if outer.parent.is_some() {
                continue;
            }
            let Some(c) = outer.first_child else {
                continue;
            };
            let Some(g) = nodes[c].first_child else {
                continue;
            };

            let outline = outer.outline();
            let outer_area = polygon_area(&outline);
            if outer_area < min_area as f64 {
                continue;
            }

            let rect_area = min_area_rect_area(&outline);
            if rect_area <= 0.0 {
                trace!("contour {}: degenerate bounding rectangle", i);
                continue;
            }
            let squareness = outer_area / rect_area;
            if squareness < 1.0 - config.square_tolerance as f64 {
                trace!("contour {}: not square enough ({:.3})", i, squareness);
                continue;
            }

            let middle_area = polygon_area(&nodes[c].outline());
            let inner_area = polygon_area(&nodes[g].outline());
            if outer_area == 0.0 || middle_area == 0.0 {
                continue;
            }

            let middle_ratio = middle_area / outer_area;
            let inner_ratio = inner_area / middle_area;
            let tol = config.area_ratio_tolerance as f64;
            if (middle_ratio - config.middle_area_ratio as f64).abs() > tol
                || (inner_ratio - config.inner_area_ratio as f64).abs() > tol
            {
                trace!(
                    "contour {}: area ratios {:.3}/{:.3} out of range",
                    i, middle_ratio, inner_ratio
                );
                continue;
            }

            let Some(center) = polygon_moments(&outline).centroid() else {
                trace!("contour {}: zero mass", i);
                continue;
            };

            candidates.push(FinderPatternCandidate::new(center, outer_area as f32, outline));
        }

        candidates
    }
}
