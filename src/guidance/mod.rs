//! Turns deduplicated finder patterns into directional feedback.
//!
//! The engine is a pure function of the frame size and the candidate list. It
//! never draws; it returns a [`GuidanceDecision`] whose [`Overlay`] a separate
//! renderer may paint onto the frame.

/// 5x7 bitmap glyphs for overlay text
pub mod font;
/// Overlay description and rasterizer
pub mod overlay;

use serde::Serialize;

use crate::config::GuidanceConfig;
use crate::models::{FinderPatternCandidate, Point};
pub use overlay::{Overlay, render};

/// Pan instruction derived from the candidate centroid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionHint {
    /// Centroid is above the vertical dead zone
    MoveUp,
    /// Centroid is below the vertical dead zone
    MoveDown,
    /// Centroid is left of the horizontal dead zone
    MoveLeft,
    /// Centroid is right of the horizontal dead zone
    MoveRight,
    /// Centroid inside both dead zones
    Centered,
}

impl PositionHint {
    /// User-facing text
    pub fn message(&self) -> &'static str {
        match self {
            PositionHint::MoveUp => "Move Camera UP",
            PositionHint::MoveDown => "Move Camera DOWN",
            PositionHint::MoveLeft => "Move Camera LEFT",
            PositionHint::MoveRight => "Move Camera RIGHT",
            PositionHint::Centered => "Position: OK",
        }
    }
}

/// Rotation instruction derived from three finder patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleHint {
    /// Fewer than three candidates
    NeedThreeCorners,
    /// Horizontal edge too long relative to the vertical one
    RotateRight,
    /// Horizontal edge too short relative to the vertical one
    RotateLeft,
    /// Edge ratio within tolerance
    Aligned,
}

impl AngleHint {
    /// User-facing text
    pub fn message(&self) -> &'static str {
        match self {
            AngleHint::NeedThreeCorners => "Angle: Need 3 corners",
            AngleHint::RotateRight => "Rotate Camera RIGHT",
            AngleHint::RotateLeft => "Rotate Camera LEFT",
            AngleHint::Aligned => "Angle: OK",
        }
    }
}

/// Outcome of the guidance decision procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GuidanceStatus {
    /// No candidates at all
    NoCode,
    /// Candidates present but too small on average
    MoveCloser,
    /// Position assessed; angle assessed when possible.
    ///
    /// `angle` is `None` when three or more candidates exist but no triple forms a right angle.
    Aligning {
        /// Pan instruction
        position: PositionHint,
        /// Rotation instruction
        angle: Option<AngleHint>,
    },
}

impl GuidanceStatus {
    /// Status lines in display order
    pub fn messages(&self) -> Vec<&'static str> {
        match self {
            GuidanceStatus::NoCode => vec!["No QR Code Found"],
            GuidanceStatus::MoveCloser => vec!["Move Closer"],
            GuidanceStatus::Aligning { position, angle } => {
                let mut lines = vec![position.message()];
                if let Some(angle) = angle {
                    lines.push(angle.message());
                }
                lines
            }
        }
    }

    /// Primary instruction: the first status line
    pub fn headline(&self) -> &'static str {
        match self {
            GuidanceStatus::NoCode => "No QR Code Found",
            GuidanceStatus::MoveCloser => "Move Closer",
            GuidanceStatus::Aligning { position, .. } => position.message(),
        }
    }
}

/// Three finder patterns labeled by their role in the marker
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CornerTriple {
    /// Right-angle vertex
    pub top_left: Point,
    /// First hypotenuse endpoint in enumeration order
    pub top_right: Point,
    /// Second hypotenuse endpoint in enumeration order
    pub bottom_left: Point,
}

impl CornerTriple {
    /// `|TR - TL| / |BL - TL|`
    pub fn edge_ratio(&self) -> f32 {
        self.top_right.distance(&self.top_left) / self.bottom_left.distance(&self.top_left)
    }
}

/// Per-frame guidance output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuidanceDecision {
    /// What to tell the user
    pub status: GuidanceStatus,
    /// Right-angle triple used for the rotation check, if any
    pub corners: Option<CornerTriple>,
    /// Primitives to draw
    pub overlay: Overlay,
}

/// Guidance decision procedure
#[derive(Debug, Clone, Default)]
pub struct GuidanceEngine {
    config: GuidanceConfig,
}

impl GuidanceEngine {
    /// Engine with the given thresholds
    pub fn new(config: GuidanceConfig) -> Self {
        Self { config }
    }

    /// Thresholds in use
    pub fn config(&self) -> &GuidanceConfig {
        &self.config
    }

    /// Decide what to tell the user for a `width x height` frame.
    ///
    /// Outlines for every candidate are always part of the overlay.
    pub fn guide(&self, width: usize, height: usize, candidates: &[FinderPatternCandidate]) -> GuidanceDecision {
        let mut overlay = Overlay {
            outlines: candidates.iter().map(|c| c.outline.clone()).collect(),
            ..Overlay::default()
        };

        let (status, corners) = self.decide(width, height, candidates, &mut overlay);
        if let Some(triple) = corners {
            overlay.guide_lines.push((triple.top_left, triple.top_right));
            overlay.guide_lines.push((triple.top_left, triple.bottom_left));
        }
        overlay.messages = status.messages().into_iter().map(String::from).collect();

        GuidanceDecision {
            status,
            corners,
            overlay,
        }
    }

    fn decide(
        &self,
        width: usize,
        height: usize,
        candidates: &[FinderPatternCandidate],
        overlay: &mut Overlay,
    ) -> (GuidanceStatus, Option<CornerTriple>) {
        if candidates.is_empty() {
            return (GuidanceStatus::NoCode, None);
        }

        let mean_area = candidates.iter().map(|c| c.area).sum::<f32>() / candidates.len() as f32;
        if mean_area < self.config.min_guidance_area {
            return (GuidanceStatus::MoveCloser, None);
        }

        let Some(centroid) = Point::centroid(candidates.iter().map(|c| &c.center)) else {
            return (GuidanceStatus::NoCode, None);
        };
        overlay.target = Some(centroid);
        let position = self.position_hint(width, height, centroid);

        if candidates.len() < 3 {
            let angle = Some(AngleHint::NeedThreeCorners);
            return (GuidanceStatus::Aligning { position, angle }, None);
        }

        let corners = self.find_corners(candidates);
        let angle = corners.as_ref().map(|t| self.angle_hint(t));
        (GuidanceStatus::Aligning { position, angle }, corners)
    }

    /// Pan instruction for a centroid; vertical offsets take precedence
    pub fn position_hint(&self, width: usize, height: usize, centroid: Point) -> PositionHint {
        let dx = width as f32 / 2.0 - centroid.x;
        let dy = height as f32 / 2.0 - centroid.y;
        let dead_x = width as f32 * self.config.dead_zone_fraction;
        let dead_y = height as f32 * self.config.dead_zone_fraction;

        if dy > dead_y {
            PositionHint::MoveUp
        } else if dy < -dead_y {
            PositionHint::MoveDown
        } else if dx > dead_x {
            PositionHint::MoveLeft
        } else if dx < -dead_x {
            PositionHint::MoveRight
        } else {
            PositionHint::Centered
        }
    }

    /// Rotation instruction from a labeled triple
    pub fn angle_hint(&self, triple: &CornerTriple) -> AngleHint {
        let ratio = triple.edge_ratio();
        if ratio > 1.0 + self.config.rotation_tolerance {
            AngleHint::RotateRight
        } else if ratio < 1.0 - self.config.rotation_tolerance {
            AngleHint::RotateLeft
        } else {
            AngleHint::Aligned
        }
    }

    /// First triple, in `i < j < k` order, that forms a near-right angle.
    ///
    /// Early exit: a better-fitting triple later in the enumeration is never considered.
    pub fn find_corners(&self, candidates: &[FinderPatternCandidate]) -> Option<CornerTriple> {
        let n = candidates.len();
        for i in 0..n {
            for j in i + 1..n {
                for k in j + 1..n {
                    let triple = label_triple(candidates[i].center, candidates[j].center, candidates[k].center);
                    if let Some(triple) = triple {
                        if self.is_right_angle(&triple) {
                            return Some(triple);
                        }
                    }
                }
            }
        }
        None
    }

    fn is_right_angle(&self, triple: &CornerTriple) -> bool {
        let leg_h = triple.top_right.distance_squared(&triple.top_left);
        let leg_v = triple.bottom_left.distance_squared(&triple.top_left);
        let hyp = triple.top_right.distance_squared(&triple.bottom_left);
        if leg_h <= 0.0 || leg_v <= 0.0 || hyp <= 0.0 {
            return false;
        }
        (hyp - (leg_h + leg_v)).abs() / hyp < self.config.angle_tolerance
    }
}

/// Treat the longest side as the hypotenuse; its opposite vertex is the top-left.
///
/// Ties go to the earlier side in `(a,b)`, `(b,c)`, `(a,c)` order. Hypotenuse
/// endpoints keep their input order as top-right then bottom-left.
fn label_triple(a: Point, b: Point, c: Point) -> Option<CornerTriple> {
    let d_ab = a.distance_squared(&b);
    let d_bc = b.distance_squared(&c);
    let d_ac = a.distance_squared(&c);
    if !(d_ab.is_finite() && d_bc.is_finite() && d_ac.is_finite()) {
        return None;
    }

    let (top_left, top_right, bottom_left) = if d_ab >= d_bc && d_ab >= d_ac {
        (c, a, b)
    } else if d_bc >= d_ac {
        (a, b, c)
    } else {
        (b, a, c)
    };
    Some(CornerTriple {
        top_left,
        top_right,
        bottom_left,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, y: f32, area: f32) -> FinderPatternCandidate {
        let h = area.sqrt() / 2.0;
        FinderPatternCandidate::new(
            Point::new(x, y),
            area,
            vec![
                Point::new(x - h, y - h),
                Point::new(x - h, y + h),
                Point::new(x + h, y + h),
                Point::new(x + h, y - h),
            ],
        )
    }

    fn engine() -> GuidanceEngine {
        GuidanceEngine::new(GuidanceConfig::default())
    }

    #[test]
    fn test_no_candidates() {
        let d = engine().guide(640, 480, &[]);
        assert_eq!(d.status, GuidanceStatus::NoCode);
        assert_eq!(d.overlay.messages, vec!["No QR Code Found"]);
        assert!(d.overlay.outlines.is_empty());
        assert!(d.overlay.target.is_none());
    }

    #[test]
    fn test_small_candidate_says_move_closer() {
        // Far off-center, but size is checked first
        let d = engine().guide(640, 480, &[at(10.0, 10.0, 100.0)]);
        assert_eq!(d.status, GuidanceStatus::MoveCloser);
        assert_eq!(d.status.headline(), "Move Closer");
        assert_eq!(d.overlay.outlines.len(), 1);
        assert!(d.overlay.target.is_none());
    }

    #[test]
    fn test_centered_single_candidate() {
        let d = engine().guide(640, 480, &[at(320.0, 240.0, 900.0)]);
        assert_eq!(
            d.status,
            GuidanceStatus::Aligning {
                position: PositionHint::Centered,
                angle: Some(AngleHint::NeedThreeCorners),
            }
        );
        assert_eq!(d.overlay.messages, vec!["Position: OK", "Angle: Need 3 corners"]);
        assert_eq!(d.overlay.target, Some(Point::new(320.0, 240.0)));
        assert!(d.overlay.guide_lines.is_empty());
    }

    #[test]
    fn test_vertical_wins_over_horizontal() {
        // Up-left of center beyond both dead zones
        let d = engine().guide(640, 480, &[at(100.0, 50.0, 900.0)]);
        assert_eq!(d.status.headline(), "Move Camera UP");

        let d = engine().guide(640, 480, &[at(600.0, 460.0, 900.0)]);
        assert_eq!(d.status.headline(), "Move Camera DOWN");
    }

    #[test]
    fn test_horizontal_hints() {
        let e = engine();
        assert_eq!(e.position_hint(640, 480, Point::new(100.0, 240.0)), PositionHint::MoveLeft);
        assert_eq!(e.position_hint(640, 480, Point::new(600.0, 240.0)), PositionHint::MoveRight);
        // Exactly on the dead-zone edge is still inside
        assert_eq!(e.position_hint(640, 480, Point::new(160.0, 240.0)), PositionHint::Centered);
    }

    #[test]
    fn test_right_angle_aligned() {
        let patterns = [at(220.0, 140.0, 900.0), at(420.0, 140.0, 900.0), at(220.0, 340.0, 900.0)];
        let d = engine().guide(640, 480, &patterns);
        match d.status {
            GuidanceStatus::Aligning { angle, .. } => assert_eq!(angle, Some(AngleHint::Aligned)),
            other => panic!("unexpected status {:?}", other),
        }
        let corners = d.corners.unwrap();
        assert_eq!(corners.top_left, Point::new(220.0, 140.0));
        assert_eq!(corners.top_right, Point::new(420.0, 140.0));
        assert_eq!(corners.bottom_left, Point::new(220.0, 340.0));
        assert_eq!(d.overlay.guide_lines.len(), 2);
        assert_eq!(d.overlay.messages[1], "Angle: OK");
    }

    #[test]
    fn test_skewed_legs_rotate() {
        let right = [at(200.0, 200.0, 900.0), at(400.0, 200.0, 900.0), at(200.0, 300.0, 900.0)];
        let d = engine().guide(640, 480, &right);
        assert_eq!(d.overlay.messages[1], "Rotate Camera RIGHT");

        let left = [at(200.0, 150.0, 900.0), at(300.0, 150.0, 900.0), at(200.0, 350.0, 900.0)];
        let d = engine().guide(640, 480, &left);
        assert_eq!(d.overlay.messages[1], "Rotate Camera LEFT");
    }

    #[test]
    fn test_no_right_angle_gives_no_angle_line() {
        // Nearly collinear: hypotenuse² far exceeds the leg sum
        let patterns = [at(200.0, 240.0, 900.0), at(320.0, 250.0, 900.0), at(440.0, 240.0, 900.0)];
        let d = engine().guide(640, 480, &patterns);
        assert_eq!(
            d.status,
            GuidanceStatus::Aligning {
                position: PositionHint::Centered,
                angle: None,
            }
        );
        assert_eq!(d.overlay.messages.len(), 1);
        assert!(d.overlay.guide_lines.is_empty());
        assert!(d.corners.is_none());
    }

    #[test]
    fn test_first_matching_triple_wins() {
        // Triple (0,1,2) is a right angle with a 2:1 edge ratio; (0,1,3) is a perfect
        // square corner but comes later in enumeration order
        let patterns = [
            at(200.0, 200.0, 900.0),
            at(400.0, 200.0, 900.0),
            at(200.0, 300.0, 900.0),
            at(200.0, 400.0, 900.0),
        ];
        let e = engine();
        let corners = e.find_corners(&patterns).unwrap();
        assert_eq!(corners.bottom_left, Point::new(200.0, 300.0));
        assert_eq!(e.angle_hint(&corners), AngleHint::RotateRight);
    }

    #[test]
    fn test_label_triple_any_order() {
        let tl = Point::new(0.0, 0.0);
        let tr = Point::new(10.0, 0.0);
        let bl = Point::new(0.0, 10.0);
        for (a, b, c) in [(tl, tr, bl), (tr, tl, bl), (tr, bl, tl)] {
            let t = label_triple(a, b, c).unwrap();
            assert_eq!(t.top_left, tl);
        }
    }
}
