//! Overlay description and the rasterizer that paints it into a frame.
use serde::Serialize;

use super::font::{self, ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::models::{Color, Frame, Point};

/// Radius of the target marker, in pixels
const TARGET_RADIUS: i64 = 10;
/// Scale of status text
const TEXT_SCALE: usize = 2;
/// Scale of the banner text
const BANNER_SCALE: usize = 4;
const MARGIN: i64 = 10;

/// Everything the guidance step wants drawn, in original-image coordinates
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Overlay {
    /// Closed outlines of detected finder patterns
    pub outlines: Vec<Vec<Point>>,
    /// Centroid of all finder pattern centers
    pub target: Option<Point>,
    /// Top-left → top-right and top-left → bottom-left
    pub guide_lines: Vec<(Point, Point)>,
    /// Status lines, top to bottom
    pub messages: Vec<String>,
    /// Large centered text, e.g. after a successful decode
    pub banner: Option<String>,
}

impl Overlay {
    /// True when there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.outlines.is_empty()
            && self.target.is_none()
            && self.guide_lines.is_empty()
            && self.messages.is_empty()
            && self.banner.is_none()
    }
}

/// Paint `overlay` into `frame` in place. Primitives partly outside the frame are clipped.
pub fn render(overlay: &Overlay, frame: &mut Frame<'_>) {
    if frame.is_empty() {
        return;
    }

    for outline in &overlay.outlines {
        draw_polygon(frame, outline, Color::GREEN);
    }
    for (a, b) in &overlay.guide_lines {
        draw_line(frame, *a, *b, Color::BLUE);
    }
    if let Some(target) = overlay.target {
        draw_target(frame, target, Color::RED);
    }

    let line_height = ((GLYPH_HEIGHT + 3) * TEXT_SCALE) as i64;
    for (i, message) in overlay.messages.iter().enumerate() {
        let y = MARGIN + i as i64 * line_height;
        draw_text_shadowed(frame, message, MARGIN, y, TEXT_SCALE, Color::WHITE);
    }

    if let Some(banner) = &overlay.banner {
        let w = (font::text_width(banner) * BANNER_SCALE) as i64;
        let h = (GLYPH_HEIGHT * BANNER_SCALE) as i64;
        let x = (frame.width() as i64 - w) / 2;
        let y = (frame.height() as i64 - h) / 2;
        draw_text_shadowed(frame, banner, x, y, BANNER_SCALE, Color::YELLOW);
    }
}

/// Bresenham line between two points
pub fn draw_line(frame: &mut Frame<'_>, a: Point, b: Point, color: Color) {
    let (mut x0, mut y0) = (a.x.round() as i64, a.y.round() as i64);
    let (x1, y1) = (b.x.round() as i64, b.y.round() as i64);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        frame.put(x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Closed polyline through `points`
pub fn draw_polygon(frame: &mut Frame<'_>, points: &[Point], color: Color) {
    match points {
        [] => {}
        [p] => frame.put(p.x.round() as i64, p.y.round() as i64, color),
        _ => {
            for (i, &a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                draw_line(frame, a, b, color);
            }
        }
    }
}

/// Circle with a center dot
fn draw_target(frame: &mut Frame<'_>, center: Point, color: Color) {
    let (cx, cy) = (center.x.round() as i64, center.y.round() as i64);

    // Midpoint circle
    let mut x = TARGET_RADIUS;
    let mut y = 0i64;
    let mut err = 1 - x;
    while x >= y {
        for (px, py) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
            frame.put(cx + px, cy + py, color);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }

    for dy in -1..=1 {
        for dx in -1..=1 {
            frame.put(cx + dx, cy + dy, color);
        }
    }
}

fn draw_text_shadowed(frame: &mut Frame<'_>, text: &str, x: i64, y: i64, scale: usize, color: Color) {
    draw_text(frame, text, x + 1, y + 1, scale, Color::BLACK);
    draw_text(frame, text, x, y, scale, color);
}

/// Draw `text` with its top-left corner at (x, y), each font pixel `scale` wide
pub fn draw_text(frame: &mut Frame<'_>, text: &str, x: i64, y: i64, scale: usize, color: Color) {
    let scale = scale.max(1);
    for (i, c) in text.chars().enumerate() {
        let Some(rows) = font::glyph(c) else {
            continue;
        };
        let gx = x + (i * ADVANCE * scale) as i64;
        for row in 0..GLYPH_HEIGHT {
            for col in 0..GLYPH_WIDTH {
                if !font::lit(&rows, col, row) {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        frame.put(
                            gx + (col * scale + sx) as i64,
                            y + (row * scale + sy) as i64,
                            color,
                        );
                    }
                }
            }
        }
    }
}
