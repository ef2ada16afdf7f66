//! Synthetic scenes: white canvases with black finder patterns.
//!
//! Positions are top-left corners in pixels; `module` is the finder module size.
//! Pixels falling outside the canvas are skipped.
use crate::models::{BitMatrix, Point};

/// Whether module (mx, my) of a 7x7 finder pattern is dark
fn finder_module_dark(mx: usize, my: usize) -> bool {
    let ring = mx == 0 || mx == 6 || my == 0 || my == 6;
    let core = (2..=4).contains(&mx) && (2..=4).contains(&my);
    ring || core
}

/// Expected outline centroid of a finder drawn at (x0, y0), in pixel-center coordinates
pub fn finder_center(x0: usize, y0: usize, module: usize) -> Point {
    let half = (7 * module - 1) as f32 / 2.0;
    Point::new(x0 as f32 + half, y0 as f32 + half)
}

/// All-white interleaved three-channel canvas
pub fn blank_rgb(width: usize, height: usize) -> Vec<u8> {
    vec![255u8; width * height * 3]
}

/// Paint a black finder pattern into a three-channel buffer
pub fn draw_finder_rgb(buf: &mut [u8], width: usize, height: usize, x0: usize, y0: usize, module: usize) {
    let module = module.max(1);
    for y in 0..7 * module {
        for x in 0..7 * module {
            let (px, py) = (x0 + x, y0 + y);
            if px >= width || py >= height || !finder_module_dark(x / module, y / module) {
                continue;
            }
            let idx = (py * width + px) * 3;
            buf[idx..idx + 3].fill(0);
        }
    }
}

/// Canvas with one finder pattern
pub fn finder_rgb(width: usize, height: usize, x0: usize, y0: usize, module: usize) -> Vec<u8> {
    let mut buf = blank_rgb(width, height);
    draw_finder_rgb(&mut buf, width, height, x0, y0, module);
    buf
}

/// Top-left corners of the three finders of a marker `size` modules across
pub fn marker_corners(x0: usize, y0: usize, module: usize, size: usize) -> [(usize, usize); 3] {
    let offset = size.saturating_sub(7) * module;
    [(x0, y0), (x0 + offset, y0), (x0, y0 + offset)]
}

/// Canvas with the three finder patterns of an upright marker
pub fn marker_rgb(width: usize, height: usize, x0: usize, y0: usize, module: usize, size: usize) -> Vec<u8> {
    let mut buf = blank_rgb(width, height);
    for (x, y) in marker_corners(x0, y0, module, size) {
        draw_finder_rgb(&mut buf, width, height, x, y, module);
    }
    buf
}

/// Paint a finder pattern into a mask (foreground = dark)
pub fn draw_finder_mask(mask: &mut BitMatrix, x0: usize, y0: usize, module: usize) {
    let module = module.max(1);
    mask.fill_rect(x0, y0, x0 + 7 * module, y0 + 7 * module, true);
    mask.fill_rect(x0 + module, y0 + module, x0 + 6 * module, y0 + 6 * module, false);
    mask.fill_rect(x0 + 2 * module, y0 + 2 * module, x0 + 5 * module, y0 + 5 * module, true);
}

/// Mask with one finder pattern
pub fn finder_mask(width: usize, height: usize, x0: usize, y0: usize, module: usize) -> BitMatrix {
    let mut mask = BitMatrix::new(width, height);
    draw_finder_mask(&mut mask, x0, y0, module);
    mask
}
