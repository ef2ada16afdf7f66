//! Contrast Limited Adaptive Histogram Equalization.
//!
//! Each tile gets a clipped-histogram lookup table; pixels are mapped by
//! bilinear interpolation between the four nearest tile tables so tile
//! boundaries do not show up as steps.

use rayon::prelude::*;

/// Equalize `gray` in a `tiles_x x tiles_y` grid with the given clip limit.
///
/// A clip limit of 1.0 leaves the histogram flat-capped at its mean bin height;
/// larger values allow more contrast amplification.
pub fn clahe(
    gray: &[u8],
    width: usize,
    height: usize,
    tiles_x: usize,
    tiles_y: usize,
    clip_limit: f32,
) -> Vec<u8> {
    if width == 0 || height == 0 || tiles_x == 0 || tiles_y == 0 {
        return gray.to_vec();
    }

    // Small images get fewer, at-least-one-pixel tiles
    let tile_w = width.div_ceil(tiles_x).max(1);
    let tile_h = height.div_ceil(tiles_y).max(1);
    let tiles_x = width.div_ceil(tile_w);
    let tiles_y = height.div_ceil(tile_h);

    let luts: Vec<[u8; 256]> = (0..tiles_x * tiles_y)
        .into_par_iter()
        .map(|t| {
            let (tx, ty) = (t % tiles_x, t / tiles_x);
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = (x0 + tile_w).min(width);
            let y1 = (y0 + tile_h).min(height);
            tile_lut(gray, width, x0, y0, x1, y1, clip_limit)
        })
        .collect();

    let mut out = vec![0u8; width * height];
    let tw = tile_w as f32;
    let th = tile_h as f32;
    let max_tx = tiles_x as i64 - 1;
    let max_ty = tiles_y as i64 - 1;

    out.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let fy = (y as f32 + 0.5) / th - 0.5;
        let ty0 = (fy.floor() as i64).clamp(0, max_ty) as usize;
        let ty1 = (fy.floor() as i64 + 1).clamp(0, max_ty) as usize;
        let ay = (fy - fy.floor()).clamp(0.0, 1.0);

        for (x, dst) in row.iter_mut().enumerate() {
            let v = gray[y * width + x] as usize;
            let fx = (x as f32 + 0.5) / tw - 0.5;
            let tx0 = (fx.floor() as i64).clamp(0, max_tx) as usize;
            let tx1 = (fx.floor() as i64 + 1).clamp(0, max_tx) as usize;
            let ax = (fx - fx.floor()).clamp(0.0, 1.0);

            let v00 = luts[ty0 * tiles_x + tx0][v] as f32;
            let v10 = luts[ty0 * tiles_x + tx1][v] as f32;
            let v01 = luts[ty1 * tiles_x + tx0][v] as f32;
            let v11 = luts[ty1 * tiles_x + tx1][v] as f32;

            let top = v00 + (v10 - v00) * ax;
            let bottom = v01 + (v11 - v01) * ax;
            *dst = (top + (bottom - top) * ay).round().clamp(0.0, 255.0) as u8;
        }
    });

    out
}

fn tile_lut(
    gray: &[u8],
    width: usize,
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
    clip_limit: f32,
) -> [u8; 256] {
    let mut hist = [0u32; 256];
    for y in y0..y1 {
        for &v in &gray[y * width + x0..y * width + x1] {
            hist[v as usize] += 1;
        }
    }
    let total = ((x1 - x0) * (y1 - y0)) as u32;

    let clip = ((clip_limit * total as f32 / 256.0) as u32).max(1);
    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > clip {
            excess += *bin - clip;
            *bin = clip;
        }
    }
    let per_bin = excess / 256;
    let remainder = (excess % 256) as usize;
    for (i, bin) in hist.iter_mut().enumerate() {
        *bin += per_bin;
        if i < remainder {
            *bin += 1;
        }
    }

    let mut lut = [0u8; 256];
    let scale = 255.0 / total.max(1) as f32;
    let mut cdf = 0u32;
    for (i, &count) in hist.iter().enumerate() {
        cdf += count;
        lut[i] = (cdf as f32 * scale).round().min(255.0) as u8;
    }
    lut
}
