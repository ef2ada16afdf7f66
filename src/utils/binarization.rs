//! Adaptive mean thresholding (inverted: dark pixels become foreground).

use rayon::prelude::*;

use crate::models::BitMatrix;

/// Summed-area table with one row/column of zero padding
struct IntegralImage {
    stride: usize,
    sums: Vec<u64>,
}

impl IntegralImage {
    fn new(gray: &[u8], width: usize, height: usize) -> Self {
        let stride = width + 1;
        let mut sums = vec![0u64; stride * (height + 1)];
        for y in 0..height {
            let mut row_sum = 0u64;
            for x in 0..width {
                row_sum += gray[y * width + x] as u64;
                sums[(y + 1) * stride + x + 1] = row_sum + sums[y * stride + x + 1];
            }
        }
        Self { stride, sums }
    }

    /// Sum over `[x0, x1) x [y0, y1)`
    fn window_sum(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        let s = self.stride;
        self.sums[y1 * s + x1] + self.sums[y0 * s + x0] - self.sums[y0 * s + x1] - self.sums[y1 * s + x0]
    }
}

/// Binarize with a per-pixel threshold of `local_mean - offset`.
///
/// A pixel is foreground when `pixel <= mean(block) - offset`, where the block is
/// `block_size x block_size` centered on the pixel and clipped at the borders.
/// `block_size` is forced odd and at least 3.
pub fn adaptive_binarize(
    gray: &[u8],
    width: usize,
    height: usize,
    block_size: usize,
    offset: i32,
) -> BitMatrix {
    if width == 0 || height == 0 {
        return BitMatrix::new(width, height);
    }

    let radius = (block_size.max(3) | 1) / 2;
    let integral = IntegralImage::new(gray, width, height);

    let mut foreground = vec![false; width * height];
    foreground.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let y0 = y.saturating_sub(radius);
        let y1 = (y + radius + 1).min(height);
        for (x, out) in row.iter_mut().enumerate() {
            let x0 = x.saturating_sub(radius);
            let x1 = (x + radius + 1).min(width);
            let area = ((x1 - x0) * (y1 - y0)) as i64;
            let sum = integral.window_sum(x0, y0, x1, y1) as i64;
            let pixel = gray[y * width + x] as i64;
            // pixel <= sum / area - offset, kept in integers
            *out = (pixel + offset as i64) * area <= sum;
        }
    });

    BitMatrix::from_fn(width, height, |x, y| foreground[y * width + x])
}
