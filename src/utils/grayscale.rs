//! Convert an interleaved three-channel frame to grayscale
//! Y = 0.299*R + 0.587*G + 0.114*B
//! Uses fast integer arithmetic: Y = (76*R + 150*G + 29*B) >> 8
//!
//! Rows are processed in parallel with rayon.

use rayon::prelude::*;

use crate::models::ChannelOrder;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: i32 = 76;
const COEF_G: i32 = 150;
const COEF_B: i32 = 29;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as i32 + COEF_G * g as i32 + COEF_B * b as i32) >> 8;
    lum.min(255) as u8
}

/// Convert RGB or BGR bytes to grayscale, one output byte per pixel
pub fn color_to_grayscale(pixels: &[u8], width: usize, height: usize, order: ChannelOrder) -> Vec<u8> {
    let pixel_count = width * height;
    let mut gray = vec![0u8; pixel_count];
    if pixel_count == 0 {
        return gray;
    }

    gray.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let row_start = y * width * 3;
        for (x, out) in row.iter_mut().enumerate() {
            let idx = row_start + x * 3;
            let (c0, c1, c2) = (pixels[idx], pixels[idx + 1], pixels[idx + 2]);
            *out = match order {
                ChannelOrder::Rgb => luma(c0, c1, c2),
                ChannelOrder::Bgr => luma(c2, c1, c0),
            };
        }
    });

    gray
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_grayscale() {
        // Pure white
        let gray = color_to_grayscale(&[255, 255, 255], 1, 1, ChannelOrder::Rgb);
        assert!(gray[0] >= 254);

        // Pure black
        let gray = color_to_grayscale(&[0, 0, 0], 1, 1, ChannelOrder::Rgb);
        assert_eq!(gray[0], 0);

        // Pure green
        let gray = color_to_grayscale(&[0, 255, 0], 1, 1, ChannelOrder::Rgb);
        assert!(gray[0] > 100);

        // 2x2 image
        let img = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let gray = color_to_grayscale(&img, 2, 2, ChannelOrder::Rgb);
        assert_eq!(gray.len(), 4);
    }

    #[test]
    fn test_bgr_swaps_red_and_blue() {
        let red_rgb = color_to_grayscale(&[255, 0, 0], 1, 1, ChannelOrder::Rgb);
        let red_bgr = color_to_grayscale(&[0, 0, 255], 1, 1, ChannelOrder::Bgr);
        assert_eq!(red_rgb, red_bgr);

        let blue_as_bgr = color_to_grayscale(&[255, 0, 0], 1, 1, ChannelOrder::Bgr);
        assert!(blue_as_bgr[0] < red_rgb[0]);
    }

    #[test]
    fn test_empty_input() {
        assert!(color_to_grayscale(&[], 0, 0, ChannelOrder::Bgr).is_empty());
    }
}
