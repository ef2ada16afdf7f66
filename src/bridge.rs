//! Display bridge: annotated frame → RGBA for presentation.
//!
//! Runs after the pipeline has returned; the frame itself is left untouched.
use rayon::prelude::*;

use crate::models::{ChannelOrder, Frame};

/// Opaque RGBA copy of `frame`, row-major, `width * height * 4` bytes
pub fn to_rgba(frame: &Frame<'_>) -> Vec<u8> {
    let (width, height) = (frame.width(), frame.height());
    let mut out = vec![255u8; width * height * 4];
    if frame.is_empty() {
        return out;
    }

    let src = frame.as_bytes();
    let order = frame.order();
    out.par_chunks_mut(width * 4).enumerate().for_each(|(y, row)| {
        let line = &src[y * width * 3..(y + 1) * width * 3];
        for (dst, px) in row.chunks_exact_mut(4).zip(line.chunks_exact(3)) {
            let (r, g, b) = match order {
                ChannelOrder::Rgb => (px[0], px[1], px[2]),
                ChannelOrder::Bgr => (px[2], px[1], px[0]),
            };
            dst[0] = r;
            dst[1] = g;
            dst[2] = b;
        }
    });
    out
}
