use serde::{Deserialize, Serialize};

use crate::error::FrameError;
use crate::utils::grayscale::color_to_grayscale;

/// Byte order of the three color channels in a frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChannelOrder {
    /// Blue, green, red (camera bridges usually hand over BGR)
    #[default]
    Bgr,
    /// Red, green, blue
    Rgb,
}

/// RGB color used for overlays, independent of the frame's channel order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub [u8; 3]);

impl Color {
    /// Outline color for detected finder patterns
    pub const GREEN: Color = Color([0, 255, 0]);
    /// Target marker color
    pub const RED: Color = Color([255, 0, 0]);
    /// Guide line color
    pub const BLUE: Color = Color([0, 0, 255]);
    /// Status text color
    pub const WHITE: Color = Color([255, 255, 255]);
    /// Text shadow color
    pub const BLACK: Color = Color([0, 0, 0]);
    /// Decoded banner color
    pub const YELLOW: Color = Color([255, 255, 0]);
}

/// A mutable view over one interleaved three-channel camera frame.
///
/// The frame borrows the caller's buffer for the duration of one
/// locate → guide → decode → render call and never resizes it.
#[derive(Debug)]
pub struct Frame<'a> {
    data: &'a mut [u8],
    width: usize,
    height: usize,
    order: ChannelOrder,
}

impl<'a> Frame<'a> {
    /// Wrap `data` as a `width x height` frame with the given channel order.
    ///
    /// A zero-sized frame over an empty buffer is accepted; the pipeline treats it as a no-op.
    pub fn new(
        data: &'a mut [u8],
        width: usize,
        height: usize,
        order: ChannelOrder,
    ) -> Result<Self, FrameError> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(3))
            .ok_or(FrameError::Dimensions { width, height })?;
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            order,
        })
    }

    /// Frame width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Frame height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Channel order of the underlying buffer
    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    /// True when there is nothing to analyze
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Raw interleaved bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..]
    }

    /// Single-channel intensity image (row-major, `width * height` bytes)
    pub fn luma(&self) -> Vec<u8> {
        color_to_grayscale(&self.data[..], self.width, self.height, self.order)
    }

    /// Pixel at (x, y) as RGB, `None` outside the frame
    pub fn rgb_at(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 3;
        let px = [self.data[idx], self.data[idx + 1], self.data[idx + 2]];
        Some(match self.order {
            ChannelOrder::Rgb => px,
            ChannelOrder::Bgr => [px[2], px[1], px[0]],
        })
    }

    /// Paint one pixel; writes outside the frame are dropped
    pub fn put(&mut self, x: i64, y: i64, color: Color) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = (y as usize * self.width + x as usize) * 3;
        let [r, g, b] = color.0;
        let px = match self.order {
            ChannelOrder::Rgb => [r, g, b],
            ChannelOrder::Bgr => [b, g, r],
        };
        self.data[idx..idx + 3].copy_from_slice(&px);
    }
}
