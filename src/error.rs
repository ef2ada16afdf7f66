//! Error types.
//!
//! Detection and guidance never fail: degenerate geometry is filtered and missing
//! candidates are user-facing statuses. Only wrapping a caller buffer can go wrong.

/// Failure to view a caller buffer as a three-channel frame
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The buffer length does not equal `width * height * 3`
    #[error("frame buffer holds {actual} bytes, expected {expected} for {width}x{height}x3")]
    BufferSize {
        /// Frame width in pixels
        width: usize,
        /// Frame height in pixels
        height: usize,
        /// Required byte count
        expected: usize,
        /// Provided byte count
        actual: usize,
    },
    /// `width * height * 3` overflows `usize`
    #[error("frame dimensions {width}x{height} are too large")]
    Dimensions {
        /// Frame width in pixels
        width: usize,
        /// Frame height in pixels
        height: usize,
    },
}

/// Failures of the file-based tooling (CLI, benches, fixtures)
#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    /// Image could not be read, decoded or written
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    /// Filesystem failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON (de)serialization failure, e.g. a malformed configuration file
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// Pixel buffer does not match the image dimensions
    #[error(transparent)]
    Frame(#[from] FrameError),
}
