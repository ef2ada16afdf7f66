pub mod candidate;
pub mod frame;
pub mod matrix;
pub mod point;

pub use candidate::FinderPatternCandidate;
pub use frame::{ChannelOrder, Color, Frame};
pub use matrix::BitMatrix;
pub use point::{Point, PointI};
