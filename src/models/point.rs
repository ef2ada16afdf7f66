use serde::{Deserialize, Serialize};

/// 2D point with floating point coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance(&self, other: &Point) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Calculate squared distance (faster, no sqrt)
    pub fn distance_squared(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Divide both coordinates by `factor` (maps a scaled-pass point back to the source frame)
    pub fn unscale(&self, factor: f32) -> Self {
        Self {
            x: self.x / factor,
            y: self.y / factor,
        }
    }

    /// Mean of a set of points, `None` when the set is empty
    pub fn centroid<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut sum_x = 0.0f32;
        let mut sum_y = 0.0f32;
        let mut count = 0usize;
        for p in points {
            sum_x += p.x;
            sum_y += p.y;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        Some(Self::new(sum_x / count as f32, sum_y / count as f32))
    }
}

/// Integer point for pixel coordinates on a contour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointI {
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
}

impl PointI {
    /// Create a new integer point
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Widen to a floating point point
    pub fn to_f32(self) -> Point {
        Point::new(self.x as f32, self.y as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-6);
        assert!((a.distance_squared(&b) - 25.0).abs() < 1e-6);
    }

    #[test]
    fn test_centroid() {
        let pts = [Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(2.0, 6.0)];
        let c = Point::centroid(&pts).unwrap();
        assert!((c.x - 2.0).abs() < 1e-6);
        assert!((c.y - 2.0).abs() < 1e-6);
        assert!(Point::centroid(&Vec::<Point>::new()).is_none());
    }

    #[test]
    fn test_unscale() {
        let p = Point::new(40.0, 80.0).unscale(2.0);
        assert_eq!(p, Point::new(20.0, 40.0));
    }
}
