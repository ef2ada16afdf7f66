//! Polygon geometry: shoelace moments, convex hull and minimum-area rotated rectangle.
use crate::models::Point;

/// Spatial moments of a closed polygon, up to first order
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Moments {
    /// Signed enclosed area
    pub m00: f64,
    /// First moment about the y axis
    pub m10: f64,
    /// First moment about the x axis
    pub m01: f64,
}

impl Moments {
    /// Unsigned enclosed area
    pub fn area(&self) -> f64 {
        self.m00.abs()
    }

    /// Area-weighted centroid, `None` when the polygon encloses no mass
    pub fn centroid(&self) -> Option<Point> {
        if self.m00.abs() < f64::EPSILON {
            return None;
        }
        Some(Point::new(
            (self.m10 / self.m00) as f32,
            (self.m01 / self.m00) as f32,
        ))
    }
}

/// Moments of the implicitly closed polygon `points` via Green's theorem
pub fn polygon_moments(points: &[Point]) -> Moments {
    let n = points.len();
    if n < 3 {
        return Moments::default();
    }

    let mut m = Moments::default();
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        let (x0, y0, x1, y1) = (p.x as f64, p.y as f64, q.x as f64, q.y as f64);
        let cross = x0 * y1 - x1 * y0;
        m.m00 += cross;
        m.m10 += (x0 + x1) * cross;
        m.m01 += (y0 + y1) * cross;
    }
    m.m00 *= 0.5;
    m.m10 /= 6.0;
    m.m01 /= 6.0;
    m
}

/// Unsigned area of the implicitly closed polygon
pub fn polygon_area(points: &[Point]) -> f64 {
    polygon_moments(points).area()
}

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.x as f64 - o.x as f64) * (b.y as f64 - o.y as f64)
        - (a.y as f64 - o.y as f64) * (b.x as f64 - o.x as f64)
}

/// Convex hull (Andrew's monotone chain), counter-clockwise, no collinear points
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts: Vec<Point> = points.to_vec();
    pts.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<Point> = Vec::with_capacity(pts.len() * 2);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

/// Area of the smallest rotated rectangle enclosing `points`.
///
/// The optimal rectangle has one side collinear with a hull edge, so every
/// hull edge direction is tried. Degenerate (collinear) inputs give zero.
pub fn min_area_rect_area(points: &[Point]) -> f64 {
    let hull = convex_hull(points);
    if hull.len() < 3 {
        return 0.0;
    }

    let n = hull.len();
    let mut best = f64::INFINITY;
    for i in 0..n {
        let a = hull[i];
        let b = hull[(i + 1) % n];
        let (ex, ey) = (b.x as f64 - a.x as f64, b.y as f64 - a.y as f64);
        let len = (ex * ex + ey * ey).sqrt();
        if len < f64::EPSILON {
            continue;
        }
        let (ux, uy) = (ex / len, ey / len);

        let mut min_u = f64::INFINITY;
        let mut max_u = f64::NEG_INFINITY;
        let mut min_v = f64::INFINITY;
        let mut max_v = f64::NEG_INFINITY;
        for p in &hull {
            let (dx, dy) = (p.x as f64 - a.x as f64, p.y as f64 - a.y as f64);
            let u = dx * ux + dy * uy;
            let v = -dx * uy + dy * ux;
            min_u = min_u.min(u);
            max_u = max_u.max(u);
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }
        best = best.min((max_u - min_u) * (max_v - min_v));
    }

    if best.is_finite() { best } else { 0.0 }
}
