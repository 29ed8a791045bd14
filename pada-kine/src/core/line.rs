//! Lines, segments and planar transforms.

use super::point::Point;

/// Coordinate axis
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    fn of(self, p: &Point) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
            Axis::Z => p.z,
        }
    }
}

/// Infinite line in the XY plane through two points
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line2 {
    pub a: Point,
    pub b: Point,
}

impl Line2 {
    pub fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    /// Intersection with another line, ignoring z
    ///
    /// Returns `None` for parallel or degenerate lines. The result has z = 0.
    pub fn intersection(&self, other: &Line2) -> Option<Point> {
        let (x1, y1) = (self.a.x, self.a.y);
        let (x2, y2) = (self.b.x, self.b.y);
        let (x3, y3) = (other.a.x, other.a.y);
        let (x4, y4) = (other.b.x, other.b.y);

        let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
        if denom.abs() < 1e-12 {
            return None;
        }
        let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denom;
        Some(Point::new(x1 + t * (x2 - x1), y1 + t * (y2 - y1), 0.0))
    }
}

/// Finite segment in 3D
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment3 {
    pub start: Point,
    pub end: Point,
}

impl Segment3 {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    /// Intersection with the plane `axis = value`, restricted to the segment
    ///
    /// A segment lying parallel to the plane never intersects it.
    pub fn intersect_plane(&self, axis: Axis, value: f64) -> Option<Point> {
        let from = axis.of(&self.start);
        let span = axis.of(&self.end) - from;
        if span == 0.0 {
            return None;
        }
        let t = (value - from) / span;
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        Some(self.start + (self.end - self.start) * t)
    }
}

/// Point `distance` away from `from` in the direction of `to`
///
/// Returns `from` when the two points coincide.
pub fn move_towards(from: Point, to: Point, distance: f64) -> Point {
    let delta = to - from;
    let length = delta.norm();
    if length == 0.0 {
        return from;
    }
    from + delta * (distance / length)
}

/// Rotate `point` about `center` in the XY plane by `angle` radians
/// (counter-clockwise); z is kept
pub fn rotate_about(point: Point, center: Point, angle: f64) -> Point {
    let (sin_a, cos_a) = angle.sin_cos();
    let x = point.x - center.x;
    let y = point.y - center.y;
    Point::new(
        center.x + x * cos_a - y * sin_a,
        center.y + x * sin_a + y * cos_a,
        point.z,
    )
}
