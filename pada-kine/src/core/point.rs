//! Point type for leg and body coordinates.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

use super::math::round_to;

/// Point in the body frame (centimeters)
///
/// X is to the right, Y is forward, Z is up. Feet stand on z = 0 unless an
/// obstacle lifts them.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate (right)
    pub x: f64,
    /// Y coordinate (forward)
    pub y: f64,
    /// Z coordinate (up)
    pub z: f64,
}

impl Point {
    /// Create a new point
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Origin
    pub const ZERO: Point = Point::new(0.0, 0.0, 0.0);

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: &Point) -> f64 {
        (*self - *other).norm()
    }

    /// Distance ignoring z
    #[inline]
    pub fn distance_xy(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Vector length
    #[inline]
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Heading of `other` as seen from this point in the XY plane (radians)
    #[inline]
    pub fn heading_to(&self, other: &Point) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Point shifted by the given deltas
    #[inline]
    pub fn translated(&self, dx: f64, dy: f64, dz: f64) -> Point {
        Point::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Component-wise rounding to `places` decimals
    pub fn rounded(&self, places: u32) -> Point {
        Point::new(
            round_to(self.x, places),
            round_to(self.y, places),
            round_to(self.z, places),
        )
    }

    /// Per-axis closeness check
    pub fn within(&self, other: &Point, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.z - other.z).abs() <= tolerance
    }

    /// Arithmetic mean of a set of points
    pub fn centroid<'a, I>(points: I) -> Point
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut sum = Point::ZERO;
        let mut count = 0usize;
        for p in points {
            sum = sum + *p;
            count += 1;
        }
        if count == 0 {
            return Point::ZERO;
        }
        sum * (1.0 / count as f64)
    }
}

impl Add for Point {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Point::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Point {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Point::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Neg for Point {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Point::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    #[inline]
    fn mul(self, k: f64) -> Self {
        Point::new(self.x * k, self.y * k, self.z * k)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance() {
        let a = Point::new(0.0, 0.0, 0.0);
        let b = Point::new(3.0, 4.0, 12.0);
        assert_relative_eq!(a.distance(&b), 13.0);
        assert_relative_eq!(a.distance_xy(&b), 5.0);
    }

    #[test]
    fn test_ops() {
        let a = Point::new(1.0, 2.0, 3.0);
        let b = Point::new(0.5, -1.0, 2.0);
        assert_eq!(a + b, Point::new(1.5, 1.0, 5.0));
        assert_eq!(a - b, Point::new(0.5, 3.0, 1.0));
        assert_eq!(-a, Point::new(-1.0, -2.0, -3.0));
        assert_eq!(a * 2.0, Point::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn test_centroid() {
        let pts = [
            Point::new(15.0, 15.0, 0.0),
            Point::new(15.0, -15.0, 0.0),
            Point::new(-15.0, -15.0, 0.0),
            Point::new(-15.0, 15.0, 2.0),
        ];
        let c = Point::centroid(pts.iter());
        assert_relative_eq!(c.x, 0.0);
        assert_relative_eq!(c.y, 0.0);
        assert_relative_eq!(c.z, 0.5);
        assert_eq!(Point::centroid(std::iter::empty()), Point::ZERO);
    }

    #[test]
    fn test_heading() {
        let o = Point::new(3.8, 3.8, 14.0);
        let d = Point::new(15.0, 15.0, 0.0);
        assert_relative_eq!(o.heading_to(&d), std::f64::consts::FRAC_PI_4, epsilon = 1e-12);
    }
}
