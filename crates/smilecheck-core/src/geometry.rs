//! Plane geometry on image-space landmark coordinates.
//!
//! Image convention: x grows to the right, y grows downward. A positive
//! rotation angle turns a point counter-clockwise in the mathematical sense
//! (which appears clockwise on screen because of the flipped y axis).

use serde::{Deserialize, Serialize};

/// Floor applied to every distance that is later used as a divisor.
pub const MIN_SCALE: f32 = 1.0;

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Midpoint between `self` and `other`.
    pub fn midpoint(&self, other: &Point) -> Point {
        (*self + *other) * 0.5
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// Rotate `point` about `pivot` by `angle` radians.
pub fn rotate_around(point: Point, pivot: Point, angle: f32) -> Point {
    let t = point - pivot;
    let (sn, cs) = angle.sin_cos();
    Point::new(cs * t.x - sn * t.y, sn * t.x + cs * t.y) + pivot
}

/// Euclidean distance between `a` and `b`, floored at [`MIN_SCALE`].
///
/// Nearly coincident eye centres come from a failed detection; the floor
/// keeps downstream ratios from exploding on that noise.
pub fn clamped_distance(a: Point, b: Point) -> f32 {
    a.distance(&b).max(MIN_SCALE)
}

/// Arithmetic mean of `points`, or `None` for an empty slice.
pub fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let sum = points
        .iter()
        .fold(Point::default(), |acc, p| acc + *p);
    Some(sum * (1.0 / points.len() as f32))
}
