//! Deterministic 68-point faces for tests and trace generation.
//!
//! The geometry is a rough cartoon of the iBUG 68-point layout: jaw arc,
//! brows, nose, eyes as six-point rings, outer and inner lip contours. Only
//! the eye and mouth-corner positions carry meaning for the pipeline; the
//! rest exists so containment tests see a realistic spread of points.

use std::f32::consts::PI;

use crate::geometry::{rotate_around, Point};

/// Number of points produced by [`SyntheticFace::points`].
pub const POINT_COUNT: usize = 68;

/// Parameters of a generated face. Distances are in pixels unless noted.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticFace {
    /// Midpoint between the eye centres.
    pub center: Point,
    /// Distance between the eye centres.
    pub iod: f32,
    /// In-plane head roll in radians.
    pub roll: f32,
    /// Upward displacement of the left mouth corner, in IOD units.
    pub left_raise: f32,
    /// Upward displacement of the right mouth corner, in IOD units.
    pub right_raise: f32,
}

impl Default for SyntheticFace {
    fn default() -> Self {
        Self {
            center: Point::new(640.0, 410.0),
            iod: 60.0,
            roll: 0.0,
            left_raise: 0.0,
            right_raise: 0.0,
        }
    }
}

impl SyntheticFace {
    /// Same face with both corners raised by the given IOD fractions.
    pub fn smiling(&self, left_raise: f32, right_raise: f32) -> Self {
        Self {
            left_raise,
            right_raise,
            ..self.clone()
        }
    }

    /// Same face shifted by `(dx, dy)` pixels.
    pub fn shifted(&self, dx: f32, dy: f32) -> Self {
        Self {
            center: self.center + Point::new(dx, dy),
            ..self.clone()
        }
    }

    /// Generate the landmark set in raw image space.
    pub fn points(&self) -> Vec<Point> {
        let u = self.iod;
        let c = self.center;
        let mut pts = Vec::with_capacity(POINT_COUNT);

        // 0..=16 jaw: lower half of an ellipse, left to right through the chin
        let jaw_center = c + Point::new(0.0, 0.5 * u);
        for i in 0..17 {
            let t = PI - i as f32 * PI / 16.0;
            pts.push(jaw_center + Point::new(1.2 * u * t.cos(), 1.4 * u * t.sin()));
        }

        // 17..=26 brows
        for i in 0..10 {
            let x = -0.85 * u + i as f32 * (1.7 * u / 9.0);
            pts.push(c + Point::new(x, -0.35 * u));
        }

        // 27..=30 nose bridge, 31..=35 nostrils
        for i in 0..4 {
            pts.push(c + Point::new(0.0, 0.2 * u * i as f32));
        }
        for i in 0..5 {
            let x = -0.3 * u + i as f32 * (0.15 * u);
            pts.push(c + Point::new(x, 0.75 * u));
        }

        // 36..=41 left eye, 42..=47 right eye; evenly spaced rings so the
        // centroid is the eye centre exactly
        for side in [-0.5f32, 0.5] {
            let eye = c + Point::new(side * u, 0.0);
            for k in 0..6 {
                let t = PI + k as f32 * PI / 3.0;
                pts.push(eye + Point::new(0.12 * u * t.cos(), 0.05 * u * t.sin()));
            }
        }

        // 48..=59 outer lip, starting at the left corner and passing over the
        // top; 54 is the right corner
        let mouth = c + Point::new(0.0, 1.1 * u);
        for k in 0..12 {
            let t = PI + k as f32 * PI / 6.0;
            pts.push(mouth + Point::new(0.4 * u * t.cos(), 0.15 * u * t.sin()));
        }

        // 60..=67 inner lip
        for k in 0..8 {
            let t = PI + k as f32 * PI / 4.0;
            pts.push(mouth + Point::new(0.3 * u * t.cos(), 0.06 * u * t.sin()));
        }

        pts[48].y -= self.left_raise * u;
        pts[54].y -= self.right_raise * u;

        if self.roll != 0.0 {
            for p in &mut pts {
                *p = rotate_around(*p, c, self.roll);
            }
        }

        pts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::centroid;

    #[test]
    fn test_point_count() {
        assert_eq!(SyntheticFace::default().points().len(), POINT_COUNT);
    }

    #[test]
    fn test_eye_centroids() {
        let face = SyntheticFace::default();
        let pts = face.points();
        let left = centroid(&pts[36..=41]).unwrap();
        let right = centroid(&pts[42..=47]).unwrap();
        assert!(left.distance(&Point::new(610.0, 410.0)) < 1e-3);
        assert!(right.distance(&Point::new(670.0, 410.0)) < 1e-3);
    }

    #[test]
    fn test_mouth_corners_and_raise() {
        let face = SyntheticFace::default();
        let neutral = face.points();
        assert!((neutral[48].x - 616.0).abs() < 1e-3);
        assert!((neutral[54].x - 664.0).abs() < 1e-3);
        assert!((neutral[48].y - neutral[54].y).abs() < 1e-3);

        let smile = face.smiling(0.1, 0.05).points();
        assert!((neutral[48].y - smile[48].y - 6.0).abs() < 1e-3);
        assert!((neutral[54].y - smile[54].y - 3.0).abs() < 1e-3);
    }
}
