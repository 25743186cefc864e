//! Soft containment test against the elliptical alignment guide.
//!
//! Landmark noise and partial occlusion (hair, a tilted chin) routinely push
//! a few points outside any reasonable outline, so the guide only requires a
//! fraction of the landmark set to fall inside it.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Default share of landmarks that must lie inside the guide.
pub const DEFAULT_REQUIRED_FRACTION: f32 = 0.92;

/// Guide placement expressed relative to a reference camera frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideConfig {
    /// Reference frame width in pixels.
    pub frame_width: f32,
    /// Reference frame height in pixels.
    pub frame_height: f32,
    /// Ellipse centre x as a fraction of the frame width.
    pub center_x: f32,
    /// Ellipse centre y as a fraction of the frame height.
    pub center_y: f32,
    /// Horizontal semi-axis as a fraction of the frame width.
    pub semi_x: f32,
    /// Vertical semi-axis as a fraction of the frame height.
    pub semi_y: f32,
    /// Share of landmarks that must lie inside, in (0, 1].
    pub required_fraction: f32,
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            frame_width: 1280.0,
            frame_height: 720.0,
            center_x: 0.50,
            center_y: 0.60,
            semi_x: 0.13,
            semi_y: 0.28,
            required_fraction: DEFAULT_REQUIRED_FRACTION,
        }
    }
}

impl GuideConfig {
    /// Resolve the fractional placement into pixel coordinates.
    pub fn ellipse(&self) -> GuideEllipse {
        GuideEllipse {
            center: Point::new(
                self.frame_width * self.center_x,
                self.frame_height * self.center_y,
            ),
            semi_x: self.frame_width * self.semi_x,
            semi_y: self.frame_height * self.semi_y,
            required_fraction: self.required_fraction,
        }
    }
}

/// The guide ellipse in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideEllipse {
    pub center: Point,
    pub semi_x: f32,
    pub semi_y: f32,
    pub required_fraction: f32,
}

impl GuideEllipse {
    /// Whether enough of `points` fall inside this ellipse.
    pub fn contains_most(&self, points: &[Point]) -> bool {
        inside_guide(
            points,
            self.center,
            (self.semi_x, self.semi_y),
            self.required_fraction,
        )
    }
}

impl Default for GuideEllipse {
    fn default() -> Self {
        GuideConfig::default().ellipse()
    }
}

/// Count-based ellipse containment.
///
/// A point is inside when `(dx/a)^2 + (dy/b)^2 <= 1`. Returns true iff the
/// inside count reaches `required_fraction * points.len()`. An empty slice is
/// never inside.
pub fn inside_guide(
    points: &[Point],
    center: Point,
    semi_axes: (f32, f32),
    required_fraction: f32,
) -> bool {
    if points.is_empty() {
        return false;
    }

    let (a, b) = semi_axes;
    let inside = points
        .iter()
        .filter(|p| {
            let nx = (p.x - center.x) / a;
            let ny = (p.y - center.y) / b;
            nx * nx + ny * ny <= 1.0
        })
        .count();

    inside as f32 >= required_fraction * points.len() as f32
}
