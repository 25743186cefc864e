//! Landmark layout and roll normalization.
//!
//! The tracker reports landmarks in raw image space, where an in-plane head
//! tilt leaks into every vertical measurement. [`normalize`] measures the
//! tilt from the eye line and rotates the whole set back to upright about
//! the face centre, so mouth-corner raises can be compared against a neutral
//! baseline regardless of how the head is rolled. The inter-ocular distance
//! of the de-rolled eyes becomes the unit all later thresholds are expressed
//! in.

use serde::{Deserialize, Serialize};

use crate::geometry::{centroid, clamped_distance, rotate_around, Point};
use crate::guide::GuideEllipse;

/// Inclusive range of landmark indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRange {
    pub start: usize,
    pub end: usize,
}

impl IndexRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Borrow the points covered by this range, if all of them exist.
    pub fn slice<'a>(&self, points: &'a [Point]) -> Option<&'a [Point]> {
        if self.start > self.end {
            return None;
        }
        points.get(self.start..=self.end)
    }
}

/// Which landmark indices carry the eyes and mouth corners.
///
/// Defaults follow the 68-point iBUG/dlib convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandmarkLayout {
    pub mouth_left: usize,
    pub mouth_right: usize,
    pub left_eye: IndexRange,
    pub right_eye: IndexRange,
}

impl Default for LandmarkLayout {
    fn default() -> Self {
        Self {
            mouth_left: 48,
            mouth_right: 54,
            left_eye: IndexRange::new(36, 41),
            right_eye: IndexRange::new(42, 47),
        }
    }
}

impl LandmarkLayout {
    /// Smallest landmark count that covers every referenced index.
    pub fn required_len(&self) -> usize {
        let highest = self
            .left_eye
            .end
            .max(self.right_eye.end)
            .max(self.mouth_left)
            .max(self.mouth_right);
        highest + 1
    }

    /// Left and right mouth corners, if `points` is long enough to hold both.
    pub fn mouth_corners(&self, points: &[Point]) -> Option<(Point, Point)> {
        let left = points.get(self.mouth_left)?;
        let right = points.get(self.mouth_right)?;
        Some((*left, *right))
    }
}

/// One tick's landmarks, rotated into the head-upright frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DerolledFrame {
    /// Every landmark, de-rolled about `face_center`.
    pub points: Vec<Point>,
    pub left_eye: Point,
    pub right_eye: Point,
    /// Midpoint of the eye centres. It is the rotation pivot, so it is the
    /// same in raw and de-rolled space.
    pub face_center: Point,
    /// Distance between the de-rolled eye centres, floored at 1.0.
    pub iod: f32,
    /// Measured head roll in radians (eye line angle in raw image space).
    pub roll: f32,
    /// Whether enough de-rolled landmarks fall inside the guide.
    pub inside_guide: bool,
}

impl DerolledFrame {
    /// De-rolled mouth corners, if the set reaches both configured indices.
    pub fn mouth_corners(&self, layout: &LandmarkLayout) -> Option<(Point, Point)> {
        layout.mouth_corners(&self.points)
    }
}

/// De-roll `landmarks` and derive eye centres, face centre and IOD.
///
/// Returns `None` when there is nothing to normalize: an empty set (no
/// tracked subject this tick) or a set too short for the configured eye
/// ranges.
pub fn normalize(
    landmarks: &[Point],
    layout: &LandmarkLayout,
    guide: &GuideEllipse,
) -> Option<DerolledFrame> {
    if landmarks.is_empty() {
        return None;
    }

    let left_eye = centroid(layout.left_eye.slice(landmarks)?)?;
    let right_eye = centroid(layout.right_eye.slice(landmarks)?)?;
    let face_center = left_eye.midpoint(&right_eye);

    let d = right_eye - left_eye;
    let roll = d.y.atan2(d.x);

    let points: Vec<Point> = landmarks
        .iter()
        .map(|p| rotate_around(*p, face_center, -roll))
        .collect();
    let left_eye = rotate_around(left_eye, face_center, -roll);
    let right_eye = rotate_around(right_eye, face_center, -roll);

    let iod = clamped_distance(left_eye, right_eye);
    let inside_guide = guide.contains_most(&points);

    Some(DerolledFrame {
        points,
        left_eye,
        right_eye,
        face_center,
        iod,
        roll,
        inside_guide,
    })
}
