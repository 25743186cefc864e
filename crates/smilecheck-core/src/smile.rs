//! Baseline-relative smile intensity and asymmetry.
//!
//! Once the head has been still long enough, the de-rolled mouth corners are
//! captured as the neutral baseline. Every later tick measures how far each
//! corner has risen relative to that baseline (in IOD units) and folds two
//! scores into exponential moving averages:
//!
//! - **intensity**: mean absolute raise of both corners.
//! - **asymmetry**: `|left - right| / (mean + eps)`. Being a ratio, it is
//!   independent of how broadly the subject smiles; a small absolute
//!   difference at low intensity can still read as fully one-sided.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, MIN_SCALE};
use crate::landmarks::LandmarkLayout;

/// Guards the asymmetry ratio when neither corner has moved.
pub const ASYMMETRY_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmileConfig {
    /// EMA weight of the newest sample, in (0, 1].
    pub smoothing_alpha: f32,
    /// Smoothed intensity at or above which the subject counts as smiling.
    pub smile_min: f32,
    /// Smoothed asymmetry above which the smile is flagged.
    pub asym_threshold: f32,
    /// Metric decay rate per tick while uncalibrated or the landmark set is
    /// too short.
    pub insufficient_decay: f32,
}

impl Default for SmileConfig {
    fn default() -> Self {
        Self {
            smoothing_alpha: 0.2,
            smile_min: 0.06,
            asym_threshold: 0.35,
            insufficient_decay: 0.2,
        }
    }
}

/// Neutral mouth-corner reference captured at calibration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmileBaseline {
    pub left: Point,
    pub right: Point,
    pub iod: f32,
}

/// Smoothed smile scores. Both are non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SmileMetrics {
    pub intensity: f32,
    pub asymmetry: f32,
}

impl SmileMetrics {
    /// Move both scores toward zero by `rate` (0 keeps, 1 zeroes).
    fn decay(&mut self, rate: f32) {
        self.intensity *= 1.0 - rate;
        self.asymmetry *= 1.0 - rate;
    }
}

#[derive(Debug, Clone)]
pub struct SmileEvaluator {
    config: SmileConfig,
    mouth_left: usize,
    mouth_right: usize,
    baseline: Option<SmileBaseline>,
    metrics: SmileMetrics,
}

impl SmileEvaluator {
    pub fn new(config: SmileConfig, layout: &LandmarkLayout) -> Self {
        Self {
            config,
            mouth_left: layout.mouth_left,
            mouth_right: layout.mouth_right,
            baseline: None,
            metrics: SmileMetrics::default(),
        }
    }

    /// Drop the baseline and zero both scores.
    pub fn reset(&mut self) {
        self.baseline = None;
        self.metrics = SmileMetrics::default();
    }

    /// Record the neutral mouth corners and IOD for this capture cycle.
    pub fn calibrate(&mut self, left: Point, right: Point, iod: f32) {
        self.baseline = Some(SmileBaseline { left, right, iod });
    }

    /// Update scores from a full de-rolled landmark set.
    ///
    /// Decays instead when uncalibrated or when the set does not reach both
    /// configured mouth-corner indices.
    pub fn update_metrics(&mut self, points: &[Point], iod: f32) {
        match (points.get(self.mouth_left), points.get(self.mouth_right)) {
            (Some(left), Some(right)) => self.update_from_corners(*left, *right, iod),
            _ => self.decay(self.config.insufficient_decay),
        }
    }

    /// Update scores from the two de-rolled mouth corners directly.
    pub fn update_from_corners(&mut self, left: Point, right: Point, iod: f32) {
        let Some(base) = self.baseline else {
            self.decay(self.config.insufficient_decay);
            return;
        };

        // Image y grows downward: a positive raise means the corner moved up
        let scale = iod.max(MIN_SCALE);
        let left_raise = (base.left.y - left.y) / scale;
        let right_raise = (base.right.y - right.y) / scale;

        let mean_abs = 0.5 * (left_raise.abs() + right_raise.abs());
        let intensity = mean_abs.max(0.0);
        let asymmetry = (left_raise - right_raise).abs() / (mean_abs + ASYMMETRY_EPSILON);

        let a = self.config.smoothing_alpha;
        self.metrics.intensity = (1.0 - a) * self.metrics.intensity + a * intensity;
        self.metrics.asymmetry = (1.0 - a) * self.metrics.asymmetry + a * asymmetry;

        tracing::trace!(
            left_raise,
            right_raise,
            intensity = self.metrics.intensity,
            asymmetry = self.metrics.asymmetry,
            "smile: metrics updated"
        );
    }

    /// Move both scores toward zero by `rate`.
    pub fn decay(&mut self, rate: f32) {
        self.metrics.decay(rate);
    }

    pub fn is_calibrated(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn baseline(&self) -> Option<SmileBaseline> {
        self.baseline
    }

    pub fn metrics(&self) -> SmileMetrics {
        self.metrics
    }

    pub fn intensity(&self) -> f32 {
        self.metrics.intensity
    }

    pub fn asymmetry(&self) -> f32 {
        self.metrics.asymmetry
    }

    /// Whether the smoothed intensity counts as a smile.
    pub fn is_smiling(&self) -> bool {
        self.metrics.intensity >= self.config.smile_min
    }

    pub fn above_asymmetry_threshold(&self) -> bool {
        self.metrics.asymmetry > self.config.asym_threshold
    }
}

impl Default for SmileEvaluator {
    fn default() -> Self {
        Self::new(SmileConfig::default(), &LandmarkLayout::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IOD: f32 = 60.0;
    const LEFT: Point = Point::new(616.0, 476.0);
    const RIGHT: Point = Point::new(664.0, 476.0);

    fn corners(left_raise: f32, right_raise: f32) -> (Point, Point) {
        (
            Point::new(LEFT.x, LEFT.y - left_raise * IOD),
            Point::new(RIGHT.x, RIGHT.y - right_raise * IOD),
        )
    }

    fn calibrated() -> SmileEvaluator {
        let mut ev = SmileEvaluator::default();
        ev.calibrate(LEFT, RIGHT, IOD);
        ev
    }

    /// Landmark set long enough for the default mouth indices.
    fn with_corners(left: Point, right: Point) -> Vec<Point> {
        let mut pts = vec![Point::default(); 68];
        pts[48] = left;
        pts[54] = right;
        pts
    }

    #[test]
    fn test_uncalibrated_decays() {
        let mut ev = SmileEvaluator::default();
        ev.metrics = SmileMetrics {
            intensity: 1.0,
            asymmetry: 2.0,
        };
        let (l, r) = corners(0.2, 0.0);
        ev.update_metrics(&with_corners(l, r), IOD);
        assert!((ev.intensity() - 0.8).abs() < 1e-6);
        assert!((ev.asymmetry() - 1.6).abs() < 1e-6);

        for _ in 0..100 {
            ev.update_metrics(&with_corners(l, r), IOD);
        }
        assert!(ev.intensity() < 1e-6);
        assert!(ev.asymmetry() < 1e-6);
    }

    #[test]
    fn test_short_set_decays_even_when_calibrated() {
        let mut ev = calibrated();
        let (l, r) = corners(0.2, 0.2);
        ev.update_from_corners(l, r, IOD);
        let before = ev.intensity();
        assert!(before > 0.0);

        ev.update_metrics(&[l, r], IOD);
        assert!((ev.intensity() - before * 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_unchanged_corners_give_zero_intensity() {
        let mut ev = calibrated();
        for _ in 0..20 {
            ev.update_metrics(&with_corners(LEFT, RIGHT), IOD);
        }
        assert!(ev.intensity() < 1e-6);
        assert!(ev.asymmetry() < 1e-6);
        assert!(!ev.is_smiling());
    }

    #[test]
    fn test_first_update_is_one_alpha_step() {
        let mut ev = calibrated();
        let (l, r) = corners(0.1, 0.1);
        ev.update_from_corners(l, r, IOD);
        assert!((ev.intensity() - 0.02).abs() < 1e-5);
        assert!(ev.asymmetry() < 1e-4);
    }

    #[test]
    fn test_symmetric_smile_converges() {
        let mut ev = calibrated();
        let (l, r) = corners(0.1, 0.1);
        for _ in 0..60 {
            ev.update_metrics(&with_corners(l, r), IOD);
        }
        assert!((ev.intensity() - 0.1).abs() < 1e-3);
        assert!(ev.asymmetry() < 1e-3);
        assert!(ev.is_smiling());
        assert!(!ev.above_asymmetry_threshold());
    }

    #[test]
    fn test_one_sided_smile_is_flagged() {
        let mut ev = calibrated();
        let (l, r) = corners(0.1, 0.02);
        for _ in 0..60 {
            ev.update_from_corners(l, r, IOD);
        }
        // |0.1 - 0.02| / 0.06
        assert!((ev.asymmetry() - 4.0 / 3.0).abs() < 1e-2);
        assert!(ev.above_asymmetry_threshold());
    }

    #[test]
    fn test_lowered_corners_count_as_intensity() {
        // Intensity uses absolute raises, so a drooping mouth also registers
        let mut ev = calibrated();
        let (l, r) = corners(-0.1, -0.1);
        for _ in 0..60 {
            ev.update_from_corners(l, r, IOD);
        }
        assert!((ev.intensity() - 0.1).abs() < 1e-3);
    }

    #[test]
    fn test_tiny_iod_is_floored() {
        let mut ev = SmileEvaluator::default();
        ev.calibrate(LEFT, RIGHT, 0.0);
        ev.update_from_corners(Point::new(LEFT.x, LEFT.y - 0.5), RIGHT, 0.0);
        assert!(ev.intensity().is_finite());
        assert!(ev.asymmetry().is_finite());
    }

    #[test]
    fn test_reset_clears_baseline_and_metrics() {
        let mut ev = calibrated();
        let (l, r) = corners(0.2, 0.1);
        ev.update_from_corners(l, r, IOD);
        ev.reset();
        assert!(!ev.is_calibrated());
        assert_eq!(ev.metrics(), SmileMetrics::default());
    }

    #[test]
    fn test_custom_mouth_indices() {
        let layout = LandmarkLayout {
            mouth_left: 0,
            mouth_right: 1,
            ..LandmarkLayout::default()
        };
        let mut ev = SmileEvaluator::new(SmileConfig::default(), &layout);
        ev.calibrate(LEFT, RIGHT, IOD);
        let (l, r) = corners(0.1, 0.1);
        ev.update_metrics(&[l, r], IOD);
        assert!(ev.intensity() > 0.0);
    }
}
