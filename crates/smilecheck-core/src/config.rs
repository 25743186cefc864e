use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::guide::GuideConfig;
use crate::landmarks::{IndexRange, LandmarkLayout};
use crate::smile::SmileConfig;
use crate::stability::StabilityConfig;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a positive number (got {value})")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must be in (0, 1] (got {value})")]
    NotAFraction { field: &'static str, value: f32 },

    #[error("{field} must be in [0, 1] (got {value})")]
    InvalidDecay { field: &'static str, value: f32 },

    #[error("{field} range is reversed: {start}..={end}")]
    ReversedRange {
        field: &'static str,
        start: usize,
        end: usize,
    },
}

/// Every tunable of the capture protocol.
///
/// Deserializes from a partial document: missing fields keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Continuous stillness required before the neutral baseline is captured.
    pub hold_still_seconds: f32,
    /// Continuous above-threshold smile required before the verdict freezes.
    pub smile_hold_seconds: f32,
    /// Metric decay rate per tick while no face is tracked. Gentler than
    /// `smile.insufficient_decay` so brief dropouts do not crash the score.
    pub absent_decay: f32,
    pub stability: StabilityConfig,
    pub smile: SmileConfig,
    pub layout: LandmarkLayout,
    pub guide: GuideConfig,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            hold_still_seconds: 1.5,
            smile_hold_seconds: 0.6,
            absent_decay: 0.08,
            stability: StabilityConfig::default(),
            smile: SmileConfig::default(),
            layout: LandmarkLayout::default(),
            guide: GuideConfig::default(),
        }
    }
}

impl FlowConfig {
    /// Reject values that would stall the protocol or produce NaN metrics.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("hold_still_seconds", self.hold_still_seconds)?;
        positive("smile_hold_seconds", self.smile_hold_seconds)?;
        decay("absent_decay", self.absent_decay)?;

        positive("stability.movement_threshold", self.stability.movement_threshold)?;

        fraction("smile.smoothing_alpha", self.smile.smoothing_alpha)?;
        positive("smile.smile_min", self.smile.smile_min)?;
        positive("smile.asym_threshold", self.smile.asym_threshold)?;
        decay("smile.insufficient_decay", self.smile.insufficient_decay)?;

        ordered("layout.left_eye", self.layout.left_eye)?;
        ordered("layout.right_eye", self.layout.right_eye)?;

        positive("guide.frame_width", self.guide.frame_width)?;
        positive("guide.frame_height", self.guide.frame_height)?;
        positive("guide.semi_x", self.guide.semi_x)?;
        positive("guide.semi_y", self.guide.semi_y)?;
        fraction("guide.required_fraction", self.guide.required_fraction)?;

        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    // Written so NaN fails too
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn fraction(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::NotAFraction { field, value })
    }
}

fn decay(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidDecay { field, value })
    }
}

fn ordered(field: &'static str, range: IndexRange) -> Result<(), ConfigError> {
    if range.start <= range.end {
        Ok(())
    } else {
        Err(ConfigError::ReversedRange {
            field,
            start: range.start,
            end: range.end,
        })
    }
}
