//! Head stillness monitor.
//!
//! Stable time accrues only while the face stays inside the guide and the
//! face centre moves less than a fraction of the inter-ocular distance per
//! tick. Any violation drops the accumulated time to zero; there is no
//! partial credit, so a brief flinch cannot hide behind earlier stillness.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, MIN_SCALE};

/// Default per-tick movement allowance, in IOD units.
pub const DEFAULT_MOVEMENT_THRESHOLD: f32 = 0.012;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Face-centre movement per tick, in IOD units, below which the head
    /// counts as still.
    pub movement_threshold: f32,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            movement_threshold: DEFAULT_MOVEMENT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StabilityMonitor {
    config: StabilityConfig,
    previous_center: Option<Point>,
    stable_time: f32,
}

impl StabilityMonitor {
    pub fn new(config: StabilityConfig) -> Self {
        Self {
            config,
            previous_center: None,
            stable_time: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.previous_center = None;
        self.stable_time = 0.0;
    }

    /// Feed one tick of face position.
    pub fn update(&mut self, center: Point, iod: f32, inside_guide: bool, dt: f32) {
        if !inside_guide {
            self.reset();
            return;
        }

        // First sample only establishes the reference position
        let Some(previous) = self.previous_center.replace(center) else {
            self.stable_time = 0.0;
            return;
        };

        let move_norm = center.distance(&previous) / iod.max(MIN_SCALE);
        if move_norm < self.config.movement_threshold {
            self.stable_time += dt;
        } else {
            tracing::trace!(move_norm, "stability: movement above threshold");
            self.stable_time = 0.0;
        }
    }

    /// Seconds of uninterrupted stillness inside the guide.
    pub fn stable_time(&self) -> f32 {
        self.stable_time
    }
}

impl Default for StabilityMonitor {
    fn default() -> Self {
        Self::new(StabilityConfig::default())
    }
}
