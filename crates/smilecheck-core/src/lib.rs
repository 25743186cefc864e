//! Smilecheck core: turns a per-frame stream of 2D facial landmarks into a
//! calibrated, asymmetry-aware smile verdict.
//!
//! Per tick, data flows one way:
//!
//! raw landmarks → [`normalize`] → {guide test, [`StabilityMonitor`],
//! [`SmileEvaluator`]} → [`FlowController`] → [`FlowStatus`]
//!
//! Everything here is synchronous and single-threaded. Landmark acquisition
//! and rendering live outside this crate; the controller only ever sees a
//! value snapshot of one subject's landmarks per tick.

pub mod config;
pub mod flow;
pub mod geometry;
pub mod guide;
pub mod landmarks;
pub mod smile;
pub mod stability;
pub mod synthetic;

pub use config::{ConfigError, FlowConfig};
pub use flow::{FlowController, FlowInputs, FlowStatus, Stage, Verdict};
pub use geometry::{clamped_distance, rotate_around, Point};
pub use guide::{inside_guide, GuideConfig, GuideEllipse};
pub use landmarks::{normalize, DerolledFrame, IndexRange, LandmarkLayout};
pub use smile::{SmileBaseline, SmileConfig, SmileEvaluator, SmileMetrics};
pub use stability::{StabilityConfig, StabilityMonitor};
pub use synthetic::SyntheticFace;
