//! Capture protocol state machine.
//!
//! ```text
//!  Home ──begin()──▶ Align ──inside guide──▶ HoldStill ──still + mouth──▶ PromptSmile ──smile held──▶ Evaluate
//!                      ▲                        │                            │                          │
//!                      └──── left guide ────────┴────────────────────────────┘                          │
//!                      └─────────────────────────────── reset() ────────────────────────────────────────┘
//! ```
//!
//! Losing the face forces every stage except `Evaluate` back to `Align`;
//! a result, once frozen, survives tracking dropouts until an explicit
//! [`FlowController::reset`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::FlowConfig;
use crate::geometry::Point;
use crate::guide::GuideEllipse;
use crate::landmarks::{normalize, DerolledFrame, LandmarkLayout};
use crate::smile::SmileEvaluator;
use crate::stability::StabilityMonitor;

/// Floor for the hold-still duration when computing progress.
const MIN_PROGRESS_SECONDS: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Welcome screen, left only through [`FlowController::begin`] or by
    /// losing the face.
    Home,
    Align,
    HoldStill,
    PromptSmile,
    /// Terminal until reset.
    Evaluate,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Home => "home",
            Stage::Align => "align",
            Stage::HoldStill => "hold_still",
            Stage::PromptSmile => "prompt_smile",
            Stage::Evaluate => "evaluate",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Normal,
    Abnormal,
}

impl Verdict {
    pub fn is_abnormal(&self) -> bool {
        matches!(self, Verdict::Abnormal)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Normal => "NORMAL",
            Verdict::Abnormal => "ABNORMALITY DETECTED",
        }
    }
}

/// One tick of input to [`FlowController::update`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowInputs<'a> {
    pub has_face: bool,
    pub inside_guide: bool,
    /// Seconds since the previous tick.
    pub dt: f32,
    pub iod: f32,
    pub face_center: Point,
    /// De-rolled left and right mouth corners, when the set reaches them.
    pub mouth: Option<(Point, Point)>,
    /// The full de-rolled landmark set, when available.
    pub points: Option<&'a [Point]>,
}

impl<'a> FlowInputs<'a> {
    /// A tick with no tracked face.
    pub fn absent(dt: f32) -> Self {
        Self {
            dt,
            iod: 1.0,
            ..Self::default()
        }
    }

    pub fn from_frame(frame: &'a DerolledFrame, layout: &LandmarkLayout, dt: f32) -> Self {
        Self {
            has_face: true,
            inside_guide: frame.inside_guide,
            dt,
            iod: frame.iod,
            face_center: frame.face_center,
            mouth: frame.mouth_corners(layout),
            points: Some(frame.points.as_slice()),
        }
    }
}

/// Everything a renderer needs after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowStatus {
    pub stage: Stage,
    /// Hold-still progress in [0, 1].
    pub progress: f32,
    pub intensity: f32,
    pub asymmetry: f32,
    /// Present only in [`Stage::Evaluate`].
    pub verdict: Option<Verdict>,
    pub lines: Vec<String>,
}

/// Owns the stability monitor and smile evaluator and sequences them.
#[derive(Debug, Clone)]
pub struct FlowController {
    config: FlowConfig,
    guide: GuideEllipse,
    stage: Stage,
    stability: StabilityMonitor,
    smile: SmileEvaluator,
    smile_hold_time: f32,
    abnormal: bool,
}

impl FlowController {
    /// Build a controller parked on the welcome stage.
    ///
    /// The config is taken as-is; callers loading it from outside should run
    /// [`FlowConfig::validate`] first.
    pub fn new(config: FlowConfig) -> Self {
        let guide = config.guide.ellipse();
        let stability = StabilityMonitor::new(config.stability.clone());
        let smile = SmileEvaluator::new(config.smile.clone(), &config.layout);
        Self {
            config,
            guide,
            stage: Stage::Home,
            stability,
            smile,
            smile_hold_time: 0.0,
            abnormal: false,
        }
    }

    /// Leave the welcome stage. No effect anywhere else.
    pub fn begin(&mut self) {
        if self.stage == Stage::Home {
            self.transition(Stage::Align);
        }
    }

    /// Return to `Align` and clear all per-cycle state.
    pub fn reset(&mut self) {
        tracing::info!(from = %self.stage, "flow: reset");
        self.stage = Stage::Align;
        self.stability.reset();
        self.smile.reset();
        self.smile_hold_time = 0.0;
        self.abnormal = false;
    }

    /// Advance the protocol by one tick.
    pub fn update(&mut self, inputs: &FlowInputs<'_>) {
        if !inputs.has_face {
            self.smile.decay(self.config.absent_decay);
            if self.stage != Stage::Evaluate {
                self.transition(Stage::Align);
            }
            return;
        }

        match self.stage {
            Stage::Home | Stage::Evaluate => {}
            Stage::Align => {
                self.stability.reset();
                self.smile_hold_time = 0.0;
                if inputs.inside_guide {
                    self.transition(Stage::HoldStill);
                }
            }
            Stage::HoldStill => {
                self.stability.update(
                    inputs.face_center,
                    inputs.iod,
                    inputs.inside_guide,
                    inputs.dt,
                );
                if !inputs.inside_guide {
                    self.transition(Stage::Align);
                    return;
                }
                if self.stability.stable_time() < self.config.hold_still_seconds {
                    return;
                }
                // Without a mouth reading the subject has to stay still until
                // one coincides with the stability threshold
                if let Some((left, right)) = inputs.mouth {
                    self.smile.calibrate(left, right, inputs.iod);
                    tracing::info!(
                        iod = inputs.iod,
                        stable_time = self.stability.stable_time(),
                        "flow: neutral baseline captured"
                    );
                    self.transition(Stage::PromptSmile);
                }
            }
            Stage::PromptSmile => {
                if !inputs.inside_guide {
                    self.transition(Stage::Align);
                    return;
                }

                match (inputs.points, inputs.mouth) {
                    (Some(points), _) => self.smile.update_metrics(points, inputs.iod),
                    (None, Some((left, right))) => {
                        self.smile.update_from_corners(left, right, inputs.iod)
                    }
                    (None, None) => {}
                }

                if self.smile.is_smiling() {
                    self.smile_hold_time += inputs.dt;
                } else {
                    self.smile_hold_time = 0.0;
                }

                if self.smile_hold_time >= self.config.smile_hold_seconds {
                    self.abnormal = self.smile.above_asymmetry_threshold();
                    tracing::info!(
                        intensity = self.smile.intensity(),
                        asymmetry = self.smile.asymmetry(),
                        abnormal = self.abnormal,
                        "flow: verdict frozen"
                    );
                    self.transition(Stage::Evaluate);
                }
            }
        }
    }

    /// Normalize raw landmarks, advance one tick and report the result.
    ///
    /// An empty or too-short landmark set counts as "no face".
    pub fn tick(&mut self, landmarks: &[Point], dt: f32) -> FlowStatus {
        let frame = normalize(landmarks, &self.config.layout, &self.guide);
        let inputs = match &frame {
            Some(frame) => FlowInputs::from_frame(frame, &self.config.layout, dt),
            None => FlowInputs::absent(dt),
        };
        self.update(&inputs);
        self.status()
    }

    fn transition(&mut self, to: Stage) {
        if self.stage != to {
            tracing::debug!(from = %self.stage, to = %to, "flow: stage transition");
            self.stage = to;
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn guide(&self) -> &GuideEllipse {
        &self.guide
    }

    /// The frozen result, once in `Evaluate`.
    pub fn verdict(&self) -> Option<Verdict> {
        if self.stage != Stage::Evaluate {
            return None;
        }
        Some(if self.abnormal {
            Verdict::Abnormal
        } else {
            Verdict::Normal
        })
    }

    pub fn stability_progress(&self) -> f32 {
        let hold = self.config.hold_still_seconds.max(MIN_PROGRESS_SECONDS);
        (self.stability.stable_time() / hold).clamp(0.0, 1.0)
    }

    pub fn stable_time(&self) -> f32 {
        self.stability.stable_time()
    }

    pub fn smile_hold_time(&self) -> f32 {
        self.smile_hold_time
    }

    pub fn smile_intensity(&self) -> f32 {
        self.smile.intensity()
    }

    pub fn smile_asymmetry(&self) -> f32 {
        self.smile.asymmetry()
    }

    pub fn is_calibrated(&self) -> bool {
        self.smile.is_calibrated()
    }

    /// Human-readable instructions for the current stage.
    pub fn status_lines(&self) -> Vec<String> {
        match self.stage {
            Stage::Home => vec![
                "Welcome!".to_string(),
                "Align your head inside the oval, hold still, then smile.".to_string(),
                "The check compares both mouth corners.".to_string(),
                "Press any key to begin.".to_string(),
            ],
            Stage::Align => vec![
                "Align your head inside the oval.".to_string(),
                "Keep your head roughly upright.".to_string(),
            ],
            Stage::HoldStill => vec![
                "Hold still...".to_string(),
                "Capturing neutral baseline.".to_string(),
                format!("Progress: {:.0}%", self.stability_progress() * 100.0),
            ],
            Stage::PromptSmile => vec![
                "Show your teeth (smile)!".to_string(),
                "Hold for a moment...".to_string(),
                format!(
                    "Smile intensity: {:.3}  |  Asym: {:.3}",
                    self.smile.intensity(),
                    self.smile.asymmetry()
                ),
            ],
            Stage::Evaluate => {
                let label = self.verdict().map_or("", |v| v.label());
                vec![
                    "Result:".to_string(),
                    label.to_string(),
                    "Reset to run again.".to_string(),
                ]
            }
        }
    }

    pub fn status(&self) -> FlowStatus {
        FlowStatus {
            stage: self.stage,
            progress: self.stability_progress(),
            intensity: self.smile.intensity(),
            asymmetry: self.smile.asymmetry(),
            verdict: self.verdict(),
            lines: self.status_lines(),
        }
    }
}

impl Default for FlowController {
    fn default() -> Self {
        Self::new(FlowConfig::default())
    }
}
