//! `smilecheck synth` — writes a synthetic capture trace to stdout.

use anyhow::{ensure, Result};
use clap::Args;
use smilecheck_core::SyntheticFace;

use crate::trace::{write_events, TraceEvent};

#[derive(Args, Debug, Clone)]
pub struct SynthArgs {
    /// Frames per second of the generated trace.
    #[arg(long, default_value_t = 30.0)]
    pub fps: f32,
    /// Left mouth-corner raise while smiling, in IOD units.
    #[arg(long, default_value_t = 0.1)]
    pub left_raise: f32,
    /// Right mouth-corner raise while smiling, in IOD units.
    #[arg(long, default_value_t = 0.1)]
    pub right_raise: f32,
    /// Head roll in degrees, applied to every frame.
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub roll_deg: f32,
    /// Seconds of neutral, motionless face before the smile.
    #[arg(long, default_value_t = 2.5)]
    pub settle_secs: f32,
    /// Seconds of smiling.
    #[arg(long, default_value_t = 2.0)]
    pub smile_secs: f32,
}

/// Upper bound on generated frames.
const MAX_FRAMES: usize = 1_000_000;

/// Build the event sequence: begin, neutral hold, smile.
pub fn build(args: &SynthArgs) -> Result<Vec<TraceEvent>> {
    ensure!(
        args.fps.is_finite() && args.fps > 0.0,
        "--fps must be a positive finite number"
    );
    ensure!(
        args.settle_secs.is_finite()
            && args.smile_secs.is_finite()
            && args.settle_secs >= 0.0
            && args.smile_secs >= 0.0,
        "durations must be finite and non-negative"
    );
    let total = (args.settle_secs * args.fps).ceil() + (args.smile_secs * args.fps).ceil();
    ensure!(
        total <= MAX_FRAMES as f32,
        "trace would need {total} frames (limit {MAX_FRAMES})"
    );

    let dt = 1.0 / args.fps;
    let neutral = SyntheticFace {
        roll: args.roll_deg.to_radians(),
        ..SyntheticFace::default()
    };
    let smiling = neutral.smiling(args.left_raise, args.right_raise);

    let settle_frames = (args.settle_secs * args.fps).ceil() as usize;
    let smile_frames = (args.smile_secs * args.fps).ceil() as usize;

    let mut events = Vec::with_capacity(1 + settle_frames + smile_frames);
    events.push(TraceEvent::Begin);
    let neutral_points = neutral.points();
    events.extend((0..settle_frames).map(|_| TraceEvent::Frame {
        dt,
        points: neutral_points.clone(),
    }));
    let smile_points = smiling.points();
    events.extend((0..smile_frames).map(|_| TraceEvent::Frame {
        dt,
        points: smile_points.clone(),
    }));

    Ok(events)
}

pub fn run(args: &SynthArgs) -> Result<()> {
    let events = build(args)?;
    let stdout = std::io::stdout();
    write_events(stdout.lock(), &events)?;
    tracing::debug!(events = events.len(), "synthetic trace written");
    Ok(())
}
