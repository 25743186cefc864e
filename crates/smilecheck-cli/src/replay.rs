//! `smilecheck replay` — runs a recorded landmark trace through a session.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use smilecheck_core::{FlowConfig, FlowStatus, Stage};

use crate::session::{spawn_session, SessionHandle};
use crate::trace::{read_events, TraceEvent};

pub struct ReplayOptions {
    /// Print every tick's status as a JSON line instead of stage changes.
    pub json: bool,
    /// Stay on the welcome stage until the trace sends `begin`.
    pub wait_for_begin: bool,
}

/// Outcome of a replay.
#[derive(Debug)]
pub struct ReplaySummary {
    pub frames: usize,
    pub resets: usize,
    pub last: FlowStatus,
}

pub async fn run(path: &Path, config: FlowConfig, options: &ReplayOptions) -> Result<ReplaySummary> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let events = read_events(BufReader::new(file))
        .with_context(|| format!("failed to read trace {}", path.display()))?;
    tracing::info!(path = %path.display(), events = events.len(), "replaying trace");

    let session = spawn_session(config)?;
    let summary = replay_events(&session, &events, options).await?;

    tracing::info!(
        frames = summary.frames,
        resets = summary.resets,
        stage = %summary.last.stage,
        "replay finished"
    );

    match summary.last.verdict {
        Some(verdict) => println!("final: {} ({})", summary.last.stage, verdict.label()),
        None => println!("final: {} (no verdict)", summary.last.stage),
    }

    Ok(summary)
}

/// Feed `events` to `session`, printing as configured.
pub async fn replay_events(
    session: &SessionHandle,
    events: &[TraceEvent],
    options: &ReplayOptions,
) -> Result<ReplaySummary> {
    let mut last = if options.wait_for_begin {
        session.status().await?
    } else {
        session.begin().await?
    };
    let mut previous_stage: Option<Stage> = None;
    let mut frames = 0;
    let mut resets = 0;

    for event in events {
        last = match event {
            TraceEvent::Begin => session.begin().await?,
            TraceEvent::Reset => {
                resets += 1;
                session.reset().await?
            }
            TraceEvent::Frame { dt, points } => {
                frames += 1;
                session.tick(points.clone(), *dt).await?
            }
        };

        if options.json {
            println!("{}", serde_json::to_string(&last)?);
        } else if previous_stage != Some(last.stage) {
            println!("[{}]", last.stage);
            for line in &last.lines {
                println!("  {line}");
            }
        }
        previous_stage = Some(last.stage);
    }

    Ok(ReplaySummary {
        frames,
        resets,
        last,
    })
}
