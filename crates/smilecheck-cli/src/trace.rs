//! JSON-lines landmark traces.
//!
//! One event per line:
//!
//! ```text
//! {"kind":"begin"}
//! {"kind":"frame","dt":0.033,"points":[{"x":612.0,"y":401.5}, ...]}
//! {"kind":"reset"}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};
use smilecheck_core::Point;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraceError {
    #[error("trace I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("trace line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("trace line {line}: dt must be finite and non-negative (got {dt})")]
    InvalidDt { line: usize, dt: f32 },
    #[error("failed to encode trace event: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceEvent {
    /// Leave the welcome stage.
    Begin,
    /// One tick of landmarks. An empty `points` list means no face.
    Frame {
        dt: f32,
        #[serde(default)]
        points: Vec<Point>,
    },
    /// External reset trigger.
    Reset,
}

/// Parse every event from `reader`, stopping at the first bad line.
pub fn read_events<R: BufRead>(reader: R) -> Result<Vec<TraceEvent>, TraceError> {
    let mut events = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let number = idx + 1;
        let event: TraceEvent = serde_json::from_str(trimmed)
            .map_err(|source| TraceError::Parse {
                line: number,
                source,
            })?;

        if let TraceEvent::Frame { dt, .. } = &event {
            if !(dt.is_finite() && *dt >= 0.0) {
                return Err(TraceError::InvalidDt {
                    line: number,
                    dt: *dt,
                });
            }
        }

        events.push(event);
    }

    Ok(events)
}

/// Write `events` as JSON lines.
pub fn write_events<W: Write>(mut writer: W, events: &[TraceEvent]) -> Result<(), TraceError> {
    for event in events {
        let line = serde_json::to_string(event).map_err(TraceError::Encode)?;
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;
    Ok(())
}
