/*!
 * Recorded snapshot streams.
 *
 * A replay file holds the events a live capture would have produced, in
 * order. Two formats are read:
 * - JSON lines: `{"type":"snapshot","text":"...","at_ms":1200}`,
 *   `{"type":"region_cleared","at_ms":..}` and `{"type":"tick","at_ms":..}`.
 *   `at_ms` is an offset from the replay start; when missing the event is
 *   placed one step after the previous one.
 * - Plain text: one snapshot per line, `---` marks a cleared region. Events
 *   are spaced one step apart.
 *
 * Blank lines are skipped in both formats. An event time that does not fit
 * in a timestamp is a parse error.
 */

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::errors::ReplayError;
use crate::reconcile::resync::RegionCleared;
use crate::session::models::{Snapshot, SourceEvent};

/// Plain-text line marking a cleared caption region
pub const CLEARED_MARKER: &str = "---";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReplayFormat {
    /// One JSON event per line
    #[value(name = "jsonl")]
    JsonLines,
    /// One snapshot per line
    Plain,
}

impl ReplayFormat {
    /// Guess the format from a file extension; anything unknown is plain text
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("jsonl") | Some("json") | Some("ndjson") => Self::JsonLines,
            _ => Self::Plain,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ReplayRecord {
    Snapshot {
        text: String,
        #[serde(default)]
        at_ms: Option<u64>,
    },
    RegionCleared {
        #[serde(default)]
        at_ms: Option<u64>,
    },
    Tick {
        #[serde(default)]
        at_ms: Option<u64>,
    },
}

/// Parse a replay into ordered source events
pub fn parse_replay(
    input: &str,
    format: ReplayFormat,
    start: DateTime<Utc>,
    step: Duration,
) -> Result<Vec<SourceEvent>, ReplayError> {
    match format {
        ReplayFormat::JsonLines => parse_json_lines(input, start, step),
        ReplayFormat::Plain => parse_plain(input, start, step),
    }
}

fn parse_json_lines(input: &str, start: DateTime<Utc>, step: Duration) -> Result<Vec<SourceEvent>, ReplayError> {
    let mut events = Vec::new();
    let mut previous: Option<DateTime<Utc>> = None;

    for (idx, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record: ReplayRecord = serde_json::from_str(line).map_err(|e| ReplayError::Parse {
            line: idx + 1,
            message: e.to_string(),
        })?;

        let mut place = |at_ms: Option<u64>| -> Result<DateTime<Utc>, ReplayError> {
            let at = match at_ms {
                Some(ms) => i64::try_from(ms)
                    .ok()
                    .and_then(Duration::try_milliseconds)
                    .and_then(|offset| start.checked_add_signed(offset)),
                None => match previous {
                    Some(p) => p.checked_add_signed(step),
                    None => Some(start),
                },
            };
            let at = at.ok_or_else(|| out_of_range(idx + 1, at_ms))?;
            previous = Some(at);
            Ok(at)
        };

        let event = match record {
            ReplayRecord::Snapshot { text, at_ms } => SourceEvent::Snapshot(Snapshot::new(text, place(at_ms)?)),
            ReplayRecord::RegionCleared { at_ms } => SourceEvent::RegionCleared(RegionCleared::new(place(at_ms)?)),
            ReplayRecord::Tick { at_ms } => SourceEvent::Tick { at: place(at_ms)? },
        };
        events.push(event);
    }

    Ok(events)
}

fn parse_plain(input: &str, start: DateTime<Utc>, step: Duration) -> Result<Vec<SourceEvent>, ReplayError> {
    let mut events = Vec::new();
    let mut at = start;

    for (idx, line) in input.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if !events.is_empty() {
            at = at
                .checked_add_signed(step)
                .ok_or_else(|| out_of_range(idx + 1, None))?;
        }

        let event = if line.trim() == CLEARED_MARKER {
            SourceEvent::RegionCleared(RegionCleared::new(at))
        } else {
            SourceEvent::Snapshot(Snapshot::new(line, at))
        };
        events.push(event);
    }

    Ok(events)
}

fn out_of_range(line: usize, at_ms: Option<u64>) -> ReplayError {
    let message = match at_ms {
        Some(ms) => format!("at_ms out of range: {}", ms),
        None => "event time out of range".to_string(),
    };
    ReplayError::Parse { line, message }
}
