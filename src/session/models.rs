/*!
 * Capture session models.
 *
 * Events delivered by the snapshot producer, and the counters and report a
 * session hands back when it ends.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::reconcile::gate::{Emission, EmissionSource, GateOutcome};
use crate::reconcile::resync::RegionCleared;
use crate::subtitle_processor::SubtitleEntry;

/// One full read of the live caption region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Entire visible text at read time
    pub raw_text: String,
    /// When the read happened
    pub observed_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(raw_text: impl Into<String>, observed_at: DateTime<Utc>) -> Self {
        Self {
            raw_text: raw_text.into(),
            observed_at,
        }
    }

    /// Snapshot stamped with the current time
    pub fn now(raw_text: impl Into<String>) -> Self {
        Self::new(raw_text, Utc::now())
    }
}

/// Ordered events from the producer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// A new read of the caption region
    Snapshot(Snapshot),
    /// The region was observed empty after having had content
    RegionCleared(RegionCleared),
    /// Keepalive: the open unit is still on screen
    Tick { at: DateTime<Utc> },
}

impl SourceEvent {
    pub fn observed_at(&self) -> DateTime<Utc> {
        match self {
            Self::Snapshot(snapshot) => snapshot.observed_at,
            Self::RegionCleared(cleared) => cleared.observed_at,
            Self::Tick { at } => *at,
        }
    }
}

/// Counters collected over a capture session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Snapshots received
    pub snapshots: u64,
    /// Repeats of the previous snapshot
    pub duplicates: u64,
    /// Snapshots with no visible text
    pub blanks: u64,
    /// Fragments emitted downstream
    pub emitted: u64,
    /// Snapshots with nothing new after the anchor
    pub unchanged: u64,
    /// Snapshots where the anchor was not found
    pub desyncs: u64,
    /// Snapshots where the anchor occurred more than once
    pub ambiguous: u64,
    /// Fallback recoveries, per strategy
    pub fallback_recoveries: BTreeMap<String, u64>,
    /// Desynced snapshots dropped after the fallbacks
    pub dropped: u64,
    /// Whole-snapshot emissions during the shutdown drain
    pub forced: u64,
    pub soft_resyncs: u64,
    pub full_resets: u64,
    pub ticks: u64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one gate outcome
    pub fn record(&mut self, outcome: &GateOutcome) {
        self.snapshots += 1;
        if outcome.desynced {
            self.desyncs += 1;
        }
        if outcome.ambiguous {
            self.ambiguous += 1;
        }

        match &outcome.emission {
            Emission::Duplicate => self.duplicates += 1,
            Emission::Blank => self.blanks += 1,
            Emission::Unchanged => self.unchanged += 1,
            Emission::Dropped => self.dropped += 1,
            Emission::Emitted { source, .. } => {
                self.emitted += 1;
                match source {
                    EmissionSource::Anchor => {}
                    EmissionSource::Fallback(name) => {
                        *self.fallback_recoveries.entry((*name).to_string()).or_default() += 1;
                    }
                    EmissionSource::Forced => self.forced += 1,
                }
            }
        }
    }

    /// Recoveries across all fallback strategies
    pub fn total_recoveries(&self) -> u64 {
        self.fallback_recoveries.values().sum()
    }
}

/// Everything a finished session produced
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stats: SessionStats,
    pub units: Vec<SubtitleEntry>,
}

impl SessionReport {
    pub fn total_chars(&self) -> usize {
        self.units.iter().map(|u| u.char_count).sum()
    }
}

impl std::fmt::Display for SessionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} unit(s), {} fragment(s), {} desync(s), {} resync(s)",
            &self.session_id[..8.min(self.session_id.len())],
            self.units.len(),
            self.stats.emitted,
            self.stats.desyncs,
            self.stats.soft_resyncs + self.stats.full_resets
        )
    }
}
