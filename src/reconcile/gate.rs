/*!
 * Reconciliation gate.
 *
 * The gate wraps the anchor extractor with desync and ambiguity tracking.
 * For every distinct snapshot it either accepts the anchor extraction, falls
 * back to the incremental strategies, or drops the snapshot for this cycle.
 * When a failure counter reaches its threshold the outcome asks the owner
 * for a soft resync; the owner performs it once the emitted fragment has
 * been recorded, so the rebuilt history includes it.
 *
 * Nothing here fails. Every condition is absorbed and reported through the
 * returned outcome and the log.
 */

use log::{debug, info, warn};
use serde::Serialize;

use super::extractor::{extract_new_part, Extraction, Fragment};
use super::fallback::{default_chain, run_chain, FallbackStrategy};
use super::history::History;
use super::resync::{self, ResetKind};
use crate::app_config::ReconcileConfig;
use crate::session::models::Snapshot;
use crate::text::Normalized;

/// Consecutive-failure counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GateState {
    pub desync_count: u32,
    pub ambiguous_count: u32,
}

impl GateState {
    pub fn clear(&mut self) {
        self.desync_count = 0;
        self.ambiguous_count = 0;
    }
}

/// Coarse gate phase, derived from the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GatePhase {
    Normal,
    Desyncing,
    Resynchronizing,
}

/// Which path produced an emitted fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionSource {
    /// Trailing-anchor extraction
    Anchor,
    /// A fallback strategy, by name
    Fallback(&'static str),
    /// Whole snapshot emitted during the shutdown drain
    Forced,
}

/// What a single snapshot produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    /// Same raw text as the last snapshot seen
    Duplicate,
    /// No visible text
    Blank,
    /// Anchor matched but nothing follows it
    Unchanged,
    /// New confirmed text
    Emitted {
        fragment: Fragment,
        source: EmissionSource,
    },
    /// Desynced and no fallback produced text
    Dropped,
}

impl Emission {
    pub fn fragment(&self) -> Option<&Fragment> {
        match self {
            Self::Emitted { fragment, .. } => Some(fragment),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.fragment().map(|f| f.text.as_str())
    }
}

/// Why a soft resync is due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResyncTrigger {
    Desync { count: u32 },
    Ambiguous { count: u32 },
}

/// Result of reconciling one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateOutcome {
    pub emission: Emission,

    /// The anchor was not found in this snapshot
    pub desynced: bool,

    /// The anchor was found more than once in this snapshot
    pub ambiguous: bool,

    /// A soft resync must follow
    pub resync_due: Option<ResyncTrigger>,
}

impl GateOutcome {
    fn skipped(emission: Emission) -> Self {
        Self {
            emission,
            desynced: false,
            ambiguous: false,
            resync_due: None,
        }
    }
}

/// Serial reconciliation gate; owns the history for one capture session
pub struct Gate {
    history: History,
    state: GateState,
    fallbacks: Vec<Box<dyn FallbackStrategy>>,
    resync_threshold: u32,
    ambiguous_threshold: u32,
    soft_reset_window: usize,
    pending: Option<ResyncTrigger>,
}

impl Gate {
    /// Create a gate with the default fallback chain
    pub fn new(config: &ReconcileConfig) -> Self {
        Self::with_fallbacks(config, default_chain(config.min_fallback_overlap))
    }

    /// Create a gate with a custom fallback chain, tried in the given order
    pub fn with_fallbacks(config: &ReconcileConfig, fallbacks: Vec<Box<dyn FallbackStrategy>>) -> Self {
        Self {
            history: History::new(config.anchor_length, config.history_retain_chars),
            state: GateState::default(),
            fallbacks,
            resync_threshold: config.resync_threshold,
            ambiguous_threshold: config.ambiguous_threshold,
            soft_reset_window: config.soft_reset_unit_window,
            pending: None,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn phase(&self) -> GatePhase {
        if self.pending.is_some() {
            GatePhase::Resynchronizing
        } else if self.state.desync_count > 0 {
            GatePhase::Desyncing
        } else {
            GatePhase::Normal
        }
    }

    /// Units used to rebuild history on a soft resync
    pub fn soft_reset_window(&self) -> usize {
        self.soft_reset_window
    }

    /// The reset a threshold trip asks for
    pub fn soft_reset_kind(&self) -> ResetKind {
        ResetKind::Soft {
            window: self.soft_reset_window,
        }
    }

    /// Reconcile one snapshot
    pub fn reconcile(&mut self, snapshot: &Snapshot) -> GateOutcome {
        self.run(snapshot, false)
    }

    /// Reconcile a snapshot drained at shutdown.
    ///
    /// Behaves like `reconcile`, except that a desynced snapshot whose
    /// fallbacks are exhausted is emitted whole instead of dropped. A whole
    /// emission never asks for a soft resync.
    pub fn reconcile_forced(&mut self, snapshot: &Snapshot) -> GateOutcome {
        self.run(snapshot, true)
    }

    /// Reset the history and zero both counters
    pub fn resync(&mut self, kind: ResetKind, recent_units: &[String]) {
        resync::apply(kind, &mut self.history, &mut self.state, recent_units);
        self.pending = None;
    }

    fn run(&mut self, snapshot: &Snapshot, forced: bool) -> GateOutcome {
        let raw = snapshot.raw_text.as_str();
        if raw == self.history.last_raw() {
            return GateOutcome::skipped(Emission::Duplicate);
        }

        let normalized = Normalized::new(raw);
        if normalized.is_blank() {
            return GateOutcome::skipped(Emission::Blank);
        }
        self.history.mark_seen(raw);

        match extract_new_part(&normalized, &self.history) {
            Extraction::New { fragment, ambiguous } => {
                let resync_due = self.note_match(ambiguous);
                self.history.append(&fragment.fingerprint, raw);
                GateOutcome {
                    emission: Emission::Emitted {
                        fragment,
                        source: EmissionSource::Anchor,
                    },
                    desynced: false,
                    ambiguous,
                    resync_due,
                }
            }
            Extraction::Unchanged { ambiguous } => {
                let resync_due = self.note_match(ambiguous);
                self.history.mark_processed(raw);
                GateOutcome {
                    emission: Emission::Unchanged,
                    desynced: false,
                    ambiguous,
                    resync_due,
                }
            }
            Extraction::NotFound => self.recover(&normalized, raw, forced),
        }
    }

    fn recover(&mut self, normalized: &Normalized, raw: &str, forced: bool) -> GateOutcome {
        self.state.desync_count += 1;
        let count = self.state.desync_count;
        debug!(
            "Anchor not found ({} consecutive), trying fallbacks",
            count
        );

        let emission = match run_chain(&self.fallbacks, normalized, &self.history) {
            Some((name, fragment)) => {
                info!("Recovered {} char(s) via {}", fragment.text.chars().count(), name);
                self.history.append(&fragment.fingerprint, raw);
                Emission::Emitted {
                    fragment,
                    source: EmissionSource::Fallback(name),
                }
            }
            None if forced => {
                let fragment = Fragment::from_display(normalized.display());
                warn!(
                    "Shutdown drain: emitting desynced snapshot whole ({} chars)",
                    fragment.text.chars().count()
                );
                self.history.append(&fragment.fingerprint, raw);
                Emission::Emitted {
                    fragment,
                    source: EmissionSource::Forced,
                }
            }
            None => {
                if count * 2 >= self.resync_threshold {
                    warn!("Fallbacks exhausted, snapshot dropped (desync {}/{})", count, self.resync_threshold);
                } else {
                    debug!("Fallbacks exhausted, snapshot dropped");
                }
                Emission::Dropped
            }
        };

        // A forced emission ends the session; never rebuild history from it
        let forced_emission = matches!(
            emission,
            Emission::Emitted {
                source: EmissionSource::Forced,
                ..
            }
        );
        let resync_due = self.trip(
            count >= self.resync_threshold && !forced_emission,
            ResyncTrigger::Desync { count },
        );

        GateOutcome {
            emission,
            desynced: true,
            ambiguous: false,
            resync_due,
        }
    }

    /// Update counters after a primary match; returns a trigger when the ambiguity threshold trips
    fn note_match(&mut self, ambiguous: bool) -> Option<ResyncTrigger> {
        if !ambiguous {
            self.state.clear();
            return None;
        }

        self.state.desync_count = 0;
        self.state.ambiguous_count += 1;
        let count = self.state.ambiguous_count;
        debug!("Anchor occurs more than once ({} consecutive)", count);
        self.trip(count >= self.ambiguous_threshold, ResyncTrigger::Ambiguous { count })
    }

    fn trip(&mut self, reached: bool, trigger: ResyncTrigger) -> Option<ResyncTrigger> {
        if reached {
            self.pending = Some(trigger);
            Some(trigger)
        } else {
            None
        }
    }
}
