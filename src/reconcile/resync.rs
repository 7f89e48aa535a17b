/*!
 * History resynchronization.
 *
 * Two reset strategies exist and are dispatched by the caller:
 * - `ResetKind::Full` discards all context. It can only be built from a
 *   `RegionCleared` boundary event, i.e. when the source positively
 *   asserted that the caption region was emptied.
 * - `ResetKind::Soft` rebuilds the confirmed fingerprint from the most
 *   recent emitted units. The caption region still shows recent text, so
 *   the next snapshot must reattach to it instead of being read as new.
 */

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use super::gate::GateState;
use super::history::History;
use crate::text::{fingerprint, tail_chars};

/// Boundary signal: the source region was observed empty after having had content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionCleared {
    pub observed_at: DateTime<Utc>,
}

impl RegionCleared {
    pub fn new(observed_at: DateTime<Utc>) -> Self {
        Self { observed_at }
    }
}

/// How the history is reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetKind {
    /// Discard everything; requires the boundary event that justifies it
    Full(RegionCleared),

    /// Rebuild from the last `window` emitted units
    Soft { window: usize },
}

impl ResetKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Full(_) => "full",
            Self::Soft { .. } => "soft",
        }
    }
}

/// Apply a reset to the history and zero the gate counters.
///
/// `recent_units` holds unit texts in emission order; only the last
/// `window` of them are used for a soft reset. The caller must have
/// finalized any open unit before a full reset.
pub fn apply(kind: ResetKind, history: &mut History, state: &mut GateState, recent_units: &[String]) {
    match kind {
        ResetKind::Full(cleared) => {
            history.clear();
            info!("Full reset: caption region cleared at {}", cleared.observed_at);
        }
        ResetKind::Soft { window } => {
            let start = recent_units.len().saturating_sub(window);
            let rebuilt = fingerprint(&recent_units[start..].join(" "));
            history.rebuild(&rebuilt);

            if history.is_empty() {
                info!("Soft reset: no emitted units, history emptied");
            } else {
                info!(
                    "Soft reset from {} unit(s), anchor tail '{}'",
                    recent_units.len() - start,
                    tail_chars(history.trailing_anchor(), 20)
                );
            }
        }
    }
    state.clear();
}
