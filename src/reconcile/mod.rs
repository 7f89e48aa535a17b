/*!
 * Snapshot reconciliation.
 *
 * This module turns a stream of overlapping caption snapshots into a stream
 * of confirmed, non-repeating fragments:
 * - `history`: confirmed fingerprint and trailing anchor
 * - `extractor`: rightmost anchor matching
 * - `fallback`: incremental strategies used when the anchor is lost
 * - `gate`: desync and ambiguity tracking around the extractor
 * - `resync`: full and soft history resets
 */

pub mod extractor;
pub mod fallback;
pub mod gate;
pub mod history;
pub mod resync;

pub use extractor::{extract_new_part, find_anchor, AnchorMatch, Extraction, Fragment};
pub use fallback::{FallbackStrategy, IncrementalDelta, OverlapSlice};
pub use gate::{Emission, EmissionSource, Gate, GateOutcome, GatePhase, GateState, ResyncTrigger};
pub use history::History;
pub use resync::{RegionCleared, ResetKind};
