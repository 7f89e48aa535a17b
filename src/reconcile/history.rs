/*!
 * Confirmed-text history.
 *
 * The history is the single source of truth for what has already been
 * confirmed in a capture session. It keeps the fingerprint of every
 * confirmed fragment, concatenated in order, and a trailing anchor of at
 * most `anchor_length` characters used to reattach the next snapshot.
 *
 * The confirmed fingerprint is append-only between resets, but only its
 * last `retain_chars` characters are kept in memory. That window is what the
 * overlap fallback scans, so nothing older is ever needed.
 */

use crate::text::tail_chars;

/// Confirmed fingerprint history plus the trailing reattachment anchor
#[derive(Debug, Clone)]
pub struct History {
    // @field: Retained tail of every confirmed fingerprint, in order
    confirmed_fingerprint: String,

    // @field: Number of characters currently held in confirmed_fingerprint
    retained_chars: usize,

    // @field: Total characters ever confirmed since the last reset
    confirmed_total_chars: usize,

    // @field: Last anchor_length characters of confirmed_fingerprint
    trailing_anchor: String,

    // @field: Last snapshot seen
    last_raw: String,

    // @field: Last snapshot successfully reconciled
    last_processed_raw: String,

    anchor_length: usize,
    retain_chars: usize,
}

impl History {
    /// Create an empty history.
    ///
    /// `retain_chars` is raised to `anchor_length` if smaller, so the anchor
    /// is always a suffix of the retained fingerprint.
    pub fn new(anchor_length: usize, retain_chars: usize) -> Self {
        Self {
            confirmed_fingerprint: String::new(),
            retained_chars: 0,
            confirmed_total_chars: 0,
            trailing_anchor: String::new(),
            last_raw: String::new(),
            last_processed_raw: String::new(),
            anchor_length,
            retain_chars: retain_chars.max(anchor_length),
        }
    }

    /// Retained confirmed fingerprint (oldest characters may have been compacted away)
    pub fn confirmed_fingerprint(&self) -> &str {
        &self.confirmed_fingerprint
    }

    /// Reattachment anchor for the next snapshot
    pub fn trailing_anchor(&self) -> &str {
        &self.trailing_anchor
    }

    pub fn last_raw(&self) -> &str {
        &self.last_raw
    }

    pub fn last_processed_raw(&self) -> &str {
        &self.last_processed_raw
    }

    pub fn anchor_length(&self) -> usize {
        self.anchor_length
    }

    /// Characters confirmed since the last reset, including compacted ones
    pub fn confirmed_total_chars(&self) -> usize {
        self.confirmed_total_chars
    }

    /// True right after session start or a reset
    pub fn is_empty(&self) -> bool {
        self.trailing_anchor.is_empty()
    }

    /// Record a snapshot as seen, for the idempotence short-circuit
    pub fn mark_seen(&mut self, raw: &str) {
        self.last_raw.clear();
        self.last_raw.push_str(raw);
    }

    /// Append a confirmed fragment's fingerprint and record the snapshot it came from
    pub fn append(&mut self, fragment_fingerprint: &str, raw: &str) {
        let added = fragment_fingerprint.chars().count();
        self.confirmed_fingerprint.push_str(fragment_fingerprint);
        self.retained_chars += added;
        self.confirmed_total_chars += added;
        self.compact();
        self.refresh_anchor();

        self.last_processed_raw.clear();
        self.last_processed_raw.push_str(raw);
    }

    /// Record a snapshot as reconciled without confirming anything new
    pub fn mark_processed(&mut self, raw: &str) {
        self.last_processed_raw.clear();
        self.last_processed_raw.push_str(raw);
    }

    /// Drop everything: fingerprint, anchor and both raw markers
    pub(crate) fn clear(&mut self) {
        self.confirmed_fingerprint.clear();
        self.retained_chars = 0;
        self.confirmed_total_chars = 0;
        self.trailing_anchor.clear();
        self.last_raw.clear();
        self.last_processed_raw.clear();
    }

    /// Replace the confirmed fingerprint with one rebuilt from recent output.
    ///
    /// The raw markers are kept so the incremental fallback and the
    /// idempotence check keep working across the rebuild.
    pub(crate) fn rebuild(&mut self, fingerprint: &str) {
        self.confirmed_fingerprint.clear();
        self.confirmed_fingerprint.push_str(fingerprint);
        self.retained_chars = fingerprint.chars().count();
        self.confirmed_total_chars = self.retained_chars;
        self.compact();
        self.refresh_anchor();
    }

    fn compact(&mut self) {
        if self.retained_chars <= self.retain_chars {
            return;
        }
        let keep = tail_chars(&self.confirmed_fingerprint, self.retain_chars);
        let cut = self.confirmed_fingerprint.len() - keep.len();
        self.confirmed_fingerprint.replace_range(..cut, "");
        self.retained_chars = self.retain_chars;
    }

    fn refresh_anchor(&mut self) {
        let anchor = tail_chars(&self.confirmed_fingerprint, self.anchor_length);
        self.trailing_anchor.clear();
        self.trailing_anchor.push_str(anchor);
    }
}
