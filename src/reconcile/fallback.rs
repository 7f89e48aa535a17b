/*!
 * Fallback extractors used when the trailing anchor is not found.
 *
 * Strategies are tried in order until one yields a non-empty fragment:
 * 1. `IncrementalDelta`: compare against the last reconciled snapshot
 * 2. `OverlapSlice`: align the start of the snapshot with the end of the
 *    whole retained confirmed history
 *
 * Both accept overlaps as short as `min_overlap` characters (one by
 * default). A missed caption is worse than a few duplicated characters.
 */

use super::extractor::Fragment;
use super::history::History;
use crate::text::{fingerprint, Normalized};

/// One incremental extraction strategy
pub trait FallbackStrategy: Send {
    /// Short identifier used in logs and stats
    fn name(&self) -> &'static str;

    /// Extract new text, or `None` when this strategy cannot tell
    fn extract(&self, snapshot: &Normalized, history: &History) -> Option<Fragment>;
}

/// Suffix of the snapshot beyond its common prefix with the last reconciled snapshot
#[derive(Debug, Clone)]
pub struct IncrementalDelta {
    min_overlap: usize,
}

impl IncrementalDelta {
    pub const NAME: &'static str = "incremental_delta";

    pub fn new(min_overlap: usize) -> Self {
        Self {
            min_overlap: min_overlap.max(1),
        }
    }
}

impl FallbackStrategy for IncrementalDelta {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn extract(&self, snapshot: &Normalized, history: &History) -> Option<Fragment> {
        let previous = history.last_processed_raw();
        if previous.is_empty() {
            return None;
        }

        let previous = fingerprint(previous);
        let current = snapshot.fingerprint();
        let common = common_prefix_len(&previous, current);
        if current[..common].chars().count() < self.min_overlap {
            return None;
        }

        let fragment = Fragment::from_display(snapshot.display_from(common));
        (!fragment.is_empty()).then_some(fragment)
    }
}

/// Longest suffix of the confirmed history that the snapshot starts with
#[derive(Debug, Clone)]
pub struct OverlapSlice {
    min_overlap: usize,
}

impl OverlapSlice {
    pub const NAME: &'static str = "overlap_slice";

    pub fn new(min_overlap: usize) -> Self {
        Self {
            min_overlap: min_overlap.max(1),
        }
    }
}

impl FallbackStrategy for OverlapSlice {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn extract(&self, snapshot: &Normalized, history: &History) -> Option<Fragment> {
        let confirmed = history.confirmed_fingerprint();
        let current = snapshot.fingerprint();

        let overlap = suffix_prefix_overlap(confirmed, current);
        if overlap == 0 || current[..overlap].chars().count() < self.min_overlap {
            return None;
        }

        let fragment = Fragment::from_display(snapshot.display_from(overlap));
        (!fragment.is_empty()).then_some(fragment)
    }
}

/// The fixed fallback order
pub fn default_chain(min_overlap: usize) -> Vec<Box<dyn FallbackStrategy>> {
    vec![
        Box::new(IncrementalDelta::new(min_overlap)),
        Box::new(OverlapSlice::new(min_overlap)),
    ]
}

/// Run strategies in order and return the first non-empty result with its strategy name
pub fn run_chain(
    chain: &[Box<dyn FallbackStrategy>],
    snapshot: &Normalized,
    history: &History,
) -> Option<(&'static str, Fragment)> {
    chain
        .iter()
        .find_map(|strategy| strategy.extract(snapshot, history).map(|f| (strategy.name(), f)))
}

/// Byte length of the longest common prefix, on a character boundary
pub fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, ca), cb)| ca != cb)
        .map(|((idx, _), _)| idx)
        .unwrap_or_else(|| a.len().min(b.len()))
}

/// Byte length of the longest prefix of `text` that is also a suffix of `history`.
///
/// Runs the KMP automaton of `text` over `history`, so the whole retained
/// history is scanned in linear time. Both inputs are valid UTF-8, so a byte
/// match always ends on a character boundary.
pub fn suffix_prefix_overlap(history: &str, text: &str) -> usize {
    let pattern = text.as_bytes();
    if pattern.is_empty() || history.is_empty() {
        return 0;
    }

    let failure = prefix_function(pattern);
    let mut matched = 0;
    for &byte in history.as_bytes() {
        while matched > 0 && (matched == pattern.len() || pattern[matched] != byte) {
            matched = failure[matched - 1];
        }
        if pattern[matched] == byte {
            matched += 1;
        }
    }
    matched
}

fn prefix_function(pattern: &[u8]) -> Vec<usize> {
    let mut pi = vec![0; pattern.len()];
    let mut k = 0;
    for i in 1..pattern.len() {
        while k > 0 && pattern[i] != pattern[k] {
            k = pi[k - 1];
        }
        if pattern[i] == pattern[k] {
            k += 1;
        }
        pi[i] = k;
    }
    pi
}
