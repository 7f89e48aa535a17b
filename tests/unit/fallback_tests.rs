/*!
 * Tests for the fallback extractors
 */

use livesub::reconcile::fallback::{default_chain, run_chain, suffix_prefix_overlap};
use livesub::reconcile::{FallbackStrategy, History, IncrementalDelta, OverlapSlice};
use livesub::text::{fingerprint, Normalized};

fn history_with(confirmed: &str, processed_raw: &str, anchor_length: usize) -> History {
    let mut history = History::new(anchor_length, 1000);
    history.append(&fingerprint(confirmed), processed_raw);
    history
}

#[test]
fn test_incrementalDelta_withGrowingSnapshot_shouldReturnSuffix() {
    let history = history_with("the quick brown", "the quick brown", 50);
    let delta = IncrementalDelta::new(1);

    let fragment = delta
        .extract(&Normalized::new("the quick  brown fox"), &history)
        .unwrap();
    assert_eq!(fragment.text, "fox");
}

#[test]
fn test_incrementalDelta_withoutPreviousSnapshot_shouldDecline() {
    let history = History::new(50, 1000);
    let delta = IncrementalDelta::new(1);
    assert!(delta.extract(&Normalized::new("anything"), &history).is_none());
}

#[test]
fn test_incrementalDelta_withShortPrefix_shouldRespectMinOverlap() {
    let history = history_with("the cat", "the cat", 50);
    let snapshot = Normalized::new("tom");

    assert!(IncrementalDelta::new(3).extract(&snapshot, &history).is_none());

    // Permissive default accepts a single shared character
    let fragment = IncrementalDelta::new(1).extract(&snapshot, &history).unwrap();
    assert_eq!(fragment.text, "om");
}

#[test]
fn test_overlapSlice_withOverlapShorterThanAnchor_shouldRecover() {
    let history = history_with("abc def", "zzz", 4);
    assert_eq!(history.trailing_anchor(), "cdef");

    let fragment = OverlapSlice::new(1)
        .extract(&Normalized::new("ef gh"), &history)
        .unwrap();
    assert_eq!(fragment.text, "gh");
}

#[test]
fn test_overlapSlice_shouldScanBeyondTrailingAnchor() {
    // The overlap is longer than the anchor window
    let history = history_with("we will meet at noon", "zzz", 3);
    let fragment = OverlapSlice::new(1)
        .extract(&Normalized::new("meet at noon tomorrow"), &history)
        .unwrap();
    assert_eq!(fragment.text, "tomorrow");
}

#[test]
fn test_overlapSlice_withFullOverlap_shouldDecline() {
    let history = history_with("see you", "zzz", 50);
    assert!(OverlapSlice::new(1)
        .extract(&Normalized::new("you"), &history)
        .is_none());
}

#[test]
fn test_chain_shouldTryDeltaThenOverlap() {
    let chain = default_chain(1);
    assert_eq!(chain[0].name(), IncrementalDelta::NAME);
    assert_eq!(chain[1].name(), OverlapSlice::NAME);

    let history = history_with("we will meet at noon", "zzz", 50);
    let (name, fragment) = run_chain(&chain, &Normalized::new("at noon tomorrow"), &history).unwrap();
    assert_eq!(name, OverlapSlice::NAME);
    assert_eq!(fragment.text, "tomorrow");
}

#[test]
fn test_chain_withNoOverlap_shouldBeExhausted() {
    let chain = default_chain(1);
    let history = history_with("we will meet at noon", "we will meet at noon", 50);
    assert!(run_chain(&chain, &Normalized::new("xyz"), &history).is_none());
}

#[test]
fn test_suffixPrefixOverlap_shouldPreferLongest() {
    assert_eq!(suffix_prefix_overlap("abab", "ababx"), 4);
    assert_eq!(suffix_prefix_overlap("xaab", "aabz"), 3);
}
