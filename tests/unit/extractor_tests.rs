/*!
 * Tests for rightmost anchor extraction
 */

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use livesub::reconcile::{extract_new_part, Extraction, History};
use livesub::text::{fingerprint, Normalized};

fn history_with(confirmed: &str, anchor_length: usize) -> History {
    let mut history = History::new(anchor_length, 1000);
    history.append(&fingerprint(confirmed), confirmed);
    history
}

#[test]
fn test_extract_withRepeatedAnchor_shouldSplitAfterLastOccurrence() {
    let history = history_with("ABCDE", 5);
    let snapshot = Normalized::new("ABCDEABCDEFG");

    match extract_new_part(&snapshot, &history) {
        Extraction::New { fragment, ambiguous } => {
            assert_eq!(fragment.text, "FG");
            assert_eq!(fragment.fingerprint, "FG");
            assert!(ambiguous);
        }
        other => panic!("expected new text, got {:?}", other),
    }
}

#[test]
fn test_extract_withVerbatimRepetition_shouldNotReemit() {
    let history = history_with("A B C", 50);

    let repeated = Normalized::new("A B C A B C");
    assert_eq!(
        extract_new_part(&repeated, &history),
        Extraction::Unchanged { ambiguous: true }
    );

    let extended = Normalized::new("A B C A B C D E");
    match extract_new_part(&extended, &history) {
        Extraction::New { fragment, .. } => assert_eq!(fragment.text, "D E"),
        other => panic!("expected new text, got {:?}", other),
    }
}

#[test]
fn test_extract_shouldKeepDisplaySpacing() {
    let history = history_with("good morning", 50);
    let snapshot = Normalized::new("good  morning   dear\u{200b} friends");
    match extract_new_part(&snapshot, &history) {
        Extraction::New { fragment, ambiguous } => {
            assert_eq!(fragment.text, "dear friends");
            assert_eq!(fragment.fingerprint, "dearfriends");
            assert!(!ambiguous);
        }
        other => panic!("expected new text, got {:?}", other),
    }
}

#[test]
fn test_extract_withEmptyHistory_shouldReturnWholeSnapshot() {
    let history = History::new(50, 1000);
    match extract_new_part(&Normalized::new(" first words "), &history) {
        Extraction::New { fragment, ambiguous } => {
            assert_eq!(fragment.text, "first words");
            assert!(!ambiguous);
        }
        other => panic!("expected new text, got {:?}", other),
    }
}

#[test]
fn test_extract_withDivergedSnapshot_shouldReportNotFound() {
    let history = history_with("the meeting starts now", 50);
    let snapshot = Normalized::new("unrelated caption text");
    assert_eq!(extract_new_part(&snapshot, &history), Extraction::NotFound);
    assert!(!Extraction::NotFound.is_ambiguous());
}

/// Split point is always rfind(anchor) + len(anchor), over random inputs
#[test]
fn test_extract_randomized_shouldMatchRfindSplit() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..2000 {
        let len = rng.random_range(1..40);
        let text: String = (0..len)
            .map(|_| if rng.random_bool(0.5) { 'a' } else { 'b' })
            .collect();
        let anchor_len = rng.random_range(1..5);
        let anchor: String = (0..anchor_len)
            .map(|_| if rng.random_bool(0.5) { 'a' } else { 'b' })
            .collect();

        let history = history_with(&anchor, anchor_len);
        assert_eq!(history.trailing_anchor(), anchor);

        let result = extract_new_part(&Normalized::new(&text), &history);
        match text.rfind(&anchor) {
            None => assert_eq!(result, Extraction::NotFound, "{} / {}", text, anchor),
            Some(last) => {
                let split = last + anchor.len();
                let ambiguous = text.find(&anchor) != Some(last);
                if split == text.len() {
                    assert_eq!(result, Extraction::Unchanged { ambiguous }, "{} / {}", text, anchor);
                } else {
                    match result {
                        Extraction::New { fragment, ambiguous: flagged } => {
                            assert_eq!(fragment.text, &text[split..], "{} / {}", text, anchor);
                            assert_eq!(flagged, ambiguous);
                        }
                        other => panic!("{} / {}: unexpected {:?}", text, anchor, other),
                    }
                }
            }
        }
    }
}
