/*!
 * Anchor-based extraction of the new part of a snapshot.
 *
 * The trailing anchor of the history is searched in the snapshot
 * fingerprint and everything after its **last** occurrence is new.
 *
 * Captions repeat short phrases all the time. When the anchor happens to be
 * one of them, splitting at the first occurrence would treat already
 * confirmed text as new and re-emit it on the next cycle. Splitting at the
 * rightmost occurrence never re-emits text that lies before the most recent
 * reattachment point.
 *
 * A second occurrence is still reported as ambiguity so the gate can count it.
 */

use super::history::History;
use crate::text::{fingerprint, Normalized};

/// A slice of a snapshot that has not been confirmed yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Display text of the new part
    pub text: String,

    /// Fingerprint of the new part, appended to the history on acceptance
    pub fingerprint: String,
}

impl Fragment {
    /// Build a fragment from a display slice
    pub fn from_display(text: &str) -> Self {
        let text = text.trim();
        Self {
            text: text.to_string(),
            fingerprint: fingerprint(text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprint.is_empty()
    }
}

/// Result of matching a snapshot against the trailing anchor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// New text after the reattachment point
    New {
        fragment: Fragment,
        /// The anchor occurs more than once in the snapshot
        ambiguous: bool,
    },

    /// Anchor found at the very end: the source re-rendered known content
    Unchanged { ambiguous: bool },

    /// Anchor absent: the snapshot diverged from history
    NotFound,
}

impl Extraction {
    pub fn is_ambiguous(&self) -> bool {
        match self {
            Self::New { ambiguous, .. } | Self::Unchanged { ambiguous } => *ambiguous,
            Self::NotFound => false,
        }
    }
}

/// Anchor match positions within a fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorMatch {
    /// Byte offset of the rightmost occurrence
    pub last: usize,
    /// More than one occurrence exists
    pub ambiguous: bool,
}

/// Locate the rightmost occurrence of `anchor` in `haystack`
pub fn find_anchor(haystack: &str, anchor: &str) -> Option<AnchorMatch> {
    let last = haystack.rfind(anchor)?;
    let first = haystack.find(anchor)?;
    Some(AnchorMatch {
        last,
        ambiguous: first != last,
    })
}

/// Compute the part of `snapshot` that follows the history's trailing anchor
pub fn extract_new_part(snapshot: &Normalized, history: &History) -> Extraction {
    let anchor = history.trailing_anchor();

    // Session start or just reset: everything is new
    if anchor.is_empty() {
        if snapshot.is_blank() {
            return Extraction::Unchanged { ambiguous: false };
        }
        return Extraction::New {
            fragment: Fragment::from_display(snapshot.display()),
            ambiguous: false,
        };
    }

    let Some(found) = find_anchor(snapshot.fingerprint(), anchor) else {
        return Extraction::NotFound;
    };

    let split = found.last + anchor.len();
    let fragment = Fragment::from_display(snapshot.display_from(split));
    if fragment.is_empty() {
        Extraction::Unchanged {
            ambiguous: found.ambiguous,
        }
    } else {
        Extraction::New {
            fragment,
            ambiguous: found.ambiguous,
        }
    }
}
