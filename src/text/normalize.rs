/*!
 * Snapshot normalization.
 *
 * A raw snapshot is projected two ways:
 * - display text: zero-width characters stripped, whitespace runs collapsed
 *   to a single space, ends trimmed
 * - fingerprint: the display text with every whitespace character removed
 *
 * The fingerprint is only ever used for comparison. Any offset found in the
 * fingerprint can be mapped back to the display text through `Normalized`,
 * which is how extracted fragments keep their original spacing.
 *
 * Two display texts that differ only in where the spaces fall collapse to the
 * same fingerprint. That loss of precision is accepted.
 */

/// Zero-width characters that the caption region injects between glyphs
const ZERO_WIDTH: [char; 4] = ['\u{200b}', '\u{200c}', '\u{200d}', '\u{feff}'];

fn is_zero_width(ch: char) -> bool {
    ZERO_WIDTH.contains(&ch)
}

/// A snapshot projected into display text and fingerprint, with an index
/// mapping between the two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    // @field: Collapsed, trimmed display text
    display: String,

    // @field: Display text with all whitespace removed
    fingerprint: String,

    // @field: offsets[b] = display byte offset of fingerprint byte b,
    // with one trailing sentinel equal to display.len()
    offsets: Vec<usize>,
}

impl Normalized {
    /// Normalize a raw snapshot in a single pass
    pub fn new(raw: &str) -> Self {
        let mut display = String::with_capacity(raw.len());
        let mut fingerprint = String::with_capacity(raw.len());
        let mut offsets = Vec::with_capacity(raw.len() + 1);
        let mut pending_space = false;

        for ch in raw.chars() {
            if is_zero_width(ch) {
                continue;
            }
            if ch.is_whitespace() {
                // Leading whitespace never produces a space
                if !display.is_empty() {
                    pending_space = true;
                }
                continue;
            }
            if pending_space {
                display.push(' ');
                pending_space = false;
            }

            let at = display.len();
            display.push(ch);
            fingerprint.push(ch);
            for k in 0..ch.len_utf8() {
                offsets.push(at + k);
            }
        }
        offsets.push(display.len());

        Self {
            display,
            fingerprint,
            offsets,
        }
    }

    /// Display text (zero-width stripped, whitespace collapsed, trimmed)
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Comparison fingerprint (no whitespace at all)
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// True when the snapshot carries no visible text
    pub fn is_blank(&self) -> bool {
        self.fingerprint.is_empty()
    }

    /// Map a fingerprint byte offset to the matching display byte offset.
    ///
    /// Offsets past the end of the fingerprint map to the end of the display text.
    pub fn display_offset(&self, fingerprint_offset: usize) -> usize {
        let idx = fingerprint_offset.min(self.fingerprint.len());
        self.offsets[idx]
    }

    /// Slice of the display text starting at the character that sits at
    /// `fingerprint_offset` in the fingerprint.
    ///
    /// The separating space in front of the slice is not part of it.
    pub fn display_from(&self, fingerprint_offset: usize) -> &str {
        let start = self.display_offset(fingerprint_offset);
        self.display[start..].trim_start()
    }
}

/// Display projection of arbitrary text
pub fn display_text(raw: &str) -> String {
    Normalized::new(raw).display
}

/// Fingerprint projection of arbitrary text
pub fn fingerprint(raw: &str) -> String {
    Normalized::new(raw).fingerprint
}

/// The last `max_chars` characters of `text` (the whole text when shorter)
pub fn tail_chars(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return "";
    }
    match text.char_indices().rev().nth(max_chars - 1) {
        Some((start, _)) => &text[start..],
        None => text,
    }
}
