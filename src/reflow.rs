/*!
 * Sentence reflow of emitted units.
 *
 * Units are cut by timing (append ceiling, length cap), not by grammar.
 * Reflow re-cuts a finished transcript into sentence-sized units:
 * - inline `[HH:MM:SS]` markers start a new piece at that wall-clock time
 * - text is split after `.`, `?` or `!` followed by whitespace
 * - a piece that does not end a sentence is merged into the next one,
 *   unless the next one starts more than 10 seconds later
 *
 * Input units are never mutated.
 */

use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::subtitle_processor::SubtitleEntry;
use crate::text::join_stream_text;

// @const: Inline [HH:MM:SS] marker
static MARKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(\d{2}):(\d{2}):(\d{2})\]").expect("valid marker regex")
});

// @const: Sentence terminator followed by whitespace
static SENTENCE_END_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.?!]\s+").expect("valid sentence regex"));

const TERMINATORS: &[char] = &['.', '?', '!'];

/// Longest gap across which an unfinished sentence is still merged
const MERGE_GAP_SECS: i64 = 10;

#[derive(Debug, Clone)]
struct Piece {
    text: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

/// Re-cut units into sentences; output units are finalized and numbered from 1
pub fn reflow_entries(entries: &[SubtitleEntry]) -> Vec<SubtitleEntry> {
    let sentences: Vec<Piece> = entries
        .iter()
        .flat_map(split_markers)
        .flat_map(|piece| split_sentences(&piece))
        .collect();

    merge_unfinished(sentences)
        .into_iter()
        .enumerate()
        .map(|(idx, piece)| {
            let mut entry = SubtitleEntry::new(idx + 1, &piece.text, piece.start);
            entry.end_time = piece.end.max(piece.start);
            entry.finalize();
            entry
        })
        .collect()
}

/// Split one unit at its inline time markers
fn split_markers(entry: &SubtitleEntry) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut start = entry.start_time;
    let mut last = 0;

    for caps in MARKER_REGEX.captures_iter(&entry.text) {
        let Some(whole) = caps.get(0) else { continue };
        push_piece(&mut pieces, &entry.text[last..whole.start()], start, entry.end_time);

        if let Some(at) = marker_time(entry.start_time, &caps[1], &caps[2], &caps[3]) {
            start = at;
        }
        last = whole.end();
    }
    push_piece(&mut pieces, &entry.text[last..], start, entry.end_time);
    pieces
}

fn push_piece(pieces: &mut Vec<Piece>, text: &str, start: DateTime<Utc>, end: DateTime<Utc>) {
    let text = text.trim();
    if !text.is_empty() {
        pieces.push(Piece {
            text: text.to_string(),
            start,
            end: end.max(start),
        });
    }
}

/// Marker time on the local date of `base`; None for out-of-range fields
fn marker_time(base: DateTime<Utc>, h: &str, m: &str, s: &str) -> Option<DateTime<Utc>> {
    let time = NaiveTime::from_hms_opt(h.parse().ok()?, m.parse().ok()?, s.parse().ok()?)?;
    let local = base.with_timezone(&Local).date_naive().and_time(time);
    Local
        .from_local_datetime(&local)
        .earliest()
        .map(|at| at.with_timezone(&Utc))
}

fn split_sentences(piece: &Piece) -> Vec<Piece> {
    let mut sentences = Vec::new();
    let mut last = 0;
    for found in SENTENCE_END_REGEX.find_iter(&piece.text) {
        // Keep the terminator, drop the whitespace
        let cut = found.start() + 1;
        push_piece(&mut sentences, &piece.text[last..cut], piece.start, piece.end);
        last = found.end();
    }
    push_piece(&mut sentences, &piece.text[last..], piece.start, piece.end);
    sentences
}

fn merge_unfinished(pieces: Vec<Piece>) -> Vec<Piece> {
    let mut merged: Vec<Piece> = Vec::with_capacity(pieces.len());
    let mut buffer: Option<Piece> = None;

    for next in pieces {
        buffer = match buffer.take() {
            None => Some(next),
            Some(mut current) => {
                let finished = current.text.ends_with(TERMINATORS);
                let far_apart = next.start - current.start > Duration::seconds(MERGE_GAP_SECS);
                if finished || far_apart {
                    merged.push(current);
                    Some(next)
                } else {
                    current.text = join_stream_text(&current.text, &next.text);
                    current.end = current.end.max(next.end);
                    Some(current)
                }
            }
        };
    }
    merged.extend(buffer);
    merged
}
