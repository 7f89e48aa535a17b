use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use log::debug;
use parking_lot::Mutex;
use serde::Serialize;

use crate::app_config::AssemblerConfig;
use crate::text::join_stream_text;

// @module: Emitted units and the entry assembler

// @struct: Single emitted unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtitleEntry {
    // @field: Sequence number, from 1
    pub seq_num: usize,

    // @field: Unit text
    pub text: String,

    // @field: When the first fragment was confirmed
    pub start_time: DateTime<Utc>,

    // @field: Last time the unit was known to be on screen
    pub end_time: DateTime<Utc>,

    // @field: Last text change; the append ceiling is measured from here
    pub updated_at: DateTime<Utc>,

    // @field: Unicode scalar count of text
    pub char_count: usize,

    // @field: Whitespace-separated word count of text
    pub word_count: usize,

    // @field: Immutable once set
    pub finalized: bool,
}

impl SubtitleEntry {
    // @creates: Open unit holding a single fragment
    pub fn new(seq_num: usize, text: &str, at: DateTime<Utc>) -> Self {
        let text = text.trim().to_string();
        let (char_count, word_count) = count(&text);
        SubtitleEntry {
            seq_num,
            text,
            start_time: at,
            end_time: at,
            updated_at: at,
            char_count,
            word_count,
            finalized: false,
        }
    }

    /// Append a fragment to an open unit. Finalized units are left untouched.
    pub fn append(&mut self, fragment: &str, at: DateTime<Utc>) {
        if self.finalized {
            return;
        }
        self.text = join_stream_text(&self.text, fragment);
        let (char_count, word_count) = count(&self.text);
        self.char_count = char_count;
        self.word_count = word_count;
        self.updated_at = at;
        self.end_time = self.end_time.max(at);
    }

    /// Push end_time forward without touching the text or the append clock
    pub fn refresh_end_time(&mut self, at: DateTime<Utc>) -> bool {
        if self.finalized || at <= self.end_time {
            return false;
        }
        self.end_time = at;
        true
    }

    pub fn finalize(&mut self) {
        self.finalized = true;
    }

    pub fn is_open(&self) -> bool {
        !self.finalized
    }

    /// Seconds since the last text change, never negative
    pub fn seconds_since_update(&self, at: DateTime<Utc>) -> f64 {
        (at - self.updated_at).to_std().unwrap_or_default().as_secs_f64()
    }

    /// Start time as local HH:MM:SS
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time)
    }

    /// Format a timestamp as local wall-clock HH:MM:SS
    pub fn format_timestamp(at: DateTime<Utc>) -> String {
        at.with_timezone(&Local).format("%H:%M:%S").to_string()
    }
}

fn count(text: &str) -> (usize, usize) {
    (text.chars().count(), text.split_whitespace().count())
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}] {}", self.format_start_time(), self.text)
    }
}

/// Ordered emitted units; at most the last one is open
#[derive(Debug, Default, Clone, Serialize)]
pub struct SubtitleCollection {
    /// List of subtitle entries
    pub entries: Vec<SubtitleEntry>,

    total_chars: usize,
    total_words: usize,
}

/// The unit collection shared between the consumer task and readers
pub type SharedUnits = Arc<Mutex<SubtitleCollection>>;

impl SubtitleCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedUnits {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_chars(&self) -> usize {
        self.total_chars
    }

    pub fn total_words(&self) -> usize {
        self.total_words
    }

    /// The open unit, if any
    pub fn open_entry(&self) -> Option<&SubtitleEntry> {
        self.entries.last().filter(|e| e.is_open())
    }

    /// Start a new open unit, finalizing the previous one first
    pub fn start_entry(&mut self, text: &str, at: DateTime<Utc>) -> usize {
        self.finalize_open();
        let entry = SubtitleEntry::new(self.entries.len() + 1, text, at);
        self.total_chars += entry.char_count;
        self.total_words += entry.word_count;
        let seq_num = entry.seq_num;
        self.entries.push(entry);
        seq_num
    }

    /// Append to the open unit; returns its sequence number, or None when no unit is open
    pub fn append_to_open(&mut self, fragment: &str, at: DateTime<Utc>) -> Option<usize> {
        let entry = self.entries.last_mut().filter(|e| e.is_open())?;
        let (chars, words) = (entry.char_count, entry.word_count);
        entry.append(fragment, at);
        self.total_chars = self.total_chars - chars + entry.char_count;
        self.total_words = self.total_words - words + entry.word_count;
        Some(entry.seq_num)
    }

    /// Finalize the open unit; returns its sequence number
    pub fn finalize_open(&mut self) -> Option<usize> {
        let entry = self.entries.last_mut().filter(|e| e.is_open())?;
        entry.finalize();
        Some(entry.seq_num)
    }

    /// Refresh the open unit's end time
    pub fn refresh_end_time(&mut self, at: DateTime<Utc>) -> bool {
        self.entries
            .last_mut()
            .filter(|e| e.is_open())
            .is_some_and(|e| e.refresh_end_time(at))
    }

    /// Texts of the last `n` units, oldest first
    pub fn recent_texts(&self, n: usize) -> Vec<String> {
        let start = self.entries.len().saturating_sub(n);
        self.entries[start..].iter().map(|e| e.text.clone()).collect()
    }

    /// One `[HH:MM:SS] text` line per unit
    pub fn to_transcript(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Where a fragment went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Appended { seq_num: usize },
    Started { seq_num: usize },
}

/// Decides whether a confirmed fragment extends the open unit or starts a new one
#[derive(Debug, Clone)]
pub struct EntryAssembler {
    time_ceiling_secs: f64,
    length_cap: usize,
}

impl EntryAssembler {
    pub fn new(config: &AssemblerConfig) -> Self {
        Self {
            time_ceiling_secs: config.append_time_ceiling_secs,
            length_cap: config.append_length_cap,
        }
    }

    /// Append is allowed while the unit is open, was updated less than the
    /// ceiling ago, and the combined length stays below the cap
    pub fn can_append(&self, entry: &SubtitleEntry, fragment: &str, at: DateTime<Utc>) -> bool {
        entry.is_open()
            && entry.seconds_since_update(at) < self.time_ceiling_secs
            && entry.char_count + fragment.trim().chars().count() < self.length_cap
    }

    /// Place a fragment into the collection
    pub fn push(&self, units: &mut SubtitleCollection, fragment: &str, at: DateTime<Utc>) -> Placement {
        let appendable = units
            .open_entry()
            .is_some_and(|open| self.can_append(open, fragment, at));

        if appendable {
            if let Some(seq_num) = units.append_to_open(fragment, at) {
                return Placement::Appended { seq_num };
            }
        }

        let seq_num = units.start_entry(fragment, at);
        debug!("Started unit #{}", seq_num);
        Placement::Started { seq_num }
    }
}
