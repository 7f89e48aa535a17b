/*!
 * Text canonicalization for live caption snapshots.
 *
 * - `normalize`: display text and whitespace-insensitive fingerprints
 * - `join`: punctuation-aware joining of streamed fragments
 */

pub mod join;
pub mod normalize;

pub use join::join_stream_text;
pub use normalize::{display_text, fingerprint, tail_chars, Normalized};
