/*!
 * # livesub - live caption capture
 *
 * A Rust library that turns repeated reads of a live caption region into a
 * clean, non-duplicated stream of subtitle units.
 *
 * Each read returns the whole visible text, not a delta. Reads can repeat
 * verbatim, shrink, reset, or arrive corrupted. The library reattaches every
 * read to what was already confirmed and emits only the new part.
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `text`: snapshot normalization (display text, fingerprint) and fragment joining
 * - `reconcile`: the reconciliation core:
 *   - `reconcile::history`: confirmed fingerprint and trailing anchor
 *   - `reconcile::extractor`: rightmost anchor matching
 *   - `reconcile::fallback`: incremental extractors used on desync
 *   - `reconcile::gate`: desync and ambiguity tracking
 *   - `reconcile::resync`: full and soft history resets
 * - `subtitle_processor`: emitted units and the entry assembler
 * - `session`: the serial reconciler and the async capture session
 * - `reflow`: sentence reflow of finished transcripts
 * - `replay`: recorded snapshot streams
 * - `app_config`: Configuration management
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod reconcile;
pub mod reflow;
pub mod replay;
pub mod session;
pub mod subtitle_processor;
pub mod text;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, ReplayError, SessionError};
pub use reconcile::{Emission, Gate, GateOutcome, History, RegionCleared, ResetKind};
pub use session::{CaptureSession, Reconciler, SessionReport, Snapshot, SourceEvent};
pub use subtitle_processor::{EntryAssembler, SubtitleCollection, SubtitleEntry};
