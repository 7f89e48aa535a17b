/*!
 * Capture session module.
 *
 * This module provides:
 * - Source event and snapshot models
 * - The serial reconciler that feeds the gate and the entry assembler
 * - The async capture session with its ordered channel and shutdown drain
 */

pub mod manager;
pub mod models;
pub mod reconciler;

// Re-export main types
pub use manager::CaptureSession;
pub use models::{SessionReport, SessionStats, Snapshot, SourceEvent};
pub use reconciler::{FragmentSink, Reconciler};
