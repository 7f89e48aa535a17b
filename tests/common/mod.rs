/*!
 * Common test utilities for the livesub test suite
 */

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;

use livesub::app_config::Config;
use livesub::reconcile::RegionCleared;
use livesub::session::{Snapshot, SourceEvent};

/// Route library logs to the test harness; safe to call from every test
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Fixed session start used by most tests
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// `t0` plus an offset in milliseconds
pub fn at_ms(ms: i64) -> DateTime<Utc> {
    t0() + Duration::milliseconds(ms)
}

pub fn snapshot(text: &str, ms: i64) -> Snapshot {
    Snapshot::new(text, at_ms(ms))
}

pub fn snapshot_event(text: &str, ms: i64) -> SourceEvent {
    SourceEvent::Snapshot(snapshot(text, ms))
}

pub fn cleared_event(ms: i64) -> SourceEvent {
    SourceEvent::RegionCleared(RegionCleared::new(at_ms(ms)))
}

/// Default config with the given gate parameters
pub fn gate_config(anchor_length: usize, resync_threshold: u32, ambiguous_threshold: u32) -> Config {
    let mut config = Config::default();
    config.reconcile.anchor_length = anchor_length;
    config.reconcile.resync_threshold = resync_threshold;
    config.reconcile.ambiguous_threshold = ambiguous_threshold;
    config
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}
