use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs;
use std::path::Path;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Snapshot reconciliation settings
    #[serde(default)]
    pub reconcile: ReconcileConfig,

    /// Unit assembly settings
    #[serde(default)]
    pub assembler: AssemblerConfig,

    /// Capture session settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Reconciliation gate and history settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReconcileConfig {
    // @field: Trailing anchor length in fingerprint characters
    #[serde(default = "default_anchor_length")]
    pub anchor_length: usize,

    // @field: Consecutive desyncs before a soft resync
    #[serde(default = "default_resync_threshold")]
    pub resync_threshold: u32,

    // @field: Consecutive ambiguous matches before a soft resync
    #[serde(default = "default_ambiguous_threshold")]
    pub ambiguous_threshold: u32,

    // @field: Shortest overlap a fallback may accept
    #[serde(default = "default_min_fallback_overlap")]
    pub min_fallback_overlap: usize,

    // @field: Emitted units used to rebuild history on a soft resync
    #[serde(default = "default_soft_reset_unit_window")]
    pub soft_reset_unit_window: usize,

    // @field: Confirmed fingerprint characters kept in memory
    #[serde(default = "default_history_retain_chars")]
    pub history_retain_chars: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            anchor_length: default_anchor_length(),
            resync_threshold: default_resync_threshold(),
            ambiguous_threshold: default_ambiguous_threshold(),
            min_fallback_overlap: default_min_fallback_overlap(),
            soft_reset_unit_window: default_soft_reset_unit_window(),
            history_retain_chars: default_history_retain_chars(),
        }
    }
}

/// Entry assembler settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AssemblerConfig {
    /// Appends are allowed while the open unit was updated less than this many seconds ago
    #[serde(default = "default_append_time_ceiling_secs")]
    pub append_time_ceiling_secs: f64,

    /// Appends are allowed while the combined length stays below this many characters
    #[serde(default = "default_append_length_cap")]
    pub append_length_cap: usize,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            append_time_ceiling_secs: default_append_time_ceiling_secs(),
            append_length_cap: default_append_length_cap(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionConfig {
    /// Bounded snapshot queue size
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Spacing between replayed snapshots without their own timestamp
    #[serde(default = "default_replay_step_ms")]
    pub replay_step_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            replay_step_ms: default_replay_step_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(anyhow!("Invalid log level: {}", s)),
        }
    }
}

fn default_anchor_length() -> usize {
    50
}

fn default_resync_threshold() -> u32 {
    10
}

fn default_ambiguous_threshold() -> u32 {
    6
}

fn default_min_fallback_overlap() -> usize {
    1
}

fn default_soft_reset_unit_window() -> usize {
    5
}

fn default_history_retain_chars() -> usize {
    3000
}

fn default_append_time_ceiling_secs() -> f64 {
    5.0
}

fn default_append_length_cap() -> usize {
    300
}

fn default_channel_capacity() -> usize {
    256
}

fn default_replay_step_ms() -> u64 {
    200
}

impl Config {
    /// Load a configuration file; missing fields take their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let reconcile = &self.reconcile;
        if reconcile.anchor_length == 0 {
            return Err(anyhow!("reconcile.anchor_length must be greater than 0"));
        }
        if reconcile.resync_threshold == 0 {
            return Err(anyhow!("reconcile.resync_threshold must be greater than 0"));
        }
        if reconcile.ambiguous_threshold == 0 {
            return Err(anyhow!("reconcile.ambiguous_threshold must be greater than 0"));
        }
        if reconcile.soft_reset_unit_window == 0 {
            return Err(anyhow!("reconcile.soft_reset_unit_window must be greater than 0"));
        }
        if reconcile.history_retain_chars < reconcile.anchor_length {
            return Err(anyhow!(
                "reconcile.history_retain_chars ({}) must be at least anchor_length ({})",
                reconcile.history_retain_chars,
                reconcile.anchor_length
            ));
        }

        let ceiling = self.assembler.append_time_ceiling_secs;
        if !ceiling.is_finite() || ceiling <= 0.0 {
            return Err(anyhow!(
                "assembler.append_time_ceiling_secs must be a positive number, got {}",
                ceiling
            ));
        }
        if self.assembler.append_length_cap == 0 {
            return Err(anyhow!("assembler.append_length_cap must be greater than 0"));
        }

        if self.session.channel_capacity == 0 {
            return Err(anyhow!("session.channel_capacity must be greater than 0"));
        }

        Ok(())
    }
}
