/*!
 * Error types for the livesub application.
 *
 * Reconciliation itself never fails; these cover the surfaces around it
 * (the capture session task, replay parsing, the CLI).
 */

use thiserror::Error;

/// Errors raised by a capture session
#[derive(Error, Debug)]
pub enum SessionError {
    /// The consumer task is gone and can no longer accept events
    #[error("Capture session is closed")]
    Closed,

    /// The consumer task panicked or was aborted
    #[error("Consumer task failed: {0}")]
    TaskFailed(String),
}

/// Errors raised while reading a recorded snapshot stream
#[derive(Error, Debug)]
pub enum ReplayError {
    /// A line could not be parsed
    #[error("Line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// Parser message
        message: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the capture session
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Error from replay parsing
    #[error("Replay error: {0}")]
    Replay(#[from] ReplayError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
