//! Error types for rawplay
//!
//! Setup failures (device, negotiation, file) and the run-time abort of the
//! transfer loop share one enum. Per-write device faults use
//! [`crate::audio::sink::WriteError`] instead, since the transfer loop
//! recovers from some of them.

use thiserror::Error;

/// Main error type for the rawplay crate
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or inconsistent settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested output device does not exist
    #[error("Audio device not found: {0}")]
    DeviceNotFound(String),

    /// Audio output device errors (open, stream build, start, drain)
    #[error("Audio output error: {0}")]
    AudioOutput(String),

    /// Device does not support the required PCM parameters
    #[error("Parameter negotiation failed: {0}")]
    Negotiation(String),

    /// Transfer loop gave up
    #[error("Playback error: {0}")]
    Playback(String),

    /// Errors from the shared library (config file loading)
    #[error(transparent)]
    Common(#[from] rawplay_common::Error),
}

/// Convenience Result type using rawplay Error
pub type Result<T> = std::result::Result<T, Error>;
