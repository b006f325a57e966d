//! Player settings resolved from command line, environment and config file
//!
//! Priority, highest first:
//! 1. Command-line arguments
//! 2. Environment variables (bound to the same arguments by clap)
//! 3. TOML config file
//! 4. Built-in defaults

use crate::audio::output::DEFAULT_DEVICE;
use crate::error::{Error, Result};
use crate::playback::TransferOptions;
use rawplay_common::config::TomlConfig;
use std::path::PathBuf;

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub input: Option<PathBuf>,
    pub device: Option<String>,
    pub period_frames: Option<u32>,
    pub max_consecutive_write_failures: Option<u32>,
    /// Flag; can only switch padding on
    pub pad_final_period: bool,
    pub log_level: Option<String>,
}

/// Fully resolved player configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Raw PCM file to play
    pub input: PathBuf,

    /// Output device name or [`DEFAULT_DEVICE`]
    pub device: String,

    /// Period size hint for negotiation, in frames
    pub period_frames: u32,

    /// Transfer loop behaviour
    pub transfer: TransferOptions,

    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,
}

impl PlayerConfig {
    /// Merge overrides on top of the config file.
    pub fn resolve(cli: CliOverrides, file: TomlConfig) -> Result<Self> {
        let input = cli.input.or(file.input).ok_or_else(|| {
            Error::Config(
                "No input file given (use --input, RAWPLAY_INPUT, or `input` in the config file)"
                    .to_string(),
            )
        })?;

        let device = cli
            .device
            .or(file.device)
            .unwrap_or_else(|| DEFAULT_DEVICE.to_string());

        let period_frames = cli
            .period_frames
            .unwrap_or_else(|| file.playback.period_frames_or_default());
        if period_frames == 0 {
            return Err(Error::Config("period_frames must be at least 1".to_string()));
        }

        let transfer = TransferOptions {
            max_consecutive_write_failures: cli
                .max_consecutive_write_failures
                .unwrap_or(file.playback.max_consecutive_write_failures),
            pad_final_period: cli.pad_final_period || file.playback.pad_final_period,
        };

        let log_level = cli.log_level.unwrap_or(file.logging.level);

        Ok(Self {
            input,
            device,
            period_frames,
            transfer,
            log_level,
        })
    }
}
