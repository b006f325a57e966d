//! TOML configuration loading and config file discovery
//!
//! The TOML file is the third source consulted when resolving settings:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables
//! 3. TOML config file
//! 4. Built-in defaults (fallback)
//!
//! Steps 1 and 2 are handled by the binary's argument parser; this module
//! only knows about the file and the defaults.

use crate::format::DEFAULT_PERIOD_FRAMES;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the per-application config directory and of the system directory
const APP_DIR: &str = "rawplay";

/// Config file name inside the application directory
const CONFIG_FILE: &str = "config.toml";

/// Contents of a rawplay TOML config file
///
/// Every field is optional so that a partial file (or none at all) still
/// produces a usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Raw PCM file to play
    #[serde(default)]
    pub input: Option<PathBuf>,

    /// Output device name, or `default` for the system default output
    #[serde(default)]
    pub device: Option<String>,

    /// Transfer loop settings
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Transfer loop settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaybackConfig {
    /// Period size hint passed to device negotiation, in frames
    #[serde(default)]
    pub period_frames: Option<u32>,

    /// Abort after this many non-underrun write failures in a row (0 = never)
    #[serde(default = "default_max_consecutive_write_failures")]
    pub max_consecutive_write_failures: u32,

    /// Zero the unread tail of a short final chunk instead of replaying stale bytes
    #[serde(default)]
    pub pad_final_period: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            period_frames: None,
            max_consecutive_write_failures: default_max_consecutive_write_failures(),
            pad_final_period: false,
        }
    }
}

impl PlaybackConfig {
    /// Period hint, falling back to the built-in default
    pub fn period_frames_or_default(&self) -> u32 {
        self.period_frames.unwrap_or(DEFAULT_PERIOD_FRAMES)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_max_consecutive_write_failures() -> u32 {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)?;
    debug!("Parsed config file {}", path.display());
    Ok(config)
}

/// Locate the config file to use when none is given explicitly
///
/// Looks for `<config_dir>/rawplay/config.toml` first, then
/// `/etc/rawplay/config.toml` on Linux. Returns `None` when neither exists.
pub fn discover_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILE);
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Load configuration with graceful degradation
///
/// - Explicit path: the file must exist and parse, otherwise an error.
/// - No explicit path: use the discovered file if any; a missing file
///   yields the built-in defaults.
///
/// Returns the path actually read, if any. Nothing is logged here because
/// this runs before the log level is known.
pub fn load_config(explicit: Option<&Path>) -> Result<(TomlConfig, Option<PathBuf>)> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        return Ok((load_toml_config(path)?, Some(path.to_path_buf())));
    }

    match discover_config_file() {
        Some(path) => Ok((load_toml_config(&path)?, Some(path))),
        None => Ok((TomlConfig::default(), None)),
    }
}
