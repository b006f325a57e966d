//! # rawplay common library
//!
//! Shared code for the rawplay workspace:
//! - Error types
//! - PCM wire format constants
//! - TOML configuration loading and config file discovery

pub mod config;
pub mod error;
pub mod format;

pub use error::{Error, Result};
pub use format::PcmFormat;
