//! Test helper modules for rawplay integration tests
//!
//! Provides reusable test infrastructure components:
//! - FakeSink: PcmSink that records writes and injects device faults
//! - PcmFileBuilder: raw PCM files in a temporary directory

pub mod fake_sink;
pub mod pcm_files;

// Re-export commonly used types
pub use fake_sink::{FakeSink, WriteRecord};
pub use pcm_files::PcmFileBuilder;
