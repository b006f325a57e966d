//! Raw PCM test file generation
//!
//! Files are plain byte sequences with a recognisable pattern so that the
//! position of every byte written to the device can be asserted.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Creates raw PCM files in a temporary directory removed on drop
pub struct PcmFileBuilder {
    temp_dir: TempDir,
}

impl PcmFileBuilder {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    /// File whose byte `i` is `(i % 251) as u8`
    pub fn counting(&self, name: &str, len: usize) -> std::io::Result<PathBuf> {
        self.with_bytes(name, &counting_bytes(len))
    }

    /// File with the given contents
    pub fn with_bytes(&self, name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Path inside the temp directory that does not exist
    pub fn missing(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}

/// Byte pattern used by [`PcmFileBuilder::counting`]
pub fn counting_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
