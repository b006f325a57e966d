//! Frame source: period-sized reads from a raw PCM byte stream
//!
//! Wraps any `Read + Seek` (a `File` in production, a `Cursor` in tests),
//! remembers the total length measured at open time, and hands out one
//! buffer's worth of bytes per [`FrameSource::load`] call.
//!
//! The read offset advances by the number of bytes *requested*, not the
//! number actually read. On a short final chunk the bytes past the valid
//! region are left untouched in the target buffer, and the offset ends up
//! past the end of the stream.

use crate::error::Result;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, trace};

/// Result of a single [`FrameSource::load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Bytes were read into the target buffer
    ///
    /// `valid_bytes` is less than the buffer length only for the last chunk
    /// of a stream whose length is not a multiple of the buffer size.
    Loaded { valid_bytes: usize },

    /// The offset had already reached the end; nothing was read
    Exhausted,
}

/// Raw PCM byte stream with a tracked read offset
#[derive(Debug)]
pub struct FrameSource<R> {
    reader: R,
    len: u64,
    offset: u64,
}

impl FrameSource<File> {
    /// Open a raw PCM file and measure its length.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let source = Self::from_reader(file)?;
        debug!("Opened {} ({} bytes)", path.display(), source.len());
        Ok(source)
    }
}

impl<R: Read + Seek> FrameSource<R> {
    /// Wrap a seekable reader. The length is taken from the end position;
    /// the reader is left positioned at the start.
    pub fn from_reader(mut reader: R) -> Result<Self> {
        let len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;
        Ok(Self {
            reader,
            len,
            offset: 0,
        })
    }

    /// Fill `target` with the next chunk.
    ///
    /// Reports [`LoadOutcome::Exhausted`] without touching `target` once the
    /// offset has reached the stream length.
    pub fn load(&mut self, target: &mut [u8]) -> Result<LoadOutcome> {
        if self.is_exhausted() {
            trace!("Source exhausted at offset {} of {}", self.offset, self.len);
            return Ok(LoadOutcome::Exhausted);
        }

        self.reader.seek(SeekFrom::Start(self.offset))?;
        let valid_bytes = read_up_to(&mut self.reader, target)?;
        self.offset += target.len() as u64;

        if valid_bytes < target.len() {
            debug!(
                "Short read: {} of {} bytes valid, offset now {} (length {})",
                valid_bytes,
                target.len(),
                self.offset,
                self.len
            );
        }

        Ok(LoadOutcome::Loaded { valid_bytes })
    }

    /// Total stream length in bytes, fixed at open time
    pub fn len(&self) -> u64 {
        self.len
    }

    /// True for a zero-length stream
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current read offset in bytes
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// True once no further chunk can be loaded
    pub fn is_exhausted(&self) -> bool {
        self.offset >= self.len
    }

    /// Give back the underlying reader
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Read until `buf` is full or the reader reports end of data.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
