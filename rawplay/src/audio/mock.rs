//! In-crate sink double for unit tests

use crate::audio::sink::{PcmSink, WriteError};
use crate::error::Result;
use std::collections::VecDeque;

/// Records every write; scripted faults are returned in order before
/// falling back to success.
#[derive(Debug, Default)]
pub(crate) struct MockSink {
    pub period_frames: usize,
    pub writes: Vec<Vec<u8>>,
    pub faults: VecDeque<Option<WriteError>>,
    pub prepares: usize,
    pub drained: bool,
}

impl MockSink {
    pub fn new(period_frames: usize) -> Self {
        Self {
            period_frames,
            ..Default::default()
        }
    }

    /// Script the outcome of upcoming writes (`None` = succeed)
    pub fn with_faults(mut self, faults: impl IntoIterator<Item = Option<WriteError>>) -> Self {
        self.faults = faults.into_iter().collect();
        self
    }
}

impl PcmSink for MockSink {
    fn period_frames(&self) -> usize {
        self.period_frames
    }

    fn sample_rate(&self) -> u32 {
        44_100
    }

    fn write(&mut self, data: &[u8]) -> std::result::Result<usize, WriteError> {
        self.writes.push(data.to_vec());
        match self.faults.pop_front().flatten() {
            Some(fault) => Err(fault),
            None => Ok(data.len() / 4),
        }
    }

    fn prepare(&mut self) -> Result<()> {
        self.prepares += 1;
        Ok(())
    }

    fn drain(&mut self) -> Result<()> {
        self.drained = true;
        Ok(())
    }
}
