//! Fault-injecting PcmSink
//!
//! Every write is recorded together with the bytes it carried, so tests can
//! check exactly which buffer contents reached the device. Faults are
//! injected by write index.

use rawplay::audio::{PcmSink, WriteError};
use std::collections::HashMap;

/// One call to `write`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub data: Vec<u8>,
    pub result: Result<usize, WriteError>,
}

/// Recording sink with scripted faults
#[derive(Debug)]
pub struct FakeSink {
    period_frames: usize,
    faults: HashMap<usize, WriteError>,
    pub writes: Vec<WriteRecord>,
    pub prepares: usize,
    pub drains: usize,
    /// Index of the write after which each prepare happened
    pub prepare_after: Vec<usize>,
}

impl FakeSink {
    /// Sink negotiating `period_frames` frames per period
    pub fn new(period_frames: usize) -> Self {
        Self {
            period_frames,
            faults: HashMap::new(),
            writes: Vec::new(),
            prepares: 0,
            drains: 0,
            prepare_after: Vec::new(),
        }
    }

    /// Make write number `index` (0-based) fail with `fault`
    pub fn fail_write(mut self, index: usize, fault: WriteError) -> Self {
        self.faults.insert(index, fault);
        self
    }

    /// Bytes of every write, in order
    pub fn written(&self) -> Vec<Vec<u8>> {
        self.writes.iter().map(|w| w.data.clone()).collect()
    }
}

impl PcmSink for FakeSink {
    fn period_frames(&self) -> usize {
        self.period_frames
    }

    fn sample_rate(&self) -> u32 {
        44_100
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        let index = self.writes.len();
        let result = match self.faults.remove(&index) {
            Some(fault) => Err(fault),
            None => Ok(data.len() / 4),
        };
        self.writes.push(WriteRecord {
            data: data.to_vec(),
            result: result.clone(),
        });
        result
    }

    fn prepare(&mut self) -> rawplay::Result<()> {
        self.prepares += 1;
        self.prepare_after.push(self.writes.len() - 1);
        Ok(())
    }

    fn drain(&mut self) -> rawplay::Result<()> {
        self.drains += 1;
        Ok(())
    }
}
