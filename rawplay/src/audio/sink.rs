//! Blocking PCM output contract
//!
//! A sink accepts one period of interleaved s16le bytes per `write` and
//! blocks until the device has taken it. Underrun is reported separately
//! from other faults because the caller recovers from it with `prepare`.

use crate::error::Result;
use thiserror::Error;

/// Failure of a single device write
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    /// The device ran dry before this write; it must be prepared again
    #[error("Buffer underrun")]
    Underrun,

    /// Any other device fault
    #[error("Device write failed: {0}")]
    Device(String),
}

/// Audio output that consumes interleaved PCM bytes one period at a time
pub trait PcmSink {
    /// Negotiated frames per period
    fn period_frames(&self) -> usize;

    /// Negotiated sample rate in Hz
    fn sample_rate(&self) -> u32;

    /// Write interleaved bytes, returning the number of frames accepted.
    fn write(&mut self, data: &[u8]) -> std::result::Result<usize, WriteError>;

    /// Reset the device to a ready state after an underrun.
    fn prepare(&mut self) -> Result<()>;

    /// Block until everything written so far has been played.
    fn drain(&mut self) -> Result<()>;
}

impl<S: PcmSink + ?Sized> PcmSink for Box<S> {
    fn period_frames(&self) -> usize {
        (**self).period_frames()
    }

    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }

    fn write(&mut self, data: &[u8]) -> std::result::Result<usize, WriteError> {
        (**self).write(data)
    }

    fn prepare(&mut self) -> Result<()> {
        (**self).prepare()
    }

    fn drain(&mut self) -> Result<()> {
        (**self).drain()
    }
}
