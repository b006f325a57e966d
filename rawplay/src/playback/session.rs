//! Playback driver
//!
//! Owns the negotiated sink for the whole run and writes one filled buffer
//! per [`PlaybackSession::play`]. Underrun is recovered here by preparing the
//! device; the period that hit it is dropped, not retried. Other write
//! failures are reported back to the caller, which decides whether to keep
//! going.

use crate::audio::sink::{PcmSink, WriteError};
use crate::error::Result;
use tracing::{debug, trace, warn};

/// What happened to one period handed to the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The device accepted `frames` frames
    Played { frames: usize },

    /// The device had underrun; it was prepared and this period was dropped
    Underrun,

    /// The write failed for another reason
    Failed(String),
}

/// Device handle plus negotiated period size
#[derive(Debug)]
pub struct PlaybackSession<S> {
    sink: S,
    period_frames: usize,
}

impl<S: PcmSink> PlaybackSession<S> {
    /// Start a session on an already negotiated sink.
    pub fn new(sink: S) -> Self {
        let period_frames = sink.period_frames();
        debug!(
            "Playback session: {} frames per period at {} Hz",
            period_frames,
            sink.sample_rate()
        );
        Self {
            sink,
            period_frames,
        }
    }

    /// Frames per period negotiated with the device
    pub fn period_frames(&self) -> usize {
        self.period_frames
    }

    /// Write one period.
    ///
    /// Only a failure to prepare the device after an underrun is an error;
    /// every write fault is reported through [`PlayOutcome`].
    pub fn play(&mut self, period: &[u8]) -> Result<PlayOutcome> {
        match self.sink.write(period) {
            Ok(frames) => {
                if frames < self.period_frames {
                    debug!(
                        "Short write: device took {} of {} frames",
                        frames, self.period_frames
                    );
                } else {
                    trace!("Wrote {} frames", frames);
                }
                Ok(PlayOutcome::Played { frames })
            }
            Err(WriteError::Underrun) => {
                warn!("Buffer underrun, preparing audio device");
                self.sink.prepare()?;
                Ok(PlayOutcome::Underrun)
            }
            Err(WriteError::Device(message)) => Ok(PlayOutcome::Failed(message)),
        }
    }

    /// The underlying sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Drain the device and hand back the sink.
    pub fn finish(mut self) -> Result<S> {
        self.sink.drain()?;
        Ok(self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::mock::MockSink;

    #[test]
    fn test_period_taken_from_sink() {
        let session = PlaybackSession::new(MockSink::new(256));
        assert_eq!(session.period_frames(), 256);
    }

    #[test]
    fn test_successful_write() {
        let mut session = PlaybackSession::new(MockSink::new(1));
        let outcome = session.play(&[1, 2, 3, 4]).unwrap();
        assert_eq!(outcome, PlayOutcome::Played { frames: 1 });
        assert_eq!(session.sink().writes, vec![vec![1, 2, 3, 4]]);
        assert_eq!(session.sink().prepares, 0);
    }

    #[test]
    fn test_underrun_prepares_without_retry() {
        let sink = MockSink::new(1).with_faults([Some(WriteError::Underrun)]);
        let mut session = PlaybackSession::new(sink);

        assert_eq!(session.play(&[0; 4]).unwrap(), PlayOutcome::Underrun);
        assert_eq!(session.sink().prepares, 1);
        // Dropped, not written a second time
        assert_eq!(session.sink().writes.len(), 1);

        assert_eq!(
            session.play(&[0; 4]).unwrap(),
            PlayOutcome::Played { frames: 1 }
        );
    }

    #[test]
    fn test_other_failure_is_reported() {
        let sink = MockSink::new(1).with_faults([Some(WriteError::Device("EIO".to_string()))]);
        let mut session = PlaybackSession::new(sink);

        assert_eq!(
            session.play(&[0; 4]).unwrap(),
            PlayOutcome::Failed("EIO".to_string())
        );
        assert_eq!(session.sink().prepares, 0);
    }

    #[test]
    fn test_finish_drains() {
        let session = PlaybackSession::new(MockSink::new(1));
        let sink = session.finish().unwrap();
        assert!(sink.drained);
    }
}
