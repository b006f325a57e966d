//! Double-buffered transfer loop
//!
//! State machine: `Prime` → `Running` → `Stopped`.
//!
//! - `Prime` loads the first period into slot A. An empty stream goes
//!   straight to `Stopped`.
//! - `Running` plays the buffer loaded last, then loads the other one.
//!   The load that finds the stream exhausted moves to `Stopped`.
//! - `Stopped` is terminal.
//!
//! Loads and plays are strictly interleaved on the calling thread, so one
//! buffer belongs to the file side and the other to the device side at every
//! point. A short final chunk is played in full: its unread tail still holds
//! the bytes of that buffer's previous fill unless `pad_final_period` is set.

use crate::audio::buffers::BufferPair;
use crate::audio::sink::PcmSink;
use crate::audio::source::{FrameSource, LoadOutcome};
use crate::error::{Error, Result};
use crate::playback::session::{PlayOutcome, PlaybackSession};
use std::io::{Read, Seek};
use tracing::{debug, trace, warn};

/// Transfer loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    /// Nothing loaded yet
    Prime,
    /// One buffer loaded and waiting to be played
    Running,
    /// Source exhausted; no further device writes
    Stopped,
}

/// Knobs for behaviour the device contract leaves open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOptions {
    /// Abort after this many non-underrun write failures in a row (0 = never)
    pub max_consecutive_write_failures: u32,

    /// Zero the unread tail of a short final chunk
    pub pad_final_period: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            max_consecutive_write_failures: 3,
            pad_final_period: false,
        }
    }
}

/// Summary of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferReport {
    /// Successful loads
    pub loads: u64,

    /// Periods handed to the device, including dropped ones
    pub plays: u64,

    /// Valid bytes read from the source
    pub bytes_loaded: u64,

    /// Source offset when the loop stopped
    pub final_offset: u64,

    /// Valid bytes of the last chunk, when it was short
    pub short_tail: Option<usize>,
}

/// Alternates loads and plays across a [`BufferPair`] until the source runs out
pub struct TransferLoop<R, S> {
    source: FrameSource<R>,
    buffers: BufferPair,
    session: PlaybackSession<S>,
    options: TransferOptions,
    state: TransferState,
    consecutive_failures: u32,
    report: TransferReport,
}

impl<R: Read + Seek, S: PcmSink> TransferLoop<R, S> {
    /// Allocate both buffers for the session's period size.
    pub fn new(
        source: FrameSource<R>,
        session: PlaybackSession<S>,
        options: TransferOptions,
    ) -> Result<Self> {
        let buffers = BufferPair::new(session.period_frames())?;
        debug!(
            "Transfer loop: {} byte buffers, source {} bytes",
            buffers.capacity_bytes(),
            source.len()
        );

        Ok(Self {
            source,
            buffers,
            session,
            options,
            state: TransferState::Prime,
            consecutive_failures: 0,
            report: TransferReport::default(),
        })
    }

    /// Advance the state machine by one transition.
    pub fn step(&mut self) -> Result<TransferState> {
        match self.state {
            TransferState::Prime => {
                self.state = if self.load_next()? {
                    TransferState::Running
                } else {
                    TransferState::Stopped
                };
            }
            TransferState::Running => {
                self.play_current()?;
                if !self.load_next()? {
                    self.state = TransferState::Stopped;
                }
            }
            TransferState::Stopped => {}
        }

        Ok(self.state)
    }

    /// Run until the source is exhausted.
    pub fn run(&mut self) -> Result<TransferReport> {
        while self.step()? != TransferState::Stopped {}
        Ok(self.report())
    }

    /// Load the next chunk into the fill buffer and flip the selector.
    ///
    /// Returns `false` when the source was already exhausted.
    fn load_next(&mut self) -> Result<bool> {
        let slot = self.buffers.fill_slot();
        let target = self.buffers.fill_buffer_mut();

        let valid_bytes = match self.source.load(target)? {
            LoadOutcome::Exhausted => return Ok(false),
            LoadOutcome::Loaded { valid_bytes } => valid_bytes,
        };

        if valid_bytes < target.len() {
            if self.options.pad_final_period {
                target[valid_bytes..].fill(0);
            }
            self.report.short_tail = Some(valid_bytes);
        }

        self.buffers.flip();
        self.report.loads += 1;
        self.report.bytes_loaded += valid_bytes as u64;
        self.report.final_offset = self.source.offset();
        trace!("Loaded {} bytes into slot {:?}", valid_bytes, slot);
        Ok(true)
    }

    /// Play the buffer loaded last.
    fn play_current(&mut self) -> Result<()> {
        let outcome = self.session.play(self.buffers.play_buffer())?;
        self.report.plays += 1;

        match outcome {
            PlayOutcome::Played { .. } | PlayOutcome::Underrun => {
                self.consecutive_failures = 0;
            }
            PlayOutcome::Failed(message) => {
                self.consecutive_failures += 1;
                warn!(
                    "Device write failed ({} in a row): {}",
                    self.consecutive_failures, message
                );

                let limit = self.options.max_consecutive_write_failures;
                if limit > 0 && self.consecutive_failures >= limit {
                    return Err(Error::Playback(format!(
                        "{} consecutive device write failures, last: {}",
                        self.consecutive_failures, message
                    )));
                }
            }
        }

        Ok(())
    }

    /// Current state
    pub fn state(&self) -> TransferState {
        self.state
    }

    /// Counters so far
    pub fn report(&self) -> TransferReport {
        let mut report = self.report.clone();
        report.final_offset = self.source.offset();
        report
    }

    /// The frame source
    pub fn source(&self) -> &FrameSource<R> {
        &self.source
    }

    /// The buffer pair
    pub fn buffers(&self) -> &BufferPair {
        &self.buffers
    }

    /// The playback session
    pub fn session(&self) -> &PlaybackSession<S> {
        &self.session
    }

    /// Drain the device and release the source and buffers.
    pub fn finish(self) -> Result<(TransferReport, S)> {
        let report = self.report();
        let sink = self.session.finish()?;
        Ok((report, sink))
    }
}
