//! Double buffer for the transfer loop
//!
//! Two period-sized byte regions allocated once. [`BufferPair::fill_slot`]
//! names the buffer the next load writes into; the other one always holds
//! the most recently loaded period and is what gets played. The slot flips
//! once per load.

use crate::error::{Error, Result};
use rawplay_common::PcmFormat;

/// One of the two physical buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferSlot {
    A,
    B,
}

impl BufferSlot {
    /// The opposite slot
    pub fn other(self) -> Self {
        match self {
            BufferSlot::A => BufferSlot::B,
            BufferSlot::B => BufferSlot::A,
        }
    }

    fn index(self) -> usize {
        match self {
            BufferSlot::A => 0,
            BufferSlot::B => 1,
        }
    }
}

/// Two fixed-size frame buffers with an alternating fill slot
#[derive(Debug)]
pub struct BufferPair {
    buffers: [Box<[u8]>; 2],
    next_fill: BufferSlot,
    period_frames: usize,
}

impl BufferPair {
    /// Allocate both buffers for one period of s16le stereo each.
    ///
    /// Buffers start zeroed; the first load goes into slot A.
    pub fn new(period_frames: usize) -> Result<Self> {
        Self::with_format(period_frames, PcmFormat::S16LE_STEREO)
    }

    /// Allocate both buffers for one period of `format` each.
    pub fn with_format(period_frames: usize, format: PcmFormat) -> Result<Self> {
        if period_frames == 0 {
            return Err(Error::Config("Period size must be at least one frame".to_string()));
        }

        let bytes = format.frames_to_bytes(period_frames);
        Ok(Self {
            buffers: [
                vec![0u8; bytes].into_boxed_slice(),
                vec![0u8; bytes].into_boxed_slice(),
            ],
            next_fill: BufferSlot::A,
            period_frames,
        })
    }

    /// Frames held by each buffer
    pub fn period_frames(&self) -> usize {
        self.period_frames
    }

    /// Bytes held by each buffer
    pub fn capacity_bytes(&self) -> usize {
        self.buffers[0].len()
    }

    /// Slot the next load writes into
    pub fn fill_slot(&self) -> BufferSlot {
        self.next_fill
    }

    /// Slot holding the most recently loaded period
    pub fn play_slot(&self) -> BufferSlot {
        self.next_fill.other()
    }

    /// Buffer the next load writes into
    pub fn fill_buffer_mut(&mut self) -> &mut [u8] {
        &mut self.buffers[self.next_fill.index()]
    }

    /// Buffer holding the most recently loaded period
    pub fn play_buffer(&self) -> &[u8] {
        &self.buffers[self.play_slot().index()]
    }

    /// Borrow the fill buffer mutably and the play buffer shared at once.
    pub fn split(&mut self) -> (&mut [u8], &[u8]) {
        let [a, b] = &mut self.buffers;
        match self.next_fill {
            BufferSlot::A => (&mut a[..], &b[..]),
            BufferSlot::B => (&mut b[..], &a[..]),
        }
    }

    /// Contents of a specific slot
    pub fn buffer(&self, slot: BufferSlot) -> &[u8] {
        &self.buffers[slot.index()]
    }

    /// Hand the fill buffer over to the play side after a load.
    pub fn flip(&mut self) {
        self.next_fill = self.next_fill.other();
    }
}
