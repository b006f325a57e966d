//! PCM wire format
//!
//! The player only accepts headerless interleaved signed 16-bit
//! little-endian stereo. Everything that sizes a buffer or converts
//! between frames and bytes goes through [`PcmFormat`].

/// Sample rates tried during negotiation, in order of preference
pub const PREFERRED_SAMPLE_RATES: [u32; 2] = [44_100, 48_000];

/// Period size requested from the device when nothing else is configured
pub const DEFAULT_PERIOD_FRAMES: u32 = 1024;

/// Layout of one interleaved PCM frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    /// Number of interleaved channels
    pub channels: u16,

    /// Bytes per single-channel sample
    pub bytes_per_sample: u16,
}

impl PcmFormat {
    /// Signed 16-bit little-endian stereo
    pub const S16LE_STEREO: PcmFormat = PcmFormat {
        channels: 2,
        bytes_per_sample: 2,
    };

    /// Bytes in one frame (one sample per channel)
    pub const fn bytes_per_frame(&self) -> usize {
        self.channels as usize * self.bytes_per_sample as usize
    }

    /// Bytes needed to hold `frames` frames
    pub const fn frames_to_bytes(&self, frames: usize) -> usize {
        frames * self.bytes_per_frame()
    }

    /// Whole frames contained in `bytes` (a trailing partial frame is dropped)
    pub const fn bytes_to_frames(&self, bytes: usize) -> usize {
        bytes / self.bytes_per_frame()
    }

    /// Samples (all channels) contained in `frames` frames
    pub const fn samples_per_frames(&self, frames: usize) -> usize {
        frames * self.channels as usize
    }
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self::S16LE_STEREO
    }
}
