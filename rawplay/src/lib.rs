//! # rawplay
//!
//! Streams a headerless PCM file (interleaved s16le stereo) to an audio
//! output device through a pair of period-sized buffers.
//!
//! **Architecture:** [`audio::FrameSource`] fills one buffer of an
//! [`audio::BufferPair`] while the other, filled on the previous step, is
//! written through a [`playback::PlaybackSession`]. The
//! [`playback::TransferLoop`] strictly interleaves the two on one thread.
//! The hardware side is abstracted behind [`audio::PcmSink`]; the cpal
//! implementation lives in [`audio::output`].

pub mod audio;
pub mod config;
pub mod error;
pub mod playback;

pub use error::{Error, Result};
