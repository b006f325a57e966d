//! Audio I/O: file source, buffer pair, and device sinks

pub mod buffers;
pub mod output;
pub mod sink;
pub mod source;

pub use buffers::{BufferPair, BufferSlot};
pub use output::CpalSink;
pub use sink::{PcmSink, WriteError};
pub use source::{FrameSource, LoadOutcome};

#[cfg(test)]
pub(crate) mod mock;
