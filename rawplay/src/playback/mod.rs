//! Playback: device driver and the double-buffered transfer loop

pub mod session;
pub mod transfer;

pub use session::{PlayOutcome, PlaybackSession};
pub use transfer::{TransferLoop, TransferOptions, TransferReport, TransferState};
