//! Transfer Loop Performance Benchmark
//!
//! Measures load/play throughput of the double-buffered loop against a
//! device that accepts every write immediately, i.e. the loop's own
//! overhead on top of file reads.
//!
//! **Goal:** One minute of 44.1 kHz stereo should move in well under a
//! millisecond per second of audio.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rawplay::audio::{FrameSource, PcmSink, WriteError};
use rawplay::playback::{PlaybackSession, TransferLoop, TransferOptions};
use std::io::Cursor;

/// Sink that discards everything
struct NullSink {
    period_frames: usize,
}

impl PcmSink for NullSink {
    fn period_frames(&self) -> usize {
        self.period_frames
    }

    fn sample_rate(&self) -> u32 {
        44_100
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        black_box(data);
        Ok(data.len() / 4)
    }

    fn prepare(&mut self) -> rawplay::Result<()> {
        Ok(())
    }

    fn drain(&mut self) -> rawplay::Result<()> {
        Ok(())
    }
}

fn bench_transfer_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("transfer_loop");

    // 60 seconds of 44.1 kHz stereo s16
    let audio = vec![0x55u8; 44_100 * 4 * 60];
    group.throughput(Throughput::Bytes(audio.len() as u64));

    for period_frames in [256usize, 1024, 4096] {
        group.bench_with_input(
            BenchmarkId::new("period_frames", period_frames),
            &period_frames,
            |b, &period_frames| {
                b.iter(|| {
                    let source = FrameSource::from_reader(Cursor::new(audio.as_slice())).unwrap();
                    let session = PlaybackSession::new(NullSink { period_frames });
                    let mut transfer =
                        TransferLoop::new(source, session, TransferOptions::default()).unwrap();
                    black_box(transfer.run().unwrap());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_transfer_loop);
criterion_main!(benches);
