//! Audio output using cpal
//!
//! Presents cpal's callback-driven stream as a blocking [`PcmSink`].
//! Written periods go into a lock-free ring of two periods; the audio
//! callback drains it. When the callback finds the ring empty after
//! playback has started it plays silence and latches an underrun, which the
//! next `write` reports until `prepare` clears it.
//!
//! Parameter negotiation mirrors a classic hw-params setup: signed 16-bit
//! samples, stereo, 44100 Hz or else 48000 Hz, and a fixed period size taken
//! from a hint clamped to what the device supports.

use crate::audio::sink::{PcmSink, WriteError};
use crate::error::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, SampleFormat, SampleRate, Stream, StreamConfig, SupportedBufferSize};
use rawplay_common::format::PREFERRED_SAMPLE_RATES;
use rawplay_common::PcmFormat;
use ringbuf::{traits::*, HeapProd, HeapRb};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Device selector meaning "the host's default output"
pub const DEFAULT_DEVICE: &str = "default";

/// Periods of headroom between `write` and the audio callback
const RING_PERIODS: usize = 2;

/// Give up draining when the callback makes no progress for this long
const DRAIN_STALL_TIMEOUT: Duration = Duration::from_secs(2);

/// One supported output configuration range, reduced to what negotiation needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigCandidate {
    pub channels: u16,
    pub sample_format: SampleFormat,
    pub min_sample_rate: u32,
    pub max_sample_rate: u32,
    /// Supported period range in frames, if the backend reports one
    pub buffer_size: Option<(u32, u32)>,
}

impl From<&cpal::SupportedStreamConfigRange> for ConfigCandidate {
    fn from(range: &cpal::SupportedStreamConfigRange) -> Self {
        let buffer_size = match range.buffer_size() {
            SupportedBufferSize::Range { min, max } => Some((*min, *max)),
            SupportedBufferSize::Unknown => None,
        };
        Self {
            channels: range.channels(),
            sample_format: range.sample_format(),
            min_sample_rate: range.min_sample_rate().0,
            max_sample_rate: range.max_sample_rate().0,
            buffer_size,
        }
    }
}

impl ConfigCandidate {
    fn supports_rate(&self, rate: u32) -> bool {
        self.min_sample_rate <= rate && rate <= self.max_sample_rate
    }
}

/// Outcome of parameter negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiatedParams {
    pub sample_rate: u32,
    pub channels: u16,
    pub period_frames: u32,
}

impl NegotiatedParams {
    /// Wall-clock length of one period
    pub fn period_duration(&self) -> Duration {
        Duration::from_secs_f64(self.period_frames as f64 / self.sample_rate as f64)
    }

    fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            channels: self.channels,
            sample_rate: SampleRate(self.sample_rate),
            buffer_size: BufferSize::Fixed(self.period_frames),
        }
    }
}

/// Pick s16 stereo at the preferred rate from the device's supported ranges.
///
/// Fails with the step that could not be satisfied: sample format, channel
/// count, or sample rate.
pub fn negotiate(candidates: &[ConfigCandidate], period_hint: u32) -> Result<NegotiatedParams> {
    let format = PcmFormat::S16LE_STEREO;

    let s16: Vec<&ConfigCandidate> = candidates
        .iter()
        .filter(|c| c.sample_format == SampleFormat::I16)
        .collect();
    if s16.is_empty() {
        return Err(Error::Negotiation(
            "Error setting format to signed 16bit little-endian".to_string(),
        ));
    }

    let stereo: Vec<&ConfigCandidate> = s16
        .into_iter()
        .filter(|c| c.channels == format.channels)
        .collect();
    if stereo.is_empty() {
        return Err(Error::Negotiation("Error setting channels to stereo".to_string()));
    }

    for (attempt, &rate) in PREFERRED_SAMPLE_RATES.iter().enumerate() {
        if let Some(candidate) = stereo.iter().find(|c| c.supports_rate(rate)) {
            let period_frames = match candidate.buffer_size {
                Some((min, max)) if min <= max => period_hint.clamp(min, max),
                _ => period_hint,
            };
            if period_frames != period_hint {
                debug!(
                    "Period hint {} outside device range, using {} frames",
                    period_hint, period_frames
                );
            }
            return Ok(NegotiatedParams {
                sample_rate: rate,
                channels: format.channels,
                period_frames,
            });
        }

        if let Some(next) = PREFERRED_SAMPLE_RATES.get(attempt + 1) {
            warn!(
                "Could not set sample rate to {} Hz, attempting {} Hz",
                rate, next
            );
        }
    }

    Err(Error::Negotiation("Error setting sample rate".to_string()))
}

/// State shared with the audio callback
#[derive(Debug, Default)]
struct CallbackState {
    /// Callback ran dry during playback
    underrun: AtomicBool,
    /// At least one full period queued since the last prepare
    primed: AtomicBool,
    /// Running dry is expected while draining
    draining: AtomicBool,
    /// Samples taken out of the ring by the callback
    consumed: AtomicU64,
    /// Last error reported by cpal's error callback
    stream_error: Mutex<Option<String>>,
}

impl CallbackState {
    fn take_stream_error(&self) -> Option<String> {
        self.stream_error.lock().ok().and_then(|mut slot| slot.take())
    }
}

/// Blocking PCM sink on top of a cpal output stream
pub struct CpalSink {
    device_name: String,
    params: NegotiatedParams,
    stream: Stream,
    producer: HeapProd<i16>,
    state: Arc<CallbackState>,
    /// Decoded samples of the period being written
    scratch: Vec<i16>,
    /// Samples pushed into the ring since open
    queued_total: u64,
    poll_interval: Duration,
}

impl CpalSink {
    /// List available audio output devices.
    pub fn list_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();

        let devices: Vec<String> = host
            .output_devices()
            .map_err(|e| Error::AudioOutput(format!("Failed to enumerate devices: {}", e)))?
            .filter_map(|device| device.name().ok())
            .collect();

        debug!("Found {} output devices", devices.len());
        Ok(devices)
    }

    /// Open an output device and negotiate s16 stereo parameters.
    ///
    /// `selector` is a device name or [`DEFAULT_DEVICE`]. An unknown name is
    /// an error; there is no fallback to the default device.
    pub fn open(selector: &str, period_hint: u32) -> Result<Self> {
        let host = cpal::default_host();
        let device = find_device(&host, selector)?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        info!("Opening audio device: {}", device_name);

        let candidates: Vec<ConfigCandidate> = device
            .supported_output_configs()
            .map_err(|e| Error::AudioOutput(format!("Failed to get device configs: {}", e)))?
            .map(|range| ConfigCandidate::from(&range))
            .collect();
        debug!("Device reports {} output configurations", candidates.len());

        let params = negotiate(&candidates, period_hint)?;
        Self::start(device, device_name, params)
    }

    fn start(device: Device, device_name: String, params: NegotiatedParams) -> Result<Self> {
        let format = PcmFormat::S16LE_STEREO;
        let period_samples = format.samples_per_frames(params.period_frames as usize);

        let ring = HeapRb::<i16>::new(period_samples * RING_PERIODS);
        let (producer, mut consumer) = ring.split();
        let state = Arc::new(CallbackState::default());

        let callback_state = Arc::clone(&state);
        let error_state = Arc::clone(&state);

        let stream = device
            .build_output_stream(
                &params.stream_config(),
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    let popped = consumer.pop_slice(data);
                    callback_state
                        .consumed
                        .fetch_add(popped as u64, Ordering::Release);
                    if popped < data.len() {
                        data[popped..].fill(0);
                        if callback_state.primed.load(Ordering::Acquire)
                            && !callback_state.draining.load(Ordering::Acquire)
                        {
                            callback_state.underrun.store(true, Ordering::Release);
                        }
                    }
                },
                move |err| {
                    error!("Audio stream error: {}", err);
                    if let Ok(mut slot) = error_state.stream_error.lock() {
                        *slot = Some(err.to_string());
                    }
                },
                None,
            )
            .map_err(|e| Error::AudioOutput(format!("Failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| Error::AudioOutput(format!("Failed to start stream: {}", e)))?;

        info!(
            "Audio stream ready: sample_rate={}, channels={}, period={} frames",
            params.sample_rate, params.channels, params.period_frames
        );

        let poll_interval = (params.period_duration() / 4).max(Duration::from_millis(1));

        Ok(Self {
            device_name,
            params,
            stream,
            producer,
            state,
            scratch: Vec::with_capacity(period_samples),
            queued_total: 0,
            poll_interval,
        })
    }

    /// Name of the opened device
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Negotiated parameters
    pub fn params(&self) -> NegotiatedParams {
        self.params
    }
}

impl PcmSink for CpalSink {
    fn period_frames(&self) -> usize {
        self.params.period_frames as usize
    }

    fn sample_rate(&self) -> u32 {
        self.params.sample_rate
    }

    fn write(&mut self, data: &[u8]) -> std::result::Result<usize, WriteError> {
        if let Some(message) = self.state.take_stream_error() {
            return Err(WriteError::Device(message));
        }
        if self.state.underrun.load(Ordering::Acquire) {
            return Err(WriteError::Underrun);
        }

        let format = PcmFormat::S16LE_STEREO;
        let frames = format.bytes_to_frames(data.len());
        decode_s16le(&data[..format.frames_to_bytes(frames)], &mut self.scratch);

        let mut queued = 0;
        while queued < self.scratch.len() {
            let pushed = self.producer.push_slice(&self.scratch[queued..]);
            queued += pushed;
            self.queued_total += pushed as u64;
            if queued < self.scratch.len() {
                if let Some(message) = self.state.take_stream_error() {
                    return Err(WriteError::Device(message));
                }
                thread::sleep(self.poll_interval);
            }
        }

        self.state.primed.store(true, Ordering::Release);
        Ok(frames)
    }

    fn prepare(&mut self) -> Result<()> {
        debug!("Preparing audio device after underrun");
        self.state.primed.store(false, Ordering::Release);
        self.state.underrun.store(false, Ordering::Release);
        Ok(())
    }

    fn drain(&mut self) -> Result<()> {
        self.state.draining.store(true, Ordering::Release);

        let mut last_consumed = self.state.consumed.load(Ordering::Acquire);
        let mut last_progress = Instant::now();
        while last_consumed < self.queued_total {
            if let Some(message) = self.state.take_stream_error() {
                return Err(Error::AudioOutput(format!("Stream failed while draining: {}", message)));
            }

            thread::sleep(self.poll_interval);

            let consumed = self.state.consumed.load(Ordering::Acquire);
            if consumed > last_consumed {
                last_consumed = consumed;
                last_progress = Instant::now();
            } else if last_progress.elapsed() > DRAIN_STALL_TIMEOUT {
                warn!(
                    "Audio device stopped consuming, dropping {} queued samples",
                    self.queued_total - consumed
                );
                break;
            }
        }

        // The device still holds up to one period of its own
        thread::sleep(self.params.period_duration());

        self.stream
            .pause()
            .map_err(|e| Error::AudioOutput(format!("Failed to pause stream: {}", e)))?;
        debug!("Audio device drained");
        Ok(())
    }
}

fn find_device(host: &cpal::Host, selector: &str) -> Result<Device> {
    if selector == DEFAULT_DEVICE {
        return host
            .default_output_device()
            .ok_or_else(|| Error::DeviceNotFound("No default output device found".to_string()));
    }

    let mut devices = host
        .output_devices()
        .map_err(|e| Error::AudioOutput(format!("Failed to enumerate devices: {}", e)))?;

    devices
        .find(|d| d.name().ok().as_deref() == Some(selector))
        .ok_or_else(|| Error::DeviceNotFound(selector.to_string()))
}

/// Decode little-endian 16-bit samples into `out`, replacing its contents.
fn decode_s16le(bytes: &[u8], out: &mut Vec<i16>) {
    out.clear();
    out.extend(
        bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]])),
    );
}
