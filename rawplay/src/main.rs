//! rawplay - Main entry point
//!
//! Streams a raw PCM file (interleaved s16le stereo, no header) to an audio
//! output device through the double-buffered transfer loop.
//!
//! Setup failures (device, negotiation, file, configuration) are reported
//! and the process still exits with status 0. A run aborted by repeated
//! device write failures exits with status 1.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use rawplay::audio::{CpalSink, FrameSource};
use rawplay::config::{CliOverrides, PlayerConfig};
use rawplay::playback::{PlaybackSession, TransferLoop};
use rawplay_common::config::{load_config, TomlConfig};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for rawplay
#[derive(Parser, Debug)]
#[command(name = "rawplay")]
#[command(about = "Stream a raw 16-bit stereo PCM file to an audio output device")]
#[command(version)]
struct Args {
    /// Raw PCM file (interleaved signed 16-bit little-endian stereo, no header)
    #[arg(short, long, env = "RAWPLAY_INPUT")]
    input: Option<PathBuf>,

    /// Output device name, or "default" for the system default output
    #[arg(short, long, env = "RAWPLAY_DEVICE")]
    device: Option<String>,

    /// Period size hint in frames
    #[arg(long, env = "RAWPLAY_PERIOD_FRAMES")]
    period_frames: Option<u32>,

    /// Abort after this many device write failures in a row (0 = never)
    #[arg(long)]
    max_write_failures: Option<u32>,

    /// Zero the unread tail of a short final period instead of replaying stale bytes
    #[arg(long)]
    pad_final_period: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,

    /// Config file (default: <config dir>/rawplay/config.toml)
    #[arg(short, long, env = "RAWPLAY_CONFIG")]
    config: Option<PathBuf>,

    /// List output devices and exit
    #[arg(long)]
    list_devices: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            input: self.input.clone(),
            device: self.device.clone(),
            period_frames: self.period_frames,
            max_consecutive_write_failures: self.max_write_failures,
            pad_final_period: self.pad_final_period,
            log_level: self.log_level.clone(),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // The config file may set the log level, so it is read before tracing starts
    let loaded = load_config(args.config.as_deref());
    let level = args
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|(c, _)| c.logging.level.clone()))
        .unwrap_or_else(|| "info".to_string());
    init_tracing(&level);

    match run(&args, loaded) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            info!("Terminated");
            if matches!(e.downcast_ref::<rawplay::Error>(), Some(rawplay::Error::Playback(_))) {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
    }
}

fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("rawplay={level},rawplay_common={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(
    args: &Args,
    loaded: rawplay_common::Result<(TomlConfig, Option<PathBuf>)>,
) -> Result<()> {
    if args.list_devices {
        for name in CpalSink::list_devices().context("Error listing audio devices")? {
            println!("{}", name);
        }
        return Ok(());
    }

    let (file_config, config_path) = loaded.context("Error loading configuration")?;
    match &config_path {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => warn!("No config file found, using built-in defaults"),
    }
    let config = PlayerConfig::resolve(args.overrides(), file_config)
        .context("Invalid configuration")?;

    let sink = CpalSink::open(&config.device, config.period_frames)
        .with_context(|| format!("Error initializing audio device '{}'", config.device))?;
    let params = sink.params();
    info!(
        "Audio hardware initialized: {} at {} Hz, {} frames per period",
        sink.device_name(),
        params.sample_rate,
        params.period_frames
    );

    let source = FrameSource::open(&config.input)
        .with_context(|| format!("Error opening audio file {}", config.input.display()))?;
    info!("Audio file is open");

    let mut transfer = TransferLoop::new(source, PlaybackSession::new(sink), config.transfer)
        .context("Error allocating buffers")?;

    info!("Playback started");
    transfer.run().context("Playback aborted")?;
    info!("Playback finished");

    let (report, _sink) = transfer.finish().context("Error draining audio device")?;
    info!(
        "Played {} periods ({} bytes loaded, final offset {})",
        report.plays, report.bytes_loaded, report.final_offset
    );
    if let Some(valid) = report.short_tail {
        info!("Final period held {} valid bytes", valid);
    }

    info!("Terminated");
    Ok(())
}
