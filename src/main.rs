// Module declarations
mod dsp;
mod receiver;
mod recorder;
mod sdr;
mod types;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Parser;
use dsp::DcBlockMode;
use receiver::Receiver;
use recorder::{AudioSink, RawPcmWriter, WavRecorder};
use sdr::{CaptureSource, IqReader};
use std::path::PathBuf;
use types::{Deemphasis, DspConfig, ReceiverConfig, SdrConfig};

/// Record broadcast FM from an RTL-SDR (or a raw cu8 capture) to a mono WAV file
#[derive(Parser, Debug)]
#[command(name = "rtl-fm-wav")]
#[command(version, about, long_about = None)]
struct Args {
    /// Center frequency in MHz
    #[arg(short, long, value_name = "MHZ")]
    frequency: Option<f64>,

    /// Capture duration in seconds
    #[arg(short, long, default_value_t = sdr::config::defaults::DURATION_SECS)]
    duration: u32,

    /// Read raw cu8 I/Q samples from a file ("-" for stdin) instead of a device
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output WAV file ("-" writes raw s16le PCM to stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Capture sample rate in Hz
    #[arg(long, default_value_t = sdr::config::defaults::SAMPLE_RATE)]
    rate: u32,

    /// Audio sample rate in Hz (must divide the capture rate)
    #[arg(long, default_value_t = sdr::config::defaults::AUDIO_RATE)]
    audio_rate: u32,

    /// De-emphasis standard: eu (50 µs) or us (75 µs)
    #[arg(long, value_enum, default_value_t = Deemphasis::Europe)]
    deemphasis: Deemphasis,

    /// DC-block behavior at buffer boundaries
    #[arg(long, value_enum, default_value_t = DcBlockMode::PerBuffer)]
    dc_block: DcBlockMode,

    /// Tuner gain in tenths of dB, -1 for automatic
    #[arg(short, long, default_value_t = sdr::config::defaults::AUTO_GAIN, allow_hyphen_values = true)]
    gain: i32,

    /// Frequency correction in PPM
    #[arg(long, default_value_t = sdr::config::defaults::PPM_ERROR, allow_hyphen_values = true)]
    ppm: i32,

    /// RTL-SDR device index
    #[arg(long, default_value_t = 0)]
    device: usize,

    /// Raw capture buffer size in bytes
    #[arg(long, default_value_t = sdr::config::defaults::BUFFER_SIZE)]
    buffer_size: usize,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn to_config(&self) -> Result<ReceiverConfig> {
        let frequency = match self.frequency {
            Some(mhz) => sdr::config::frequency_from_mhz(mhz)?,
            None => sdr::config::defaults::FREQUENCY,
        };

        Ok(ReceiverConfig {
            sdr: SdrConfig {
                frequency,
                tuner_gain: self.gain,
                ppm_error: self.ppm,
                device_index: self.device,
            },
            dsp: DspConfig {
                sample_rate: self.rate,
                audio_rate: self.audio_rate,
                deemphasis: self.deemphasis,
                dc_block: self.dc_block,
                buffer_size: self.buffer_size,
            },
            duration_secs: self.duration,
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    log::info!("rtl-fm-wav v{} starting...", env!("CARGO_PKG_VERSION"));

    // Run the application
    if let Err(e) = run(&args) {
        log::error!("Application error: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let config = args.to_config()?;
    config.validate()?;

    log::info!(
        "Capture {} Hz -> audio {} Hz, de-emphasis {:?} ({:.0} us), DC block {:?}, {} s",
        config.dsp.sample_rate,
        config.dsp.audio_rate,
        config.dsp.deemphasis,
        config.dsp.deemphasis.tau() * 1e6,
        config.dsp.dc_block,
        config.duration_secs
    );

    // The output is only created once the input is known to be readable
    let source = open_source(args, &config)?;
    let sink = open_sink(args, &config)?;
    capture(&config, source, sink)
}

fn open_source(args: &Args, config: &ReceiverConfig) -> Result<Box<dyn CaptureSource>> {
    match &args.input {
        Some(path) if path.as_os_str() == "-" => Ok(Box::new(IqReader::stdin())),
        Some(path) => {
            let source = IqReader::from_file(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Ok(Box::new(source))
        }
        None => {
            log::info!(
                "Device {}: gain {} (tenths of dB, -1 = auto), PPM {}",
                config.sdr.device_index,
                config.sdr.tuner_gain,
                config.sdr.ppm_error
            );
            open_device(args, config)
        }
    }
}

#[cfg(feature = "rtlsdr")]
fn open_device(args: &Args, config: &ReceiverConfig) -> Result<Box<dyn CaptureSource>> {
    if args.frequency.is_none() {
        anyhow::bail!("A center frequency (--frequency MHZ) is required when capturing from a device");
    }
    config
        .sdr
        .validate(config.dsp.sample_rate, config.dsp.buffer_size)?;

    let device = sdr::RtlSdrDevice::configure(&config.sdr, config.dsp.sample_rate)?;
    Ok(Box::new(device.into_source(config.dsp.buffer_size)?))
}

#[cfg(not(feature = "rtlsdr"))]
fn open_device(_args: &Args, _config: &ReceiverConfig) -> Result<Box<dyn CaptureSource>> {
    anyhow::bail!("Built without RTL-SDR support; rebuild with --features rtlsdr or pass --input")
}

fn capture(
    config: &ReceiverConfig,
    source: Box<dyn CaptureSource>,
    sink: Box<dyn AudioSink>,
) -> Result<()> {
    let mut receiver = Receiver::new(config, source, sink)?;
    let stats = receiver.run()?;
    log::debug!("Final filter state: {:?}", receiver.state());

    log::info!(
        "Done: {} raw bytes -> {} audio bytes ({:.2}s at {} Hz)",
        stats.raw_bytes,
        stats.audio_bytes(),
        stats.audio_secs(),
        stats.audio_rate
    );
    Ok(())
}

fn open_sink(args: &Args, config: &ReceiverConfig) -> Result<Box<dyn AudioSink>> {
    let audio_rate = config.dsp.audio_rate;
    match &args.output {
        Some(path) if path.as_os_str() == "-" => Ok(Box::new(RawPcmWriter::stdout())),
        Some(path) => Ok(Box::new(WavRecorder::create(path, audio_rate)?)),
        None => {
            let path = default_filename(config.sdr.frequency, Local::now());
            Ok(Box::new(WavRecorder::create(path, audio_rate)?))
        }
    }
}

/// Timestamped output name, e.g. `fm_98.500MHz_2026-10-16_12-00-00.wav`
fn default_filename(frequency: u32, time: DateTime<Local>) -> String {
    format!(
        "fm_{:.3}MHz_{}.wav",
        frequency as f64 / 1_000_000.0,
        time.format("%Y-%m-%d_%H-%M-%S")
    )
}
