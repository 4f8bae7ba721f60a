//! Capture loop driving the demodulation pipeline
//!
//! One buffer at a time: read from the capture source, demodulate, append to
//! the audio sink. The filter carry is owned here and threaded through every
//! pipeline call in order.

use crate::dsp::{FilterState, Pipeline};
use crate::recorder::AudioSink;
use crate::sdr::CaptureSource;
use crate::types::ReceiverConfig;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};

/// Totals for one capture run
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureStats {
    /// Raw buffers demodulated
    pub buffers: u64,
    /// Raw I/Q bytes consumed
    pub raw_bytes: u64,
    /// PCM samples handed to the sink
    pub audio_samples: u64,
    /// Audio rate of the produced samples
    pub audio_rate: u32,
}

impl CaptureStats {
    fn new(audio_rate: u32) -> Self {
        Self {
            buffers: 0,
            raw_bytes: 0,
            audio_samples: 0,
            audio_rate,
        }
    }

    /// PCM payload size in bytes (two bytes per sample)
    pub fn audio_bytes(&self) -> u64 {
        self.audio_samples * 2
    }

    /// Length of the produced audio in seconds
    pub fn audio_secs(&self) -> f64 {
        self.audio_samples as f64 / self.audio_rate as f64
    }
}

/// FM receiver: capture source + pipeline + audio sink
pub struct Receiver<S: CaptureSource, K: AudioSink> {
    source: S,
    sink: K,
    pipeline: Pipeline,
    state: FilterState,
    buffer: Vec<u8>,
    total_bytes: u64,
    audio_rate: u32,
}

impl<S: CaptureSource, K: AudioSink> Receiver<S, K> {
    pub fn new(config: &ReceiverConfig, source: S, sink: K) -> Result<Self> {
        config.validate()?;
        let pipeline = Pipeline::new(&config.dsp).context("Invalid demodulation settings")?;

        Ok(Self {
            source,
            sink,
            pipeline,
            state: FilterState::default(),
            buffer: vec![0u8; config.dsp.buffer_size],
            total_bytes: config.total_bytes(),
            audio_rate: config.dsp.audio_rate,
        })
    }

    /// Carried filter state after the last processed buffer
    pub fn state(&self) -> FilterState {
        self.state
    }

    /// Run until the configured duration is captured or the source runs dry
    ///
    /// Any capture or sink error aborts the run; the sink is still finalized
    /// only on success.
    pub fn run(&mut self) -> Result<CaptureStats> {
        let started: DateTime<Local> = Local::now();
        let mut stats = CaptureStats::new(self.audio_rate);

        log::info!(
            "Capturing {} bytes from {} ({} byte buffers, {} samples per block, decimation {})",
            self.total_bytes,
            self.source.describe(),
            self.buffer.len(),
            self.pipeline.block_len(),
            self.pipeline.decimation()
        );

        while stats.raw_bytes < self.total_bytes {
            let read = match self
                .source
                .read_buffer(&mut self.buffer)
                .context("An error occurred while reading I/Q samples")?
            {
                Some(n) => n,
                None => {
                    log::info!("Capture source exhausted after {} buffers", stats.buffers);
                    break;
                }
            };

            let (pcm, state) = self.pipeline.process(&self.buffer[..read], self.state)?;
            self.sink.write_pcm(pcm).context("Failed to write audio")?;

            self.state = state;
            stats.buffers += 1;
            stats.raw_bytes += read as u64;
            stats.audio_samples += pcm.len() as u64;

            log::debug!(
                "Buffer {}: {} bytes -> {} samples ({}/{} bytes)",
                stats.buffers,
                read,
                pcm.len(),
                stats.raw_bytes,
                self.total_bytes
            );
        }

        self.sink.finish().context("Failed to finalize audio output")?;

        let elapsed = Local::now().signed_duration_since(started);
        log::info!(
            "Captured {:.2}s of audio ({} bytes) from {} buffers in {:.2}s",
            stats.audio_secs(),
            stats.audio_bytes(),
            stats.buffers,
            elapsed.num_milliseconds() as f64 / 1000.0
        );

        Ok(stats)
    }

    /// Recover the source and sink
    #[cfg(test)]
    pub fn into_parts(self) -> (S, K) {
        (self.source, self.sink)
    }
}
