use crate::dsp::DcBlockMode;
#[cfg(feature = "rtlsdr")]
use crate::sdr::config::constraints;
use crate::sdr::config::defaults;

/// Receiver configuration
#[derive(Debug, Clone)]
pub struct ReceiverConfig {
    pub sdr: SdrConfig,
    pub dsp: DspConfig,
    /// Capture duration in seconds
    pub duration_secs: u32,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            sdr: SdrConfig::default(),
            dsp: DspConfig::default(),
            duration_secs: defaults::DURATION_SECS,
        }
    }
}

impl ReceiverConfig {
    /// Raw capture bytes covering the requested duration (one I and one Q byte per sample)
    pub fn total_bytes(&self) -> u64 {
        self.dsp.sample_rate as u64 * self.duration_secs as u64 * 2
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.duration_secs == 0 {
            anyhow::bail!("Capture duration must be at least one second");
        }
        self.dsp.validate()
    }
}

/// SDR device configuration
#[derive(Debug, Clone)]
pub struct SdrConfig {
    /// Center frequency in Hz
    pub frequency: u32,
    /// Tuner gain in tenths of dB (e.g., 421 = 42.1 dB)
    /// Use -1 for automatic gain
    pub tuner_gain: i32,
    /// PPM (Parts Per Million) frequency correction
    pub ppm_error: i32,
    /// Device index (0 for first device)
    pub device_index: usize,
}

impl Default for SdrConfig {
    fn default() -> Self {
        Self {
            frequency: defaults::FREQUENCY,
            tuner_gain: defaults::AUTO_GAIN,
            ppm_error: defaults::PPM_ERROR,
            device_index: 0,
        }
    }
}

#[cfg(feature = "rtlsdr")]
impl SdrConfig {
    /// Validate device parameters against the RTL-SDR hardware limits
    pub fn validate(&self, sample_rate: u32, buffer_size: usize) -> anyhow::Result<()> {
        crate::sdr::config::validate_frequency(self.frequency)?;
        crate::sdr::config::validate_sample_rate(sample_rate)?;

        if buffer_size % constraints::BUFFER_ALIGNMENT != 0 {
            anyhow::bail!(
                "Buffer size {} is not a multiple of {} bytes required by the RTL-SDR reader",
                buffer_size,
                constraints::BUFFER_ALIGNMENT
            );
        }

        Ok(())
    }
}

/// FM de-emphasis standard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Deemphasis {
    /// 50 µs: Europe, Asia, Africa
    #[default]
    #[value(name = "eu")]
    Europe,
    /// 75 µs: Americas, South Korea
    #[value(name = "us")]
    Americas,
}

impl Deemphasis {
    /// Time constant in seconds
    pub fn tau(&self) -> f64 {
        match self {
            Deemphasis::Europe => 50e-6,
            Deemphasis::Americas => 75e-6,
        }
    }
}

/// Demodulation pipeline configuration
#[derive(Debug, Clone)]
pub struct DspConfig {
    /// Capture sample rate in Hz
    pub sample_rate: u32,
    /// Audio output sample rate in Hz
    pub audio_rate: u32,
    pub deemphasis: Deemphasis,
    pub dc_block: DcBlockMode,
    /// Raw capture buffer size in bytes
    pub buffer_size: usize,
}

impl Default for DspConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            audio_rate: defaults::AUDIO_RATE,
            deemphasis: Deemphasis::default(),
            dc_block: DcBlockMode::default(),
            buffer_size: defaults::BUFFER_SIZE,
        }
    }
}

impl DspConfig {
    /// Decimation factor, if the capture rate is an exact multiple of the audio rate
    pub fn decimation(&self) -> Option<u32> {
        if self.audio_rate == 0 || self.sample_rate % self.audio_rate != 0 {
            return None;
        }
        match self.sample_rate / self.audio_rate {
            0 => None,
            factor => Some(factor),
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sample_rate == 0 || self.audio_rate == 0 {
            anyhow::bail!("Sample rates must be non-zero");
        }

        if self.decimation().is_none() {
            anyhow::bail!(
                "Capture rate {} Hz must be an integer multiple of audio rate {} Hz",
                self.sample_rate,
                self.audio_rate
            );
        }

        if self.buffer_size % 2 != 0 {
            anyhow::bail!(
                "Buffer size {} must be even (one I and one Q byte per sample)",
                self.buffer_size
            );
        }

        if self.buffer_size < 4 {
            anyhow::bail!("Buffer size {} is too small, need at least 4 bytes", self.buffer_size);
        }

        Ok(())
    }
}
