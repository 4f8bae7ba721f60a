/// RTL-SDR specific configuration constants and utilities

/// Default receiver configuration values
pub mod defaults {
    /// Default center frequency (98.5 MHz)
    pub const FREQUENCY: u32 = 98_500_000;

    /// Default capture rate (960 kHz, an exact multiple of the audio rate)
    pub const SAMPLE_RATE: u32 = 960_000;

    /// Default audio output rate (48 kHz)
    pub const AUDIO_RATE: u32 = 48_000;

    /// Raw buffer size: 16 USB transfers of 16384 bytes
    pub const BUFFER_SIZE: usize = 16 * 16384;

    /// Default capture duration in seconds
    pub const DURATION_SECS: u32 = 5;

    /// Automatic gain (-1)
    pub const AUTO_GAIN: i32 = -1;

    /// Default PPM correction
    pub const PPM_ERROR: i32 = 0;
}

/// RTL-SDR hardware constraints
#[cfg(feature = "rtlsdr")]
pub mod constraints {
    /// Minimum frequency supported by RTL-SDR (24 MHz)
    pub const MIN_FREQUENCY: u32 = 24_000_000;

    /// Maximum frequency supported by RTL-SDR (1.766 GHz)
    pub const MAX_FREQUENCY: u32 = 1_766_000_000;

    /// Minimum sample rate (225 kHz)
    pub const MIN_SAMPLE_RATE: u32 = 225_000;

    /// Maximum sample rate (3.2 MHz)
    pub const MAX_SAMPLE_RATE: u32 = 3_200_000;

    /// Async read buffers must be a multiple of this many bytes
    pub const BUFFER_ALIGNMENT: usize = 512;
}

/// Broadcast FM band edges (ITU regions combined)
#[cfg(feature = "rtlsdr")]
pub mod fm_band {
    pub const LOW: u32 = 76_000_000;
    pub const HIGH: u32 = 108_000_000;
}

/// Common RTL-SDR sample rates that work well
#[cfg(feature = "rtlsdr")]
pub const COMMON_SAMPLE_RATES: &[u32] = &[
    225_000,    // 225 kHz
    900_000,    // 900 kHz
    960_000,    // 960 kHz (20 x 48 kHz)
    1_024_000,  // 1.024 MHz
    1_200_000,  // 1.2 MHz (25 x 48 kHz)
    1_440_000,  // 1.44 MHz (30 x 48 kHz)
    1_800_000,  // 1.8 MHz
    1_920_000,  // 1.92 MHz (40 x 48 kHz)
    2_048_000,  // 2.048 MHz
    2_400_000,  // 2.4 MHz (50 x 48 kHz)
    2_560_000,  // 2.56 MHz
    2_880_000,  // 2.88 MHz (60 x 48 kHz)
    3_200_000,  // 3.2 MHz (maximum)
];

/// Parse a center frequency given in MHz into Hz
pub fn frequency_from_mhz(mhz: f64) -> anyhow::Result<u32> {
    let hz = (mhz * 1_000_000.0).round();
    if !hz.is_finite() || hz < 0.0 || hz > u32::MAX as f64 {
        anyhow::bail!("Frequency {} MHz is not representable", mhz);
    }
    Ok(hz as u32)
}

/// Validate frequency is within RTL-SDR range
#[cfg(feature = "rtlsdr")]
pub fn validate_frequency(freq: u32) -> anyhow::Result<()> {
    if freq < constraints::MIN_FREQUENCY {
        anyhow::bail!(
            "Frequency {} Hz is below minimum {} Hz",
            freq,
            constraints::MIN_FREQUENCY
        );
    } else if freq > constraints::MAX_FREQUENCY {
        anyhow::bail!(
            "Frequency {} Hz is above maximum {} Hz",
            freq,
            constraints::MAX_FREQUENCY
        );
    }

    if !(fm_band::LOW..=fm_band::HIGH).contains(&freq) {
        log::warn!(
            "Frequency {:.3} MHz is outside the broadcast FM band",
            freq as f64 / 1_000_000.0
        );
    }
    Ok(())
}

/// Validate sample rate is within RTL-SDR range
#[cfg(feature = "rtlsdr")]
pub fn validate_sample_rate(rate: u32) -> anyhow::Result<()> {
    if rate < constraints::MIN_SAMPLE_RATE {
        anyhow::bail!(
            "Sample rate {} Hz is below minimum {} Hz",
            rate,
            constraints::MIN_SAMPLE_RATE
        );
    } else if rate > constraints::MAX_SAMPLE_RATE {
        anyhow::bail!(
            "Sample rate {} Hz is above maximum {} Hz",
            rate,
            constraints::MAX_SAMPLE_RATE
        );
    }

    // Warn if not a common sample rate
    if !COMMON_SAMPLE_RATES.contains(&rate) {
        log::warn!(
            "Sample rate {} Hz is not a common RTL-SDR rate, may cause issues",
            rate
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "rtlsdr")]
    #[test]
    fn test_validate_frequency() {
        assert!(validate_frequency(98_500_000).is_ok());
        assert!(validate_frequency(144_390_000).is_ok());
        assert!(validate_frequency(1_000_000).is_err());
        assert!(validate_frequency(2_000_000_000).is_err());
    }

    #[cfg(feature = "rtlsdr")]
    #[test]
    fn test_validate_sample_rate() {
        assert!(validate_sample_rate(960_000).is_ok());
        assert!(validate_sample_rate(100_000).is_err());
        assert!(validate_sample_rate(5_000_000).is_err());
    }

    #[test]
    fn test_frequency_from_mhz() {
        assert_eq!(frequency_from_mhz(98.5).unwrap(), 98_500_000);
        assert_eq!(frequency_from_mhz(101.1).unwrap(), 101_100_000);
        assert!(frequency_from_mhz(-1.0).is_err());
        assert!(frequency_from_mhz(f64::NAN).is_err());
    }
}
