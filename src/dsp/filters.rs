//! Post-detection filters for broadcast FM
//!
//! Both filters are single-pole IIR sections that run in place over a block
//! of frequency samples. State that must outlive a block is passed in and
//! handed back by the caller, never kept inside the filter.

/// Pole of the DC-block high-pass section
pub const DC_BLOCK_POLE: f32 = 0.99;

/// De-emphasis low-pass filter
///
/// Exponential moving average matching the RC network of an analog receiver:
/// `y[n] = alpha * x[n] + (1 - alpha) * y[n-1]`
#[derive(Debug, Clone, Copy)]
pub struct DeemphasisFilter {
    alpha: f32,
}

impl DeemphasisFilter {
    /// Create a new de-emphasis filter
    ///
    /// # Arguments
    /// * `sample_rate` - Rate of the samples being filtered in Hz (pre-decimation)
    /// * `tau` - Time constant in seconds (50e-6 for EU, 75e-6 for US)
    pub fn new(sample_rate: u32, tau: f64) -> Self {
        let alpha = 1.0 - (-1.0 / (tau * sample_rate as f64)).exp();

        Self {
            alpha: alpha as f32,
        }
    }

    /// Smoothing coefficient
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Filter `samples` in place, seeded with the previous block's last output
    ///
    /// Returns the last output sample, to be fed back as `last` for the next
    /// block. An empty block leaves the carry untouched.
    pub fn process(&self, samples: &mut [f32], last: f32) -> f32 {
        let mut prev = last;
        for sample in samples.iter_mut() {
            prev = self.alpha * *sample + (1.0 - self.alpha) * prev;
            *sample = prev;
        }
        prev
    }
}

/// How the DC-block filter treats block boundaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DcBlockMode {
    /// Restart at every block: the first sample passes through unchanged
    #[default]
    PerBuffer,
    /// Carry the last input and output across blocks
    Continuous,
}

/// Carried DC-block state for [`DcBlockMode::Continuous`]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DcBlockCarry {
    pub last_input: f32,
    pub last_output: f32,
}

/// DC-block high-pass filter
///
/// `y[n] = x[n] - x[n-1] + R * y[n-1]`
#[derive(Debug, Clone, Copy)]
pub struct DcBlockFilter {
    pole: f32,
    mode: DcBlockMode,
}

impl DcBlockFilter {
    pub fn new(mode: DcBlockMode) -> Self {
        Self {
            pole: DC_BLOCK_POLE,
            mode,
        }
    }

    /// Filter `samples` in place
    ///
    /// `carry` is only read in continuous mode. The returned carry always
    /// describes the end of this block.
    pub fn process(&self, samples: &mut [f32], carry: DcBlockCarry) -> DcBlockCarry {
        let Some((first, rest)) = samples.split_first_mut() else {
            return carry;
        };

        let input = *first;
        if self.mode == DcBlockMode::Continuous {
            *first = input - carry.last_input + self.pole * carry.last_output;
        }

        let mut last_input = input;
        let mut last_output = *first;
        for sample in rest.iter_mut() {
            let input = *sample;
            last_output = input - last_input + self.pole * last_output;
            last_input = input;
            *sample = last_output;
        }

        DcBlockCarry {
            last_input,
            last_output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deemphasis_alpha() {
        let filter = DeemphasisFilter::new(960_000, 50e-6);
        let expected = 1.0 - (-1.0f64 / 48.0).exp();
        assert!((filter.alpha() as f64 - expected).abs() < 1e-6);

        // Longer time constant smooths harder
        let us = DeemphasisFilter::new(960_000, 75e-6);
        assert!(us.alpha() < filter.alpha());
    }

    #[test]
    fn test_deemphasis_first_sample_uses_carry() {
        let filter = DeemphasisFilter::new(960_000, 50e-6);
        let a = filter.alpha();

        let mut samples = vec![1.0, 0.0];
        let last = filter.process(&mut samples, 0.5);

        assert!((samples[0] - (a + (1.0 - a) * 0.5)).abs() < 1e-6);
        assert!((samples[1] - (1.0 - a) * samples[0]).abs() < 1e-6);
        assert_eq!(last, samples[1]);
    }

    #[test]
    fn test_deemphasis_converges_to_constant() {
        let filter = DeemphasisFilter::new(960_000, 50e-6);
        let mut last = 0.0;

        for _ in 0..10 {
            let mut block = vec![0.8; 1000];
            last = filter.process(&mut block, last);
        }

        assert!((last - 0.8).abs() < 1e-4);
    }

    #[test]
    fn test_deemphasis_empty_block_keeps_carry() {
        let filter = DeemphasisFilter::new(960_000, 75e-6);
        assert_eq!(filter.process(&mut [], 0.25), 0.25);
    }

    #[test]
    fn test_dc_block_converges_to_zero() {
        let filter = DcBlockFilter::new(DcBlockMode::PerBuffer);
        let mut samples = vec![0.6; 2000];
        filter.process(&mut samples, DcBlockCarry::default());

        assert_eq!(samples[0], 0.6);
        assert!(samples[1000].abs() < 1e-4);
        assert!(samples[1999].abs() < 1e-6);
    }

    #[test]
    fn test_dc_block_recurrence() {
        let filter = DcBlockFilter::new(DcBlockMode::PerBuffer);
        let mut samples = vec![1.0, 2.0, 4.0];
        let carry = filter.process(&mut samples, DcBlockCarry::default());

        assert_eq!(samples[0], 1.0);
        assert!((samples[1] - (2.0 - 1.0 + 0.99 * 1.0)).abs() < 1e-6);
        assert!((samples[2] - (4.0 - 2.0 + 0.99 * samples[1])).abs() < 1e-6);
        assert_eq!(carry.last_input, 4.0);
        assert_eq!(carry.last_output, samples[2]);
    }

    #[test]
    fn test_dc_block_per_buffer_ignores_carry() {
        let filter = DcBlockFilter::new(DcBlockMode::PerBuffer);
        let mut samples = vec![0.3, 0.3];
        let carry = DcBlockCarry {
            last_input: 5.0,
            last_output: 5.0,
        };
        filter.process(&mut samples, carry);
        assert_eq!(samples[0], 0.3);
    }

    #[test]
    fn test_dc_block_continuous_matches_single_block() {
        let input: Vec<f32> = (0..400).map(|i| (i as f32 * 0.05).sin() + 0.4).collect();

        let filter = DcBlockFilter::new(DcBlockMode::Continuous);
        let mut whole = input.clone();
        filter.process(&mut whole, DcBlockCarry::default());

        let mut split = input.clone();
        let (a, b) = split.split_at_mut(150);
        let carry = filter.process(a, DcBlockCarry::default());
        filter.process(b, carry);

        for (x, y) in whole.iter().zip(split.iter()) {
            assert!((x - y).abs() < 1e-5);
        }
    }

    #[test]
    fn test_dc_block_modes_agree_on_first_block() {
        let input: Vec<f32> = (0..50).map(|i| i as f32 * 0.01).collect();

        let mut a = input.clone();
        DcBlockFilter::new(DcBlockMode::PerBuffer).process(&mut a, DcBlockCarry::default());
        let mut b = input.clone();
        DcBlockFilter::new(DcBlockMode::Continuous).process(&mut b, DcBlockCarry::default());

        assert_eq!(a, b);
    }
}
