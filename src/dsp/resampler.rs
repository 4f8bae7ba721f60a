use super::DspError;

/// Integer-ratio decimator
///
/// Keeps every `factor`-th sample, starting from the first one of each block.
/// No anti-alias filtering is applied; the de-emphasis filter already rolls
/// off most of the content above the audio band.
#[derive(Debug, Clone, Copy)]
pub struct Decimator {
    /// Decimation factor (input / output)
    factor: usize,
}

impl Decimator {
    /// Create a new decimator
    ///
    /// Fails unless `input_rate` is an exact positive multiple of `output_rate`.
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self, DspError> {
        let invalid = DspError::InvalidDecimation {
            capture_rate: input_rate,
            audio_rate: output_rate,
        };

        if input_rate == 0 || output_rate == 0 || input_rate % output_rate != 0 {
            return Err(invalid);
        }

        Ok(Self {
            factor: (input_rate / output_rate) as usize,
        })
    }

    /// Number of output samples produced for `input_len` input samples
    pub fn output_len(&self, input_len: usize) -> usize {
        input_len / self.factor
    }

    /// Decimate `input` into `output`, returning the number of samples written
    ///
    /// The trailing `input.len() % factor` samples are dropped.
    pub fn process(&self, input: &[f32], output: &mut [f32]) -> usize {
        let mut count = 0;
        for (sample, slot) in input
            .iter()
            .step_by(self.factor)
            .take(self.output_len(input.len()))
            .zip(output.iter_mut())
        {
            *slot = *sample;
            count += 1;
        }
        count
    }

    /// Get the decimation factor
    pub fn factor(&self) -> usize {
        self.factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimator_picks_every_nth() {
        let decimator = Decimator::new(960_000, 48_000).unwrap();
        assert_eq!(decimator.factor(), 20);

        let input: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let mut output = vec![0.0; 10];
        let n = decimator.process(&input, &mut output);

        assert_eq!(n, 5);
        assert_eq!(&output[..n], &[0.0, 20.0, 40.0, 60.0, 80.0]);
    }

    #[test]
    fn test_decimator_drops_remainder() {
        let decimator = Decimator::new(960_000, 48_000).unwrap();
        let input: Vec<f32> = (0..119).map(|i| i as f32).collect();
        let mut output = vec![0.0; 10];

        assert_eq!(decimator.output_len(119), 5);
        assert_eq!(decimator.process(&input, &mut output), 5);
        assert_eq!(output[4], 80.0);
        assert_eq!(decimator.process(&input[..19], &mut output), 0);
    }

    #[test]
    fn test_decimator_rejects_fractional_ratio() {
        assert!(Decimator::new(1_024_000, 48_000).is_err());
        assert!(Decimator::new(960_000, 0).is_err());
        assert!(Decimator::new(0, 48_000).is_err());
        assert!(Decimator::new(48_000, 48_000).is_ok());
    }

    #[test]
    fn test_decimator_factor() {
        assert_eq!(Decimator::new(2_400_000, 48_000).unwrap().factor(), 50);
        assert_eq!(Decimator::new(1_200_000, 24_000).unwrap().factor(), 50);
        assert_eq!(Decimator::new(48_000, 48_000).unwrap().factor(), 1);
    }
}
