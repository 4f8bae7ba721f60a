//! Per-buffer FM demodulation chain
//!
//! raw cu8 bytes → discriminator → de-emphasis → DC-block → decimator →
//! quantizer. Scratch space is allocated once in [`Pipeline::new`]; the only
//! state that crosses buffer boundaries is [`FilterState`], which the caller
//! owns and threads through [`Pipeline::process`].

use super::demod::{discriminate, iq_from_bytes};
use super::filters::{DcBlockCarry, DcBlockFilter, DeemphasisFilter};
use super::quantize::quantize;
use super::resampler::Decimator;
use super::DspError;
use crate::types::DspConfig;
use num_complex::Complex;

/// Filter carries between consecutive buffers
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterState {
    /// Last de-emphasis output of the previous buffer
    pub last_deemphasis: f32,
    /// DC-block carry, only read in continuous mode
    pub dc_block: DcBlockCarry,
}

/// FM demodulation pipeline with preallocated scratch buffers
pub struct Pipeline {
    deemphasis: DeemphasisFilter,
    dc_block: DcBlockFilter,
    decimator: Decimator,
    /// Largest raw buffer accepted, in bytes
    capacity: usize,
    iq: Vec<Complex<f32>>,
    freq: Vec<f32>,
    decimated: Vec<f32>,
    pcm: Vec<i16>,
}

impl Pipeline {
    /// Create a pipeline sized for raw buffers of `config.buffer_size` bytes
    pub fn new(config: &DspConfig) -> Result<Self, DspError> {
        let decimator = Decimator::new(config.sample_rate, config.audio_rate)?;
        validate_buffer_len(config.buffer_size)?;

        let pairs = config.buffer_size / 2;
        let freq_len = pairs - 1;
        let audio_len = decimator.output_len(freq_len);

        let deemphasis = DeemphasisFilter::new(config.sample_rate, config.deemphasis.tau());

        log::debug!(
            "Pipeline: {} byte buffers, {} frequency samples, {} audio samples, decimation {}, de-emphasis alpha {:.5}",
            config.buffer_size,
            freq_len,
            audio_len,
            decimator.factor(),
            deemphasis.alpha()
        );

        Ok(Self {
            deemphasis,
            dc_block: DcBlockFilter::new(config.dc_block),
            decimator,
            capacity: config.buffer_size,
            iq: vec![Complex::new(0.0, 0.0); pairs],
            freq: vec![0.0; freq_len],
            decimated: vec![0.0; audio_len],
            pcm: vec![0; audio_len],
        })
    }

    /// Demodulate one raw I/Q buffer
    ///
    /// Returns the PCM block for this buffer together with the state to pass
    /// to the next call. The block borrows the pipeline's scratch space and is
    /// only valid until the next call.
    pub fn process(
        &mut self,
        raw: &[u8],
        state: FilterState,
    ) -> Result<(&[i16], FilterState), DspError> {
        validate_buffer_len(raw.len())?;
        if raw.len() > self.capacity {
            return Err(DspError::BufferTooLarge {
                len: raw.len(),
                capacity: self.capacity,
            });
        }

        let pairs = iq_from_bytes(raw, &mut self.iq);
        let freq_len = discriminate(&self.iq[..pairs], &mut self.freq);
        let freq = &mut self.freq[..freq_len];

        let last_deemphasis = self.deemphasis.process(freq, state.last_deemphasis);
        let dc_block = self.dc_block.process(freq, state.dc_block);

        let audio_len = self.decimator.process(freq, &mut self.decimated);
        let written = quantize(&self.decimated[..audio_len], &mut self.pcm);

        log::trace!(
            "Processed {} bytes into {} PCM samples (carry {:.5})",
            raw.len(),
            written,
            last_deemphasis
        );

        Ok((
            &self.pcm[..written],
            FilterState {
                last_deemphasis,
                dc_block,
            },
        ))
    }

    /// Audio samples produced by a full-capacity buffer
    pub fn block_len(&self) -> usize {
        self.pcm.len()
    }

    pub fn decimation(&self) -> usize {
        self.decimator.factor()
    }
}

fn validate_buffer_len(len: usize) -> Result<(), DspError> {
    if len % 2 != 0 {
        return Err(DspError::OddBufferLength(len));
    }
    if len < 4 {
        return Err(DspError::BufferTooShort(len));
    }
    Ok(())
}
