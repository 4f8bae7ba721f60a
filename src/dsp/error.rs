use thiserror::Error;

/// Precondition failures raised by the demodulation pipeline
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DspError {
    /// Raw I/Q buffers interleave one I and one Q byte, so the length must be even
    #[error("raw I/Q buffer has odd length {0}")]
    OddBufferLength(usize),

    /// At least two I/Q pairs are needed to produce one frequency sample
    #[error("raw I/Q buffer of {0} bytes is too short, need at least 4")]
    BufferTooShort(usize),

    /// The pipeline scratch space is sized once at construction
    #[error("raw I/Q buffer of {len} bytes exceeds pipeline capacity of {capacity} bytes")]
    BufferTooLarge { len: usize, capacity: usize },

    /// Capture rate must be an exact positive multiple of the audio rate
    #[error("capture rate {capture_rate} Hz is not an integer multiple of audio rate {audio_rate} Hz")]
    InvalidDecimation { capture_rate: u32, audio_rate: u32 },
}
