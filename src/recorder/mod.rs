pub mod raw;
pub mod wav;

// Re-export commonly used types
pub use raw::RawPcmWriter;
pub use wav::WavRecorder;

use anyhow::Result;

/// Destination for demodulated 16-bit PCM blocks
pub trait AudioSink {
    /// Append one block of mono samples
    fn write_pcm(&mut self, samples: &[i16]) -> Result<()>;

    /// Flush and finalize the output; no further writes are accepted
    fn finish(&mut self) -> Result<()>;
}

impl<S: AudioSink + ?Sized> AudioSink for Box<S> {
    fn write_pcm(&mut self, samples: &[i16]) -> Result<()> {
        (**self).write_pcm(samples)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}
