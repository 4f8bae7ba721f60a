//! Mono 16-bit PCM WAV recorder
//!
//! The header is written up front with zero sizes and patched in
//! [`WavRecorder::finish`] once the amount of audio is known.

use super::AudioSink;
use anyhow::{Context, Result};
use byteorder::{LittleEndian, WriteBytesExt};
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

/// Size of the canonical RIFF/WAVE header
pub const HEADER_LEN: u64 = 44;

const CHANNELS: u16 = 1;
const BITS_PER_SAMPLE: u16 = 16;
const FORMAT_PCM: u16 = 1;

/// Streaming WAV writer for mono s16le audio
pub struct WavRecorder<W: Write + Seek> {
    writer: W,
    sample_rate: u32,
    data_bytes: u64,
    finished: bool,
}

impl WavRecorder<BufWriter<File>> {
    /// Create (or truncate) a WAV file at `path`
    pub fn create<P: AsRef<Path>>(path: P, sample_rate: u32) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        log::info!("Recording audio to {}", path.display());
        Self::new(BufWriter::new(file), sample_rate)
    }
}

impl<W: Write + Seek> WavRecorder<W> {
    /// Wrap a seekable writer and emit the placeholder header
    pub fn new(mut writer: W, sample_rate: u32) -> Result<Self> {
        write_header(&mut writer, sample_rate, 0)?;

        Ok(Self {
            writer,
            sample_rate,
            data_bytes: 0,
            finished: false,
        })
    }

    /// Audio payload written so far, in bytes
    pub fn data_bytes(&self) -> u64 {
        self.data_bytes
    }

    /// Recover the underlying writer
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Seek> AudioSink for WavRecorder<W> {
    fn write_pcm(&mut self, samples: &[i16]) -> Result<()> {
        if self.finished {
            anyhow::bail!("WAV recorder already finalized");
        }

        for &sample in samples {
            self.writer.write_i16::<LittleEndian>(sample)?;
        }
        self.data_bytes += samples.len() as u64 * 2;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }

        let data_bytes = u32::try_from(self.data_bytes)
            .ok()
            .filter(|&n| n <= u32::MAX - 36)
            .with_context(|| {
                format!("{} bytes of audio exceed the WAV size limit", self.data_bytes)
            })?;

        self.writer.seek(SeekFrom::Start(0))?;
        write_header(&mut self.writer, self.sample_rate, data_bytes)?;
        self.writer.seek(SeekFrom::End(0))?;
        self.writer.flush()?;
        self.finished = true;

        log::debug!(
            "WAV header finalized: {} data bytes at {} Hz ({} bytes total)",
            self.data_bytes(),
            self.sample_rate,
            HEADER_LEN + self.data_bytes
        );
        Ok(())
    }
}

/// Write the 44-byte RIFF header for mono 16-bit PCM
fn write_header<W: Write>(writer: &mut W, sample_rate: u32, data_bytes: u32) -> Result<()> {
    let block_align = CHANNELS * BITS_PER_SAMPLE / 8;
    let byte_rate = sample_rate * block_align as u32;

    // RIFF chunk descriptor
    writer.write_all(b"RIFF")?;
    writer.write_u32::<LittleEndian>(36 + data_bytes)?;
    writer.write_all(b"WAVE")?;

    // fmt sub-chunk
    writer.write_all(b"fmt ")?;
    writer.write_u32::<LittleEndian>(16)?;
    writer.write_u16::<LittleEndian>(FORMAT_PCM)?;
    writer.write_u16::<LittleEndian>(CHANNELS)?;
    writer.write_u32::<LittleEndian>(sample_rate)?;
    writer.write_u32::<LittleEndian>(byte_rate)?;
    writer.write_u16::<LittleEndian>(block_align)?;
    writer.write_u16::<LittleEndian>(BITS_PER_SAMPLE)?;

    // data sub-chunk
    writer.write_all(b"data")?;
    writer.write_u32::<LittleEndian>(data_bytes)?;

    Ok(())
}
