use super::AudioSink;
use anyhow::Result;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::{BufWriter, Write};

/// Headerless s16le PCM output, e.g. for `aplay -r 48000 -f S16_LE -c 1`
pub struct RawPcmWriter<W: Write> {
    writer: BufWriter<W>,
    samples: u64,
}

impl RawPcmWriter<std::io::Stdout> {
    pub fn stdout() -> Self {
        log::info!("Writing raw s16le PCM to stdout");
        Self::new(std::io::stdout())
    }
}

impl<W: Write> RawPcmWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            samples: 0,
        }
    }

    pub fn samples_written(&self) -> u64 {
        self.samples
    }

    #[cfg(test)]
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush PCM output: {}", e.error()))
    }
}

impl<W: Write> AudioSink for RawPcmWriter<W> {
    fn write_pcm(&mut self, samples: &[i16]) -> Result<()> {
        for &sample in samples {
            self.writer.write_i16::<LittleEndian>(sample)?;
        }
        self.samples += samples.len() as u64;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        log::debug!("Wrote {} raw PCM samples", self.samples_written());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_pcm_is_little_endian() {
        let mut writer = RawPcmWriter::new(Vec::new());
        writer.write_pcm(&[0x0102, -2]).unwrap();
        writer.finish().unwrap();
        assert_eq!(writer.samples_written(), 2);

        let bytes = writer.into_inner().unwrap();
        assert_eq!(bytes, vec![0x02, 0x01, 0xfe, 0xff]);
    }
}
