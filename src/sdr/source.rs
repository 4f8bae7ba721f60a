use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use thiserror::Error;

/// Fatal capture failures
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to read I/Q samples: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "rtlsdr")]
    #[error("device error: {0}")]
    Device(String),

    #[cfg(feature = "rtlsdr")]
    #[error("device sample stream closed unexpectedly")]
    Disconnected,
}

/// Source of raw interleaved cu8 I/Q buffers
pub trait CaptureSource {
    /// Fill `buf` with the next raw buffer
    ///
    /// Returns the number of bytes read, or `None` once the source is
    /// exhausted. Any error is fatal for the capture.
    fn read_buffer(&mut self, buf: &mut [u8]) -> Result<Option<usize>, CaptureError>;

    /// Short human readable description for logging
    fn describe(&self) -> String;
}

impl<S: CaptureSource + ?Sized> CaptureSource for Box<S> {
    fn read_buffer(&mut self, buf: &mut [u8]) -> Result<Option<usize>, CaptureError> {
        (**self).read_buffer(buf)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// cu8 samples from any byte stream (file, stdin, pipe)
pub struct IqReader<R: Read> {
    reader: R,
    name: String,
    bytes_read: u64,
}

impl IqReader<BufReader<File>> {
    /// Open a raw cu8 recording, e.g. one written by `rtl_sdr`
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        log::info!("Reading I/Q samples from {}", path.display());
        Ok(Self::new(BufReader::new(file), path.display().to_string()))
    }
}

impl IqReader<std::io::StdinLock<'static>> {
    /// Read cu8 samples piped on standard input
    pub fn stdin() -> Self {
        log::info!("Reading I/Q samples from stdin");
        Self::new(std::io::stdin().lock(), String::from("stdin"))
    }
}

impl<R: Read> IqReader<R> {
    pub fn new(reader: R, name: String) -> Self {
        Self {
            reader,
            name,
            bytes_read: 0,
        }
    }
}

impl<R: Read> CaptureSource for IqReader<R> {
    fn read_buffer(&mut self, buf: &mut [u8]) -> Result<Option<usize>, CaptureError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if filled < buf.len() {
            // A partial buffer is dropped rather than padded
            if filled > 0 {
                log::warn!(
                    "Dropping trailing partial buffer of {} bytes from {}",
                    filled,
                    self.name
                );
            }
            log::debug!("End of {} after {} bytes", self.name, self.bytes_read);
            return Ok(None);
        }

        self.bytes_read += filled as u64;
        Ok(Some(filled))
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(ErrorKind::BrokenPipe, "unplugged"))
        }
    }

    #[test]
    fn test_reads_whole_buffers() {
        let data: Vec<u8> = (0..=255).collect();
        let mut source = IqReader::new(Cursor::new(data), String::from("memory"));
        let mut buf = [0u8; 100];

        assert_eq!(source.read_buffer(&mut buf).unwrap(), Some(100));
        assert_eq!(buf[0], 0);
        assert_eq!(source.read_buffer(&mut buf).unwrap(), Some(100));
        assert_eq!(buf[0], 100);

        // 56 bytes left: dropped
        assert_eq!(source.read_buffer(&mut buf).unwrap(), None);
        assert_eq!(source.bytes_read, 200);
    }

    #[test]
    fn test_empty_source() {
        let mut source = IqReader::new(Cursor::new(Vec::new()), String::from("empty"));
        let mut buf = [0u8; 16];
        assert_eq!(source.read_buffer(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_read_error_is_reported() {
        let mut source = IqReader::new(FailingReader, String::from("broken"));
        let mut buf = [0u8; 16];
        let err = source.read_buffer(&mut buf).unwrap_err();
        assert!(matches!(err, CaptureError::Io(_)));
        assert_eq!(source.describe(), "broken");
    }

    #[test]
    fn test_boxed_source() {
        let mut source: Box<dyn CaptureSource> =
            Box::new(IqReader::new(Cursor::new(vec![1u8; 8]), String::from("boxed")));
        let mut buf = [0u8; 4];
        assert_eq!(source.read_buffer(&mut buf).unwrap(), Some(4));
        assert_eq!(source.describe(), "boxed");
    }
}
