use super::config::constraints;
use anyhow::Result;
use crossbeam::channel::{Receiver, Sender};
use rtlsdr_mt::Reader;
use std::thread;

/// Number of USB transfer buffers handed to librtlsdr
const ASYNC_BUFFERS: u32 = 16;

/// Raw buffers queued between the acquisition thread and the pipeline
const QUEUE_DEPTH: usize = 64;

/// Start the SDR acquisition thread
///
/// librtlsdr only offers a callback based reader, so it runs on its own
/// thread and each delivered buffer is copied into a bounded channel. The
/// thread ends once the device read is cancelled.
pub fn start_sdr_thread(
    mut reader: Reader,
    buffer_size: usize,
) -> Result<(thread::JoinHandle<()>, Receiver<Vec<u8>>)> {
    if buffer_size == 0 || buffer_size % constraints::BUFFER_ALIGNMENT != 0 {
        anyhow::bail!(
            "RTL-SDR buffer size {} must be a non-zero multiple of {}",
            buffer_size,
            constraints::BUFFER_ALIGNMENT
        );
    }
    let len = u32::try_from(buffer_size)?;

    let (samples_tx, samples_rx): (Sender<Vec<u8>>, Receiver<Vec<u8>>) =
        crossbeam::channel::bounded(QUEUE_DEPTH);

    let handle = thread::spawn(move || {
        log::info!("SDR acquisition thread started");

        let result = reader.read_async(ASYNC_BUFFERS, len, |bytes| {
            // Blocks when the pipeline falls behind; fails once the source is dropped
            if samples_tx.send(bytes.to_vec()).is_err() {
                log::trace!("Sample receiver gone, discarding {} bytes", bytes.len());
            }
        });

        if let Err(e) = result {
            log::error!("SDR read_async error: {:?}", e);
        }

        log::info!("SDR acquisition thread stopped");
    });

    Ok((handle, samples_rx))
}
