use super::source::{CaptureError, CaptureSource};
use super::thread::start_sdr_thread;
use crate::types::SdrConfig;
use anyhow::{anyhow, Result};
use crossbeam::channel::Receiver;
use rtlsdr_mt::{Controller, Reader};
use std::thread;

/// Wrapper around RTL-SDR device for easier management
pub struct RtlSdrDevice {
    controller: Controller,
    reader: Reader,
    sample_rate: u32,
    center_freq: u32,
}

impl RtlSdrDevice {
    /// Open the RTL-SDR device by index
    pub fn open(device_index: usize) -> Result<Self> {
        log::info!("Opening RTL-SDR device {}", device_index);

        let (controller, reader) = rtlsdr_mt::open(device_index as u32)
            .map_err(|e| anyhow!("Failed to open RTL-SDR device {}: {:?}", device_index, e))?;

        log::info!("RTL-SDR device opened successfully");

        Ok(Self {
            controller,
            reader,
            sample_rate: 0,
            center_freq: 0,
        })
    }

    /// Open and configure a device for FM capture
    pub fn configure(config: &SdrConfig, sample_rate: u32) -> Result<Self> {
        let mut device = Self::open(config.device_index)?;
        device.set_center_freq(config.frequency)?;
        device.set_sample_rate(sample_rate)?;
        device.set_tuner_gain(config.tuner_gain)?;
        device.set_ppm(config.ppm_error)?;

        log::info!(
            "RTL-SDR configured: {} Hz, {} S/s",
            device.center_freq,
            device.sample_rate
        );
        Ok(device)
    }

    /// Set the center frequency in Hz
    pub fn set_center_freq(&mut self, freq: u32) -> Result<()> {
        super::config::validate_frequency(freq)?;

        self.controller
            .set_center_freq(freq)
            .map_err(|_| anyhow!("Failed to set center frequency to {} Hz", freq))?;

        self.center_freq = freq;
        log::info!(
            "Set center frequency to {} Hz ({:.3} MHz)",
            freq,
            freq as f64 / 1_000_000.0
        );

        Ok(())
    }

    /// Set the sample rate in Hz
    pub fn set_sample_rate(&mut self, rate: u32) -> Result<()> {
        super::config::validate_sample_rate(rate)?;

        self.controller
            .set_sample_rate(rate)
            .map_err(|_| anyhow!("Failed to set sample rate to {} Hz", rate))?;

        self.sample_rate = rate;
        log::info!("Set sample rate to {} Hz ({} kHz)", rate, rate / 1000);

        Ok(())
    }

    /// Set tuner gain in tenths of dB (e.g., 421 = 42.1 dB)
    /// Use -1 for automatic gain
    pub fn set_tuner_gain(&mut self, gain: i32) -> Result<()> {
        if gain == -1 {
            self.controller
                .enable_agc()
                .map_err(|_| anyhow!("Failed to enable automatic gain"))?;
            log::info!("Enabled automatic gain control");
        } else {
            self.controller
                .disable_agc()
                .map_err(|_| anyhow!("Failed to disable automatic gain"))?;
            self.controller
                .set_tuner_gain(gain)
                .map_err(|_| anyhow!("Failed to set tuner gain to {} ({}dB)", gain, gain / 10))?;
            log::info!("Set tuner gain to {} ({}.{} dB)", gain, gain / 10, gain % 10);
        }

        Ok(())
    }

    /// Set PPM (parts per million) frequency correction
    pub fn set_ppm(&mut self, ppm: i32) -> Result<()> {
        if ppm == 0 {
            return Ok(());
        }

        self.controller
            .set_ppm(ppm)
            .map_err(|_| anyhow!("Failed to set PPM correction to {}", ppm))?;
        log::info!("Set PPM correction to {}", ppm);

        Ok(())
    }

    /// Start streaming and turn the device into a blocking capture source
    ///
    /// `buffer_size` must be a multiple of 512 bytes.
    pub fn into_source(self, buffer_size: usize) -> Result<RtlSdrSource> {
        let (handle, samples_rx) = start_sdr_thread(self.reader, buffer_size)?;

        Ok(RtlSdrSource {
            controller: self.controller,
            samples_rx: Some(samples_rx),
            handle: Some(handle),
            center_freq: self.center_freq,
        })
    }
}

/// Blocking view over the device's asynchronous sample stream
pub struct RtlSdrSource {
    controller: Controller,
    samples_rx: Option<Receiver<Vec<u8>>>,
    handle: Option<thread::JoinHandle<()>>,
    center_freq: u32,
}

impl CaptureSource for RtlSdrSource {
    fn read_buffer(&mut self, buf: &mut [u8]) -> Result<Option<usize>, CaptureError> {
        let rx = self.samples_rx.as_ref().ok_or(CaptureError::Disconnected)?;
        let bytes = rx.recv().map_err(|_| CaptureError::Disconnected)?;

        if bytes.len() != buf.len() {
            return Err(CaptureError::Device(format!(
                "expected {} byte buffer, device delivered {}",
                buf.len(),
                bytes.len()
            )));
        }

        buf.copy_from_slice(&bytes);
        Ok(Some(bytes.len()))
    }

    fn describe(&self) -> String {
        format!("RTL-SDR @ {:.3} MHz", self.center_freq as f64 / 1_000_000.0)
    }
}

impl Drop for RtlSdrSource {
    fn drop(&mut self) {
        // Unblock the callback before cancelling so read_async can return
        self.samples_rx.take();
        self.controller.cancel_async_read();

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("SDR acquisition thread panicked");
            }
        }
        log::info!("RTL-SDR capture stopped");
    }
}
