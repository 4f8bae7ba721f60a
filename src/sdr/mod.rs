pub mod config;
#[cfg(feature = "rtlsdr")]
pub mod device;
pub mod source;
#[cfg(feature = "rtlsdr")]
pub mod thread;

// Re-export commonly used types
#[cfg(feature = "rtlsdr")]
pub use device::{RtlSdrDevice, RtlSdrSource};
pub use source::{CaptureSource, IqReader};
