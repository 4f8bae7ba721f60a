pub mod config;

// Re-export commonly used types
pub use config::{Deemphasis, DspConfig, ReceiverConfig, SdrConfig};
