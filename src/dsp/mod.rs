pub mod demod;
pub mod error;
pub mod filters;
pub mod pipeline;
pub mod quantize;
pub mod resampler;

// Re-export commonly used types
pub use error::DspError;
pub use filters::DcBlockMode;
pub use pipeline::{FilterState, Pipeline};
