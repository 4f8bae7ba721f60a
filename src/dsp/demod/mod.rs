pub mod fm;

pub use fm::{discriminate, iq_from_bytes};
