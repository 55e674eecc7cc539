//! Clock module - wall-clock sampling and chime scheduling

mod sampler;
pub mod schedule;

pub use sampler::{ClockSampler, SampledTime};
pub use schedule::ChimeKey;
