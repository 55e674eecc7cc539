//! The Count's Timepiece - an ornate terminal clock
//!
//! Displays the current time, chimes at six, noon, and midnight with a
//! recorded bell (or a synthesized Westminster phrase when the recording
//! is unavailable), and keeps a low fireside ambience looping between
//! chimes.

pub mod audio;
pub mod chime;
pub mod clock;
pub mod settings;
pub mod timepiece;
pub mod ui;

// Re-export commonly used types
pub use chime::{AmbienceState, ChimeController, ChimePlayback, ChimeState};
pub use clock::{ClockSampler, SampledTime};
pub use timepiece::Timepiece;
