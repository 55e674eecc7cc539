//! Chime module - firing state machine and the synthesized fallback phrase

mod controller;
pub mod notes;

pub use controller::{
    AmbienceState, ChimeController, ChimePlayback, ChimeState, AMBIENCE_RESUME_DELAY,
    CHIME_DURATION,
};
