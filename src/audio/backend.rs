//! Audio backend abstraction
//!
//! The chime controller talks to audio through this trait, so playback can
//! be mocked in tests and the real output library stays an implementation
//! detail.

use thiserror::Error;

use crate::chime::notes::BellNote;

/// Non-fatal audio failures. Every variant has a defined fallback; none is
/// ever surfaced to the user beyond a log line.
#[derive(Debug, Error)]
pub enum AudioError {
    /// A named audio asset could not be fetched or decoded.
    #[error("audio asset unavailable: {0}")]
    AssetLoad(String),

    /// The platform or device refused playback.
    #[error("playback rejected: {0}")]
    PlaybackRejected(String),

    /// No tone-generation capability is present, so the synthesized
    /// fallback cannot run either.
    #[error("tone synthesis unavailable")]
    SynthesisUnavailable,
}

/// Capability surface the chime controller needs from an audio output.
pub trait AudioBackend {
    /// Play the pre-recorded chime asset once, fire-and-forget.
    fn play_chime(&mut self) -> Result<(), AudioError>;

    /// Play the synthesized fallback sequence. Each note starts at its
    /// own offset relative to the call.
    fn play_chime_fallback(&mut self, notes: &[BellNote]) -> Result<(), AudioError>;

    /// Load and start the looping ambience track at its nominal volume.
    fn start_ambience(&mut self) -> Result<(), AudioError>;

    /// Pause the ambience track, keeping it loaded.
    fn pause_ambience(&mut self);

    /// Resume a paused ambience track at its nominal volume.
    fn resume_ambience(&mut self);

    /// Rewind the ambience track to position zero.
    fn rewind_ambience(&mut self);
}
