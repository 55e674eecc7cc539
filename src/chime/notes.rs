//! The synthesized fallback chime
//!
//! A fixed four-note Westminster-quarter phrase used when the recorded
//! chime asset cannot be played. Deterministic and parameter-free: the
//! same four notes, offsets, and envelope every time.

/// One note of the fallback sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BellNote {
    /// Fundamental frequency in Hz.
    pub frequency: f32,
    /// Onset relative to the start of the sequence, in seconds.
    pub offset: f32,
}

/// Gap between successive note onsets, in seconds.
pub const NOTE_SPACING: f32 = 0.8;

/// Total audible span of a single note, in seconds.
pub const NOTE_SPAN: f32 = 2.0;

/// Attack time before a note reaches peak amplitude, in seconds.
pub const NOTE_ATTACK: f32 = 0.1;

/// Peak amplitude of a note's envelope.
pub const NOTE_PEAK: f32 = 0.3;

/// Amplitude the decay tail ends at (effectively silence).
pub const NOTE_FLOOR: f32 = 0.001;

/// The Westminster quarter phrase: E5, C5, D5, G4.
pub const WESTMINSTER_QUARTER: [BellNote; 4] = [
    BellNote {
        frequency: 659.25,
        offset: 0.0,
    },
    BellNote {
        frequency: 523.25,
        offset: NOTE_SPACING,
    },
    BellNote {
        frequency: 587.33,
        offset: 2.0 * NOTE_SPACING,
    },
    BellNote {
        frequency: 392.00,
        offset: 3.0 * NOTE_SPACING,
    },
];

/// Duration of the whole sequence from first onset to last decay, in
/// seconds.
pub fn sequence_span() -> f32 {
    WESTMINSTER_QUARTER
        .last()
        .map(|n| n.offset + NOTE_SPAN)
        .unwrap_or(0.0)
}

/// Envelope amplitude for a note at `t` seconds past its onset: a short
/// ramp up to peak, then an exponential decay to the floor.
pub fn envelope(t: f32) -> f32 {
    if t < 0.0 || t >= NOTE_SPAN {
        0.0
    } else if t < NOTE_ATTACK {
        NOTE_PEAK * (t / NOTE_ATTACK)
    } else {
        let progress = (t - NOTE_ATTACK) / (NOTE_SPAN - NOTE_ATTACK);
        NOTE_PEAK * (NOTE_FLOOR / NOTE_PEAK).powf(progress)
    }
}
