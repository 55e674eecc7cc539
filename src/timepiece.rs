//! Top-level coordinator
//!
//! Glues the clock sampler to the chime controller and exposes read-only
//! state for the display layer. Owns no rendering and no input mapping.

use std::time::Duration;

use crate::audio::AudioBackend;
use crate::chime::{AmbienceState, ChimeController, ChimeState};
use crate::clock::{schedule, ClockSampler, SampledTime};
use crate::settings::Settings;

/// The running clock: sampler, chime controller, and the current sample.
pub struct Timepiece {
    sampler: ClockSampler,
    controller: ChimeController,
    current: SampledTime,
}

impl Timepiece {
    pub fn new(backend: Box<dyn AudioBackend>, settings: &Settings) -> Self {
        let mut sampler = ClockSampler::new();
        sampler.start();

        Self {
            sampler,
            controller: ChimeController::new(backend, settings.sound_enabled),
            current: SampledTime::now(),
        }
    }

    /// Advance by one frame: poll the clock, feed any fresh sample to the
    /// chime scheduler, and step the firing timers.
    pub fn update(&mut self, delta: Duration) {
        if let Some(sample) = self.sampler.poll(delta) {
            self.current = sample;
            self.controller.handle_sample(&sample);
        }
        self.controller.update(delta);
    }

    /// First-user-interaction hook: platforms refuse autoplaying audio,
    /// so the ambience loop starts only once the user has pressed a key.
    pub fn notice_interaction(&mut self) {
        self.controller.start_ambience();
    }

    pub fn toggle_sound(&mut self) {
        self.controller.toggle_sound();
    }

    pub fn manual_trigger(&mut self) {
        self.controller.manual_trigger();
    }

    /// Stop the sampling loop. Pending chime timers are left to lapse;
    /// teardown is best-effort by design.
    pub fn shutdown(&mut self) {
        self.sampler.stop();
    }

    pub fn current_time(&self) -> &SampledTime {
        &self.current
    }

    pub fn chime_state(&self) -> ChimeState {
        self.controller.chime_state()
    }

    pub fn ambience_state(&self) -> AmbienceState {
        self.controller.ambience_state()
    }

    pub fn sound_enabled(&self) -> bool {
        self.controller.sound_enabled()
    }

    /// Whether the display should show the "on the hour" hint.
    pub fn is_chime_minute(&self) -> bool {
        schedule::is_chime_minute(&self.current)
    }

    /// Countdown text for the display, e.g. "5h 59m".
    pub fn next_chime_text(&self) -> String {
        schedule::format_until_next(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioError;
    use crate::chime::notes::BellNote;

    struct SilentBackend;

    impl AudioBackend for SilentBackend {
        fn play_chime(&mut self) -> Result<(), AudioError> {
            Ok(())
        }
        fn play_chime_fallback(&mut self, _notes: &[BellNote]) -> Result<(), AudioError> {
            Ok(())
        }
        fn start_ambience(&mut self) -> Result<(), AudioError> {
            Ok(())
        }
        fn pause_ambience(&mut self) {}
        fn resume_ambience(&mut self) {}
        fn rewind_ambience(&mut self) {}
    }

    fn timepiece() -> Timepiece {
        Timepiece::new(Box::new(SilentBackend), &Settings::default())
    }

    #[test]
    fn test_manual_trigger_starts_chiming() {
        let mut tp = timepiece();
        tp.manual_trigger();
        assert_eq!(tp.chime_state(), ChimeState::Chiming);

        tp.update(Duration::from_secs(6));
        assert_eq!(tp.chime_state(), ChimeState::Idle);
    }

    #[test]
    fn test_interaction_starts_ambience() {
        let mut tp = timepiece();
        assert_eq!(tp.ambience_state(), AmbienceState::Stopped);
        tp.notice_interaction();
        assert_eq!(tp.ambience_state(), AmbienceState::Playing);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut tp = timepiece();
        tp.shutdown();
        tp.shutdown();
        // Updates after shutdown still advance chime timers but sample
        // nothing new.
        tp.update(Duration::from_secs(2));
    }

    #[test]
    fn test_next_chime_text_is_formatted() {
        let tp = timepiece();
        let text = tp.next_chime_text();
        assert!(text.ends_with('m'));
        assert!(text.contains("h "));
    }
}
