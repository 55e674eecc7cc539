//! Chime state machine
//!
//! Owns every piece of mutable chime state: the dedup key for automatic
//! firings, the chime/ambience state enums, the sound toggle, and the two
//! countdown timers that sequence a firing. Timers are advanced by
//! `update(delta)` from the main loop, so tests can step time explicitly.

use std::time::Duration;

use crate::audio::AudioBackend;
use crate::clock::{schedule, ChimeKey, SampledTime};

use super::notes::WESTMINSTER_QUARTER;

/// How long the clock stays in the Chiming state, wall-clock.
pub const CHIME_DURATION: Duration = Duration::from_secs(6);

/// Pause between the end of a chime and the ambience track resuming.
pub const AMBIENCE_RESUME_DELAY: Duration = Duration::from_millis(1200);

/// Whether the clock is currently chiming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChimeState {
    Idle,
    Chiming,
}

/// State of the looping ambience track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmbienceState {
    /// Not playing: never started, load failed, or sound is off.
    Stopped,
    /// Looping at nominal volume.
    Playing,
    /// Paused and rewound while a chime plays; resumes afterward.
    SuspendedForChime,
}

/// How a firing actually produced sound. Both failure paths are explicit
/// so the outcome can be logged and asserted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChimePlayback {
    /// The pre-recorded asset played.
    Recorded,
    /// The asset failed; the synthesized phrase played instead.
    Synthesized,
    /// Sound was off, or both attempts failed. Visual chime only.
    Silent,
}

/// Drives chime firings and coordinates the ambience track.
pub struct ChimeController {
    backend: Box<dyn AudioBackend>,
    sound_enabled: bool,
    chime_state: ChimeState,
    ambience_state: AmbienceState,
    /// Key of the most recent automatic firing
    last_fired: Option<ChimeKey>,
    /// Counts down the Chiming window
    chime_timer: Option<Duration>,
    /// Counts down from chime end to ambience resume
    resume_timer: Option<Duration>,
    /// Whether the ambience track has been started this session
    ambience_started: bool,
    /// A failed ambience load is permanent for the session
    ambience_failed: bool,
    /// Outcome of the most recent firing
    last_playback: ChimePlayback,
}

impl ChimeController {
    pub fn new(backend: Box<dyn AudioBackend>, sound_enabled: bool) -> Self {
        Self {
            backend,
            sound_enabled,
            chime_state: ChimeState::Idle,
            ambience_state: AmbienceState::Stopped,
            last_fired: None,
            chime_timer: None,
            resume_timer: None,
            ambience_started: false,
            ambience_failed: false,
            last_playback: ChimePlayback::Silent,
        }
    }

    /// Feed one clock sample; fires the chime when the sample sits on a
    /// not-yet-fired trigger instant.
    pub fn handle_sample(&mut self, sample: &SampledTime) {
        if let Some(key) = schedule::evaluate(sample, self.last_fired.as_ref()) {
            log::info!(
                "Chime trigger at {:02}:{:02}:{:02}",
                sample.hour(),
                sample.minute(),
                sample.second()
            );
            self.last_fired = Some(key);
            self.fire();
        }
    }

    /// User-invoked test chime. Bypasses the dedup key entirely; always
    /// plays. Triggered during an active chime, it restarts the window.
    pub fn manual_trigger(&mut self) {
        log::info!("Manual chime trigger");
        self.fire();
    }

    fn fire(&mut self) {
        self.chime_state = ChimeState::Chiming;
        self.chime_timer = Some(CHIME_DURATION);
        self.resume_timer = None;

        // Ambience must be out of the way before any chime audio starts.
        if self.ambience_state == AmbienceState::Playing {
            self.backend.pause_ambience();
            self.backend.rewind_ambience();
            self.ambience_state = AmbienceState::SuspendedForChime;
        }

        self.last_playback = if self.sound_enabled {
            self.attempt_playback()
        } else {
            ChimePlayback::Silent
        };
    }

    /// Two-stage playback: recorded asset first, synthesized phrase on
    /// failure, silence if both fail. Never escalates past a log line.
    fn attempt_playback(&mut self) -> ChimePlayback {
        match self.backend.play_chime() {
            Ok(()) => ChimePlayback::Recorded,
            Err(e) => {
                log::warn!("Chime asset playback failed ({}), falling back to synthesis", e);
                match self.backend.play_chime_fallback(&WESTMINSTER_QUARTER) {
                    Ok(()) => ChimePlayback::Synthesized,
                    Err(e) => {
                        log::warn!("Synthesized chime failed ({}), chiming silently", e);
                        ChimePlayback::Silent
                    }
                }
            }
        }
    }

    /// Advance the firing sequence. A large `delta` can cross both the
    /// chime end and the resume delay in a single call.
    pub fn update(&mut self, delta: Duration) {
        let mut remaining = delta;

        if let Some(timer) = self.chime_timer {
            if timer > remaining {
                self.chime_timer = Some(timer - remaining);
                return;
            }
            remaining -= timer;
            self.chime_timer = None;
            self.chime_state = ChimeState::Idle;
            if self.ambience_state == AmbienceState::SuspendedForChime {
                self.resume_timer = Some(AMBIENCE_RESUME_DELAY);
            }
        }

        if let Some(timer) = self.resume_timer {
            if timer > remaining {
                self.resume_timer = Some(timer - remaining);
                return;
            }
            self.resume_timer = None;
            if self.sound_enabled && self.ambience_state == AmbienceState::SuspendedForChime {
                self.backend.resume_ambience();
                self.ambience_state = AmbienceState::Playing;
            }
        }
    }

    /// Start the ambience loop. Gated on prior user interaction by the
    /// caller; a load failure is logged once and permanent for the
    /// session.
    pub fn start_ambience(&mut self) {
        if self.ambience_started
            || self.ambience_failed
            || !self.sound_enabled
            || self.chime_state == ChimeState::Chiming
        {
            return;
        }

        match self.backend.start_ambience() {
            Ok(()) => {
                self.ambience_started = true;
                self.ambience_state = AmbienceState::Playing;
            }
            Err(e) => {
                log::warn!("Ambience unavailable for this session: {}", e);
                self.ambience_failed = true;
            }
        }
    }

    /// Turn sound on or off. Off silences ambience immediately and
    /// suppresses chime audio (visual chiming still runs); on restarts
    /// ambience unless a chime is in progress.
    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;

        if !enabled {
            if self.ambience_state != AmbienceState::Stopped {
                self.backend.pause_ambience();
                self.backend.rewind_ambience();
                self.ambience_state = AmbienceState::Stopped;
            }
            self.resume_timer = None;
        } else if self.chime_state == ChimeState::Idle
            && self.ambience_started
            && !self.ambience_failed
        {
            self.backend.resume_ambience();
            self.ambience_state = AmbienceState::Playing;
        }
    }

    pub fn toggle_sound(&mut self) {
        self.set_sound_enabled(!self.sound_enabled);
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn chime_state(&self) -> ChimeState {
        self.chime_state
    }

    pub fn ambience_state(&self) -> AmbienceState {
        self.ambience_state
    }

    pub fn last_playback(&self) -> ChimePlayback {
        self.last_playback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioError;
    use crate::chime::notes::BellNote;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        PlayChime,
        Fallback(Vec<BellNote>),
        StartAmbience,
        Pause,
        Resume,
        Rewind,
    }

    #[derive(Default)]
    struct MockState {
        calls: Vec<Call>,
        fail_chime: bool,
        fail_fallback: bool,
        fail_ambience: bool,
    }

    struct MockBackend(Rc<RefCell<MockState>>);

    impl AudioBackend for MockBackend {
        fn play_chime(&mut self) -> Result<(), AudioError> {
            let mut s = self.0.borrow_mut();
            s.calls.push(Call::PlayChime);
            if s.fail_chime {
                Err(AudioError::AssetLoad("missing".into()))
            } else {
                Ok(())
            }
        }

        fn play_chime_fallback(&mut self, notes: &[BellNote]) -> Result<(), AudioError> {
            let mut s = self.0.borrow_mut();
            s.calls.push(Call::Fallback(notes.to_vec()));
            if s.fail_fallback {
                Err(AudioError::SynthesisUnavailable)
            } else {
                Ok(())
            }
        }

        fn start_ambience(&mut self) -> Result<(), AudioError> {
            let mut s = self.0.borrow_mut();
            s.calls.push(Call::StartAmbience);
            if s.fail_ambience {
                Err(AudioError::AssetLoad("missing".into()))
            } else {
                Ok(())
            }
        }

        fn pause_ambience(&mut self) {
            self.0.borrow_mut().calls.push(Call::Pause);
        }

        fn resume_ambience(&mut self) {
            self.0.borrow_mut().calls.push(Call::Resume);
        }

        fn rewind_ambience(&mut self) {
            self.0.borrow_mut().calls.push(Call::Rewind);
        }
    }

    fn controller(sound_enabled: bool) -> (ChimeController, Rc<RefCell<MockState>>) {
        let state = Rc::new(RefCell::new(MockState::default()));
        let backend = MockBackend(Rc::clone(&state));
        (ChimeController::new(Box::new(backend), sound_enabled), state)
    }

    fn at(hour: u32, minute: u32, second: u32) -> SampledTime {
        SampledTime::from_ymd_hms(2024, 3, 15, hour, minute, second).unwrap()
    }

    #[test]
    fn test_automatic_fire_plays_recorded_chime() {
        let (mut ctrl, state) = controller(true);
        ctrl.handle_sample(&at(6, 0, 0));

        assert_eq!(ctrl.chime_state(), ChimeState::Chiming);
        assert_eq!(ctrl.last_playback(), ChimePlayback::Recorded);
        assert_eq!(state.borrow().calls, vec![Call::PlayChime]);
    }

    #[test]
    fn test_automatic_fire_dedups_same_instant() {
        let (mut ctrl, state) = controller(true);
        let sample = at(12, 0, 0);
        ctrl.handle_sample(&sample);
        ctrl.handle_sample(&sample);

        assert_eq!(state.borrow().calls.len(), 1);
    }

    #[test]
    fn test_next_day_fires_again() {
        let (mut ctrl, state) = controller(true);
        let today = SampledTime::from_ymd_hms(2024, 3, 15, 6, 0, 0).unwrap();
        let tomorrow = SampledTime::from_ymd_hms(2024, 3, 16, 6, 0, 0).unwrap();

        ctrl.handle_sample(&today);
        ctrl.update(Duration::from_secs(30));
        ctrl.handle_sample(&tomorrow);

        assert_eq!(state.borrow().calls.len(), 2);
    }

    #[test]
    fn test_non_trigger_samples_never_fire() {
        let (mut ctrl, state) = controller(true);
        ctrl.handle_sample(&at(6, 0, 1));
        ctrl.handle_sample(&at(9, 0, 0));
        ctrl.handle_sample(&at(12, 30, 0));

        assert_eq!(ctrl.chime_state(), ChimeState::Idle);
        assert!(state.borrow().calls.is_empty());
    }

    #[test]
    fn test_asset_failure_falls_back_to_synthesis_once() {
        let (mut ctrl, state) = controller(true);
        state.borrow_mut().fail_chime = true;

        ctrl.manual_trigger();

        assert_eq!(ctrl.last_playback(), ChimePlayback::Synthesized);
        let calls = state.borrow().calls.clone();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], Call::PlayChime);
        match &calls[1] {
            Call::Fallback(notes) => {
                let offsets: Vec<f32> = notes.iter().map(|n| n.offset).collect();
                assert_eq!(offsets, vec![0.0, 0.8, 1.6, 2.4]);
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_both_failures_chime_silently() {
        let (mut ctrl, state) = controller(true);
        {
            let mut s = state.borrow_mut();
            s.fail_chime = true;
            s.fail_fallback = true;
        }

        ctrl.manual_trigger();

        assert_eq!(ctrl.last_playback(), ChimePlayback::Silent);
        assert_eq!(ctrl.chime_state(), ChimeState::Chiming);
    }

    #[test]
    fn test_sound_off_chimes_visually_only() {
        let (mut ctrl, state) = controller(false);
        ctrl.manual_trigger();

        assert_eq!(ctrl.chime_state(), ChimeState::Chiming);
        assert_eq!(ctrl.last_playback(), ChimePlayback::Silent);
        assert!(state.borrow().calls.is_empty());

        ctrl.update(CHIME_DURATION);
        assert_eq!(ctrl.chime_state(), ChimeState::Idle);
    }

    #[test]
    fn test_chime_window_lasts_six_seconds() {
        let (mut ctrl, _) = controller(true);
        ctrl.manual_trigger();

        ctrl.update(Duration::from_secs(5));
        assert_eq!(ctrl.chime_state(), ChimeState::Chiming);
        ctrl.update(Duration::from_secs(1));
        assert_eq!(ctrl.chime_state(), ChimeState::Idle);
    }

    #[test]
    fn test_ambience_suspended_before_chime_audio() {
        let (mut ctrl, state) = controller(true);
        ctrl.start_ambience();
        assert_eq!(ctrl.ambience_state(), AmbienceState::Playing);

        ctrl.manual_trigger();
        assert_eq!(ctrl.ambience_state(), AmbienceState::SuspendedForChime);

        let calls = state.borrow().calls.clone();
        assert_eq!(
            calls,
            vec![Call::StartAmbience, Call::Pause, Call::Rewind, Call::PlayChime]
        );
    }

    #[test]
    fn test_ambience_resumes_only_after_chime_plus_delay() {
        let (mut ctrl, _) = controller(true);
        ctrl.start_ambience();
        ctrl.manual_trigger();

        // Through the whole chime window: still suspended.
        ctrl.update(CHIME_DURATION);
        assert_eq!(ctrl.ambience_state(), AmbienceState::SuspendedForChime);

        // Not quite through the resume delay.
        ctrl.update(AMBIENCE_RESUME_DELAY - Duration::from_millis(1));
        assert_eq!(ctrl.ambience_state(), AmbienceState::SuspendedForChime);

        ctrl.update(Duration::from_millis(1));
        assert_eq!(ctrl.ambience_state(), AmbienceState::Playing);
    }

    #[test]
    fn test_one_large_update_crosses_both_timers() {
        let (mut ctrl, _) = controller(true);
        ctrl.start_ambience();
        ctrl.manual_trigger();

        ctrl.update(CHIME_DURATION + AMBIENCE_RESUME_DELAY);
        assert_eq!(ctrl.chime_state(), ChimeState::Idle);
        assert_eq!(ctrl.ambience_state(), AmbienceState::Playing);
    }

    #[test]
    fn test_manual_trigger_ignores_dedup() {
        let (mut ctrl, state) = controller(true);
        ctrl.manual_trigger();
        ctrl.manual_trigger();

        let chimes = state
            .borrow()
            .calls
            .iter()
            .filter(|c| **c == Call::PlayChime)
            .count();
        assert_eq!(chimes, 2);
        // Second trigger restarted the window.
        assert_eq!(ctrl.chime_state(), ChimeState::Chiming);
    }

    #[test]
    fn test_disable_sound_stops_ambience_immediately() {
        let (mut ctrl, state) = controller(true);
        ctrl.start_ambience();

        ctrl.set_sound_enabled(false);
        assert_eq!(ctrl.ambience_state(), AmbienceState::Stopped);
        let calls = state.borrow().calls.clone();
        assert_eq!(calls, vec![Call::StartAmbience, Call::Pause, Call::Rewind]);
    }

    #[test]
    fn test_disable_sound_cancels_pending_resume() {
        let (mut ctrl, state) = controller(true);
        ctrl.start_ambience();
        ctrl.manual_trigger();
        ctrl.update(CHIME_DURATION);

        ctrl.set_sound_enabled(false);
        ctrl.update(AMBIENCE_RESUME_DELAY * 2);

        assert_eq!(ctrl.ambience_state(), AmbienceState::Stopped);
        let resumes = state
            .borrow()
            .calls
            .iter()
            .filter(|c| **c == Call::Resume)
            .count();
        assert_eq!(resumes, 0);
    }

    #[test]
    fn test_enable_sound_during_chime_defers_ambience() {
        let (mut ctrl, _) = controller(true);
        ctrl.start_ambience();
        ctrl.manual_trigger();

        ctrl.set_sound_enabled(false);
        ctrl.set_sound_enabled(true);
        // Still chiming, so ambience stays stopped for now.
        assert_eq!(ctrl.ambience_state(), AmbienceState::Stopped);
    }

    #[test]
    fn test_enable_sound_while_idle_resumes_ambience() {
        let (mut ctrl, _) = controller(true);
        ctrl.start_ambience();
        ctrl.set_sound_enabled(false);
        ctrl.set_sound_enabled(true);

        assert_eq!(ctrl.ambience_state(), AmbienceState::Playing);
    }

    #[test]
    fn test_ambience_load_failure_is_permanent() {
        let (mut ctrl, state) = controller(true);
        state.borrow_mut().fail_ambience = true;

        ctrl.start_ambience();
        ctrl.start_ambience();

        assert_eq!(ctrl.ambience_state(), AmbienceState::Stopped);
        let attempts = state
            .borrow()
            .calls
            .iter()
            .filter(|c| **c == Call::StartAmbience)
            .count();
        assert_eq!(attempts, 1);
    }

    #[test]
    fn test_ambience_not_started_without_sound() {
        let (mut ctrl, state) = controller(false);
        ctrl.start_ambience();
        assert!(state.borrow().calls.is_empty());
        assert_eq!(ctrl.ambience_state(), AmbienceState::Stopped);
    }
}
