//! Kira-backed audio output
//!
//! Production implementation of [`AudioBackend`] on top of the Kira audio
//! library. Assets are loaded lazily on first use; a failed device init
//! leaves the backend silent but functional (the clock keeps running with
//! visual-only chimes).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kira::{
    manager::{backend::DefaultBackend, AudioManager as KiraManager, AudioManagerSettings},
    sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings},
    tween::Tween,
    Frame, Volume,
};

use super::backend::{AudioBackend, AudioError};
use crate::chime::notes::{envelope, BellNote, NOTE_SPAN};
use crate::settings::Settings;

/// Sample rate for synthesized fallback audio.
const SYNTH_SAMPLE_RATE: u32 = 44_100;

/// Audio output using Kira.
pub struct KiraBackend {
    /// Kira audio manager; `None` when no output device is available
    manager: Option<KiraManager>,
    /// Lazily loaded chime asset
    chime_data: Option<StaticSoundData>,
    /// Handle to the looping ambience track, once started
    ambience_handle: Option<StaticSoundHandle>,
    chime_path: PathBuf,
    ambience_path: PathBuf,
    chime_volume: f64,
    ambience_volume: f64,
}

impl KiraBackend {
    pub fn new(settings: &Settings) -> Self {
        let manager = match KiraManager::<DefaultBackend>::new(AudioManagerSettings::default()) {
            Ok(m) => {
                log::info!("Audio output initialized");
                Some(m)
            }
            Err(e) => {
                log::warn!("Failed to initialize audio output: {}. Running silent.", e);
                None
            }
        };

        Self {
            manager,
            chime_data: None,
            ambience_handle: None,
            chime_path: settings.chime_path.clone(),
            ambience_path: settings.ambience_path.clone(),
            chime_volume: settings.chime_volume,
            ambience_volume: settings.ambience_volume,
        }
    }

    /// Whether an output device was acquired.
    pub fn is_available(&self) -> bool {
        self.manager.is_some()
    }

    fn load_sound(path: &Path) -> Result<StaticSoundData, AudioError> {
        if !path.exists() {
            return Err(AudioError::AssetLoad(format!(
                "sound file not found: {}",
                path.display()
            )));
        }
        StaticSoundData::from_file(path)
            .map_err(|e| AudioError::AssetLoad(format!("{}: {:?}", path.display(), e)))
    }

    /// Render the fallback note sequence into PCM frames: one decaying
    /// triangle wave per note, mixed at its onset offset.
    fn render_notes(notes: &[BellNote]) -> Vec<Frame> {
        let span = notes
            .iter()
            .map(|n| n.offset + NOTE_SPAN)
            .fold(0.0f32, f32::max);
        let frame_count = (span * SYNTH_SAMPLE_RATE as f32).ceil() as usize;

        let mut frames = Vec::with_capacity(frame_count);
        for i in 0..frame_count {
            let t = i as f32 / SYNTH_SAMPLE_RATE as f32;
            let mut sample = 0.0f32;
            for note in notes {
                let local = t - note.offset;
                let amp = envelope(local);
                if amp > 0.0 {
                    sample += amp * triangle(local * note.frequency);
                }
            }
            frames.push(Frame::from_mono(sample));
        }
        frames
    }
}

/// Triangle wave in [-1, 1] for a phase given in cycles.
fn triangle(phase: f32) -> f32 {
    let p = phase.fract();
    if p < 0.5 {
        4.0 * p - 1.0
    } else {
        3.0 - 4.0 * p
    }
}

impl AudioBackend for KiraBackend {
    fn play_chime(&mut self) -> Result<(), AudioError> {
        let Some(manager) = &mut self.manager else {
            return Err(AudioError::PlaybackRejected(
                "no audio output device".into(),
            ));
        };

        if self.chime_data.is_none() {
            self.chime_data = Some(Self::load_sound(&self.chime_path)?);
        }
        let data = self
            .chime_data
            .as_ref()
            .cloned()
            .ok_or_else(|| AudioError::AssetLoad("chime data missing".into()))?;

        let settings = StaticSoundSettings::new().volume(Volume::Amplitude(self.chime_volume));
        manager
            .play(data.with_settings(settings))
            .map(|_| ())
            .map_err(|e| AudioError::PlaybackRejected(format!("{:?}", e)))
    }

    fn play_chime_fallback(&mut self, notes: &[BellNote]) -> Result<(), AudioError> {
        let Some(manager) = &mut self.manager else {
            return Err(AudioError::SynthesisUnavailable);
        };

        let frames: Arc<[Frame]> = Self::render_notes(notes).into();
        let data = StaticSoundData {
            sample_rate: SYNTH_SAMPLE_RATE,
            frames,
            settings: StaticSoundSettings::new().volume(Volume::Amplitude(self.chime_volume)),
            slice: None,
        };

        manager
            .play(data)
            .map(|_| ())
            .map_err(|e| AudioError::PlaybackRejected(format!("{:?}", e)))
    }

    fn start_ambience(&mut self) -> Result<(), AudioError> {
        let Some(manager) = &mut self.manager else {
            return Err(AudioError::PlaybackRejected(
                "no audio output device".into(),
            ));
        };

        if self.ambience_handle.is_some() {
            self.resume_ambience();
            return Ok(());
        }

        let data = Self::load_sound(&self.ambience_path)?;
        let settings = StaticSoundSettings::new()
            .loop_region(0.0..)
            .volume(Volume::Amplitude(self.ambience_volume));
        let handle = manager
            .play(data.with_settings(settings))
            .map_err(|e| AudioError::PlaybackRejected(format!("{:?}", e)))?;

        self.ambience_handle = Some(handle);
        Ok(())
    }

    fn pause_ambience(&mut self) {
        if let Some(handle) = &mut self.ambience_handle {
            handle.pause(Tween::default());
        }
    }

    fn resume_ambience(&mut self) {
        if let Some(handle) = &mut self.ambience_handle {
            handle.set_volume(Volume::Amplitude(self.ambience_volume), Tween::default());
            handle.resume(Tween::default());
        }
    }

    fn rewind_ambience(&mut self) {
        if let Some(handle) = &mut self.ambience_handle {
            handle.seek_to(0.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chime::notes::WESTMINSTER_QUARTER;

    #[test]
    fn test_triangle_wave_range() {
        for i in 0..100 {
            let s = triangle(i as f32 * 0.037);
            assert!((-1.0..=1.0).contains(&s));
        }
        assert!((triangle(0.25) - 0.0).abs() < 1e-6);
        assert!((triangle(0.0) - (-1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_rendered_sequence_length() {
        let frames = KiraBackend::render_notes(&WESTMINSTER_QUARTER);
        // Last onset at 2.4s plus a 2s span.
        let expected = (4.4 * SYNTH_SAMPLE_RATE as f32).ceil() as usize;
        assert_eq!(frames.len(), expected);
    }

    #[test]
    fn test_rendered_sequence_starts_quiet() {
        let frames = KiraBackend::render_notes(&WESTMINSTER_QUARTER);
        // Attack ramps from zero, so the very first frame is silent.
        assert!(frames[0].left.abs() < 1e-3);
    }
}
