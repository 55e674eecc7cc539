//! Wall-clock sampling
//!
//! Produces one fresh time sample per second, driven by the frame loop's
//! delta time.

use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Timelike};

/// A single snapshot of the local wall clock.
///
/// Re-derived every sampling tick; carries no identity across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampledTime {
    instant: DateTime<Local>,
}

impl SampledTime {
    /// Sample the system clock right now.
    pub fn now() -> Self {
        Self {
            instant: Local::now(),
        }
    }

    /// Build a sample from explicit calendar fields. Used by tests and
    /// anywhere a deterministic instant is needed.
    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Option<Self> {
        let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
        let instant = Local.from_local_datetime(&naive).single()?;
        Some(Self { instant })
    }

    /// As [`from_ymd_hms`], with sub-second precision.
    ///
    /// [`from_ymd_hms`]: SampledTime::from_ymd_hms
    pub fn from_ymd_hms_nano(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        nanosecond: u32,
    ) -> Option<Self> {
        let naive = NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_nano_opt(hour, minute, second, nanosecond)?;
        let instant = Local.from_local_datetime(&naive).single()?;
        Some(Self { instant })
    }

    /// The underlying instant.
    pub fn instant(&self) -> DateTime<Local> {
        self.instant
    }

    /// Hour of day, 0-23.
    pub fn hour(&self) -> u32 {
        self.instant.hour()
    }

    /// Minute of hour, 0-59.
    pub fn minute(&self) -> u32 {
        self.instant.minute()
    }

    /// Second of minute, 0-59.
    pub fn second(&self) -> u32 {
        self.instant.second()
    }
}

/// Nominal interval between samples.
const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Emits wall-clock samples at a 1-second cadence.
///
/// The sampler is driven by the main loop: each frame calls [`poll`] with
/// the frame delta, and a sample is emitted whenever the accumulated time
/// crosses the interval. Sub-second precision is not guaranteed and drift
/// is acceptable.
///
/// [`poll`]: ClockSampler::poll
pub struct ClockSampler {
    running: bool,
    since_last: Duration,
}

impl ClockSampler {
    pub fn new() -> Self {
        Self {
            running: false,
            since_last: Duration::ZERO,
        }
    }

    /// Begin ticking. The first `poll` after `start` emits immediately so
    /// consumers never wait a full second for their initial sample.
    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.since_last = SAMPLE_INTERVAL;
        }
    }

    /// Halt future ticks. Idempotent; safe to call whether or not the
    /// sampler is running, including from code reacting to a sample.
    pub fn stop(&mut self) {
        self.running = false;
        self.since_last = Duration::ZERO;
    }

    /// Whether the sampler is currently ticking.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance by `delta` and return a fresh sample if the interval has
    /// elapsed. Returns `None` while stopped.
    pub fn poll(&mut self, delta: Duration) -> Option<SampledTime> {
        if !self.running {
            return None;
        }

        self.since_last += delta;
        if self.since_last >= SAMPLE_INTERVAL {
            // Keep the remainder so cadence doesn't drift by a full frame
            // each second.
            self.since_last -= SAMPLE_INTERVAL;
            if self.since_last >= SAMPLE_INTERVAL {
                self.since_last = Duration::ZERO;
            }
            Some(SampledTime::now())
        } else {
            None
        }
    }
}

impl Default for ClockSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_poll_after_start_emits() {
        let mut sampler = ClockSampler::new();
        sampler.start();
        assert!(sampler.poll(Duration::ZERO).is_some());
    }

    #[test]
    fn test_emits_once_per_second() {
        let mut sampler = ClockSampler::new();
        sampler.start();
        sampler.poll(Duration::ZERO); // initial sample

        assert!(sampler.poll(Duration::from_millis(400)).is_none());
        assert!(sampler.poll(Duration::from_millis(400)).is_none());
        assert!(sampler.poll(Duration::from_millis(400)).is_some());
        assert!(sampler.poll(Duration::from_millis(100)).is_none());
    }

    #[test]
    fn test_stopped_sampler_emits_nothing() {
        let mut sampler = ClockSampler::new();
        assert!(sampler.poll(Duration::from_secs(5)).is_none());

        sampler.start();
        sampler.stop();
        assert!(sampler.poll(Duration::from_secs(5)).is_none());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut sampler = ClockSampler::new();
        sampler.start();
        sampler.stop();
        sampler.stop();
        assert!(!sampler.is_running());
        assert!(sampler.poll(Duration::from_secs(2)).is_none());
    }

    #[test]
    fn test_restart_after_stop() {
        let mut sampler = ClockSampler::new();
        sampler.start();
        sampler.stop();
        sampler.start();
        assert!(sampler.poll(Duration::ZERO).is_some());
    }

    #[test]
    fn test_sample_fields_in_range() {
        let t = SampledTime::now();
        assert!(t.hour() < 24);
        assert!(t.minute() < 60);
        assert!(t.second() < 60);
    }

    #[test]
    fn test_from_ymd_hms() {
        let t = SampledTime::from_ymd_hms(2024, 3, 15, 6, 0, 0).unwrap();
        assert_eq!(t.hour(), 6);
        assert_eq!(t.minute(), 0);
        assert_eq!(t.second(), 0);
    }
}
