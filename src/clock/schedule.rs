//! Chime scheduling
//!
//! Decides when the clock should chime and how long until it next will.
//! The chime hours are fixed: midnight, six in the morning, and noon.

use chrono::{Days, NaiveDateTime, Timelike};

use super::sampler::SampledTime;

/// Hours of the day (0-23) at which the clock chimes.
pub const CHIME_HOURS: [u32; 3] = [0, 6, 12];

/// Dedup token for a chime instant.
///
/// Keys on the full calendar date as well as the time of day, so the same
/// clock-face instant recurring on a later day always yields a distinct
/// key and chimes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChimeKey(NaiveDateTime);

impl ChimeKey {
    fn from_sample(sample: &SampledTime) -> Self {
        // Truncate to the second: any two samples inside the same wall
        // second (clock steps, NTP nudges) must share one key.
        let naive = sample.instant().naive_local();
        Self(naive.with_nanosecond(0).unwrap_or(naive))
    }
}

/// Whether `hour` is one of the chime hours.
fn is_chime_hour(hour: u32) -> bool {
    CHIME_HOURS.contains(&hour)
}

/// Decide whether a chime should fire for this sample.
///
/// Pure: the caller owns the last-fired key and stores the returned one.
/// Returns `Some(new_key)` exactly when the sample sits on a trigger
/// instant (XX:00:00 at a chime hour) whose key differs from `last_fired`.
pub fn evaluate(sample: &SampledTime, last_fired: Option<&ChimeKey>) -> Option<ChimeKey> {
    if sample.minute() != 0 || sample.second() != 0 || !is_chime_hour(sample.hour()) {
        return None;
    }

    let key = ChimeKey::from_sample(sample);
    if last_fired == Some(&key) {
        None
    } else {
        Some(key)
    }
}

/// Whether the sample falls anywhere inside a chime minute (XX:00 at a
/// chime hour). Display hint only; firing is decided by [`evaluate`].
pub fn is_chime_minute(sample: &SampledTime) -> bool {
    sample.minute() == 0 && is_chime_hour(sample.hour())
}

/// Time until the next chime, as whole hours and whole remaining minutes
/// (seconds truncated).
///
/// The next target is chosen by hour alone: before 6 it is today's 06:00,
/// before 12 it is today's noon, otherwise tomorrow's midnight. Once a
/// chime hour has begun its own instant is never re-selected, so at
/// 06:00:05 the answer already points at noon.
pub fn time_until_next(sample: &SampledTime) -> (i64, i64) {
    let now = sample.instant().naive_local();
    let today = now.date();

    let target = if sample.hour() < 6 {
        today.and_hms_opt(6, 0, 0)
    } else if sample.hour() < 12 {
        today.and_hms_opt(12, 0, 0)
    } else {
        today
            .checked_add_days(Days::new(1))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    };

    // The chime instants always exist on a calendar; an unrepresentable
    // target can only mean we are at the end of the supported date range.
    let Some(target) = target else {
        return (0, 0);
    };

    let diff = target - now;
    let hours = diff.num_hours();
    let minutes = diff.num_minutes() - hours * 60;
    (hours, minutes)
}

/// Human-readable countdown, e.g. "5h 59m".
pub fn format_until_next(sample: &SampledTime) -> String {
    let (hours, minutes) = time_until_next(sample);
    format!("{}h {}m", hours, minutes)
}
