use chrono::{Datelike, Duration, LocalResult, Months, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::models::{Event, RepeatInterval};

/// RecurrenceAdvancer: moves a reminder fire time forward to the first
/// occurrence-aligned instant on or after a reference time.
///
/// Responsibilities:
/// 1. Step fixed-period rules (day, week, biweek) in epoch seconds
/// 2. Step calendar-unit rules (month, year) on the civil calendar of `timezone`
/// 3. Skip ignored occurrences while stepping fixed-period rules
/// 4. Keep one-shot events only while their fire time is still ahead
#[derive(Debug, Clone)]
pub struct RecurrenceAdvancer {
    timezone: Tz,
    /// Also honor ignored occurrences for month/year rules.
    skip_ignored_calendar_occurrences: bool,
}

impl RecurrenceAdvancer {
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            skip_ignored_calendar_occurrences: false,
        }
    }

    pub fn with_calendar_exclusions(mut self, enabled: bool) -> Self {
        self.skip_ignored_calendar_occurrences = enabled;
        self
    }

    /// Computes the candidate fire time for one reminder offset.
    ///
    /// # Arguments
    /// * `event` - The event whose occurrences are being stepped
    /// * `offset_secs` - Seconds between a reminder and its occurrence start
    /// * `now` - Reference instant, epoch seconds
    ///
    /// # Returns
    /// * `Option<i64>` - Fire time in epoch seconds, or `None` when nothing is due
    ///
    /// # Behavior
    /// - Day/Week/Biweek: add the period while the fire time is before `now` or
    ///   its occurrence is ignored; exclusion is re-checked after every step
    /// - Month/Year: add whole months to the local date-time of the first fire
    ///   time until it is no longer before `now` (civil comparison); day overflow
    ///   clamps to the last day of the target month and never drifts, because every
    ///   candidate is computed from the anchor
    /// - None: the first fire time if it is strictly after `now`
    pub fn advance(&self, event: &Event, offset_secs: i64, now: i64) -> Option<i64> {
        let fire = event.start_ts.checked_sub(offset_secs)?;

        match event.repeat_interval {
            RepeatInterval::Day | RepeatInterval::Week | RepeatInterval::Biweek => {
                let period = event.repeat_interval.fixed_period_secs()?;
                advance_fixed(event, fire, offset_secs, period, now)
            }
            RepeatInterval::Month | RepeatInterval::Year => {
                let months = event.repeat_interval.calendar_months()?;
                self.advance_calendar(event, fire, offset_secs, months, now)
            }
            RepeatInterval::None => (fire > now).then_some(fire),
        }
    }

    fn advance_calendar(
        &self,
        event: &Event,
        fire: i64,
        offset_secs: i64,
        months_per_step: u32,
        now: i64,
    ) -> Option<i64> {
        let anchor = self.local_datetime(fire)?;
        let now_local = self.local_datetime(now)?;

        // Every step before this one is still strictly in the past.
        let months_behind = (now_local.year() - anchor.year()) * 12
            + now_local.month() as i32
            - anchor.month() as i32
            - 1;
        let mut step = u32::try_from(months_behind.max(0)).ok()? / months_per_step;

        loop {
            let candidate = anchor.checked_add_months(Months::new(months_per_step.checked_mul(step)?))?;
            if candidate >= now_local {
                let ts = self.epoch_seconds(candidate)?;
                // A repeated local hour can map the candidate to an instant before `now`.
                let ignored = self.skip_ignored_calendar_occurrences
                    && event.is_ignored(ts.checked_add(offset_secs)?);
                if ts >= now && !ignored {
                    return Some(ts);
                }
            }
            step = step.checked_add(1)?;
        }
    }

    fn local_datetime(&self, ts: i64) -> Option<NaiveDateTime> {
        self.timezone
            .timestamp_opt(ts, 0)
            .single()
            .map(|dt| dt.naive_local())
    }

    /// Ambiguous local times resolve to the earlier instant; times skipped by a
    /// DST gap move forward one hour.
    fn epoch_seconds(&self, local: NaiveDateTime) -> Option<i64> {
        match self.timezone.from_local_datetime(&local) {
            LocalResult::Single(dt) => Some(dt.timestamp()),
            LocalResult::Ambiguous(earliest, _) => Some(earliest.timestamp()),
            LocalResult::None => self
                .timezone
                .from_local_datetime(&(local + Duration::hours(1)))
                .earliest()
                .map(|dt| dt.timestamp()),
        }
    }
}

fn advance_fixed(event: &Event, fire: i64, offset_secs: i64, period: i64, now: i64) -> Option<i64> {
    let mut fire = fire;
    if fire < now {
        let behind = now.checked_sub(fire)?;
        let steps = behind.checked_add(period - 1)? / period;
        fire = fire.checked_add(steps.checked_mul(period)?)?;
    }
    while fire < now || event.is_ignored(fire.checked_add(offset_secs)?) {
        fire = fire.checked_add(period)?;
    }
    Some(fire)
}
