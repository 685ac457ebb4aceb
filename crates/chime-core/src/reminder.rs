use chrono_tz::Tz;
use tracing::debug;

use crate::models::{Event, ReminderRequest};
use crate::recurrence::RecurrenceAdvancer;
use crate::scheduler::Clock;

/// Lookahead added to "now" so nothing is scheduled for the instant being computed.
pub const DEFAULT_GUARD_SECONDS: i64 = 3;

/// Configuration for reminder resolution. Passed explicitly, never read from a global.
#[derive(Debug, Clone)]
pub struct ReminderConfig {
    pub guard_seconds: i64,
    /// Zone whose civil calendar drives month/year stepping.
    pub timezone: Tz,
    /// Also skip ignored occurrences of month/year rules. Off by default to
    /// match existing schedules, where only fixed-period rules honor exclusions.
    pub skip_ignored_calendar_occurrences: bool,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            guard_seconds: DEFAULT_GUARD_SECONDS,
            timezone: Tz::UTC,
            skip_ignored_calendar_occurrences: false,
        }
    }
}

/// Why an event has nothing to schedule right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoReminderReason {
    /// The event has no reminder offsets at all.
    NoReminders,
    /// Every offset points at a fire time that has already passed.
    AllInPast,
    /// The reduced candidate failed the final sanity check.
    InvalidRecurrenceState,
    /// The next fire time is not before the series' repeat limit.
    PastRepeatLimit,
}

impl std::fmt::Display for NoReminderReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoReminderReason::NoReminders => write!(f, "no reminders configured"),
            NoReminderReason::AllInPast => write!(f, "all reminders are in the past"),
            NoReminderReason::InvalidRecurrenceState => write!(f, "inconsistent recurrence state"),
            NoReminderReason::PastRepeatLimit => write!(f, "series has reached its repeat limit"),
        }
    }
}

/// Outcome of resolving an event. `NoReminderDue` is a normal result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Due(ReminderRequest),
    NoReminderDue(NoReminderReason),
}

impl Resolution {
    pub fn request(&self) -> Option<ReminderRequest> {
        match self {
            Resolution::Due(request) => Some(*request),
            Resolution::NoReminderDue(_) => None,
        }
    }

    pub fn fire_at(&self) -> Option<i64> {
        self.request().map(|r| r.fire_at)
    }
}

/// NextReminderResolver: reduces an event to the single next reminder fire time.
///
/// Responsibilities:
/// 1. Ask the advancer for a candidate per reminder offset
/// 2. Keep the earliest candidate
/// 3. Reject candidates that are in the past or beyond the repeat limit
#[derive(Debug, Clone)]
pub struct NextReminderResolver {
    config: ReminderConfig,
    advancer: RecurrenceAdvancer,
}

impl NextReminderResolver {
    pub fn new(config: ReminderConfig) -> Self {
        let advancer = RecurrenceAdvancer::new(config.timezone)
            .with_calendar_exclusions(config.skip_ignored_calendar_occurrences);
        Self { config, advancer }
    }

    pub fn with_defaults() -> Self {
        Self::new(ReminderConfig::default())
    }

    pub fn config(&self) -> &ReminderConfig {
        &self.config
    }

    /// Resolves against the current time of `clock`.
    pub fn resolve(&self, event: &Event, clock: &impl Clock) -> Resolution {
        self.resolve_at(event, clock.now_millis().div_euclid(1000))
    }

    /// Resolves the next reminder for `event` as of `now_epoch_secs`.
    ///
    /// # Behavior
    /// - No reminders: `NoReminderDue(NoReminders)` before any other work
    /// - Every offset is considered; the earliest candidate wins
    /// - A candidate of `0` or one before the guarded "now" is discarded
    /// - With a nonzero `repeat_limit`, the fire time must be strictly below it
    pub fn resolve_at(&self, event: &Event, now_epoch_secs: i64) -> Resolution {
        if !event.has_reminders() {
            return Resolution::NoReminderDue(NoReminderReason::NoReminders);
        }

        let now = now_epoch_secs.saturating_add(self.config.guard_seconds);
        let next = event
            .reminder_offsets_secs()
            .filter_map(|offset| self.advancer.advance(event, offset, now))
            .min();

        let Some(fire_at) = next else {
            debug!(event_id = event.id, "every reminder offset is in the past");
            return Resolution::NoReminderDue(NoReminderReason::AllInPast);
        };

        if fire_at == 0 || fire_at < now || fire_at == i64::MAX {
            debug!(event_id = event.id, fire_at, now, "discarding inconsistent reminder candidate");
            return Resolution::NoReminderDue(NoReminderReason::InvalidRecurrenceState);
        }

        if event.repeat_limit != 0 && fire_at >= event.repeat_limit {
            debug!(
                event_id = event.id,
                fire_at,
                repeat_limit = event.repeat_limit,
                "next reminder falls past the repeat limit"
            );
            return Resolution::NoReminderDue(NoReminderReason::PastRepeatLimit);
        }

        debug!(event_id = event.id, fire_at, "resolved next reminder");
        Resolution::Due(ReminderRequest {
            event_id: event.id,
            fire_at,
        })
    }
}
