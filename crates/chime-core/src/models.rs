use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use thiserror::Error;

use crate::error::CoreError;

/// Identifier of a calendar event. Doubles as the identity of its pending wake-up.
pub type EventId = i64;

pub const DAY_SECS: i64 = 86_400;
pub const WEEK_SECS: i64 = 7 * DAY_SECS;
pub const BIWEEK_SECS: i64 = 14 * DAY_SECS;
/// Legacy storage encoding of a monthly rule (30 days). Not a real period.
pub const MONTH_SECS: i64 = 30 * DAY_SECS;
/// Legacy storage encoding of a yearly rule (365 days). Not a real period.
pub const YEAR_SECS: i64 = 365 * DAY_SECS;

/// How an event repeats.
///
/// `Day`, `Week` and `Biweek` are fixed periods. `Month` and `Year` are civil
/// calendar units and must be stepped on the calendar, never in seconds.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RepeatInterval {
    #[default]
    None,
    Day,
    Week,
    Biweek,
    Month,
    Year,
}

impl RepeatInterval {
    /// Fixed step in seconds, or `None` for one-shot and calendar-unit rules.
    pub fn fixed_period_secs(self) -> Option<i64> {
        match self {
            RepeatInterval::Day => Some(DAY_SECS),
            RepeatInterval::Week => Some(WEEK_SECS),
            RepeatInterval::Biweek => Some(BIWEEK_SECS),
            RepeatInterval::None | RepeatInterval::Month | RepeatInterval::Year => None,
        }
    }

    /// Number of civil months per step for calendar-unit rules.
    pub fn calendar_months(self) -> Option<u32> {
        match self {
            RepeatInterval::Month => Some(1),
            RepeatInterval::Year => Some(12),
            _ => None,
        }
    }

    pub fn is_recurring(self) -> bool {
        self != RepeatInterval::None
    }

    /// Legacy seconds encoding used by stored events.
    pub fn as_legacy_seconds(self) -> i64 {
        match self {
            RepeatInterval::None => 0,
            RepeatInterval::Day => DAY_SECS,
            RepeatInterval::Week => WEEK_SECS,
            RepeatInterval::Biweek => BIWEEK_SECS,
            RepeatInterval::Month => MONTH_SECS,
            RepeatInterval::Year => YEAR_SECS,
        }
    }

    pub fn from_legacy_seconds(seconds: i64) -> Result<Self, CoreError> {
        match seconds {
            0 => Ok(RepeatInterval::None),
            DAY_SECS => Ok(RepeatInterval::Day),
            WEEK_SECS => Ok(RepeatInterval::Week),
            BIWEEK_SECS => Ok(RepeatInterval::Biweek),
            MONTH_SECS => Ok(RepeatInterval::Month),
            YEAR_SECS => Ok(RepeatInterval::Year),
            other => Err(CoreError::InvalidInput(format!(
                "Unsupported repeat interval of {} seconds",
                other
            ))),
        }
    }
}

impl std::fmt::Display for RepeatInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepeatInterval::None => write!(f, "none"),
            RepeatInterval::Day => write!(f, "day"),
            RepeatInterval::Week => write!(f, "week"),
            RepeatInterval::Biweek => write!(f, "biweek"),
            RepeatInterval::Month => write!(f, "month"),
            RepeatInterval::Year => write!(f, "year"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid repeat interval: {0}")]
pub struct ParseRepeatIntervalError(String);

impl FromStr for RepeatInterval {
    type Err = ParseRepeatIntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "once" => Ok(RepeatInterval::None),
            "day" | "daily" => Ok(RepeatInterval::Day),
            "week" | "weekly" => Ok(RepeatInterval::Week),
            "biweek" | "biweekly" => Ok(RepeatInterval::Biweek),
            "month" | "monthly" => Ok(RepeatInterval::Month),
            "year" | "yearly" => Ok(RepeatInterval::Year),
            _ => Err(ParseRepeatIntervalError(s.to_string())),
        }
    }
}

fn deserialize_repeat_interval<'de, D>(deserializer: D) -> Result<RepeatInterval, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Encoded {
        Name(RepeatInterval),
        Seconds(i64),
    }

    match Encoded::deserialize(deserializer)? {
        Encoded::Name(interval) => Ok(interval),
        Encoded::Seconds(seconds) => {
            RepeatInterval::from_legacy_seconds(seconds).map_err(serde::de::Error::custom)
        }
    }
}

/// A calendar event as seen by the reminder core. Loaded elsewhere, never mutated here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    #[serde(default)]
    pub title: String,
    /// First occurrence start, epoch seconds. Anchor for every later occurrence.
    pub start_ts: i64,
    /// Accepts a rule name or its legacy seconds encoding.
    #[serde(default, deserialize_with = "deserialize_repeat_interval")]
    pub repeat_interval: RepeatInterval,
    /// Absolute epoch cutoff; `0` means the series never ends.
    #[serde(default)]
    pub repeat_limit: i64,
    /// Minutes before each occurrence start.
    #[serde(default)]
    pub reminders: Vec<u32>,
    /// Occurrence starts the user skipped.
    #[serde(default)]
    pub ignored_occurrences: BTreeSet<i64>,
}

impl Event {
    pub fn new(id: EventId, start_ts: i64) -> Self {
        Self {
            id,
            start_ts,
            ..Default::default()
        }
    }

    pub fn has_reminders(&self) -> bool {
        !self.reminders.is_empty()
    }

    pub fn is_ignored(&self, occurrence_ts: i64) -> bool {
        self.ignored_occurrences.contains(&occurrence_ts)
    }

    /// Reminder offsets in seconds, in reverse declaration order.
    pub fn reminder_offsets_secs(&self) -> impl Iterator<Item = i64> + '_ {
        self.reminders.iter().rev().map(|minutes| i64::from(*minutes) * 60)
    }
}

/// The single value the core hands to the alarm boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReminderRequest {
    pub event_id: EventId,
    /// Epoch seconds.
    pub fire_at: i64,
}
