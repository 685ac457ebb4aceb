//! Human-readable reminder lead times and repetition frequencies.

use crate::models::RepeatInterval;

const MINUTES_PER_HOUR: u32 = 60;
const MINUTES_PER_DAY: u32 = 1440;

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Lead time of a reminder. `None` means the reminder is switched off.
pub fn reminder_text(minutes: Option<u32>) -> String {
    match minutes {
        None => "No reminder".to_string(),
        Some(0) => "At start".to_string(),
        Some(m) if m % MINUTES_PER_DAY == 0 => plural(i64::from(m / MINUTES_PER_DAY), "day"),
        Some(m) if m % MINUTES_PER_HOUR == 0 => plural(i64::from(m / MINUTES_PER_HOUR), "hour"),
        Some(m) => plural(i64::from(m), "minute"),
    }
}

/// Repetition frequency for an interval given in seconds. Only whole days count.
pub fn repetition_text(seconds: i64) -> String {
    let days = seconds / 60 / 60 / 24;
    match days {
        0 => "No repetition".to_string(),
        1 => "Daily".to_string(),
        7 => "Weekly".to_string(),
        14 => "Biweekly".to_string(),
        30 => "Monthly".to_string(),
        365 => "Yearly".to_string(),
        d if d % 365 == 0 => format!("Every {}", plural(d / 365, "year")),
        d if d % 30 == 0 => format!("Every {}", plural(d / 30, "month")),
        d if d % 7 == 0 => format!("Every {}", plural(d / 7, "week")),
        d => format!("Every {}", plural(d, "day")),
    }
}

impl RepeatInterval {
    pub fn description(self) -> String {
        repetition_text(self.as_legacy_seconds())
    }
}
