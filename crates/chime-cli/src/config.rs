use chime_core::error::CoreError;
use chime_core::reminder::{ReminderConfig, DEFAULT_GUARD_SECONDS};
use chime_core::timezone::{detect_system_timezone, parse_timezone};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// JSON file holding the events to schedule
    #[serde(default = "default_events_file")]
    pub events_file: PathBuf,
    /// IANA timezone whose calendar drives monthly and yearly stepping
    #[serde(default = "detect_system_timezone")]
    pub timezone: String,
    /// Lookahead added to "now" before resolving
    #[serde(default = "default_guard_seconds")]
    pub guard_seconds: i64,
    /// Skip ignored occurrences of monthly and yearly events too
    #[serde(default)]
    pub skip_ignored_calendar_occurrences: bool,
    /// Log filter used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_events_file() -> PathBuf {
    PathBuf::from("events.json")
}

fn default_guard_seconds() -> i64 {
    DEFAULT_GUARD_SECONDS
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            events_file: default_events_file(),
            timezone: detect_system_timezone(),
            guard_seconds: default_guard_seconds(),
            skip_ignored_calendar_occurrences: false,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("chime.toml"))
            .merge(Env::prefixed("CHIME_"))
            .extract()
    }

    /// Builds the resolver configuration, preferring `timezone_override` when given.
    pub fn reminder_config(&self, timezone_override: Option<&str>) -> Result<ReminderConfig, CoreError> {
        let timezone = parse_timezone(timezone_override.unwrap_or(&self.timezone))?;
        Ok(ReminderConfig {
            guard_seconds: self.guard_seconds,
            timezone,
            skip_ignored_calendar_occurrences: self.skip_ignored_calendar_occurrences,
        })
    }
}
