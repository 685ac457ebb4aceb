use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test harness for running CLI commands against a temporary events file
pub struct CliTestHarness {
    _temp_dir: TempDir,
    events_path: PathBuf,
}

impl CliTestHarness {
    /// Create a new test harness with `events_json` as the events file
    pub fn with_events(events_json: &str) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let events_path = temp_dir.path().join("events.json");
        std::fs::write(&events_path, events_json).expect("Failed to write events file");

        Self {
            _temp_dir: temp_dir,
            events_path,
        }
    }

    /// Harness with the standard fixture events
    pub fn new() -> Self {
        Self::with_events(TestFixtures::events_json())
    }

    /// Get a Command instance configured for testing
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("chime").expect("Failed to find chime binary");

        // Point the CLI at the temporary events file and pin the zone
        cmd.env("CHIME_EVENTS_FILE", &self.events_path);
        cmd.env("CHIME_TIMEZONE", "UTC");
        cmd.env_remove("RUST_LOG");

        cmd
    }

    /// Get the events file path for this test instance
    pub fn events_path(&self) -> &std::path::Path {
        &self.events_path
    }

    /// Helper to run a command and assert success
    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    /// Helper to run a command and assert failure
    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }
}

/// Common test fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// Reference "now": 2025-06-15T12:00:00Z
    pub const NOW: i64 = 1_749_988_800;

    /// A one-shot event, a daily event with a skipped occurrence, a monthly
    /// event anchored on the 31st and an event without reminders
    pub fn events_json() -> &'static str {
        r#"[
            {
                "id": 1,
                "title": "Dentist",
                "start_ts": 1750003200,
                "reminders": [30, 60]
            },
            {
                "id": 2,
                "title": "Standup",
                "start_ts": 1748768400,
                "repeat_interval": "day",
                "reminders": [10],
                "ignored_occurrences": [1750064400]
            },
            {
                "id": 3,
                "title": "Rent",
                "start_ts": 1738314000,
                "repeat_interval": "month",
                "reminders": [1440]
            },
            {
                "id": 4,
                "title": "Silent",
                "start_ts": 1750003200,
                "repeat_interval": "week"
            }
        ]"#
    }
}

/// Assertion helpers
pub mod assertions {
    use super::*;

    pub fn json_line(event_id: i64, fire_at: Option<i64>) -> impl Predicate<str> {
        let fire_at = fire_at.map_or("null".to_string(), |ts| ts.to_string());
        predicate::str::contains(format!("\"event_id\":{}", event_id))
            .and(predicate::str::contains(format!("\"fire_at\":{}", fire_at)))
    }
}
