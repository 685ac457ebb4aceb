use anyhow::Result;
use chime_core::models::EventId;
use chime_core::reminder::{NextReminderResolver, Resolution};
use chrono::Utc;
use serde::Serialize;

use crate::cli::NextCommand;
use crate::config::Config;
use crate::parser::parse_when;
use crate::util::{load_events, select_events};
use crate::views::table::{display_reminders, ViewReminder};

#[derive(Debug, Serialize)]
struct NextReminderLine<'a> {
    event_id: EventId,
    title: &'a str,
    fire_at: Option<i64>,
    reason: Option<String>,
}

pub fn next_reminders(command: NextCommand, config: &Config, timezone: Option<&str>) -> Result<()> {
    let reminder_config = config.reminder_config(timezone)?;
    let now = match command.now.as_deref() {
        Some(when) => parse_when(when, &reminder_config.timezone)?,
        None => Utc::now().timestamp(),
    };

    let store = load_events(command.events.as_deref(), config)?;
    let events = select_events(&store, command.id)?;

    let tz = reminder_config.timezone;
    let resolver = NextReminderResolver::new(reminder_config);
    let views: Vec<ViewReminder> = events
        .into_iter()
        .map(|event| {
            let resolution = resolver.resolve_at(&event, now);
            ViewReminder { event, resolution }
        })
        .collect();

    if command.json {
        for view in &views {
            let line = NextReminderLine {
                event_id: view.event.id,
                title: &view.event.title,
                fire_at: view.resolution.fire_at(),
                reason: match view.resolution {
                    Resolution::Due(_) => None,
                    Resolution::NoReminderDue(reason) => Some(reason.to_string()),
                },
            };
            println!("{}", serde_json::to_string(&line)?);
        }
    } else {
        display_reminders(&views, now, &tz);
    }

    Ok(())
}
