use anyhow::Result;
use chime_core::models::Event;
use chime_core::reminder::{NextReminderResolver, Resolution};
use chime_core::scheduler::{AlarmScheduler, SystemClock, TokioTimerService};
use chime_core::service::{Notifier, ReminderService};
use chime_core::timezone::format_timestamp;
use chrono_tz::Tz;
use owo_colors::OwoColorize;
use std::sync::Arc;

use crate::cli::WatchCommand;
use crate::config::Config;
use crate::util::load_events;

/// Prints delivered reminders to stdout.
struct TerminalNotifier {
    timezone: Tz,
}

impl Notifier for TerminalNotifier {
    fn notify(&self, event: &Event, fired_at_millis: i64) {
        let at = format_timestamp(fired_at_millis.div_euclid(1000), &self.timezone, "%H:%M:%S")
            .unwrap_or_default();
        let title = if event.title.is_empty() { "(untitled)" } else { event.title.as_str() };
        let starts = format_timestamp(event.start_ts, &self.timezone, "%H:%M").unwrap_or_default();
        println!(
            "{} [{}] {} (event {}, starts at {})",
            "Reminder:".bold().yellow(),
            at,
            title.bold(),
            event.id,
            starts
        );
    }
}

pub async fn watch_events(command: WatchCommand, config: &Config, timezone: Option<&str>) -> Result<()> {
    let reminder_config = config.reminder_config(timezone)?;
    let store = Arc::new(load_events(command.events.as_deref(), config)?);
    let tz = reminder_config.timezone;

    let (timers, mut fired) = TokioTimerService::new();
    let service = ReminderService::new(
        store,
        NextReminderResolver::new(reminder_config),
        AlarmScheduler::new(timers, SystemClock),
        TerminalNotifier { timezone: tz },
    );

    for (id, resolution) in service.schedule_all().await? {
        match resolution {
            Resolution::Due(request) => println!(
                "{} event {} at {}",
                "Scheduled".green(),
                id,
                format_timestamp(request.fire_at, &tz, "%Y-%m-%d %H:%M %Z").unwrap_or_default()
            ),
            Resolution::NoReminderDue(reason) => {
                println!("{} event {}: {}", "Skipped".dimmed(), id, reason)
            }
        }
    }

    if service.pending() == 0 {
        println!("No reminders to wait for.");
        return Ok(());
    }

    println!("Waiting for {} reminder(s). Press Ctrl-C to stop.", service.pending());
    tokio::select! {
        delivered = service.run(&mut fired) => {
            println!("Delivered {} reminder(s); nothing left to schedule.", delivered);
        }
        _ = tokio::signal::ctrl_c() => {
            println!("Stopped.");
        }
    }

    Ok(())
}
