use chime_core::models::Event;
use chime_core::reminder::Resolution;
use chime_core::text::reminder_text;
use chime_core::timezone::format_timestamp;
use chrono::Duration;
use chrono_humanize::HumanTime;
use chrono_tz::Tz;
use comfy_table::{Attribute, Cell, Color, Row, Table};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M %Z";

#[derive(Debug, Clone)]
pub struct ViewReminder {
    pub event: Event,
    pub resolution: Resolution,
}

fn format_ts(ts: i64, timezone: &Tz) -> String {
    format_timestamp(ts, timezone, TIME_FORMAT).unwrap_or_else(|| ts.to_string())
}

fn event_name(event: &Event) -> String {
    let mut name = String::new();
    if event.repeat_interval.is_recurring() {
        name.push('↻'); // Recurring symbol
        name.push(' ');
    }
    if event.title.is_empty() {
        name.push_str("(untitled)");
    } else {
        name.push_str(&event.title);
    }
    name
}

pub fn display_reminders(reminders: &[ViewReminder], now: i64, timezone: &Tz) {
    if reminders.is_empty() {
        println!("No events found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Event", "Repeats", "Next reminder", "When"]);

    for view in reminders {
        let mut row = Row::new();
        row.add_cell(Cell::new(view.event.id));
        row.add_cell(Cell::new(event_name(&view.event)));
        row.add_cell(Cell::new(view.event.repeat_interval.description()));

        match view.resolution {
            Resolution::Due(request) => {
                row.add_cell(Cell::new(format_ts(request.fire_at, timezone)).fg(Color::Green));
                let relative = HumanTime::from(Duration::seconds(request.fire_at - now));
                row.add_cell(Cell::new(relative.to_string()));
            }
            Resolution::NoReminderDue(reason) => {
                row.add_cell(Cell::new("-").fg(Color::DarkGrey));
                row.add_cell(
                    Cell::new(reason.to_string())
                        .fg(Color::DarkGrey)
                        .add_attribute(Attribute::Italic),
                );
            }
        }
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_descriptions(events: &[Event], timezone: &Tz) {
    if events.is_empty() {
        println!("No events found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Event", "Starts", "Repeats", "Until", "Reminders", "Skipped"]);

    for event in events {
        let reminders = if event.reminders.is_empty() {
            reminder_text(None)
        } else {
            event
                .reminders
                .iter()
                .map(|m| reminder_text(Some(*m)))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let until = if event.repeat_limit == 0 || !event.repeat_interval.is_recurring() {
            "-".to_string()
        } else {
            format_ts(event.repeat_limit, timezone)
        };

        let mut row = Row::new();
        row.add_cell(Cell::new(event.id));
        row.add_cell(Cell::new(event_name(event)));
        row.add_cell(Cell::new(format_ts(event.start_ts, timezone)));
        row.add_cell(Cell::new(event.repeat_interval.description()));
        row.add_cell(Cell::new(until));
        row.add_cell(Cell::new(reminders));
        row.add_cell(Cell::new(event.ignored_occurrences.len()));
        table.add_row(row);
    }

    println!("{table}");
}
