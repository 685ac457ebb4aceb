use anyhow::Result;

use crate::cli::DescribeCommand;
use crate::config::Config;
use crate::util::{load_events, select_events};
use crate::views::table::display_descriptions;

pub fn describe_events(command: DescribeCommand, config: &Config, timezone: Option<&str>) -> Result<()> {
    let reminder_config = config.reminder_config(timezone)?;
    let store = load_events(command.events.as_deref(), config)?;
    let events = select_events(&store, command.id)?;

    display_descriptions(&events, &reminder_config.timezone);
    Ok(())
}
