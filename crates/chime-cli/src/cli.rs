use clap::{ArgAction, Parser, Subcommand};
use chime_core::models::EventId;
use std::path::PathBuf;

/// Chime: compute and deliver the next reminder of your calendar events
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Timezone for monthly and yearly stepping (IANA format, e.g. 'Europe/Berlin')
    #[arg(long, global = true)]
    pub timezone: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show the next reminder of each event
    Next(NextCommand),
    /// Describe the reminders and repetition of each event
    Describe(DescribeCommand),
    /// Schedule every event and deliver reminders as they fire
    Watch(WatchCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct NextCommand {
    /// JSON file with events (defaults to the configured events file)
    pub events: Option<PathBuf>,
    /// Only resolve this event
    #[arg(long)]
    pub id: Option<EventId>,
    /// Resolve as of this time (epoch seconds, RFC 3339, or e.g. 'tomorrow')
    #[arg(long)]
    pub now: Option<String>,
    /// Print one JSON object per event
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DescribeCommand {
    /// JSON file with events (defaults to the configured events file)
    pub events: Option<PathBuf>,
    /// Only describe this event
    #[arg(long)]
    pub id: Option<EventId>,
}

#[derive(Parser, Debug, Clone)]
pub struct WatchCommand {
    /// JSON file with events (defaults to the configured events file)
    pub events: Option<PathBuf>,
}
