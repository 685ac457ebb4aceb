use chime_core::error::CoreError;
use chime_core::timezone::suggest_timezone;
use clap::Parser;
use owo_colors::{OwoColorize, Style};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod parser;
mod util;
mod views;

fn init_tracing(config: &config::Config, verbose: u8) {
    let level = match verbose {
        0 => config.log_level.as_str(),
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();
    let config = config::Config::new().unwrap_or_else(|e| {
        eprintln!("{} ignoring invalid configuration: {}", "Warning:".yellow().bold(), e);
        config::Config::default()
    });
    init_tracing(&config, cli.verbose);

    let timezone = cli.timezone.as_deref();
    let result = match cli.command {
        cli::Commands::Next(command) => commands::next::next_reminders(command, &config, timezone),
        cli::Commands::Describe(command) => {
            commands::describe::describe_events(command, &config, timezone)
        }
        cli::Commands::Watch(command) => {
            commands::watch::watch_events(command, &config, timezone).await
        }
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();
    let core_error = err.chain().find_map(|e| e.downcast_ref::<CoreError>());

    match core_error {
        Some(CoreError::NotFound(id)) => {
            eprintln!("{} No event with ID '{}'.", "Error:".style(error_style), id);
        }
        Some(CoreError::InvalidTimezone(tz)) => {
            eprintln!("{} Invalid timezone: {}", "Error:".style(error_style), tz.yellow());
            eprintln!("Did you mean one of these?");
            for suggestion in suggest_timezone(tz) {
                eprintln!("  {}", suggestion);
            }
        }
        Some(CoreError::InvalidInput(s)) => {
            eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
        }
        _ => eprintln!("{} {:#}", "Error:".style(error_style), err),
    }
}
