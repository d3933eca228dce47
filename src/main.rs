use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand};
use scheduler_core::{Config, Event};
use scheduler_teamup::TeamupCalendar;
use tokio_util::sync::CancellationToken;

/// Operate a room's Teamup calendar from the command line.
#[derive(Debug, Parser)]
#[command(name = "scheduler", version, about)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the events scheduled in the room
    Events,
    /// Schedule a new event in the room
    Create {
        #[arg(long)]
        title: String,
        /// Start time, RFC 3339 (e.g. 2024-01-01T09:00:00-07:00)
        #[arg(long, value_parser = parse_time)]
        start: DateTime<FixedOffset>,
        /// End time, RFC 3339
        #[arg(long, value_parser = parse_time)]
        end: DateTime<FixedOffset>,
    },
    /// Print the Teamup sub-calendar id of the room
    Subcalendar,
}

fn parse_time(s: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(s).map_err(|e| format!("invalid RFC 3339 time {:?}: {}", s, e))
}

/// The adapter does not validate times, so reject empty or inverted ranges here.
fn build_event(
    title: String,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
) -> Result<Event> {
    let event = Event::new(title, start, end);
    if event.duration() <= chrono::Duration::zero() {
        anyhow::bail!("Event must end after it starts");
    }
    Ok(event)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    scheduler_core::init()?;

    let (config, _) = Config::load_validated(cli.config.as_deref())?;
    let calendar = TeamupCalendar::from_config(&config.teamup)
        .context("Failed to set up Teamup calendar")?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling request");
            on_interrupt.cancel();
        }
    });

    match cli.command {
        Command::Events => {
            let events = calendar
                .get_events(&cancel)
                .await
                .context("Failed to list events")?;

            if events.is_empty() {
                println!("No events scheduled in {}", config.teamup.room_id);
            }
            for event in events {
                println!(
                    "{}  {}  {}",
                    event.start_time.to_rfc3339(),
                    event.end_time.to_rfc3339(),
                    event.title
                );
            }
        }
        Command::Create { title, start, end } => {
            let event = build_event(title, start, end)?;

            calendar
                .create_event(&cancel, &event)
                .await
                .context("Failed to create event")?;

            println!("Created {:?} in {}", event.title, config.teamup.room_id);
        }
        Command::Subcalendar => {
            let id = calendar
                .subcalendar_id(&cancel)
                .await
                .context("Failed to resolve room")?;
            println!("{}", id);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create() {
        let cli = Cli::try_parse_from([
            "scheduler",
            "create",
            "--title",
            "Standup",
            "--start",
            "2024-01-01T09:00:00Z",
            "--end",
            "2024-01-01T09:15:00Z",
        ])
        .unwrap();

        let Command::Create { title, start, end } = cli.command else {
            unreachable!("expected the create subcommand");
        };
        assert_eq!(title, "Standup");
        assert!(start < end);
    }

    #[test]
    fn test_rejects_bad_time() {
        let result = Cli::try_parse_from([
            "scheduler",
            "create",
            "--title",
            "x",
            "--start",
            "tomorrow",
            "--end",
            "2024-01-01T09:15:00Z",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli =
            Cli::try_parse_from(["scheduler", "events", "--config", "/tmp/scheduler.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/scheduler.toml")));
        assert!(matches!(cli.command, Command::Events));
    }

    #[test]
    fn test_build_event_rejects_empty_or_inverted_range() {
        let nine = parse_time("2024-01-01T09:00:00Z").unwrap();
        let quarter_past = parse_time("2024-01-01T09:15:00Z").unwrap();

        assert!(build_event("ok".into(), nine, quarter_past).is_ok());
        assert!(build_event("empty".into(), nine, nine).is_err());
        assert!(build_event("inverted".into(), quarter_past, nine).is_err());

        // Same instant expressed with a different offset is still empty.
        let nine_in_denver = parse_time("2024-01-01T02:00:00-07:00").unwrap();
        assert!(build_event("offset".into(), nine, nine_in_denver).is_err());
    }
}
