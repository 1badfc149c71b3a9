use std::str::FromStr;

use anyhow::Context;
use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    interval::ReminderInterval,
    notify::{AuthorizationOptions, NotificationFacility},
    scheduling::ReminderScheduler,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetInterval { hours: u32, minutes: u32, seconds: u8 },
    Start,
    Stop,
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut parts = input.split_whitespace();
        let keyword = parts.next().unwrap_or_default().to_ascii_lowercase();

        let command = match keyword.as_str() {
            "interval" => {
                let hours = parse_field(parts.next(), "hours", 23)?;
                let minutes = parse_field(parts.next(), "minutes", 59)?;
                let seconds = parse_field(parts.next(), "seconds", 59)?;
                Command::SetInterval {
                    hours,
                    minutes,
                    seconds: seconds as u8,
                }
            }
            "start" => Command::Start,
            "stop" => Command::Stop,
            "status" => Command::Status,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => anyhow::bail!("Unknown command `{other}`"),
        };

        if let Some(extra) = parts.next() {
            anyhow::bail!("Unexpected trailing input `{extra}`");
        }

        Ok(command)
    }
}

fn parse_field(part: Option<&str>, name: &str, max: u32) -> anyhow::Result<u32> {
    let raw = part.with_context(|| format!("Missing {name}"))?;
    let value: u32 = raw
        .parse()
        .with_context(|| format!("Invalid {name} `{raw}`"))?;
    anyhow::ensure!(value <= max, "{name} must be at most {max}");
    Ok(value)
}

/// Requests notification authorization once per launch. On denial prints a
/// single alert-style message pointing at the system settings; starting
/// reminders stays possible either way.
pub async fn ensure_notification_authorization(facility: &dyn NotificationFacility) -> bool {
    let granted = match facility
        .request_authorization(AuthorizationOptions::all())
        .await
    {
        Ok(granted) => granted,
        Err(error) => {
            log::error!("Notification authorization request failed: {error:#}");
            false
        }
    };

    if !granted {
        println!("Notifications are disabled for this application.");
        println!("Reminders can still be started, but no alerts will be delivered.");
        println!("Enable notifications in your system's notification settings to receive them.");
    }

    granted
}

/// Interactive settings surface: time-of-day and seconds entry, start/stop
/// toggle and a status panel, driven from stdin lines.
pub struct ConsoleInteractionInterface;

impl ConsoleInteractionInterface {
    pub async fn start(
        mut scheduler: ReminderScheduler,
        mut interval: ReminderInterval,
    ) -> anyhow::Result<()> {
        log::info!("Starting console interaction interface");

        print_help();
        println!("Reminder interval: {interval}");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match line.parse::<Command>() {
                Ok(Command::Quit) => break,
                Ok(command) => handle_command(&mut scheduler, &mut interval, command).await,
                Err(error) => {
                    println!("{error:#}. Type `help` to list commands.");
                }
            }
        }

        // Teardown cancels any outstanding registration so no external state
        // survives the scheduler.
        scheduler.stop().await;
        Ok(())
    }
}

async fn handle_command(
    scheduler: &mut ReminderScheduler,
    interval: &mut ReminderInterval,
    command: Command,
) {
    match command {
        Command::SetInterval {
            hours,
            minutes,
            seconds,
        } => match ReminderInterval::from_hms(hours, minutes, seconds) {
            Some(new_interval) => {
                *interval = new_interval;
                println!("Interval set to {interval}");
                if scheduler.is_active() {
                    println!("Takes effect the next time reminders are started.");
                }
            }
            None => println!("Interval out of range."),
        },
        Command::Start => {
            scheduler.start(interval).await;
            println!("Reminders started every {interval}");
        }
        Command::Stop => {
            scheduler.stop().await;
            println!("Reminders stopped.");
        }
        Command::Status => print_status(scheduler, interval),
        Command::Help => print_help(),
        // Handled by the interface loop.
        Command::Quit => {}
    }
}

fn print_status(scheduler: &ReminderScheduler, interval: &ReminderInterval) {
    let status = scheduler.status();
    if status.is_active {
        println!("Reminders active.");
        if let Some(next_fire_at) = status.next_fire_at {
            println!(
                "Next reminder at {}.",
                next_fire_at.with_timezone(&Local).format("%H:%M:%S")
            );
        }
    } else {
        println!("Reminders inactive.");
    }
    println!("Interval: {interval}");
}

fn print_help() {
    println!("Commands:");
    println!("  interval <hours> <minutes> <seconds>   set the reminder interval");
    println!("  start                                  start repeating reminders");
    println!("  stop                                   stop reminders and clear pending notifications");
    println!("  status                                 show the current reminder state");
    println!("  help                                   show this help");
    println!("  quit                                   stop reminders and exit");
}
