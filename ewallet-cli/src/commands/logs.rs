//! Logs command - failed backend calls and command history

use anyhow::Result;
use chrono::{TimeZone, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use ewallet_core::config::ServiceName;
use ewallet_core::services::{EntryPoint, LogEntry, LogQuery, LogStats, LoggingService};

use super::get_ewallet_dir;
use crate::output::create_table;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent events, newest first
    List {
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Only failures
        #[arg(long)]
        errors: bool,
        /// Only events for one backend service (user, wallet, bank, transaction)
        #[arg(long)]
        service: Option<ServiceName>,
        #[arg(long)]
        json: bool,
    },
    /// Delete old events
    Clear {
        #[arg(long, default_value = "30")]
        older_than_days: u64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        #[arg(long)]
        json: bool,
    },
    /// Failure counts per service
    Stats {
        #[arg(long)]
        json: bool,
    },
}

fn open_log() -> Result<LoggingService> {
    LoggingService::new(&get_ewallet_dir()?, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

fn format_ms(ms: i64) -> String {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}

fn status_cell(entry: &LogEntry) -> String {
    match (entry.http_status, entry.error_kind.as_deref()) {
        (Some(status), _) if status >= 500 => status.to_string().red().to_string(),
        (Some(status), _) => status.to_string().yellow().to_string(),
        (None, Some(kind)) => kind.red().to_string(),
        (None, None) if entry.is_error() => "failed".red().to_string(),
        (None, None) => "ok".green().to_string(),
    }
}

pub fn run(command: LogsCommands) -> Result<()> {
    match command {
        LogsCommands::List {
            limit,
            errors,
            service,
            json,
        } => {
            let mut query = LogQuery::recent(limit);
            if errors {
                query = query.errors_only();
            }
            if let Some(service) = service {
                query = query.for_service(service);
            }
            let entries = open_log()?.query(&query)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }
            if entries.is_empty() {
                println!("No log entries found.");
                return Ok(());
            }

            let mut table = create_table();
            table.set_header(vec!["Time", "Event", "Command", "Service", "Status", "Message"]);
            for entry in &entries {
                table.add_row(vec![
                    format_ms(entry.logged_at),
                    entry.event.clone(),
                    entry.command.clone().unwrap_or_default(),
                    entry.service.clone().unwrap_or_default(),
                    status_cell(entry),
                    entry.error_message.clone().unwrap_or_default(),
                ]);
            }
            println!("{}", table);
        }
        LogsCommands::Clear {
            older_than_days,
            force,
            json,
        } => {
            let log = open_log()?;

            if !force && !json {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete log entries older than {} days?", older_than_days))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let deleted = log.delete_older_than(older_than_days)?;
            if json {
                println!("{}", serde_json::json!({ "deleted": deleted }));
            } else {
                println!("Deleted {} log entries", deleted);
            }
        }
        LogsCommands::Stats { json } => {
            let log = open_log()?;
            let stats = log.stats()?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "stats": stats,
                        "database_path": log.db_path().to_string_lossy(),
                    }))?
                );
            } else {
                print_stats(&stats);
                println!("  Database: {}", log.db_path().display());
            }
        }
    }

    Ok(())
}

fn print_stats(stats: &LogStats) {
    println!("{}", "Event log".bold());
    println!("  Events:   {}", stats.total);
    println!("  Failures: {}", stats.errors);
    if let (Some(oldest), Some(newest)) = (stats.oldest, stats.newest) {
        println!("  Range:    {} to {}", format_ms(oldest), format_ms(newest));
    }

    if stats.services.is_empty() {
        println!("\n{}", "No failed backend calls recorded.".dimmed());
        return;
    }

    let mut table = create_table();
    table.set_header(vec![
        "Service",
        "Failures",
        "Session expired",
        "Server errors",
        "Unreachable",
        "Last failure",
    ]);
    for s in &stats.services {
        table.add_row(vec![
            s.service.clone(),
            s.failures.to_string(),
            s.session_expired.to_string(),
            s.server_errors.to_string(),
            s.unreachable.to_string(),
            format_ms(s.last_failure),
        ]);
    }
    println!();
    println!("{}", table);
}
