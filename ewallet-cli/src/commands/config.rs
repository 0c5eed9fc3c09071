//! Config command - show and change service endpoints

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use ewallet_core::config::{Config, ServiceName};

use super::get_ewallet_dir;
use crate::output::create_table;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the resolved configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change the base URL of one service
    SetUrl {
        /// Service name (user, wallet, bank, transaction)
        service: ServiceName,
        /// Base URL, e.g. http://localhost:8083/wallet
        url: String,
    },
}

pub fn run(command: ConfigCommands) -> Result<()> {
    let ewallet_dir = get_ewallet_dir()?;

    match command {
        ConfigCommands::Show { json } => {
            let config = Config::load(&ewallet_dir)?;
            if json {
                let services: serde_json::Map<String, serde_json::Value> = ServiceName::ALL
                    .iter()
                    .map(|s| (s.as_str().to_string(), config.services.get(*s).into()))
                    .collect();
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "directory": ewallet_dir.to_string_lossy(),
                        "services": services,
                        "requestTimeoutSecs": config.request_timeout_secs,
                        "statusPollDelayMs": config.status_poll_delay_ms,
                    }))?
                );
                return Ok(());
            }

            println!("{} {}", "Directory:".bold(), ewallet_dir.display());
            let mut table = create_table();
            table.set_header(vec!["Service", "URL", "Source"]);
            for service in ServiceName::ALL {
                let source = if std::env::var(service.env_var()).is_ok() {
                    service.env_var().to_string()
                } else {
                    "settings".to_string()
                };
                table.add_row(vec![
                    service.as_str().to_string(),
                    config.services.get(service).to_string(),
                    source,
                ]);
            }
            println!("{}", table);
            println!("Request timeout: {}s", config.request_timeout_secs);
            println!("Status poll delay: {}ms", config.status_poll_delay_ms);
        }
        ConfigCommands::SetUrl { service, url } => {
            std::fs::create_dir_all(&ewallet_dir)?;
            // Environment overrides must not leak into the settings file
            let mut config = Config::load_with_env(&ewallet_dir, |_| None)?;
            config.set_service_url(service, &url)?;
            config.save(&ewallet_dir)?;
            println!(
                "{} {} service now at {}",
                "✓".green(),
                service,
                config.services.get(service)
            );
            if std::env::var(service.env_var()).is_ok() {
                println!(
                    "{}",
                    format!("Note: {} is set and takes precedence", service.env_var()).yellow()
                );
            }
        }
    }

    Ok(())
}
