//! eWallet CLI - your wallet and bank account in the terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::admin::AdminCommands;
use commands::config::ConfigCommands;
use commands::create_account::CreateAccountArgs;
use commands::dashboard::Tab;
use commands::logs::LogsCommands;
use commands::transfer::TransferArgs;
use commands::{admin, config, create_account, dashboard, login, logout, logs, status, transfer};
use ewallet_core::domain::TransactionMethod;
use ewallet_core::Error;

/// eWallet - wallet, bank and transfers in your terminal
#[derive(Parser)]
#[command(name = "ew", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with your phone number and password
    Login {
        /// Phone number digits, without the country code
        #[arg(long, env = "EWALLET_PHONE")]
        phone: Option<String>,
        /// Password
        #[arg(long, env = "EWALLET_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Country dialing code
        #[arg(long, default_value = "+1")]
        country_code: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Log out and forget the stored session
    Logout,

    /// Create a new account
    CreateAccount {
        /// Full name
        #[arg(long)]
        name: Option<String>,
        /// Email address
        #[arg(long)]
        email: Option<String>,
        /// Phone number digits, without the country code
        #[arg(long)]
        phone: Option<String>,
        /// Country dialing code
        #[arg(long, default_value = "+1")]
        country_code: String,
        /// Password
        #[arg(long, env = "EWALLET_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Show session status and service endpoints
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show balances and transaction history
    Dashboard {
        /// Which tab to show
        #[arg(long, value_enum, default_value = "overview")]
        tab: Tab,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send money
    Transfer {
        /// Receiver phone number, e.g. +91-9876543210
        #[arg(long)]
        to: Option<String>,
        /// Amount to send
        #[arg(long)]
        amount: Option<String>,
        /// BANK_TO_WALLET, WALLET_TO_BANK, USER_TO_USER, BANK_TO_PERSON or WALLET_TO_PERSON
        #[arg(long)]
        method: Option<TransactionMethod>,
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Admin tools
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            if e
                .downcast_ref::<Error>()
                .map(|err| err.requires_login())
                .unwrap_or(false)
            {
                eprintln!("Run `ew login` to sign in.");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login {
            phone,
            password,
            country_code,
            json,
        } => login::run(phone, password, country_code, json),
        Commands::Logout => logout::run(),
        Commands::CreateAccount {
            name,
            email,
            phone,
            country_code,
            password,
        } => create_account::run(CreateAccountArgs {
            name,
            email,
            phone,
            country_code,
            password,
        }),
        Commands::Status { json } => status::run(json),
        Commands::Dashboard { tab, json } => dashboard::run(tab, json),
        Commands::Transfer {
            to,
            amount,
            method,
            yes,
            json,
        } => transfer::run(TransferArgs {
            to,
            amount,
            method,
            yes,
            json,
        }),
        Commands::Admin { command } => admin::run(command),
        Commands::Config { command } => config::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
