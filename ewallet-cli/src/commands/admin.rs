//! Admin commands - user lookup, bank top-ups and the global transaction view

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use ewallet_core::domain::currency::currency_for_phone;
use ewallet_core::domain::forms::parse_amount;
use ewallet_core::domain::{Transaction, TransactionMethod};
use ewallet_core::services::LogEvent;

use super::dashboard::{print_method_breakdown, print_summary, print_transactions};
use super::transfer::{self, TransferArgs};
use super::{get_context, require_phone};
use crate::output::{self, create_table, format_amount};

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Look up a user by phone number
    User {
        /// Phone number, e.g. +91-9876543210
        phone: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add money to your bank account
    AddMoney {
        /// Amount to add
        amount: String,
    },
    /// Send money from the admin account
    Transfer {
        /// Receiver phone number
        #[arg(long)]
        to: Option<String>,
        /// Amount to send
        #[arg(long)]
        amount: Option<String>,
        /// Transaction method
        #[arg(long, default_value = "ADMIN_TO_USER")]
        method: TransactionMethod,
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every transaction in the system
    Transactions {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show wallet and bank balances
    Balances {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: AdminCommands) -> Result<()> {
    let ctx = get_context()?;

    match command {
        AdminCommands::User { phone, json } => {
            let user = ctx.user_service.get_user_by_phone(&phone)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&user)?);
                return Ok(());
            }

            let mut table = create_table();
            table.add_row(vec!["Name".to_string(), user.display_name().to_string()]);
            table.add_row(vec![
                "Phone".to_string(),
                user.phone().unwrap_or("-").to_string(),
            ]);
            table.add_row(vec![
                "Email".to_string(),
                user.email.clone().unwrap_or_else(|| "-".to_string()),
            ]);
            table.add_row(vec![
                "Currency".to_string(),
                currency_for_phone(user.phone().unwrap_or(&phone)).to_string(),
            ]);
            let roles = user.authorities();
            table.add_row(vec![
                "Roles".to_string(),
                if roles.is_empty() { "-".to_string() } else { roles.join(", ") },
            ]);
            println!("{}", table);
        }
        AdminCommands::AddMoney { amount } => {
            let amount = parse_amount(&amount).map_err(|msg| anyhow::anyhow!(msg))?;
            match ctx.balance_service.add_money_to_bank(amount) {
                Ok(reply) => {
                    ctx.log(LogEvent::new("bank_topped_up").with_command("admin add-money"));
                    let reply = if reply.trim().is_empty() {
                        "Money added".to_string()
                    } else {
                        reply
                    };
                    println!("{} {}", "✓".green(), reply);
                }
                Err(e) => {
                    ctx.log(
                        LogEvent::new("bank_top_up_failed")
                            .with_command("admin add-money")
                            .with_failure(&e),
                    );
                    return Err(e.into());
                }
            }
        }
        AdminCommands::Transfer {
            to,
            amount,
            method,
            yes,
            json,
        } => {
            transfer::execute(
                &ctx,
                TransferArgs {
                    to,
                    amount,
                    method: Some(method),
                    yes,
                    json,
                },
                "admin transfer",
            )?;
        }
        AdminCommands::Transactions { json } => {
            let phone = require_phone(&ctx)?;
            let history = ctx.dashboard_service.admin_history()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
                return Ok(());
            }

            let rows: Vec<&Transaction> = history.transactions.iter().collect();
            print_transactions(&rows, &phone);
            print_summary(&history, currency_for_phone(&phone));
            println!();
            println!("{}", "By method".bold());
            print_method_breakdown(&history);
        }
        AdminCommands::Balances { json } => {
            let phone = require_phone(&ctx)?;
            let snapshot = ctx.dashboard_service.snapshot(&phone)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
                return Ok(());
            }

            let mut table = create_table();
            table.set_header(vec!["Account", "Balance"]);
            table.add_row(vec![
                "Wallet".to_string(),
                format_amount(snapshot.wallet.amount, &snapshot.wallet.currency),
            ]);
            table.add_row(vec![
                "Bank".to_string(),
                format_amount(snapshot.bank.amount, &snapshot.bank.currency),
            ]);
            println!("{}", table);
            if !snapshot.user.is_admin() {
                output::warning("This account does not carry an admin role.");
            }
        }
    }

    Ok(())
}
