//! Dashboard command - balances, profile and transaction history

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use ewallet_core::domain::currency::currency_for_phone;
use ewallet_core::domain::{Transaction, TransactionMethod, TxnStatus};
use ewallet_core::services::{DashboardSnapshot, History, LogEvent};

use super::{get_context, require_phone};
use crate::output::{self, create_table, format_amount, format_datetime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Tab {
    Overview,
    Wallet,
    Bank,
    Transactions,
}

pub fn run(tab: Tab, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let phone = require_phone(&ctx)?;

    let snapshot = match ctx.dashboard_service.snapshot(&phone) {
        Ok(s) => s,
        Err(e) => {
            ctx.log(
                LogEvent::new("dashboard_failed")
                    .with_command("dashboard")
                    .with_failure(&e),
            );
            return Err(e.into());
        }
    };

    // History failures are reported but do not hide balances
    let history = ctx.dashboard_service.history();

    if json {
        let history_json = match &history {
            Ok(h) => serde_json::to_value(h)?,
            Err(e) => serde_json::json!({ "error": e.to_string() }),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "snapshot": snapshot,
                "history": history_json,
            }))?
        );
        return Ok(());
    }

    match tab {
        Tab::Overview => print_overview(&snapshot),
        Tab::Wallet => {
            print_balance_header("Wallet", &snapshot, snapshot.wallet.amount);
            if let Ok(h) = &history {
                print_transactions(&h.wallet_only(), &phone);
            }
        }
        Tab::Bank => {
            print_balance_header("Bank", &snapshot, snapshot.bank.amount);
            if let Ok(h) = &history {
                print_transactions(&h.bank_only(), &phone);
            }
        }
        Tab::Transactions => {
            if let Ok(h) = &history {
                let all: Vec<&Transaction> = h.transactions.iter().collect();
                print_transactions(&all, &phone);
                print_summary(h, &snapshot.wallet.currency);
            }
        }
    }

    if let Err(e) = history {
        output::warning(&format!("Could not load transactions: {}", e));
    }

    Ok(())
}

fn print_overview(snapshot: &DashboardSnapshot) {
    println!();
    println!("{} {}", "Welcome,".bold(), snapshot.user.display_name().bold());
    if let Some(email) = &snapshot.user.email {
        println!("{}", email.dimmed());
    }
    println!();

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
    table.add_row(vec![
        "Total".bold().to_string(),
        format_amount(snapshot.total(), &snapshot.wallet.currency)
            .bold()
            .to_string(),
    ]);
    println!("{}", table);
}

fn print_balance_header(label: &str, snapshot: &DashboardSnapshot, amount: rust_decimal::Decimal) {
    println!();
    println!(
        "{} {}",
        format!("{} balance:", label).bold(),
        format_amount(amount, &snapshot.wallet.currency).green().bold()
    );
    println!();
}

pub(crate) fn status_cell(status: Option<TxnStatus>) -> String {
    match status {
        Some(TxnStatus::Successful) => "SUCCESSFUL".green().to_string(),
        Some(TxnStatus::Pending) => "PENDING".yellow().to_string(),
        Some(TxnStatus::Failed) => "FAILED".red().to_string(),
        None => "-".dimmed().to_string(),
    }
}

fn direction(tx: &Transaction) -> &'static str {
    if tx.is_debit() {
        "Sent"
    } else if tx.is_credit() {
        "Received"
    } else {
        "-"
    }
}

pub(crate) fn print_transactions(transactions: &[&Transaction], phone: &str) {
    if transactions.is_empty() {
        println!("{}", "No transactions yet.".dimmed());
        return;
    }

    let mut table = create_table();
    table.set_header(vec!["Date", "Type", "Counterparty", "Method", "Amount", "Status"]);

    for tx in transactions {
        let counterparty = if tx.is_debit() {
            tx.receiver.as_deref()
        } else {
            tx.sender.as_deref()
        }
        .unwrap_or("-");

        let currency = if tx.is_debit() {
            tx.from_currency.clone()
        } else {
            tx.to_currency.clone()
        }
        .unwrap_or_else(|| currency_for_phone(phone).to_string());

        let amount = format_amount(tx.amount.unwrap_or_default(), &currency);
        let amount = if tx.is_debit() {
            format!("-{}", amount).red().to_string()
        } else if tx.is_credit() {
            format!("+{}", amount).green().to_string()
        } else {
            amount
        };

        table.add_row(vec![
            format_datetime(tx.created_on),
            direction(tx).to_string(),
            counterparty.to_string(),
            tx.transaction_method
                .map(|m| m.label())
                .unwrap_or_else(|| "-".to_string()),
            amount,
            status_cell(tx.txn_status),
        ]);
    }

    println!("{}", table);
}

pub(crate) fn print_summary(history: &History, currency: &str) {
    let summary = &history.summary;
    println!();
    println!(
        "{} {}   {} {}   {} {}",
        "Sent:".bold(),
        format_amount(summary.total_sent, currency).red(),
        "Received:".bold(),
        format_amount(summary.total_received, currency).green(),
        "Pending:".bold(),
        summary.pending
    );
}

pub(crate) fn print_method_breakdown(history: &History) {
    let mut table = create_table();
    table.set_header(vec!["Method", "Count"]);
    for method in TransactionMethod::ALL {
        let count = history.summary.by_method.get(&method).copied().unwrap_or(0);
        table.add_row(vec![method.label(), count.to_string()]);
    }
    println!("{}", table);
}
