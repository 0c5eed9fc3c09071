//! Transfer command - move money between wallet, bank and other users

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Confirm, Input, Select};
use ewallet_core::domain::currency::currency_for_phone;
use ewallet_core::domain::{TransactionMethod, TransferForm};
use ewallet_core::services::{LogEvent, TransferOutcome};
use ewallet_core::WalletContext;

use super::{ensure_interactive, get_context, require_phone};
use crate::output;

pub struct TransferArgs {
    pub to: Option<String>,
    pub amount: Option<String>,
    pub method: Option<TransactionMethod>,
    pub yes: bool,
    pub json: bool,
}

fn pick_method() -> Result<TransactionMethod> {
    ensure_interactive("--method")?;
    let labels: Vec<String> = TransactionMethod::ALL.iter().map(|m| m.label()).collect();
    let index = Select::new()
        .with_prompt("Transaction method")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(TransactionMethod::ALL[index])
}

pub fn run(args: TransferArgs) -> Result<()> {
    let ctx = get_context()?;
    execute(&ctx, args, "transfer")
}

/// Shared by `ew transfer` and `ew admin transfer`
pub fn execute(ctx: &WalletContext, args: TransferArgs, command: &str) -> Result<()> {
    let phone = require_phone(ctx)?;

    let method = match args.method {
        Some(m) => m,
        None => pick_method()?,
    };

    // Moving money between one's own accounts needs no receiver
    let receiver = match args.to {
        Some(to) => to,
        None if method.is_self_transfer() => phone.clone(),
        None => {
            ensure_interactive("--to")?;
            Input::new()
                .with_prompt("Receiver phone (e.g. +91-9876543210)")
                .interact_text()?
        }
    };

    let amount = match args.amount {
        Some(a) => a,
        None => {
            ensure_interactive("--amount")?;
            Input::new().with_prompt("Amount").interact_text()?
        }
    };

    let request = match (TransferForm {
        receiver,
        amount,
        method: Some(method),
    })
    .validate()
    {
        Ok(r) => r,
        Err(errors) => {
            output::error("Please fix the following:");
            output::field_errors(&errors);
            anyhow::bail!("Transfer form is invalid");
        }
    };

    let from_currency = currency_for_phone(&phone);
    let to_currency = currency_for_phone(&request.receiver);

    if !args.json {
        println!();
        println!("{}", "Transfer".bold());
        println!("  Method:   {}", method.label());
        println!("  To:       {}", request.receiver);
        println!("  Amount:   {} {}", request.amount, from_currency);
        if from_currency != to_currency {
            println!(
                "  {}",
                format!("Converted from {} to {} by the server", from_currency, to_currency)
                    .dimmed()
            );
        }
        println!();

        if !args.yes {
            ensure_interactive("--yes")?;
            if !Confirm::new()
                .with_prompt("Send this transfer?")
                .default(false)
                .interact()?
            {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
        }
    }

    let spinner = (!args.json).then(|| output::spinner("Processing transfer..."));
    let result = ctx.transaction_service.transfer(&request);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match result {
        Ok(outcome) => {
            let event = if outcome.is_failed() {
                LogEvent::new("transfer_failed").with_error(
                    outcome
                        .message
                        .clone()
                        .unwrap_or_else(|| "Transaction failed".to_string()),
                )
            } else {
                LogEvent::new("transfer_completed")
            };
            ctx.log(event.with_command(command));
            report(&outcome, args.json)
        }
        Err(e) => {
            ctx.log(
                LogEvent::new("transfer_failed")
                    .with_command(command)
                    .with_failure(&e),
            );
            Err(e.into())
        }
    }
}

fn report(outcome: &TransferOutcome, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
    }

    let message = outcome.message.as_deref().unwrap_or("");
    if outcome.is_failed() {
        anyhow::bail!("Transaction failed: {}", message);
    }

    if !json {
        println!(
            "{} Transaction {} ({})",
            "✓".green(),
            outcome.txn_id.bold(),
            outcome.raw_status
        );
        if !message.is_empty() {
            println!("  {}", message);
        }
    }
    Ok(())
}
