//! Status command - show session and service endpoints

use anyhow::Result;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use super::get_context;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let status = ctx.status_service.get_status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "eWallet Status".bold());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let logged_in = if status.logged_in {
        "yes".green().to_string()
    } else {
        "no".red().to_string()
    };
    table.add_row(vec!["Logged in".to_string(), logged_in]);
    if let Some(phone) = &status.phone {
        table.add_row(vec!["Phone".to_string(), phone.clone()]);
    }
    if let Some(currency) = &status.currency {
        table.add_row(vec!["Currency".to_string(), currency.clone()]);
    }
    if let Some(expires) = status.expires_at {
        let mut value = expires.format("%Y-%m-%d %H:%M UTC").to_string();
        if status.token_expired {
            value = format!("{} ({})", value, "expired".red());
        }
        table.add_row(vec!["Token expires".to_string(), value]);
    }

    println!("{}", table);
    println!();

    println!("{}", "Services".bold());
    for service in &status.services {
        println!("  • {:<12} {}", service.name, service.url.dimmed());
    }

    if status.token_expired {
        println!();
        println!("{}", "Your session has expired. Run `ew login` again.".yellow());
    }

    Ok(())
}
