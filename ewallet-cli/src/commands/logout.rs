//! Logout command - forget the stored session

use anyhow::Result;
use colored::Colorize;
use ewallet_core::services::LogEvent;

use super::get_context;

pub fn run() -> Result<()> {
    let ctx = get_context()?;

    let was_logged_in = ctx.session.is_logged_in()?;
    ctx.auth_service.logout()?;
    ctx.log(LogEvent::new("logout").with_command("logout"));

    if was_logged_in {
        println!("{} Logged out", "✓".green());
    } else {
        println!("{}", "Not logged in".dimmed());
    }
    Ok(())
}
