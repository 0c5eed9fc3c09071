//! CLI command implementations

pub mod admin;
pub mod config;
pub mod create_account;
pub mod dashboard;
pub mod login;
pub mod logout;
pub mod logs;
pub mod status;
pub mod transfer;

use std::path::PathBuf;

use anyhow::{Context, Result};
use ewallet_core::services::EntryPoint;
use ewallet_core::WalletContext;

/// Get the ewallet directory from environment or default
pub fn get_ewallet_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("EWALLET_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".ewallet"))
        .context("Could not find home directory; set EWALLET_DIR")
}

/// Build the wallet context over `~/.ewallet`, logging as the CLI
pub fn get_context() -> Result<WalletContext> {
    let ewallet_dir = get_ewallet_dir()?;

    std::fs::create_dir_all(&ewallet_dir)
        .with_context(|| format!("Failed to create ewallet directory: {:?}", ewallet_dir))?;

    WalletContext::open(&ewallet_dir, EntryPoint::Cli).context("Failed to initialize ewallet context")
}

/// Fail instead of prompting when there is no terminal to prompt on
pub fn ensure_interactive(what: &str) -> Result<()> {
    if atty::isnt(atty::Stream::Stdin) {
        anyhow::bail!("{} is required (stdin is not a terminal)", what);
    }
    Ok(())
}

/// Logged-in phone, or a hint to log in
pub fn require_phone(ctx: &WalletContext) -> Result<String> {
    ctx.session
        .phone()?
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Run `ew login` first."))
}
