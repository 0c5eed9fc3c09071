//! Login command - authenticate with phone number and password

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password};
use ewallet_core::domain::LoginForm;
use ewallet_core::services::LogEvent;
use ewallet_core::{Error, OperationResult};

use super::{ensure_interactive, get_context};
use crate::output;

pub fn run(
    phone: Option<String>,
    password: Option<String>,
    country_code: String,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;

    let phone = match phone {
        Some(p) => p,
        None => {
            ensure_interactive("--phone")?;
            Input::new()
                .with_prompt(format!("Phone number ({})", country_code))
                .interact_text()?
        }
    };
    let password = match password {
        Some(p) => p,
        None => {
            ensure_interactive("--password")?;
            Password::new().with_prompt("Password").interact()?
        }
    };

    let form = LoginForm::new(country_code, phone.trim(), password);

    let result = ctx.auth_service.login(&form);

    if json {
        let failed = result.is_err();
        let event = match &result {
            Ok(_) => LogEvent::new("login_succeeded"),
            Err(e) => LogEvent::new("login_failed").with_failure(e),
        };
        ctx.log(event.with_command("login"));

        let op: OperationResult<String> = result.map(|s| s.phone).into();
        println!("{}", serde_json::to_string_pretty(&op)?);
        if failed {
            std::process::exit(1);
        }
        return Ok(());
    }

    match result {
        Ok(session) => {
            ctx.log(LogEvent::new("login_succeeded").with_command("login"));
            println!("\n{} Logged in as {}\n", "✓".green(), session.phone.bold());
            Ok(())
        }
        Err(Error::Validation(errors)) => {
            output::error("Please fix the following:");
            output::field_errors(&errors);
            anyhow::bail!("Login form is invalid")
        }
        Err(e) => {
            ctx.log(
                LogEvent::new("login_failed")
                    .with_command("login")
                    .with_failure(&e),
            );
            Err(e.into())
        }
    }
}
