//! Create-account command - register a new user

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password};
use ewallet_core::domain::forms::password_checklist;
use ewallet_core::domain::RegistrationForm;
use ewallet_core::services::LogEvent;
use ewallet_core::Error;

use super::{ensure_interactive, get_context};
use crate::output;

pub struct CreateAccountArgs {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub country_code: String,
    pub password: Option<String>,
}

fn prompt_missing(value: Option<String>, flag: &str, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => {
            ensure_interactive(flag)?;
            Ok(Input::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()?)
        }
    }
}

fn print_checklist(password: &str) {
    println!("{}", "Password strength".bold());
    for item in password_checklist(password) {
        let mark = if item.fulfilled {
            "✓".green()
        } else {
            "✗".red()
        };
        println!("  {} {}", mark, item.label);
    }
    println!();
}

pub fn run(args: CreateAccountArgs) -> Result<()> {
    let ctx = get_context()?;

    let name = prompt_missing(args.name, "--name", "Full name")?;
    let email = prompt_missing(args.email, "--email", "Email")?;
    let phone = prompt_missing(
        args.phone,
        "--phone",
        &format!("Phone number ({})", args.country_code),
    )?;
    let password = match args.password {
        Some(p) => p,
        None => {
            ensure_interactive("--password")?;
            Password::new()
                .with_prompt("Password")
                .with_confirmation("Confirm password", "Passwords do not match")
                .allow_empty_password(true)
                .interact()?
        }
    };

    print_checklist(&password);

    let form = RegistrationForm {
        name,
        email,
        country_code: args.country_code,
        phone_number: phone.trim().to_string(),
        password,
    };

    match ctx.auth_service.register(&form) {
        Ok(message) => {
            ctx.log(LogEvent::new("account_created").with_command("create-account"));
            println!("{} {}", "✓".green(), message);
            output::info(&format!(
                "Log in with: ew login --country-code {} --phone {}",
                form.country_code, form.phone_number
            ));
            Ok(())
        }
        Err(Error::Validation(errors)) => {
            output::error("Please fix the following:");
            output::field_errors(&errors);
            anyhow::bail!("{} field(s) need attention", errors.len())
        }
        Err(e) => {
            ctx.log(
                LogEvent::new("account_creation_failed")
                    .with_command("create-account")
                    .with_failure(&e),
            );
            Err(e.into())
        }
    }
}
