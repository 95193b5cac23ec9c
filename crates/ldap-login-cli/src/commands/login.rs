//! login command - verify credentials and print the profile

use super::CommandContext;
use anyhow::{Context, Result};
use colored::Colorize;
use ldap_login_auth::{LdapConnector, LoginError, LoginProfile};
use std::io::{self, BufRead};
use std::process::ExitCode;

pub async fn execute(
    ctx: &CommandContext,
    username: &str,
    password: Option<String>,
) -> Result<ExitCode> {
    let password = match password {
        Some(p) => p,
        None => read_password(&mut io::stdin().lock())?,
    };

    match authenticate(ctx, username, &password).await {
        Ok(profile) => {
            print_profile(ctx, &profile)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            ctx.report_failure("Login failed:", &e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn authenticate(
    ctx: &CommandContext,
    username: &str,
    password: &str,
) -> Result<LoginProfile, LoginError> {
    let connector = LdapConnector::new(ctx.config.ldap.clone())?;
    connector.login(username, password).await
}

fn print_profile(ctx: &CommandContext, profile: &LoginProfile) -> Result<()> {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(profile)?);
        return Ok(());
    }

    ctx.info(&format!("{}", "Login successful".green().bold()));
    ctx.info(&format!("  {}: {}", "username".cyan(), profile.username));
    ctx.info(&format!("  {}: {}", "email".cyan(), display(&profile.email)));
    ctx.info(&format!("  {}: {}", "full name".cyan(), display(&profile.full_name)));
    ctx.info(&format!("  {}: {}", "admin".cyan(), profile.is_admin));
    Ok(())
}

fn display(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

/// Read one line from `input`, without its line terminator
fn read_password<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;

    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }

    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_password() {
        let mut input = Cursor::new("s3cret\nignored\n");
        assert_eq!(read_password(&mut input).unwrap(), "s3cret");

        let mut input = Cursor::new(" spaced pass \r\n");
        assert_eq!(read_password(&mut input).unwrap(), " spaced pass ");

        let mut input = Cursor::new("");
        assert_eq!(read_password(&mut input).unwrap(), "");
    }

    #[test]
    fn test_display_placeholder() {
        assert_eq!(display(""), "(not set)");
        assert_eq!(display("john@example.com"), "john@example.com");
    }
}
