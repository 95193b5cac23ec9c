//! config command - print the effective configuration

use super::CommandContext;
use anyhow::Result;
use std::process::ExitCode;

pub fn execute(ctx: &CommandContext) -> Result<ExitCode> {
    let config = ctx.config.redacted();

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!("{}", toml::to_string_pretty(&config)?);
    }

    if let Err(e) = ctx.config.ldap.validate() {
        ctx.error(&format!("warning: {}", e));
    }

    Ok(ExitCode::SUCCESS)
}
