//! check command - verify connectivity and the service bind

use super::CommandContext;
use anyhow::Result;
use colored::Colorize;
use ldap_login_auth::LdapConnector;
use std::process::ExitCode;

pub async fn execute(ctx: &CommandContext) -> Result<ExitCode> {
    let settings = &ctx.config.ldap;

    let result = match LdapConnector::new(settings.clone()) {
        Ok(connector) => connector.check().await,
        Err(e) => Err(e),
    };

    let bind = if settings.uses_anonymous_bind() {
        "anonymous".to_string()
    } else {
        settings.bind_dn.clone()
    };

    match result {
        Ok(()) => {
            if ctx.json {
                println!(
                    "{}",
                    serde_json::json!({ "success": true, "server": settings.server, "bind": bind })
                );
            } else {
                ctx.info(&format!(
                    "{} {} (bind: {})",
                    "Connection OK:".green().bold(),
                    settings.server,
                    bind
                ));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            ctx.report_failure("Check failed:", &e);
            Ok(ExitCode::FAILURE)
        }
    }
}
