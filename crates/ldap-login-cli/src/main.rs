//! ldap-login - verify directory credentials from the command line
//!
//! Runs the LDAP login connector against the configured server and prints
//! the resulting profile or the error payload.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::CommandContext;
use ldap_login_core::{LdapLoginConfig, LoggingConfig};
use std::process::ExitCode;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ldap-login")]
#[command(version = ldap_login_core::VERSION)]
#[command(about = "Authenticate users against an LDAP directory", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (TOML); LDAP_* environment variables override it
    #[arg(short, long, global = true, env = "LDAP_LOGIN_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "LDAP_LOGIN_LOG_LEVEL")]
    log_level: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a username and password
    Login {
        /// Login name
        username: String,

        /// Password; read from stdin when not given
        #[arg(long, env = "LDAP_LOGIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Check that the server is reachable and the service bind works
    Check,

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let (mut config, rejected) = load_config(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_logging(&config.logging);
    for msg in &rejected {
        warn!("{}", msg);
    }
    debug!(
        server = %config.ldap.server,
        anonymous = config.ldap.uses_anonymous_bind(),
        "Configuration loaded"
    );

    let ctx = CommandContext {
        config,
        json: cli.json,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Login { username, password } => {
            commands::login::execute(&ctx, &username, password).await
        }
        Commands::Check => commands::check::execute(&ctx).await,
        Commands::Config => commands::config::execute(&ctx),
    }
}

/// Load the configuration; also returns the environment values that were ignored
fn load_config(path: Option<&str>) -> Result<(LdapLoginConfig, Vec<String>)> {
    let mut config = match path {
        Some(path) => LdapLoginConfig::from_file(path)?,
        None => LdapLoginConfig::default(),
    };
    let rejected = config.apply_env();

    Ok((config, rejected))
}

fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    // Logs go to stderr so stdout stays parseable
    if logging.format == "json" {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
}
