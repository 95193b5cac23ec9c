//! CLI command implementations

pub mod check;
pub mod config;
pub mod login;

use colored::Colorize;
use ldap_login_core::{LdapLoginConfig, LoginError};

/// Context passed to all commands
pub struct CommandContext {
    pub config: LdapLoginConfig,
    pub json: bool,
    pub quiet: bool,
}

impl CommandContext {
    /// Print info message if not quiet
    pub fn info(&self, msg: &str) {
        if !self.quiet {
            println!("{}", msg);
        }
    }

    /// Print error message
    pub fn error(&self, msg: &str) {
        eprintln!("{}", msg);
    }

    /// Text shown for a failed connector call: the error payload with
    /// `--json`, a labelled message otherwise
    pub fn render_failure(&self, label: &str, err: &LoginError) -> String {
        if self.json {
            err.to_payload().to_string()
        } else {
            format!("{} {}", label.red().bold(), err)
        }
    }

    /// Print a failure; JSON goes to stdout so it can be piped
    pub fn report_failure(&self, label: &str, err: &LoginError) {
        let rendered = self.render_failure(label, err);
        if self.json {
            println!("{}", rendered);
        } else {
            self.error(&rendered);
        }
    }
}
