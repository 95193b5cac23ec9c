//! ldap-login core library
//!
//! Configuration and error types shared by the LDAP login connector and its CLI.

pub mod config;
pub mod error;

pub use config::{LdapLoginConfig, LdapSettings, LoggingConfig};
pub use error::{Error, LoginError, Result};

/// ldap-login version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Role attribute value that marks an administrator
pub const ADMIN_ROLE: &str = "admin";

/// Placeholder substituted in custom search filters
pub const USERNAME_PLACEHOLDER: &str = "{username}";
