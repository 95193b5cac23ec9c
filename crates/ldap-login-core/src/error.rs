//! Error types for ldap-login

use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure of a single login attempt.
///
/// The display text is the message handed back to the calling application,
/// see [`LoginError::to_payload`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("Error connecting to LDAP server: {0}")]
    Connection(String),

    #[error("LDAP account or password incorrect: {0}")]
    InvalidCredentials(String),

    #[error("LDAP connector is misconfigured: {0}")]
    Configuration(String),
}

impl LoginError {
    pub fn code(&self) -> &'static str {
        match self {
            LoginError::Connection(_) => "LdapConnectionError",
            LoginError::InvalidCredentials(_) => "LdapInvalidCredentials",
            LoginError::Configuration(_) => "LdapConfigurationError",
        }
    }

    pub fn error_message(&self) -> String {
        self.to_string()
    }

    /// Error body in the shape the authentication pipeline expects
    pub fn to_payload(&self) -> serde_json::Value {
        json!({ "error_message": self.error_message() })
    }

    pub fn is_credentials_error(&self) -> bool {
        matches!(self, LoginError::InvalidCredentials(_))
    }
}

impl From<Error> for LoginError {
    fn from(err: Error) -> Self {
        match err {
            Error::Config(msg) | Error::InvalidArgument(msg) => LoginError::Configuration(msg),
            other => LoginError::Configuration(other.to_string()),
        }
    }
}
