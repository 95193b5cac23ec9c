//! Directory abstraction
//!
//! The login flow talks to the directory through these traits so that the
//! LDAP client library stays behind a single implementation
//! ([`LdapDirectory`](crate::ldap::LdapDirectory)).

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Failure reported by a directory backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("{0}")]
    Connect(String),

    #[error("bind failed: {0}")]
    Bind(String),

    #[error("search failed: {0}")]
    Search(String),
}

/// Identity used for a bind
#[derive(Clone, PartialEq, Eq)]
pub enum BindCredentials {
    Anonymous,
    Simple { dn: String, password: String },
}

impl BindCredentials {
    pub fn simple(dn: impl Into<String>, password: impl Into<String>) -> Self {
        BindCredentials::Simple {
            dn: dn.into(),
            password: password.into(),
        }
    }

    /// DN shown in logs, never the password
    pub fn dn(&self) -> &str {
        match self {
            BindCredentials::Anonymous => "",
            BindCredentials::Simple { dn, .. } => dn,
        }
    }
}

impl fmt::Debug for BindCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindCredentials::Anonymous => f.write_str("Anonymous"),
            BindCredentials::Simple { dn, .. } => f
                .debug_struct("Simple")
                .field("dn", dn)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Subtree search of `base`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub base: String,
    pub filter: String,
    pub attributes: Vec<String>,
    pub page_size: i32,
}

/// One entry returned by a search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub dn: String,
    pub attrs: HashMap<String, Vec<String>>,
    pub bin_attrs: HashMap<String, Vec<Vec<u8>>>,
}

impl DirectoryEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, name: &str, values: &[&str]) -> Self {
        self.attrs.insert(
            name.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    /// First value of attribute `name`, or an empty string.
    ///
    /// Attribute names are matched case-insensitively. Values the client
    /// library could not decode as text are tried as UTF-8 once more.
    pub fn first_value(&self, name: &str) -> String {
        if name.is_empty() {
            return String::new();
        }

        if let Some(value) = lookup(&self.attrs, name).and_then(|v| v.first()) {
            return value.clone();
        }

        lookup(&self.bin_attrs, name)
            .and_then(|v| v.first())
            .and_then(|raw| String::from_utf8(raw.clone()).ok())
            .unwrap_or_default()
    }
}

fn lookup<'a, V>(map: &'a HashMap<String, V>, name: &str) -> Option<&'a V> {
    map.get(name).or_else(|| {
        map.iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    })
}

/// Source of directory sessions
#[async_trait]
pub trait Directory: Send + Sync {
    /// Open a new, unbound connection
    async fn connect(&self) -> Result<Box<dyn DirectorySession>, DirectoryError>;
}

/// One open connection to the directory
#[async_trait]
pub trait DirectorySession: Send {
    async fn bind(&mut self, credentials: &BindCredentials) -> Result<(), DirectoryError>;

    async fn search(
        &mut self,
        request: &SearchRequest,
    ) -> Result<Vec<DirectoryEntry>, DirectoryError>;

    /// Close the connection, errors are ignored
    async fn unbind(&mut self);
}
