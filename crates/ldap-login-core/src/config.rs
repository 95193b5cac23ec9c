//! Configuration for ldap-login
//!
//! Settings are read from a TOML file, from `LDAP_*` environment variables,
//! or from a file with the environment layered on top.

use crate::{Error, Result, USERNAME_PLACEHOLDER};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LdapLoginConfig {
    #[serde(default)]
    pub ldap: LdapSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LdapLoginConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay `LDAP_*` environment variables on the current values.
    ///
    /// Returns one message per variable that was set but could not be parsed.
    pub fn apply_env(&mut self) -> Vec<String> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary variable source
    pub fn apply_vars<F>(&mut self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut rejected = Vec::new();
        let ldap = &mut self.ldap;

        if let Some(server) = lookup("LDAP_SERVER") {
            ldap.server = server;
        }
        if let Some(port) = lookup("LDAP_PORT") {
            match port.trim().parse() {
                Ok(p) => ldap.port = Some(p),
                Err(_) => rejected.push(invalid_value("LDAP_PORT", &port)),
            }
        }
        if let Some(v) = lookup("LDAP_START_TLS") {
            ldap.start_tls = parse_flag(&v);
        }
        if let Some(v) = lookup("LDAP_SKIP_TLS_VERIFY") {
            ldap.skip_tls_verify = parse_flag(&v);
        }
        if let Some(timeout) = lookup("LDAP_TIMEOUT") {
            match timeout.trim().parse() {
                Ok(t) => ldap.timeout_seconds = t,
                Err(_) => rejected.push(invalid_value("LDAP_TIMEOUT", &timeout)),
            }
        }
        if let Some(base) = lookup("LDAP_SEARCH_BASE") {
            ldap.search_base = base;
        }
        if let Some(prop) = lookup("LDAP_SEARCH_PROPERTY") {
            ldap.search_property = prop;
        }
        if let Some(suffix) = lookup("LDAP_SEARCH_SUFFIX") {
            ldap.search_suffix = suffix;
        }
        if let Some(filter) = lookup("LDAP_SEARCH_FILTER") {
            ldap.search_filter = filter;
        }
        if let Some(filter) = lookup("LDAP_SEARCH_CUSTOM_FILTER") {
            ldap.search_custom_filter = Some(filter);
        }
        if let Some(dn) = lookup("LDAP_BIND_DN") {
            ldap.bind_dn = dn;
        }
        if let Some(password) = lookup("LDAP_BIND_PASSWORD") {
            ldap.bind_password = password;
        }
        if let Some(prop) = lookup("LDAP_USERNAME_PROPERTY") {
            ldap.username_property = prop;
        }
        if let Some(prop) = lookup("LDAP_ROLE_PROPERTY") {
            ldap.role_property = prop;
        }
        if let Some(prop) = lookup("LDAP_EMAIL_PROPERTY") {
            ldap.email_property = prop;
        }
        if let Some(prop) = lookup("LDAP_FULL_NAME_PROPERTY") {
            ldap.full_name_property = prop;
        }
        if let Some(size) = lookup("LDAP_PAGE_SIZE") {
            match size.trim().parse() {
                Ok(s) => ldap.page_size = s,
                Err(_) => rejected.push(invalid_value("LDAP_PAGE_SIZE", &size)),
            }
        }

        if let Some(level) = lookup("LDAP_LOGIN_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LDAP_LOGIN_LOG_FORMAT") {
            self.logging.format = format;
        }

        rejected
    }

    /// Copy of the configuration that is safe to print
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.ldap.bind_password.is_empty() {
            config.ldap.bind_password = "********".to_string();
        }
        config
    }
}

fn invalid_value(key: &str, value: &str) -> String {
    format!("Ignoring invalid {} value: {}", key, value)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

/// Directory connection and lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LdapSettings {
    /// Server host or URL
    /// Example: "ldap.example.com", "ldap://ldap.example.com:389" or "ldaps://dc.example.com"
    #[serde(default)]
    pub server: String,

    /// Port, used when `server` has none of its own
    #[serde(default)]
    pub port: Option<u16>,

    /// Upgrade plain connections with STARTTLS
    #[serde(default)]
    pub start_tls: bool,

    /// Skip TLS certificate verification (not recommended for production)
    #[serde(default)]
    pub skip_tls_verify: bool,

    /// Timeout in seconds for the connect and for each bind or search
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Base DN for user searches
    /// Example: "ou=people,dc=example,dc=com"
    #[serde(default)]
    pub search_base: String,

    /// Attribute compared with the login name
    /// Example: "uid" or "sAMAccountName"
    #[serde(default)]
    pub search_property: String,

    /// Appended to the login name before searching
    /// Example: "@example.com"
    #[serde(default)]
    pub search_suffix: String,

    /// Additional filter ANDed with the login filter, without outer parentheses
    /// Example: "objectClass=person"
    #[serde(default)]
    pub search_filter: String,

    /// Complete filter template replacing the two settings above
    /// Use {username} as placeholder
    /// Example: "(&(objectClass=person)(|(uid={username})(mail={username})))"
    #[serde(default)]
    pub search_custom_filter: Option<String>,

    /// Service account DN, anonymous bind when empty
    #[serde(default)]
    pub bind_dn: String,

    /// Service account password
    #[serde(default)]
    pub bind_password: String,

    /// Attribute holding the canonical username
    #[serde(default)]
    pub username_property: String,

    /// Attribute holding the role; the value "admin" grants administrator rights
    #[serde(default = "default_role_property")]
    pub role_property: String,

    /// Email attribute
    #[serde(default)]
    pub email_property: String,

    /// Full name attribute
    #[serde(default)]
    pub full_name_property: String,

    /// Page size requested for the user search
    #[serde(default = "default_page_size")]
    pub page_size: i32,
}

fn default_timeout() -> u64 {
    10
}

fn default_role_property() -> String {
    "ou".to_string()
}

fn default_page_size() -> i32 {
    5
}

impl Default for LdapSettings {
    fn default() -> Self {
        Self {
            server: String::new(),
            port: None,
            start_tls: false,
            skip_tls_verify: false,
            timeout_seconds: default_timeout(),
            search_base: String::new(),
            search_property: String::new(),
            search_suffix: String::new(),
            search_filter: String::new(),
            search_custom_filter: None,
            bind_dn: String::new(),
            bind_password: String::new(),
            username_property: String::new(),
            role_property: default_role_property(),
            email_property: String::new(),
            full_name_property: String::new(),
            page_size: default_page_size(),
        }
    }
}

impl LdapSettings {
    /// Whether the server is reached over LDAPS
    pub fn use_ssl(&self) -> bool {
        self.server.trim().to_ascii_lowercase().starts_with("ldaps://")
    }

    pub fn uses_anonymous_bind(&self) -> bool {
        self.bind_dn.is_empty()
    }

    /// Custom filter template, if one is set and not blank
    pub fn custom_filter(&self) -> Option<&str> {
        self.search_custom_filter
            .as_deref()
            .filter(|f| !f.trim().is_empty())
    }

    /// Connection URL built from `server` and `port`
    pub fn server_url(&self) -> Result<String> {
        let server = self.server.trim();
        if server.is_empty() {
            return Err(Error::Config("Server is required".to_string()));
        }

        let raw = if server.contains("://") {
            server.to_string()
        } else {
            format!("ldap://{}", server)
        };

        let mut url = Url::parse(&raw)
            .map_err(|e| Error::Config(format!("Invalid server URL '{}': {}", server, e)))?;

        if url.scheme() != "ldap" && url.scheme() != "ldaps" {
            return Err(Error::Config(format!(
                "Server URL must use ldap:// or ldaps://, got {}://",
                url.scheme()
            )));
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(Error::Config(format!("Server URL has no host: {}", server)));
        }

        if url.port().is_none() {
            if let Some(port) = self.port {
                url.set_port(Some(port))
                    .map_err(|_| Error::Config(format!("Cannot set port on {}", server)))?;
            }
        }

        Ok(url.to_string())
    }

    /// Attributes requested from the directory, in lookup order
    pub fn requested_attributes(&self) -> Vec<String> {
        let mut attrs: Vec<String> = Vec::with_capacity(4);

        for prop in [
            &self.username_property,
            &self.role_property,
            &self.email_property,
            &self.full_name_property,
        ] {
            if prop.is_empty() || attrs.iter().any(|a| a.eq_ignore_ascii_case(prop)) {
                continue;
            }
            attrs.push(prop.clone());
        }

        attrs
    }

    pub fn validate(&self) -> Result<()> {
        self.server_url()?;

        match self.custom_filter() {
            Some(filter) => {
                if !filter.contains(USERNAME_PLACEHOLDER) {
                    return Err(Error::Config(format!(
                        "Custom search filter must contain {} placeholder",
                        USERNAME_PLACEHOLDER
                    )));
                }
            }
            None => {
                if self.search_property.is_empty() {
                    return Err(Error::Config(
                        "Search property or custom search filter is required".to_string(),
                    ));
                }
            }
        }

        if self.page_size <= 0 {
            return Err(Error::Config("Page size must be positive".to_string()));
        }

        if self.timeout_seconds == 0 {
            return Err(Error::Config("Timeout must be at least one second".to_string()));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
