//! LDAP directory backend
//!
//! Implements [`Directory`] with the `ldap3` client. Supports plain LDAP,
//! LDAPS and STARTTLS connections.

use crate::directory::{
    BindCredentials, Directory, DirectoryEntry, DirectoryError, DirectorySession, SearchRequest,
};
use async_trait::async_trait;
use ldap3::controls::PagedResults;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry};
use ldap_login_core::{LdapSettings, LoginError};
use std::time::Duration;
use tracing::debug;

/// Directory reached over the network with `ldap3`
pub struct LdapDirectory {
    url: String,
    start_tls: bool,
    op_timeout: Duration,
    conn_settings: LdapConnSettings,
}

impl LdapDirectory {
    pub fn new(settings: &LdapSettings) -> Result<Self, LoginError> {
        let url = settings.server_url()?;

        // STARTTLS only applies to plain connections
        let start_tls = settings.start_tls && !settings.use_ssl();

        let op_timeout = Duration::from_secs(settings.timeout_seconds);

        let conn_settings = LdapConnSettings::new()
            .set_conn_timeout(op_timeout)
            .set_starttls(start_tls)
            .set_no_tls_verify(settings.skip_tls_verify);

        Ok(Self {
            url,
            start_tls,
            op_timeout,
            conn_settings,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether connections are upgraded with STARTTLS
    pub fn uses_start_tls(&self) -> bool {
        self.start_tls
    }

    /// Limit applied to every bind and search
    pub fn op_timeout(&self) -> Duration {
        self.op_timeout
    }
}

#[async_trait]
impl Directory for LdapDirectory {
    async fn connect(&self) -> Result<Box<dyn DirectorySession>, DirectoryError> {
        debug!("Connecting to LDAP server: {}", self.url);

        let (conn, ldap) = LdapConnAsync::with_settings(self.conn_settings.clone(), &self.url)
            .await
            .map_err(|e| DirectoryError::Connect(e.to_string()))?;

        ldap3::drive!(conn);

        Ok(Box::new(LdapSession {
            ldap,
            timeout: self.op_timeout,
        }))
    }
}

struct LdapSession {
    ldap: Ldap,
    timeout: Duration,
}

#[async_trait]
impl DirectorySession for LdapSession {
    async fn bind(&mut self, credentials: &BindCredentials) -> Result<(), DirectoryError> {
        let (dn, password) = match credentials {
            BindCredentials::Anonymous => ("", ""),
            BindCredentials::Simple { dn, password } => (dn.as_str(), password.as_str()),
        };

        self.ldap
            .with_timeout(self.timeout)
            .simple_bind(dn, password)
            .await
            .map_err(|e| DirectoryError::Bind(e.to_string()))?
            .success()
            .map_err(|e| DirectoryError::Bind(e.to_string()))?;

        Ok(())
    }

    async fn search(
        &mut self,
        request: &SearchRequest,
    ) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        let paging = PagedResults {
            size: request.page_size,
            cookie: Vec::new(),
        };

        let (rs, _res) = self
            .ldap
            .with_controls(paging)
            .with_timeout(self.timeout)
            .search(
                &request.base,
                Scope::Subtree,
                &request.filter,
                &request.attributes,
            )
            .await
            .map_err(|e| DirectoryError::Search(e.to_string()))?
            .success()
            .map_err(|e| DirectoryError::Search(e.to_string()))?;

        Ok(rs
            .into_iter()
            .map(|result| {
                let entry = SearchEntry::construct(result);
                DirectoryEntry {
                    dn: entry.dn,
                    attrs: entry.attrs,
                    bin_attrs: entry.bin_attrs,
                }
            })
            .collect())
    }

    async fn unbind(&mut self) {
        let _ = self.ldap.unbind().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_directory_url_from_settings() {
        let settings = LdapSettings {
            server: "ldap.example.com".to_string(),
            port: Some(389),
            ..Default::default()
        };

        let directory = LdapDirectory::new(&settings).unwrap();
        assert_eq!(directory.url(), "ldap://ldap.example.com:389");
    }

    #[test]
    fn test_start_tls_only_for_plain_connections() {
        let mut settings = LdapSettings {
            server: "ldap://ldap.example.com".to_string(),
            start_tls: true,
            timeout_seconds: 7,
            ..Default::default()
        };

        let directory = LdapDirectory::new(&settings).unwrap();
        assert!(directory.uses_start_tls());
        assert_eq!(directory.op_timeout(), Duration::from_secs(7));

        settings.server = "ldaps://ldap.example.com".to_string();
        let directory = LdapDirectory::new(&settings).unwrap();
        assert!(!directory.uses_start_tls());

        settings.server = "ldap://ldap.example.com".to_string();
        settings.start_tls = false;
        let directory = LdapDirectory::new(&settings).unwrap();
        assert!(!directory.uses_start_tls());
    }

    #[test]
    fn test_invalid_server_is_configuration_error() {
        let settings = LdapSettings {
            server: "http://ldap.example.com".to_string(),
            ..Default::default()
        };

        match LdapDirectory::new(&settings) {
            Err(LoginError::Configuration(_)) => {}
            other => panic!("unexpected result: {:?}", other.map(|d| d.url().to_string())),
        }
    }

    #[tokio::test]
    async fn test_connect_failure_is_reported() {
        // Port 1 on loopback is not expected to accept connections
        let settings = LdapSettings {
            server: "ldap://127.0.0.1:1".to_string(),
            timeout_seconds: 2,
            ..Default::default()
        };

        let directory = LdapDirectory::new(&settings).unwrap();
        match directory.connect().await {
            Err(DirectoryError::Connect(_)) => {}
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("connection to a closed port succeeded"),
        }
    }

    #[tokio::test]
    async fn test_bind_times_out_on_silent_server() {
        // Accepts TCP connections and never answers
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((sock, _)) = listener.accept().await {
                held.push(sock);
            }
        });

        let settings = LdapSettings {
            server: format!("ldap://{}", addr),
            timeout_seconds: 1,
            ..Default::default()
        };

        let directory = LdapDirectory::new(&settings).unwrap();
        let mut session = directory.connect().await.unwrap();

        let result = tokio::time::timeout(
            Duration::from_secs(10),
            session.bind(&BindCredentials::simple("cn=reader,dc=example,dc=com", "reader")),
        )
        .await
        .expect("bind was not limited by the operation timeout");

        match result {
            Err(DirectoryError::Bind(_)) => {}
            other => panic!("unexpected bind result: {:?}", other),
        }
    }
}
