//! Login connector
//!
//! Search-then-bind authentication: the service account (or an anonymous
//! session) looks up the entry of the login name, then a second connection
//! binds as that entry with the supplied password.

use crate::directory::{BindCredentials, Directory, DirectoryEntry, DirectorySession, SearchRequest};
use crate::filter::build_search_filter;
use crate::ldap::LdapDirectory;
use ldap_login_core::{LdapSettings, LoginError, ADMIN_ROLE};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

const NO_MATCH: &str = "Username or password incorrect";

/// Profile of an authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginProfile {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub is_admin: bool,
}

impl LoginProfile {
    /// `(username, email, full_name, is_admin)`
    pub fn into_tuple(self) -> (String, String, String, bool) {
        (self.username, self.email, self.full_name, self.is_admin)
    }
}

/// LDAP authentication connector
pub struct LdapConnector<D = LdapDirectory> {
    settings: LdapSettings,
    directory: D,
}

impl LdapConnector<LdapDirectory> {
    /// Create a connector talking to the configured server
    pub fn new(settings: LdapSettings) -> Result<Self, LoginError> {
        let directory = LdapDirectory::new(&settings)?;
        Ok(Self::with_directory(settings, directory))
    }
}

impl<D: Directory> LdapConnector<D> {
    pub fn with_directory(settings: LdapSettings, directory: D) -> Self {
        Self {
            settings,
            directory,
        }
    }

    pub fn settings(&self) -> &LdapSettings {
        &self.settings
    }

    /// Verify `username` and `password` and return the user's profile
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginProfile, LoginError> {
        self.settings.validate()?;

        let mut service = self.open_service_session().await?;
        let result = self.lookup_and_verify(service.as_mut(), username, password).await;
        service.unbind().await;

        match &result {
            Ok(profile) => info!(
                username = %profile.username,
                is_admin = profile.is_admin,
                "LDAP login succeeded"
            ),
            Err(e) => warn!(username = %username, "LDAP login failed: {}", e),
        }

        result
    }

    /// Check that the server is reachable and the service bind works
    pub async fn check(&self) -> Result<(), LoginError> {
        self.settings.validate()?;

        let mut service = self.open_service_session().await?;
        service.unbind().await;

        Ok(())
    }

    fn service_credentials(&self) -> BindCredentials {
        if self.settings.uses_anonymous_bind() {
            BindCredentials::Anonymous
        } else {
            BindCredentials::simple(&self.settings.bind_dn, &self.settings.bind_password)
        }
    }

    async fn open_service_session(&self) -> Result<Box<dyn DirectorySession>, LoginError> {
        let credentials = self.service_credentials();

        let mut session = self
            .directory
            .connect()
            .await
            .map_err(|e| LoginError::Connection(e.to_string()))?;

        if let Err(e) = session.bind(&credentials).await {
            session.unbind().await;
            warn!(bind_dn = %credentials.dn(), "Service bind rejected: {}", e);
            return Err(LoginError::Connection(e.to_string()));
        }

        debug!(anonymous = self.settings.uses_anonymous_bind(), "Service bind succeeded");
        Ok(session)
    }

    async fn lookup_and_verify(
        &self,
        service: &mut dyn DirectorySession,
        username: &str,
        password: &str,
    ) -> Result<LoginProfile, LoginError> {
        let request = SearchRequest {
            base: self.settings.search_base.clone(),
            filter: build_search_filter(&self.settings, username),
            attributes: self.settings.requested_attributes(),
            page_size: self.settings.page_size,
        };

        debug!("Searching for user with filter: {}", request.filter);

        let entries = service
            .search(&request)
            .await
            .map_err(|e| LoginError::InvalidCredentials(e.to_string()))?;

        let entry = entries
            .into_iter()
            .next()
            .ok_or_else(|| LoginError::InvalidCredentials(NO_MATCH.to_string()))?;

        debug!("Found user DN: {}", entry.dn);

        let profile = self.build_profile(&entry, username);

        // An empty password makes a simple bind unauthenticated, which servers accept
        if password.is_empty() {
            return Err(LoginError::InvalidCredentials(NO_MATCH.to_string()));
        }

        self.verify_password(&entry.dn, password).await?;

        Ok(profile)
    }

    async fn verify_password(&self, dn: &str, password: &str) -> Result<(), LoginError> {
        let mut user_session = self
            .directory
            .connect()
            .await
            .map_err(|e| LoginError::InvalidCredentials(e.to_string()))?;

        let result = user_session
            .bind(&BindCredentials::simple(dn, password))
            .await
            .map_err(|e| LoginError::InvalidCredentials(e.to_string()));

        user_session.unbind().await;
        result
    }

    fn build_profile(&self, entry: &DirectoryEntry, username: &str) -> LoginProfile {
        let name = entry.first_value(&self.settings.username_property);

        LoginProfile {
            username: if name.is_empty() {
                username.to_string()
            } else {
                name
            },
            email: entry.first_value(&self.settings.email_property),
            full_name: entry.first_value(&self.settings.full_name_property),
            is_admin: entry.first_value(&self.settings.role_property) == ADMIN_ROLE,
        }
    }
}
