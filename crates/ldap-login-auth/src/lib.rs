//! LDAP login connector
//!
//! Verifies a username and password against an LDAP directory:
//! - bind with a service account (or anonymously)
//! - search the directory for the login name
//! - re-bind as the entry found to verify the password
//! - return the profile attributes of that entry

pub mod connector;
pub mod directory;
pub mod filter;
pub mod ldap;

pub use connector::{LdapConnector, LoginProfile};
pub use directory::{
    BindCredentials, Directory, DirectoryEntry, DirectoryError, DirectorySession, SearchRequest,
};
pub use filter::build_search_filter;
pub use ldap::LdapDirectory;
pub use ldap_login_core::{LdapSettings, LoginError};
