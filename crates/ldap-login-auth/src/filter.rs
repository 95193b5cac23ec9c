//! Search filter construction

use ldap3::ldap_escape;
use ldap_login_core::{LdapSettings, USERNAME_PLACEHOLDER};

/// Build the filter used to find the directory entry of `username`.
///
/// The login name is escaped; suffix and configured filters are used verbatim.
pub fn build_search_filter(settings: &LdapSettings, username: &str) -> String {
    let escaped = ldap_escape(username);

    if let Some(template) = settings.custom_filter() {
        return template.replace(USERNAME_PLACEHOLDER, &escaped);
    }

    let filter = format!(
        "({}={}{})",
        settings.search_property, escaped, settings.search_suffix
    );

    if settings.search_filter.is_empty() {
        filter
    } else {
        format!("(&{}({}))", filter, settings.search_filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> LdapSettings {
        LdapSettings {
            search_property: "uid".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_filter() {
        assert_eq!(build_search_filter(&settings(), "john"), "(uid=john)");
    }

    #[test]
    fn test_suffix_is_appended() {
        let s = LdapSettings {
            search_property: "userPrincipalName".to_string(),
            search_suffix: "@corp.example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(
            build_search_filter(&s, "john"),
            "(userPrincipalName=john@corp.example.com)"
        );
    }

    #[test]
    fn test_extra_filter_is_anded() {
        let s = LdapSettings {
            search_filter: "objectClass=person".to_string(),
            ..settings()
        };
        assert_eq!(
            build_search_filter(&s, "john"),
            "(&(uid=john)(objectClass=person))"
        );
    }

    #[test]
    fn test_custom_filter_overrides() {
        let s = LdapSettings {
            search_filter: "objectClass=person".to_string(),
            search_custom_filter: Some("(|(uid={username})(mail={username}))".to_string()),
            ..settings()
        };
        assert_eq!(
            build_search_filter(&s, "john"),
            "(|(uid=john)(mail=john))"
        );
    }

    #[test]
    fn test_blank_custom_filter_is_ignored() {
        let s = LdapSettings {
            search_custom_filter: Some("  ".to_string()),
            ..settings()
        };
        assert_eq!(build_search_filter(&s, "john"), "(uid=john)");
    }

    #[test]
    fn test_username_is_escaped() {
        assert_eq!(
            build_search_filter(&settings(), "*)(uid=*"),
            "(uid=\\2a\\29\\28uid=\\2a)"
        );

        let s = LdapSettings {
            search_custom_filter: Some("(cn={username})".to_string()),
            ..settings()
        };
        assert_eq!(build_search_filter(&s, "a\\b"), "(cn=a\\5cb)");
    }
}
