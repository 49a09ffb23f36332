//! Registration policies: who is allowed to create a new account.

use crate::ProviderIdentity;
use std::collections::HashSet;

/// Gate over the verified provider identity, consulted before a new account
/// is created under register intent. Injected at startup so alternate
/// policies (domain allow-list, invite codes) can be swapped in without
/// touching the flow controller.
pub trait RegistrationPolicy: Send + Sync {
    fn allows(&self, identity: &ProviderIdentity) -> bool;
}

/// Restricts registration to an allow-listed set of email addresses.
pub struct AllowedEmails {
    emails: HashSet<String>,
}

impl AllowedEmails {
    pub fn new(emails: impl IntoIterator<Item = String>) -> Self {
        Self {
            emails: emails.into_iter().collect(),
        }
    }
}

impl RegistrationPolicy for AllowedEmails {
    fn allows(&self, identity: &ProviderIdentity) -> bool {
        identity
            .email
            .as_deref()
            .is_some_and(|email| self.emails.contains(email))
    }
}

/// Accepts every verified identity.
pub struct OpenRegistration;

impl RegistrationPolicy for OpenRegistration {
    fn allows(&self, _identity: &ProviderIdentity) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(email: Option<&str>) -> ProviderIdentity {
        ProviderIdentity {
            subject: "g-1".to_string(),
            email: email.map(String::from),
            display_name: None,
            picture: None,
            email_verified: Some(true),
        }
    }

    #[test]
    fn test_allowed_emails() {
        let policy = AllowedEmails::new(vec!["rob@robwettach.com".to_string()]);

        assert!(policy.allows(&identity(Some("rob@robwettach.com"))));
        assert!(!policy.allows(&identity(Some("not-allowed@example.com"))));
        assert!(!policy.allows(&identity(None)));
    }

    #[test]
    fn test_open_registration() {
        assert!(OpenRegistration.allows(&identity(None)));
        assert!(OpenRegistration.allows(&identity(Some("anyone@example.com"))));
    }
}
