//! Core identity types shared by the auth flow: the verified provider
//! identity, the local blog account, the account store contract, and the
//! registration policy.

mod policy;
mod store;

pub use policy::{AllowedEmails, OpenRegistration, RegistrationPolicy};
pub use store::{AccountStore, InMemoryAccountStore};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The verified result of a provider code exchange.
///
/// Transient: never persisted directly, only consumed to resolve or create a
/// [`BlogAccount`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderIdentity {
    /// Stable, opaque provider-unique identifier (`sub` for Google).
    pub subject: String,
    /// Provider-asserted email address, not independently verified here.
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub picture: Option<String>,
    pub email_verified: Option<bool>,
}

/// The durable local identity record. At most one account exists per
/// provider-unique identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogAccount {
    pub id: Uuid,
    pub username: String,
    pub google_id: String,
}

impl BlogAccount {
    /// Default username for a freshly registered provider identity.
    pub fn default_username(subject: &str) -> String {
        format!("goog{subject}")
    }
}

#[derive(Debug, Error)]
pub enum AccountError {
    /// A local account already exists for this provider identifier.
    #[error("account already linked to this Google identity")]
    AlreadyLinked,

    /// No local account matches the provider identifier (login intent).
    #[error("no account linked to this Google identity")]
    NoSuchAccount,

    /// The backing store failed.
    #[error("account store error: {0}")]
    Store(String),
}

pub type AccountResult<T> = Result<T, AccountError>;
