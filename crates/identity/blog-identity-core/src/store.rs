//! Account store contract and the in-memory implementation.

use crate::{AccountError, AccountResult, BlogAccount};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Lookup/insert contract on the durable account store.
///
/// `insert_if_absent` must be atomic with respect to the uniqueness of the
/// provider identifier: when two callers race to register the same Google
/// identity, exactly one wins and the loser observes
/// [`AccountError::AlreadyLinked`].
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_google_id(&self, google_id: &str) -> AccountResult<Option<BlogAccount>>;

    async fn insert_if_absent(
        &self,
        google_id: &str,
        username: &str,
    ) -> AccountResult<BlogAccount>;

    /// Used by session resumption.
    async fn find_by_id(&self, id: Uuid) -> AccountResult<Option<BlogAccount>>;
}

/// In-memory account store keyed by provider identifier.
pub struct InMemoryAccountStore {
    accounts: Arc<RwLock<HashMap<String, BlogAccount>>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_google_id(&self, google_id: &str) -> AccountResult<Option<BlogAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(google_id).cloned())
    }

    async fn insert_if_absent(
        &self,
        google_id: &str,
        username: &str,
    ) -> AccountResult<BlogAccount> {
        // Check and insert under a single write guard; this is the atomic
        // "insert if no existing row" guarantee.
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(google_id) {
            return Err(AccountError::AlreadyLinked);
        }

        let account = BlogAccount {
            id: Uuid::new_v4(),
            username: username.to_string(),
            google_id: google_id.to_string(),
        };
        accounts.insert(google_id.to_string(), account.clone());
        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> AccountResult<Option<BlogAccount>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = InMemoryAccountStore::new();

        let account = store.insert_if_absent("g-42", "goog-42").await.unwrap();
        assert_eq!(account.google_id, "g-42");
        assert_eq!(account.username, "goog-42");

        let found = store.find_by_google_id("g-42").await.unwrap().unwrap();
        assert_eq!(found.id, account.id);

        let by_id = store.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(by_id.google_id, "g-42");

        assert!(store.find_by_google_id("g-99").await.unwrap().is_none());
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = InMemoryAccountStore::new();

        store.insert_if_absent("g-1", "first").await.unwrap();
        let result = store.insert_if_absent("g-1", "second").await;
        assert!(matches!(result, Err(AccountError::AlreadyLinked)));

        // The winner's row is untouched.
        let found = store.find_by_google_id("g-1").await.unwrap().unwrap();
        assert_eq!(found.username, "first");
    }

    #[tokio::test]
    async fn test_concurrent_insert_has_single_winner() {
        let store = Arc::new(InMemoryAccountStore::new());

        let mut handles = vec![];
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.insert_if_absent("g-race", &format!("user{i}")).await
            }));
        }

        let mut winners = 0;
        let mut losers = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(AccountError::AlreadyLinked) => losers += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(losers, 9);
    }
}
