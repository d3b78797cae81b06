//! Account repository
//!
//! One document per account in the `account` collection, unique on the
//! `account` handle.

use super::DbError;
use crate::models::Account;
use crate::store::{from_document, to_document, DocumentStore, Filter, FindOptions, StoreError, Update};

/// Collection holding account documents
pub const ACCOUNT_COLLECTION: &str = "account";

const HANDLE_FIELD: &str = "account";
const USER_ID_FIELD: &str = "userId";
const TOKEN_FIELD: &str = "token";

/// Account repository
pub struct AccountRepo<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> AccountRepo<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Declare the unique handle index. Run once at startup.
    pub async fn ensure_indexes(&self) -> Result<(), DbError> {
        self.store.ensure_unique(ACCOUNT_COLLECTION, HANDLE_FIELD).await?;
        self.store.ensure_unique(ACCOUNT_COLLECTION, USER_ID_FIELD).await?;
        Ok(())
    }

    /// Insert an account. Returns `Ok(false)` when the handle is taken.
    pub async fn insert(&self, account: &Account) -> Result<bool, DbError> {
        match self
            .store
            .insert_one(ACCOUNT_COLLECTION, to_document(account)?)
            .await
        {
            Ok(()) => Ok(true),
            Err(StoreError::Duplicate { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_handle(&self, handle: &str) -> Result<Option<Account>, DbError> {
        let doc = self
            .store
            .find_one(ACCOUNT_COLLECTION, &Filter::by(HANDLE_FIELD, handle), &FindOptions::new())
            .await?;

        match doc {
            Some(doc) => Ok(Some(from_document(doc)?)),
            None => Ok(None),
        }
    }

    /// Record the most recently issued token on the account document.
    pub async fn set_token(&self, user_id: &str, token: &str) -> Result<(), DbError> {
        let result = self
            .store
            .update_one(
                ACCOUNT_COLLECTION,
                &Filter::by(USER_ID_FIELD, user_id),
                &Update::set(TOKEN_FIELD, token),
            )
            .await?;

        if result.matched == 0 {
            return Err(DbError::NotFound {
                resource: "account",
                id: user_id.to_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryDocumentStore;

    fn account(user_id: &str, handle: &str) -> Account {
        Account {
            user_id: user_id.into(),
            account: handle.into(),
            username: format!("{handle} display"),
            password_hash: "$2b$04$not-a-real-hash".into(),
            token: None,
        }
    }

    #[tokio::test]
    async fn duplicate_handle_is_rejected() {
        let store = MemoryDocumentStore::new();
        let repo = AccountRepo::new(&store);
        repo.ensure_indexes().await.unwrap();

        assert!(repo.insert(&account("u1", "alice")).await.unwrap());
        assert!(!repo.insert(&account("u2", "alice")).await.unwrap());
        assert_eq!(store.count(ACCOUNT_COLLECTION).await, 1);
    }

    #[tokio::test]
    async fn token_is_recorded_without_touching_other_fields() {
        let store = MemoryDocumentStore::new();
        let repo = AccountRepo::new(&store);
        repo.insert(&account("u1", "alice")).await.unwrap();

        repo.set_token("u1", "t-1").await.unwrap();
        let found = repo.find_by_handle("alice").await.unwrap().unwrap();
        assert_eq!(found.token.as_deref(), Some("t-1"));
        assert_eq!(found.username, "alice display");
        assert_eq!(found.password_hash, "$2b$04$not-a-real-hash");

        assert!(matches!(
            repo.set_token("missing", "t").await,
            Err(DbError::NotFound { .. })
        ));
        assert!(repo.find_by_handle("bob").await.unwrap().is_none());
    }
}
