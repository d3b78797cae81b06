//! Registration, login and logout

use uuid::Uuid;

use super::password::{hash_password, verify_password};
use super::{AuthError, LoginFailure, SessionStore};
use crate::db::AccountRepo;
use crate::models::{Account, AccountHandle, AccountView, ValidationError};
use crate::store::DocumentStore;

/// Validated registration input
#[derive(Debug, Clone)]
pub struct Registration {
    pub account: AccountHandle,
    pub username: String,
    pub password: String,
}

impl Registration {
    pub fn new(account: &str, username: &str, password: &str) -> Result<Self, ValidationError> {
        let account = AccountHandle::new(account)?;
        let username = username.trim();
        if username.is_empty() {
            return Err(ValidationError::Empty { field: "username" });
        }
        if password.is_empty() {
            return Err(ValidationError::Empty { field: "password" });
        }
        Ok(Self {
            account,
            username: username.to_owned(),
            password: password.to_owned(),
        })
    }
}

/// Account operations over a store and the session map
pub struct AccountService<'a> {
    repo: AccountRepo<'a>,
    sessions: &'a SessionStore,
    bcrypt_cost: u32,
}

impl<'a> AccountService<'a> {
    pub fn new(store: &'a dyn DocumentStore, sessions: &'a SessionStore, bcrypt_cost: u32) -> Self {
        Self {
            repo: AccountRepo::new(store),
            sessions,
            bcrypt_cost,
        }
    }

    /// Create an account under a fresh user id.
    pub async fn register(&self, registration: Registration) -> Result<AccountView, AuthError> {
        let password_hash = hash_password(registration.password, self.bcrypt_cost).await?;
        let account = Account {
            user_id: Uuid::new_v4().to_string(),
            account: registration.account.as_str().to_owned(),
            username: registration.username,
            password_hash,
            token: None,
        };

        if !self.repo.insert(&account).await? {
            tracing::info!(account = %account.account, "registration refused: handle taken");
            return Err(AuthError::AlreadyExists {
                account: account.account,
            });
        }

        tracing::info!(account = %account.account, user_id = %account.user_id, "account registered");
        Ok(AccountView::from(account))
    }

    /// Check credentials and issue a session token.
    ///
    /// Session state is only touched once the password has matched, and the
    /// session is dropped again if the token cannot be recorded.
    pub async fn login(&self, handle: &str, password: &str) -> Result<AccountView, AuthError> {
        let account = self
            .repo
            .find_by_handle(handle.trim())
            .await?
            .ok_or(AuthError::AuthenticationFailed(LoginFailure::UnknownAccount))?;

        if !verify_password(password.to_owned(), account.password_hash.clone()).await? {
            tracing::info!(account = %account.account, "login refused: wrong password");
            return Err(AuthError::AuthenticationFailed(LoginFailure::WrongPassword));
        }

        let session = self.sessions.issue(&account.user_id, &account.account).await;
        if let Err(e) = self.repo.set_token(&account.user_id, &session.token).await {
            self.sessions.revoke(&session.token).await;
            return Err(e.into());
        }

        tracing::info!(account = %account.account, "login");
        Ok(AccountView {
            token: Some(session.token),
            ..AccountView::from(account)
        })
    }

    /// Revoke `token` if given. Unknown tokens are ignored.
    pub async fn logout(&self, token: Option<&str>) {
        if let Some(token) = token {
            let revoked = self.sessions.revoke(token).await;
            let remaining = self.sessions.len().await;
            tracing::debug!(revoked, remaining, "logout");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DbError, ACCOUNT_COLLECTION};
    use crate::store::{Document, Filter, FindOptions, MemoryDocumentStore, StoreError, Update, UpdateResult};
    use async_trait::async_trait;
    use std::time::Duration;

    async fn setup() -> (MemoryDocumentStore, SessionStore) {
        let store = MemoryDocumentStore::new();
        AccountRepo::new(&store).ensure_indexes().await.unwrap();
        (store, SessionStore::new(Duration::from_secs(60)))
    }

    fn registration(handle: &str, password: &str) -> Registration {
        Registration::new(handle, "Display Name", password).unwrap()
    }

    #[tokio::test]
    async fn register_twice_is_already_exists() {
        let (store, sessions) = setup().await;
        let service = AccountService::new(&store, &sessions, 4);

        let view = service.register(registration("alice", "pw")).await.unwrap();
        assert_eq!(view.account, "alice");
        assert!(view.token.is_none());

        let err = service.register(registration("alice", "other")).await.unwrap_err();
        assert!(matches!(err, AuthError::AlreadyExists { ref account } if account == "alice"));
        assert_eq!(store.count(ACCOUNT_COLLECTION).await, 1);
    }

    #[tokio::test]
    async fn password_is_not_stored_in_plaintext() {
        let (store, sessions) = setup().await;
        AccountService::new(&store, &sessions, 4)
            .register(registration("alice", "pw"))
            .await
            .unwrap();

        let stored = AccountRepo::new(&store).find_by_handle("alice").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "pw");
        assert!(stored.password_hash.starts_with("$2"));
    }

    #[tokio::test]
    async fn login_issues_new_token_each_time() {
        let (store, sessions) = setup().await;
        let service = AccountService::new(&store, &sessions, 4);
        let registered = service.register(registration("alice", "pw")).await.unwrap();

        let first = service.login("alice", "pw").await.unwrap();
        let second = service.login("alice", "pw").await.unwrap();
        let (t1, t2) = (first.token.unwrap(), second.token.unwrap());
        assert_ne!(t1, t2);
        assert_eq!(sessions.len().await, 2);

        let stored = AccountRepo::new(&store).find_by_handle("alice").await.unwrap().unwrap();
        assert_eq!(stored.user_id, registered.user_id);
        assert_eq!(stored.username, "Display Name");
        assert_eq!(stored.token.as_deref(), Some(t2.as_str()));
    }

    #[tokio::test]
    async fn wrong_password_does_not_touch_sessions() {
        let (store, sessions) = setup().await;
        let service = AccountService::new(&store, &sessions, 4);
        service.register(registration("alice", "pw")).await.unwrap();

        let err = service.login("alice", "nope").await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::AuthenticationFailed(LoginFailure::WrongPassword)
        ));
        assert_eq!(sessions.len().await, 0);

        let stored = AccountRepo::new(&store).find_by_handle("alice").await.unwrap().unwrap();
        assert!(stored.token.is_none());
    }

    #[tokio::test]
    async fn unknown_account_fails() {
        let (store, sessions) = setup().await;
        let err = AccountService::new(&store, &sessions, 4)
            .login("ghost", "pw")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::AuthenticationFailed(LoginFailure::UnknownAccount)
        ));
    }

    #[tokio::test]
    async fn logout_revokes_token() {
        let (store, sessions) = setup().await;
        let service = AccountService::new(&store, &sessions, 4);
        service.register(registration("alice", "pw")).await.unwrap();
        let token = service.login("alice", "pw").await.unwrap().token.unwrap();

        service.logout(Some(&token)).await;
        assert_eq!(sessions.len().await, 0);
        assert!(!sessions.revoke(&token).await);
        service.logout(None).await;
    }

    /// Delegates to memory, but every update fails.
    struct ReadOnlyStore(MemoryDocumentStore);

    #[async_trait]
    impl DocumentStore for ReadOnlyStore {
        async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), StoreError> {
            self.0.ensure_unique(collection, field).await
        }

        async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError> {
            self.0.insert_one(collection, document).await
        }

        async fn find_one(
            &self,
            collection: &str,
            filter: &Filter,
            options: &FindOptions,
        ) -> Result<Option<Document>, StoreError> {
            self.0.find_one(collection, filter, options).await
        }

        async fn find_many(
            &self,
            collection: &str,
            filter: &Filter,
            options: &FindOptions,
        ) -> Result<Vec<Document>, StoreError> {
            self.0.find_many(collection, filter, options).await
        }

        async fn update_one(
            &self,
            _collection: &str,
            _filter: &Filter,
            _update: &Update,
        ) -> Result<UpdateResult, StoreError> {
            Err(StoreError::InvalidUpdate("store is read-only".into()))
        }

        async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
            self.0.delete_one(collection, filter).await
        }
    }

    #[tokio::test]
    async fn failed_token_write_leaves_no_session() {
        let store = ReadOnlyStore(MemoryDocumentStore::new());
        let sessions = SessionStore::new(Duration::from_secs(60));
        let service = AccountService::new(&store, &sessions, 4);
        service.register(registration("alice", "pw")).await.unwrap();

        let err = service.login("alice", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Db(DbError::Store(_))));
        assert_eq!(sessions.len().await, 0);
    }

    #[test]
    fn registration_validation() {
        assert!(Registration::new("", "n", "p").is_err());
        assert!(matches!(
            Registration::new("a", " ", "p").unwrap_err(),
            ValidationError::Empty { field: "username" }
        ));
        assert!(matches!(
            Registration::new("a", "n", "").unwrap_err(),
            ValidationError::Empty { field: "password" }
        ));
    }
}
