//! In-process session tokens
//!
//! Tokens map to the account that logged in. Entries expire after the
//! configured TTL and issuing a new token purges every expired one.
//! Sessions do not survive a restart.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Issued session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub account: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Shared token → session map
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: chrono::Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        // Out-of-range TTLs are capped at a century
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500));
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Issue a fresh token for the account. Earlier tokens stay valid until they expire.
    pub async fn issue(&self, user_id: &str, account: &str) -> Session {
        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id: user_id.to_owned(),
            account: account.to_owned(),
            expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        };

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        let purged = before - sessions.len();
        if purged > 0 {
            tracing::debug!(purged, "expired sessions removed");
        }
        sessions.insert(session.token.clone(), session.clone());

        session
    }

    /// Drop `token`. Returns whether it existed.
    pub async fn revoke(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// Number of stored sessions, expired ones included until purged.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn issued_session_carries_account() {
        let store = SessionStore::new(Duration::from_secs(60));
        let session = store.issue("u1", "alice").await;

        assert_eq!(session.user_id, "u1");
        assert_eq!(session.account, "alice");
        assert!(!session.is_expired(Utc::now()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn each_issue_is_a_new_token() {
        let store = SessionStore::new(Duration::from_secs(60));
        let a = store.issue("u1", "alice").await;
        let b = store.issue("u1", "alice").await;
        assert_ne!(a.token, b.token);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn expired_sessions_are_purged_on_issue() {
        let store = SessionStore::new(Duration::ZERO);
        let old = store.issue("u1", "alice").await;
        assert!(old.is_expired(Utc::now()));

        store.issue("u2", "bob").await;
        // The first token was purged when the second was issued
        assert_eq!(store.len().await, 1);
        assert!(!store.revoke(&old.token).await);
    }

    #[tokio::test]
    async fn revoke_removes() {
        let store = SessionStore::new(Duration::from_secs(60));
        let s = store.issue("u1", "alice").await;
        assert!(store.revoke(&s.token).await);
        assert!(!store.revoke(&s.token).await);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn concurrent_issues_are_all_kept() {
        let store = SessionStore::new(Duration::from_secs(60));
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.issue(&format!("u{i}"), "acct").await })
            })
            .collect();
        for handle in handles {
            handle.await.expect("task panicked");
        }
        assert_eq!(store.len().await, 32);
    }
}
