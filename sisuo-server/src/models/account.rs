//! Accounts: stored record and the view returned to clients

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Maximum length for login handles
const MAX_HANDLE_LEN: usize = 64;

/// Stored account document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub user_id: String,
    /// Login handle, unique across accounts
    pub account: String,
    pub username: String,
    /// bcrypt hash; the persisted field keeps its historical name
    #[serde(rename = "password")]
    pub password_hash: String,
    /// Most recently issued session token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Account as returned over HTTP. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountView {
    pub user_id: String,
    pub account: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl From<Account> for AccountView {
    fn from(a: Account) -> Self {
        Self {
            user_id: a.user_id,
            account: a.account,
            username: a.username,
            token: a.token,
        }
    }
}

/// Validated login handle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountHandle(String);

impl AccountHandle {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "account" });
        }

        if trimmed.chars().count() > MAX_HANDLE_LEN {
            return Err(ValidationError::TooLong {
                field: "account",
                max: MAX_HANDLE_LEN,
            });
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(ValidationError::InvalidFormat {
                field: "account",
                reason: "must not contain whitespace",
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_rules() {
        assert_eq!(AccountHandle::new(" alice ").unwrap().as_str(), "alice");
        assert!(matches!(
            AccountHandle::new("").unwrap_err(),
            ValidationError::Empty { .. }
        ));
        assert!(matches!(
            AccountHandle::new("al ice").unwrap_err(),
            ValidationError::InvalidFormat { .. }
        ));
        assert!(matches!(
            AccountHandle::new(&"a".repeat(65)).unwrap_err(),
            ValidationError::TooLong { max: 64, .. }
        ));
    }

    #[test]
    fn view_hides_password() {
        let account = Account {
            user_id: "u1".into(),
            account: "alice".into(),
            username: "Alice".into(),
            password_hash: "$2b$04$hash".into(),
            token: None,
        };
        let stored = serde_json::to_value(&account).unwrap();
        assert_eq!(stored["password"], "$2b$04$hash");
        assert!(stored.get("token").is_none());

        let view = serde_json::to_value(AccountView::from(account)).unwrap();
        assert!(view.get("password").is_none());
        assert_eq!(view["userId"], "u1");
    }
}
