//! Accounts and sessions
//!
//! - Registration with bcrypt-hashed passwords
//! - Login issuing expiring session tokens
//! - Logout revoking a token

pub mod accounts;
pub mod password;
pub mod sessions;

pub use accounts::{AccountService, Registration};
pub use sessions::{Session, SessionStore};

use crate::db::DbError;
use crate::models::ValidationError;

/// Why a login was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    UnknownAccount,
    WrongPassword,
}

/// Account operation error type
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("account '{account}' already exists")]
    AlreadyExists { account: String },

    #[error("authentication failed: {0:?}")]
    AuthenticationFailed(LoginFailure),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("password hashing failed: {0}")]
    Hash(String),
}
