//! Repository implementations over `DocumentStore`

pub mod boards;
pub mod accounts;

pub use boards::{BoardRepo, NewBoard, KANBAN_COLLECTION};
pub use accounts::{AccountRepo, ACCOUNT_COLLECTION};

use crate::store::StoreError;

/// Repository error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },
}
