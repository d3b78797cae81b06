//! Document store - collections of JSON documents
//!
//! # Design Principles
//!
//! - One store value built at startup and shared as `Arc<dyn DocumentStore>`
//! - Uniqueness via store indexes, no check-then-insert
//! - Single-document updates are atomic (row lock on PostgreSQL)
//! - Every PostgreSQL call is bounded by a timeout with one retry on transient failure

pub mod document;
pub mod memory;
pub mod pool;
pub mod postgres;
pub mod retry;

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

pub use document::{from_document, to_document, Document, Filter, FindOptions, Update, UpdateResult};
pub use memory::MemoryDocumentStore;
pub use pool::{create_pool, ensure_schema};
pub use postgres::PgDocumentStore;
pub use retry::RetryPolicy;

/// Store error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("{op} timed out after {timeout:?}")]
    Timeout { op: &'static str, timeout: Duration },

    #[error("duplicate key in collection '{collection}'")]
    Duplicate { collection: String },

    #[error("malformed document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("document must be a JSON object, got {kind}")]
    NotAnObject { kind: &'static str },

    #[error("invalid update: {0}")]
    InvalidUpdate(String),

    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),
}

impl StoreError {
    /// Whether a single retry may succeed: connection drops, pool
    /// exhaustion and per-attempt timeouts.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Sqlx(sqlx::Error::Io(_))
                | Self::Sqlx(sqlx::Error::PoolTimedOut)
                | Self::Timeout { .. }
        )
    }

    /// Whether the failure happened before any statement reached the
    /// server. Only these are safe to retry for non-idempotent writes.
    pub fn is_unsent(&self) -> bool {
        matches!(self, Self::Sqlx(sqlx::Error::PoolTimedOut))
    }
}

/// Collection and field names end up in index DDL, so keep them plain.
static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,47}$").expect("invalid identifier regex"));

pub(crate) fn check_identifier(name: &str) -> Result<(), StoreError> {
    if IDENT_RE.is_match(name) {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(name.to_owned()))
    }
}

/// Primitives over named collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Declare `field` unique within `collection`. Idempotent.
    async fn ensure_unique(&self, collection: &str, field: &str) -> Result<(), StoreError>;

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), StoreError>;

    /// First matching document in insertion order.
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Option<Document>, StoreError>;

    /// All matching documents in insertion order.
    async fn find_many(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Document>, StoreError>;

    /// Apply `update` to the first matching document.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Update,
    ) -> Result<UpdateResult, StoreError>;

    /// Delete the first matching document. Returns the number deleted (0 or 1).
    async fn delete_one(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;
}
