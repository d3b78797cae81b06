//! sisuo-server: accounts, kanban boards and their components over HTTP
//!
//! Boards are single documents in a JSON document store; components live
//! inside the board that owns them. Two store backends share one trait:
//! PostgreSQL JSONB for deployments and an in-memory store for tests and
//! throwaway servers.

pub mod auth;
pub mod config;
pub mod db;
pub mod http;
pub mod models;
pub mod store;

pub use config::{SessionConfig, StoreConfig};
pub use http::{build_router, run_server, AppState, ServerConfig, ServerError};
pub use store::{DocumentStore, MemoryDocumentStore, PgDocumentStore};
