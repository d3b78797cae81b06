//! Repositories - domain operations over the document store
//!
//! # Design Principles
//!
//! - Components live inside their board document; no separate collection
//! - Rely on store unique indexes, handle conflicts - no check-then-insert
//! - Store and decode failures are returned, never dropped

pub mod repos;

pub use repos::*;
