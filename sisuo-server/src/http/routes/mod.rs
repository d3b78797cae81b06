//! Route handlers organized by resource

pub mod health;
pub mod account;
pub mod kanban;
