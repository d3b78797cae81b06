//! Command implementations for the sisuo CLI

pub mod serve;

pub use serve::run_serve;
