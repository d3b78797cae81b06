//! Domain models with validation at construction
//!
//! Request input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod board;
pub mod account;

pub use validation::{require, ValidationError};
pub use board::{Anchor, Board, BoardSummary, BoardTitle, Component, Link, Position, Size};
pub use account::{Account, AccountHandle, AccountView};
