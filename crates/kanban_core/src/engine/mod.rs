//! Board engine: commands, errors and the reducer that applies them.
//!
//! # Responsibility
//! - Express every mutation as a plain [`command::BoardCommand`] value.
//! - Apply commands to an explicitly owned collection via [`reducer::apply`].
//!
//! # Invariants
//! - The reducer has no side effects; persistence and logging live in
//!   `service::board_service`.

pub mod command;
pub mod error;
pub mod reducer;
