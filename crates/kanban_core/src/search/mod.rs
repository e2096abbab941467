//! Derived, read-only board views.
//!
//! # Responsibility
//! - Filter a board by title query and priority for display.
//!
//! # Invariants
//! - Projections never mutate their input and are never persisted.

pub mod filter;
