//! Persistence adapter for the board collection.
//!
//! # Responsibility
//! - Define the `BoardStore` contract the engine uses as a side-effect sink.
//! - Keep serialization and backend details out of the engine.
//!
//! # Invariants
//! - Stores hold no business logic beyond the shared normalization step.
//! - Store failures are typed `StorageError`s, never panics.

pub mod board_store;
