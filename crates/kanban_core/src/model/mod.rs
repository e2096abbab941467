//! Kanban domain model.
//!
//! # Responsibility
//! - Define the canonical board/column/task records shared by the engine,
//!   the persistence adapter and the filter projection.
//! - Own the single normalization step applied on load and on create.
//!
//! # Invariants
//! - Every ID in a column's `task_ids` has an entry in the board's `tasks`.
//! - No task ID is listed by more than one column.
//! - `column_order` is a permutation of the keys of `columns`.

pub mod board;
pub mod ids;
pub mod task;
pub mod validation;
