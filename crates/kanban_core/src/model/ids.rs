//! Identifier aliases and generation.

use uuid::Uuid;

/// Board identifier (`board-…`).
pub type BoardId = String;
/// Column identifier, unique within one board (`col-…`).
pub type ColumnId = String;
/// Task identifier, unique within one board (`task-…`).
pub type TaskId = String;
/// Label identifier (`l1`…`l5` for the built-in palette).
pub type LabelId = String;
/// Checklist item identifier, unique within one task (`item-…`).
pub type ChecklistItemId = String;

pub(crate) const BOARD_PREFIX: &str = "board";
pub(crate) const COLUMN_PREFIX: &str = "col";
pub(crate) const TASK_PREFIX: &str = "task";
pub(crate) const CHECKLIST_ITEM_PREFIX: &str = "item";

/// Generates a fresh `<prefix>-<uuid v4>` identifier.
pub fn generate_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}
