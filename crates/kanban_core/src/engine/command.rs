//! Command values accepted by the reducer.
//!
//! Drag gestures arrive as plain [`DragEndEvent`] data and are converted into
//! [`MoveTaskCommand`]/[`MoveColumnCommand`] values, so the engine does not
//! depend on any UI event library.

use crate::engine::error::EngineError;
use crate::model::ids::{BoardId, ChecklistItemId, ColumnId, TaskId};
use crate::model::task::{Label, TaskPatch};
use serde::{Deserialize, Serialize};

/// Position of a task inside a column's `task_ids`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPosition {
    pub column_id: ColumnId,
    pub index: usize,
}

impl TaskPosition {
    pub fn new(column_id: impl Into<String>, index: usize) -> Self {
        Self {
            column_id: column_id.into(),
            index,
        }
    }
}

/// Position of a column inside the board's `column_order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPosition {
    pub index: usize,
}

/// Move one task. `destination == None` means the drag was cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTaskCommand {
    pub source: TaskPosition,
    pub destination: Option<TaskPosition>,
    pub task_id: TaskId,
}

/// Move one column. `destination == None` means the drag was cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveColumnCommand {
    pub source: ColumnPosition,
    pub destination: Option<ColumnPosition>,
    pub column_id: ColumnId,
}

/// Every mutation the engine supports. Column and task commands target the
/// active board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardCommand {
    CreateBoard {
        title: String,
    },
    RenameBoard {
        board_id: BoardId,
        title: String,
    },
    DeleteBoard {
        board_id: BoardId,
    },
    SetActiveBoard {
        board_id: BoardId,
    },
    AddColumn {
        title: String,
    },
    RenameColumn {
        column_id: ColumnId,
        title: String,
    },
    DeleteColumn {
        column_id: ColumnId,
    },
    AddTask {
        column_id: ColumnId,
        title: String,
    },
    DeleteTask {
        task_id: TaskId,
        column_id: ColumnId,
    },
    UpdateTask {
        task_id: TaskId,
        patch: TaskPatch,
    },
    /// Sets the due date from a `yyyy-mm-dd` picker value.
    SetDueDate {
        task_id: TaskId,
        date: String,
    },
    ToggleLabel {
        task_id: TaskId,
        label: Label,
    },
    AddChecklistItem {
        task_id: TaskId,
        text: String,
    },
    ToggleChecklistItem {
        task_id: TaskId,
        item_id: ChecklistItemId,
    },
    DeleteChecklistItem {
        task_id: TaskId,
        item_id: ChecklistItemId,
    },
    MoveTask(MoveTaskCommand),
    MoveColumn(MoveColumnCommand),
}

impl BoardCommand {
    /// Stable snake_case name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateBoard { .. } => "create_board",
            Self::RenameBoard { .. } => "rename_board",
            Self::DeleteBoard { .. } => "delete_board",
            Self::SetActiveBoard { .. } => "set_active_board",
            Self::AddColumn { .. } => "add_column",
            Self::RenameColumn { .. } => "rename_column",
            Self::DeleteColumn { .. } => "delete_column",
            Self::AddTask { .. } => "add_task",
            Self::DeleteTask { .. } => "delete_task",
            Self::UpdateTask { .. } => "update_task",
            Self::SetDueDate { .. } => "set_due_date",
            Self::ToggleLabel { .. } => "toggle_label",
            Self::AddChecklistItem { .. } => "add_checklist_item",
            Self::ToggleChecklistItem { .. } => "toggle_checklist_item",
            Self::DeleteChecklistItem { .. } => "delete_checklist_item",
            Self::MoveTask(_) => "move_task",
            Self::MoveColumn(_) => "move_column",
        }
    }
}

/// What was dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragKind {
    Task,
    Column,
}

/// One end of a drag gesture. `column_id` is absent for column drags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragLocation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<ColumnId>,
    pub index: usize,
}

/// Drag-end payload supplied by the presentation layer.
///
/// Wire shape: `{ "type": "task"|"column", "source": {...},
/// "destination": {...} | null, "draggableId": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragEndEvent {
    #[serde(rename = "type")]
    pub kind: DragKind,
    pub source: DragLocation,
    #[serde(default)]
    pub destination: Option<DragLocation>,
    pub draggable_id: String,
}

impl TryFrom<DragEndEvent> for BoardCommand {
    type Error = EngineError;

    /// Dispatches on `type`.
    ///
    /// # Errors
    /// - `EngineError::InvariantViolation` when a task drag omits `columnId`.
    fn try_from(event: DragEndEvent) -> Result<Self, Self::Error> {
        match event.kind {
            DragKind::Task => {
                let source = task_position(event.source, "source")?;
                let destination = event
                    .destination
                    .map(|location| task_position(location, "destination"))
                    .transpose()?;
                Ok(Self::MoveTask(MoveTaskCommand {
                    source,
                    destination,
                    task_id: event.draggable_id,
                }))
            }
            DragKind::Column => Ok(Self::MoveColumn(MoveColumnCommand {
                source: ColumnPosition {
                    index: event.source.index,
                },
                destination: event.destination.map(|location| ColumnPosition {
                    index: location.index,
                }),
                column_id: event.draggable_id,
            })),
        }
    }
}

fn task_position(location: DragLocation, end: &str) -> Result<TaskPosition, EngineError> {
    let column_id = location
        .column_id
        .ok_or_else(|| EngineError::invariant(format!("task drag {end} has no columnId")))?;
    Ok(TaskPosition {
        column_id,
        index: location.index,
    })
}
