//! Engine error taxonomy.
//!
//! Nothing here is fatal. Callers reject the input (`Validation`), ignore
//! stale references (`NotFound`), surface a warning (`Storage`) or discard the
//! attempted move (`InvariantViolation`).

use crate::model::ids::{BoardId, ChecklistItemId, ColumnId, TaskId};
use crate::model::validation::ValidationError;
use crate::repo::board_store::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EngineResult<T> = Result<T, EngineError>;

/// A command referenced something that is no longer on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundError {
    /// The collection is empty, so there is no active board to operate on.
    NoActiveBoard,
    Board(BoardId),
    Column(ColumnId),
    Task(TaskId),
    /// The named column does not list the task.
    TaskNotInColumn {
        task_id: TaskId,
        column_id: ColumnId,
    },
    ChecklistItem {
        task_id: TaskId,
        item_id: ChecklistItemId,
    },
}

impl Display for NotFoundError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoActiveBoard => write!(f, "no active board"),
            Self::Board(id) => write!(f, "board not found: {id}"),
            Self::Column(id) => write!(f, "column not found: {id}"),
            Self::Task(id) => write!(f, "task not found: {id}"),
            Self::TaskNotInColumn { task_id, column_id } => {
                write!(f, "task {task_id} is not in column {column_id}")
            }
            Self::ChecklistItem { task_id, item_id } => {
                write!(f, "checklist item {item_id} not found on task {task_id}")
            }
        }
    }
}

impl Error for NotFoundError {}

#[derive(Debug)]
pub enum EngineError {
    Validation(ValidationError),
    NotFound(NotFoundError),
    Storage(StorageError),
    /// Drag input inconsistent with current state; the move is discarded.
    InvariantViolation(String),
}

impl EngineError {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }

    /// Stable short code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Storage(_) => "storage",
            Self::InvariantViolation(_) => "invariant_violation",
        }
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::InvariantViolation(message) => write!(f, "invariant violation: {message}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::InvariantViolation(_) => None,
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<NotFoundError> for EngineError {
    fn from(value: NotFoundError) -> Self {
        Self::NotFound(value)
    }
}

impl From<StorageError> for EngineError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}
